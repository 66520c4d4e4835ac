//! JSON rendering of a node tree.

use super::node::{Node, Shape};
use serde_json::{Map, Value};

/// Render `node` as JSON. Unset optionals become `null`, records and maps
/// become objects keyed by field name or map key.
pub fn snapshot(node: &dyn Node) -> Value {
    match node.shape() {
        Shape::Scalar(scalar) => scalar.to_json(),
        Shape::Nullable(nullable) => nullable.inner().map_or(Value::Null, snapshot),
        Shape::List(list) => Value::Array(
            (0..list.len())
                .filter_map(|index| list.element(index))
                .map(snapshot)
                .collect(),
        ),
        Shape::Map(map) => {
            let mut entries = map.entries();
            entries.sort_by_key(|(key, _)| *key);
            Value::Object(
                entries
                    .into_iter()
                    .map(|(key, value)| (key.to_string(), snapshot(value)))
                    .collect(),
            )
        }
        Shape::Record(record) => {
            let mut object = Map::new();
            for field in record.fields() {
                if let Some(value) = record.field(field.name) {
                    object.insert(field.name.to_string(), snapshot(value));
                }
            }
            Value::Object(object)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    #[derive(Debug, Clone, Default)]
    struct Remote {
        url: String,
        mirrors: Vec<String>,
    }

    #[derive(Debug, Clone, Default)]
    struct Settings {
        enabled: bool,
        retries: u8,
        remote: Option<Remote>,
        labels: HashMap<String, f64>,
    }

    crate::record!(Remote { url, mirrors });
    crate::record!(Settings {
        enabled,
        retries,
        remote,
        labels
    });

    #[test]
    fn test_snapshot_default() {
        let settings = Settings::default();
        assert_eq!(
            snapshot(&settings),
            json!({"enabled": false, "retries": 0, "remote": null, "labels": {}})
        );
    }

    #[test]
    fn test_snapshot_nested() {
        let settings = Settings {
            enabled: true,
            retries: 3,
            remote: Some(Remote {
                url: "git@host:repo".into(),
                mirrors: vec!["a".into(), "b".into()],
            }),
            labels: HashMap::from([("weight".to_string(), 0.5)]),
        };
        assert_eq!(
            snapshot(&settings),
            json!({
                "enabled": true,
                "retries": 3,
                "remote": {"url": "git@host:repo", "mirrors": ["a", "b"]},
                "labels": {"weight": 0.5}
            })
        );
    }
}
