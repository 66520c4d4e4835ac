//! Ordered chain of sources.

use super::error::SourceError;
use super::Source;
use crate::pathwalk::Node;
use tracing::{debug, info};

/// Loads each source into the same record in turn, so later layers override
/// earlier ones.
#[derive(Default)]
pub struct Layers {
    sources: Vec<Box<dyn Source>>,
}

impl Layers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, source: impl Source + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    pub fn names(&self) -> Vec<&str> {
        self.sources.iter().map(|source| source.name()).collect()
    }

    /// Stops at the first failing layer. Layers loaded before it stay applied.
    pub async fn load(&self, dest: &mut dyn Node) -> Result<(), SourceError> {
        for source in &self.sources {
            debug!(layer = source.name(), "loading layer");
            source
                .load(dest)
                .await
                .map_err(|error| SourceError::Layer {
                    name: source.name().to_string(),
                    source: Box::new(error),
                })?;
        }
        info!(layers = self.sources.len(), "configuration loaded");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::OverrideSource;

    #[derive(Debug, Clone, Default)]
    struct Settings {
        schedule: String,
        strict: bool,
    }

    crate::record!(Settings { schedule, strict });

    #[tokio::test]
    async fn test_later_layers_override() {
        let layers = Layers::new()
            .with(OverrideSource::new().with("schedule", "base").with("strict", "1"))
            .with(OverrideSource::new().with("schedule", "top"));

        let mut settings = Settings::default();
        layers.load(&mut settings).await.unwrap();
        assert_eq!(settings.schedule, "top");
        assert!(settings.strict);
    }

    #[tokio::test]
    async fn test_failure_is_wrapped_with_layer_name() {
        let layers = Layers::new()
            .with(OverrideSource::new().with("schedule", "kept"))
            .with(OverrideSource::new().with("unknown", "x"));

        let mut settings = Settings::default();
        let err = layers.load(&mut settings).await.unwrap_err();
        assert!(matches!(err, SourceError::Layer { .. }));
        assert!(err.to_string().starts_with("overrides layer failed:"), "{err}");
        assert_eq!(settings.schedule, "kept");
    }
}
