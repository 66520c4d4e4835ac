//! The [`record!`](crate::record) macro.

/// Implement [`Node`](crate::pathwalk::Node) and
/// [`Record`](crate::pathwalk::Record) for a struct by listing the fields the
/// walker may address.
///
/// Fields marked `#[embedded]` are resolved as if their own fields were
/// declared on the parent. Fields marked `#[private]` can only be written when
/// the walker has unsafe access enabled. Fields left out of the list are
/// invisible to path lookups.
///
/// ```
/// use git_config_source::record;
///
/// #[derive(Debug, Clone, Default)]
/// struct Remote {
///     url: String,
///     prune: bool,
/// }
///
/// record!(Remote { url, prune });
/// ```
#[macro_export]
macro_rules! record {
    ($ty:ty { $( $(#[$flag:ident])* $field:ident ),* $(,)? }) => {
        impl $crate::pathwalk::Record for $ty {
            fn fields(&self) -> &'static [$crate::pathwalk::Field] {
                const FIELDS: &[$crate::pathwalk::Field] = &[
                    $( $crate::pathwalk::Field::new(stringify!($field)) $(.$flag())* ),*
                ];
                FIELDS
            }

            #[allow(unused_variables)]
            fn field(&self, name: &str) -> Option<&dyn $crate::pathwalk::Node> {
                $(
                    if name == stringify!($field) {
                        return Some(&self.$field as &dyn $crate::pathwalk::Node);
                    }
                )*
                None
            }

            #[allow(unused_variables)]
            fn field_mut(&mut self, name: &str) -> Option<&mut dyn $crate::pathwalk::Node> {
                $(
                    if name == stringify!($field) {
                        return Some(&mut self.$field as &mut dyn $crate::pathwalk::Node);
                    }
                )*
                None
            }
        }

        impl $crate::pathwalk::Node for $ty {
            fn shape(&self) -> $crate::pathwalk::Shape<'_> {
                $crate::pathwalk::Shape::Record(self)
            }

            fn shape_mut(&mut self) -> $crate::pathwalk::ShapeMut<'_> {
                $crate::pathwalk::ShapeMut::Record(self)
            }
        }
    };
}
