//! Configuration sources that fill a record.
//!
//! Each source applies dot-path assignments to the same destination through
//! [`pathwalk`](crate::pathwalk). [`Layers`] chains them so that git config,
//! the environment and explicit overrides are applied in that order.

mod env;
mod error;
mod executor;
mod git;
mod layers;
mod overrides;

pub use env::{EnvBinding, EnvSource};
pub use error::{ExecError, SourceError};
pub use executor::{GitCommand, QueryExecutor};
pub use git::{DEFAULT_PARAMETERS_ENV, GitConfigSource};
pub use layers::Layers;
pub use overrides::OverrideSource;

use crate::pathwalk::Node;
use async_trait::async_trait;

/// Something that can write configuration into a record.
#[async_trait]
pub trait Source: Send + Sync {
    /// Short name used in logs and errors.
    fn name(&self) -> &str;

    async fn load(&self, dest: &mut dyn Node) -> Result<(), SourceError>;
}
