//! Error types for the recycling pool

use crate::instance::InstanceId;
use crate::lifecycle::LifecycleEvent;
use thiserror::Error;

/// Boxed error carried as the source of construction and listener failures
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error returned by a lifecycle listener hook
pub type ListenerError = BoxError;

/// Failure of a construction strategy to produce a new instance
#[derive(Error, Debug)]
pub enum ConstructionError {
    #[error("No template set - cannot construct a new instance")]
    MissingTemplate,

    #[error("Instance construction failed: {0}")]
    Failed(#[source] BoxError),
}

impl ConstructionError {
    /// Wrap any error as a construction failure
    pub fn failed<E>(err: E) -> Self
    where
        E: Into<BoxError>,
    {
        Self::Failed(err.into())
    }
}

#[derive(Error, Debug)]
pub enum PoolError {
    #[error(transparent)]
    Construction(#[from] ConstructionError),

    #[error("Listener failed during {event} of instance {instance}: {source}")]
    Listener {
        event: LifecycleEvent,
        instance: InstanceId,
        #[source]
        source: ListenerError,
    },

    #[error("Instance {0} is not managed by this pool")]
    UnknownInstance(InstanceId),

    #[error("Instance was already destroyed and cannot be adopted")]
    InstanceDestroyed,
}

impl PoolError {
    /// True when the pool had no template to construct from
    pub fn is_missing_template(&self) -> bool {
        matches!(self, Self::Construction(ConstructionError::MissingTemplate))
    }
}

pub type PoolResult<T> = Result<T, PoolError>;
