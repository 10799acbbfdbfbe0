//! # EsoxSolutions.RecyclePool
//!
//! Single-threaded recycling pool for objects that are expensive to build,
//! such as scene nodes spawned for short-lived particle bursts. Released
//! instances are parked and handed out again instead of being destroyed and
//! rebuilt.
//!
//! ## Features
//!
//! - Active/inactive partitions with lazy construction on demand
//! - Pluggable construction strategies (closures or [`TemplateStrategy`])
//! - Lifecycle listeners: `on_construct` once, `on_create` / `on_recycle` per cycle
//! - Bulk release and full teardown that tolerate host-destroyed objects
//! - Adoption of externally built instances and pool warm-up
//! - Metrics, Prometheus text export and health monitoring
//!
//! ## Quick Start
//!
//! ```rust
//! use esox_recyclepool::{Pool, Poolable, TemplateStrategy};
//!
//! #[derive(Clone, Default)]
//! struct Particle {
//!     age: f32,
//! }
//!
//! impl Poolable for Particle {}
//!
//! let mut pool = Pool::new(TemplateStrategy::new(Particle::default()));
//!
//! let id = pool.acquire().unwrap();
//! pool.get_mut(id).unwrap().age = 0.5;
//! pool.release(id).unwrap();
//!
//! assert_eq!(pool.inactive_count(), 1);
//! ```

mod config;
mod errors;
mod health;
mod instance;
mod lifecycle;
mod metrics;
mod pool;
mod strategy;

pub use config::PoolConfiguration;
pub use errors::{BoxError, ConstructionError, ListenerError, PoolError, PoolResult};
pub use health::HealthStatus;
pub use instance::{InstanceId, InstanceInfo, Partition, Poolable, TemplateKey};
pub use lifecycle::{Blueprint, LifecycleEvent, LifecycleListener};
pub use metrics::{MetricsExporter, PoolMetrics};
pub use pool::Pool;
pub use strategy::{ConstructionStrategy, TemplateStrategy};
