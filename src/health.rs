//! Health monitoring for pools

/// Health status of a pool
///
/// Built by [`Pool::health_status`](crate::Pool::health_status), which checks
/// the liveness of every managed handle. A pool holding handles the host has
/// already destroyed is reported unhealthy.
///
/// # Examples
///
/// ```
/// use esox_recyclepool::{Pool, PoolConfiguration, Poolable, TemplateStrategy};
///
/// #[derive(Clone)]
/// struct Spark;
///
/// impl Poolable for Spark {}
///
/// let pool = Pool::with_config(
///     TemplateStrategy::new(Spark),
///     PoolConfiguration::new().with_warmup(3),
/// )
/// .unwrap();
///
/// let health = pool.health_status();
/// assert!(health.is_healthy());
/// assert_eq!(health.inactive_objects, 3);
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct HealthStatus {
    /// Whether the pool is healthy
    pub is_healthy: bool,

    /// Number of warnings detected
    pub warning_count: usize,

    /// Share of managed instances that are active (0.0 to 1.0)
    pub utilization: f64,

    pub active_objects: usize,

    pub inactive_objects: usize,

    /// Handles in either partition whose underlying object is gone
    pub stale_objects: usize,

    /// Warning messages
    pub warnings: Vec<String>,
}

impl HealthStatus {
    /// Create a new health status
    pub fn new(active: usize, inactive: usize, stale: usize) -> Self {
        let total = active + inactive;
        let utilization = if total > 0 {
            active as f64 / total as f64
        } else {
            0.0
        };

        let mut warnings = Vec::new();
        let mut is_healthy = true;

        if stale > 0 {
            warnings.push(format!("{} handle(s) destroyed outside the pool", stale));
            is_healthy = false;
        }

        // The pool never rejects a request, so high utilization only means
        // the next acquire is likely to construct.
        if total > 0 && utilization > 0.9 {
            warnings.push(format!("High utilization: {:.1}%", utilization * 100.0));
        }

        Self {
            is_healthy,
            warning_count: warnings.len(),
            utilization,
            active_objects: active,
            inactive_objects: inactive,
            stale_objects: stale,
            warnings,
        }
    }

    /// Check if the pool is healthy
    pub fn is_healthy(&self) -> bool {
        self.is_healthy
    }
}
