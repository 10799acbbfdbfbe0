//! Metrics collection and export for pools

use std::collections::HashMap;

/// Metrics snapshot of a pool
///
/// # Examples
///
/// ```
/// use esox_recyclepool::{Pool, Poolable, TemplateStrategy};
///
/// #[derive(Clone)]
/// struct Spark;
///
/// impl Poolable for Spark {}
///
/// let mut pool = Pool::new(TemplateStrategy::new(Spark));
///
/// let id = pool.acquire().unwrap();
/// pool.release(id).unwrap();
/// pool.acquire().unwrap();
///
/// let metrics = pool.get_metrics();
/// assert_eq!(metrics.total_constructed, 1);
/// assert_eq!(metrics.total_acquired, 2);
/// assert_eq!(metrics.total_reused, 1);
/// assert_eq!(metrics.active_objects, 1);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PoolMetrics {
    /// Instances built by the construction strategy
    pub total_constructed: u64,

    /// Instances brought in through `adopt`
    pub total_adopted: u64,

    /// Successful acquisitions, fresh or reused
    pub total_acquired: u64,

    /// Acquisitions served from the inactive partition
    pub total_reused: u64,

    /// Releases that moved an instance back to the inactive partition
    pub total_released: u64,

    /// Instances destroyed by `clear`
    pub total_destroyed: u64,

    /// Handles found already destroyed by the host and dropped from the pool
    pub stale_discarded: u64,

    /// Current active objects
    pub active_objects: usize,

    /// Current inactive objects
    pub inactive_objects: usize,

    /// Share of managed instances that are active (0.0 to 1.0)
    pub utilization: f64,
}

impl PoolMetrics {
    /// Fraction of acquisitions that avoided construction
    pub fn reuse_ratio(&self) -> f64 {
        if self.total_acquired > 0 {
            self.total_reused as f64 / self.total_acquired as f64
        } else {
            0.0
        }
    }

    /// Export metrics as a HashMap
    pub fn export(&self) -> HashMap<String, String> {
        let mut metrics = HashMap::new();
        metrics.insert("total_constructed".to_string(), self.total_constructed.to_string());
        metrics.insert("total_adopted".to_string(), self.total_adopted.to_string());
        metrics.insert("total_acquired".to_string(), self.total_acquired.to_string());
        metrics.insert("total_reused".to_string(), self.total_reused.to_string());
        metrics.insert("total_released".to_string(), self.total_released.to_string());
        metrics.insert("total_destroyed".to_string(), self.total_destroyed.to_string());
        metrics.insert("stale_discarded".to_string(), self.stale_discarded.to_string());
        metrics.insert("active_objects".to_string(), self.active_objects.to_string());
        metrics.insert("inactive_objects".to_string(), self.inactive_objects.to_string());
        metrics.insert("utilization".to_string(), format!("{:.2}", self.utilization));
        metrics.insert("reuse_ratio".to_string(), format!("{:.2}", self.reuse_ratio()));
        metrics
    }
}

/// Metrics exporter for Prometheus format
pub struct MetricsExporter;

impl MetricsExporter {
    /// Export metrics in Prometheus exposition format
    ///
    /// Extra tags are emitted after the `pool` label, sorted by key.
    ///
    /// # Examples
    ///
    /// ```
    /// use esox_recyclepool::{Pool, Poolable, TemplateStrategy};
    /// use std::collections::HashMap;
    ///
    /// #[derive(Clone)]
    /// struct Spark;
    ///
    /// impl Poolable for Spark {}
    ///
    /// let pool = Pool::new(TemplateStrategy::new(Spark));
    ///
    /// let mut tags = HashMap::new();
    /// tags.insert("scene".to_string(), "arena".to_string());
    ///
    /// let output = pool.export_metrics_prometheus(Some(&tags));
    /// assert!(output.contains("recyclepool_objects_active"));
    /// assert!(output.contains("scene=\"arena\""));
    /// ```
    pub fn export_prometheus(
        metrics: &PoolMetrics,
        pool_name: &str,
        tags: Option<&HashMap<String, String>>,
    ) -> String {
        let mut output = String::new();
        let labels = Self::format_labels(pool_name, tags);

        // Gauge metrics
        Self::push_metric(&mut output, "recyclepool_objects_active", "gauge", "Current active objects", &labels, metrics.active_objects);
        Self::push_metric(&mut output, "recyclepool_objects_inactive", "gauge", "Current inactive objects", &labels, metrics.inactive_objects);
        Self::push_metric(&mut output, "recyclepool_utilization", "gauge", "Pool utilization ratio", &labels, format!("{:.2}", metrics.utilization));

        // Counter metrics
        Self::push_metric(&mut output, "recyclepool_objects_constructed_total", "counter", "Total objects constructed", &labels, metrics.total_constructed);
        Self::push_metric(&mut output, "recyclepool_objects_adopted_total", "counter", "Total objects adopted", &labels, metrics.total_adopted);
        Self::push_metric(&mut output, "recyclepool_objects_acquired_total", "counter", "Total objects acquired", &labels, metrics.total_acquired);
        Self::push_metric(&mut output, "recyclepool_objects_reused_total", "counter", "Total acquisitions served by reuse", &labels, metrics.total_reused);
        Self::push_metric(&mut output, "recyclepool_objects_released_total", "counter", "Total objects released", &labels, metrics.total_released);
        Self::push_metric(&mut output, "recyclepool_objects_destroyed_total", "counter", "Total objects destroyed", &labels, metrics.total_destroyed);
        Self::push_metric(&mut output, "recyclepool_stale_discarded_total", "counter", "Externally destroyed handles discarded", &labels, metrics.stale_discarded);

        output
    }

    fn push_metric(
        output: &mut String,
        name: &str,
        kind: &str,
        help: &str,
        labels: &str,
        value: impl std::fmt::Display,
    ) {
        output.push_str(&format!("# HELP {} {}\n", name, help));
        output.push_str(&format!("# TYPE {} {}\n", name, kind));
        output.push_str(&format!("{}{{{}}} {}\n", name, labels, value));
    }

    fn format_labels(pool_name: &str, tags: Option<&HashMap<String, String>>) -> String {
        let mut labels = vec![format!("pool=\"{}\"", pool_name)];

        if let Some(tags) = tags {
            let mut sorted: Vec<_> = tags.iter().collect();
            sorted.sort();
            for (key, value) in sorted {
                labels.push(format!("{}=\"{}\"", key, value));
            }
        }

        labels.join(",")
    }
}

/// Internal counters, updated by the pool as it runs
#[derive(Debug, Default)]
pub(crate) struct MetricsTracker {
    pub constructed: u64,
    pub adopted: u64,
    pub acquired: u64,
    pub reused: u64,
    pub released: u64,
    pub destroyed: u64,
    pub stale_discarded: u64,
}

impl MetricsTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_metrics(&self, active: usize, inactive: usize) -> PoolMetrics {
        let total = active + inactive;
        let utilization = if total > 0 {
            active as f64 / total as f64
        } else {
            0.0
        };

        PoolMetrics {
            total_constructed: self.constructed,
            total_adopted: self.adopted,
            total_acquired: self.acquired,
            total_reused: self.reused,
            total_released: self.released,
            total_destroyed: self.destroyed,
            stale_discarded: self.stale_discarded,
            active_objects: active,
            inactive_objects: inactive,
            utilization,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utilization_and_reuse_ratio() {
        let tracker = MetricsTracker {
            acquired: 4,
            reused: 3,
            ..MetricsTracker::new()
        };
        let metrics = tracker.get_metrics(3, 1);
        assert_eq!(metrics.utilization, 0.75);
        assert_eq!(metrics.reuse_ratio(), 0.75);

        let empty = MetricsTracker::new().get_metrics(0, 0);
        assert_eq!(empty.utilization, 0.0);
        assert_eq!(empty.reuse_ratio(), 0.0);
    }

    #[test]
    fn test_export_keys() {
        let exported = MetricsTracker::new().get_metrics(1, 1).export();
        assert_eq!(exported["active_objects"], "1");
        assert_eq!(exported["utilization"], "0.50");
        assert_eq!(exported.len(), 11);
    }

    #[test]
    fn test_prometheus_labels_sorted() {
        let metrics = MetricsTracker::new().get_metrics(2, 0);
        let mut tags = HashMap::new();
        tags.insert("zone".to_string(), "b".to_string());
        tags.insert("app".to_string(), "game".to_string());

        let output = MetricsExporter::export_prometheus(&metrics, "sparks", Some(&tags));
        assert!(output.contains("recyclepool_objects_active{pool=\"sparks\",app=\"game\",zone=\"b\"} 2\n"));
        assert!(output.contains("# TYPE recyclepool_objects_released_total counter\n"));
    }
}
