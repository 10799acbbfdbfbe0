//! Pool configuration options

use crate::instance::TemplateKey;

/// Configuration for pool behavior
///
/// # Examples
///
/// ```
/// use esox_recyclepool::{PoolConfiguration, TemplateKey};
///
/// let config = PoolConfiguration::new()
///     .with_name("sparks")
///     .with_initial_capacity(64)
///     .with_warmup(16)
///     .with_template_key(TemplateKey::new(7));
///
/// assert_eq!(config.name, "sparks");
/// assert_eq!(config.warmup_size, Some(16));
/// ```
#[derive(Debug, Clone)]
pub struct PoolConfiguration {
    /// Name used in log events and metric labels
    pub name: String,

    /// Capacity reserved up front for each partition
    pub initial_capacity: usize,

    /// Number of instances constructed eagerly when the pool is created
    pub warmup_size: Option<usize>,

    /// Stable identity marker for instances of this pool; generated when unset
    pub template_key: Option<TemplateKey>,
}

impl Default for PoolConfiguration {
    fn default() -> Self {
        Self {
            name: "pool".to_string(),
            initial_capacity: 0,
            warmup_size: None,
            template_key: None,
        }
    }
}

impl PoolConfiguration {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Reserve room in both partitions
    pub fn with_initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    /// Set warm-up size
    pub fn with_warmup(mut self, size: usize) -> Self {
        self.warmup_size = Some(size);
        self
    }

    pub fn with_template_key(mut self, key: TemplateKey) -> Self {
        self.template_key = Some(key);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PoolConfiguration::default();
        assert_eq!(config.name, "pool");
        assert_eq!(config.initial_capacity, 0);
        assert!(config.warmup_size.is_none());
        assert!(config.template_key.is_none());
    }
}
