//! Instance handles and the host capabilities a pooled object provides

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_TEMPLATE_KEY: AtomicU64 = AtomicU64::new(1);

/// Opaque handle identifying an instance managed by a [`Pool`](crate::Pool)
///
/// Ids are assigned by the pool and never reused by that pool, so a handle
/// left over from before a [`Pool::clear`](crate::Pool::clear) cannot alias a
/// fresh instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceId(u64);

impl InstanceId {
    /// Build a handle from its raw value
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the raw value
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identity marker tying an instance back to the template it was built from
///
/// Keys are plain integers handed out at pool creation, not hashes of the
/// template, so two templates never share a key by accident.
///
/// # Examples
///
/// ```
/// use esox_recyclepool::TemplateKey;
///
/// let a = TemplateKey::generate();
/// let b = TemplateKey::generate();
/// assert_ne!(a, b);
/// assert_eq!(TemplateKey::new(42).raw(), 42);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TemplateKey(u64);

impl TemplateKey {
    /// Use a stable, caller-chosen key
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Generate a process-unique key
    pub fn generate() -> Self {
        Self(NEXT_TEMPLATE_KEY.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw value
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TemplateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "template-{}", self.0)
    }
}

/// Host capabilities the pool needs from a managed object
///
/// Pooled values are usually cheap handles into a host runtime (a scene
/// node, an entity id) whose underlying object the host may free on its own.
pub trait Poolable {
    /// Whether the underlying object still exists.
    ///
    /// Bulk operations skip handles that report `false` and treat them as
    /// already removed.
    fn is_alive(&self) -> bool {
        true
    }

    /// Tear down the underlying object. The pool calls this only for live
    /// instances, from [`Pool::clear`](crate::Pool::clear) or when an
    /// `on_construct` listener rejects a freshly built instance.
    fn destroy(&mut self) {}
}

/// Which partition an instance currently belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Partition {
    Active,
    Inactive,
}

/// Pool-side metadata of a managed instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceInfo {
    pub id: InstanceId,
    pub template: TemplateKey,
    pub partition: Partition,
    /// How many times the instance has been handed out by `acquire`
    pub times_acquired: u64,
    pub listeners: usize,
}
