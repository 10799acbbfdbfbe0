//! Lifecycle notifications delivered to listeners attached to pooled instances
//!
//! Every instance carries an ordered list of listeners, filled when the
//! instance is built (see [`Blueprint`]) or later through
//! [`Pool::attach`](crate::Pool::attach). The pool walks that list in
//! attachment order right after each transition:
//!
//! - `Construct` once, after the instance is built and before it is ever active
//! - `Create` on every acquire, after the instance is marked active
//! - `Recycle` on every release, after the instance is marked inactive
//!
//! A listener error stops the walk for that event and is returned to the
//! caller of the pool operation. For `Create` and `Recycle` the partition
//! change has already happened, so only the remaining listeners miss the
//! event. A failed `Construct` drops the new instance instead, so it is never
//! handed out half built.

use crate::errors::ListenerError;
use std::fmt;

/// One of the three pool-driven transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleEvent {
    Construct,
    Create,
    Recycle,
}

impl fmt::Display for LifecycleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LifecycleEvent::Construct => "construct",
            LifecycleEvent::Create => "create",
            LifecycleEvent::Recycle => "recycle",
        };
        f.write_str(name)
    }
}

/// Capability implemented by sub-parts that react to pool transitions
///
/// All methods default to doing nothing.
///
/// # Examples
///
/// ```
/// use esox_recyclepool::{LifecycleListener, ListenerError};
///
/// #[derive(Default)]
/// struct Emitter {
///     bursts: u32,
/// }
///
/// struct ResetEmitter;
///
/// impl LifecycleListener<Emitter> for ResetEmitter {
///     fn on_create(&mut self, emitter: &mut Emitter) -> Result<(), ListenerError> {
///         emitter.bursts += 1;
///         Ok(())
///     }
/// }
/// ```
pub trait LifecycleListener<T> {
    fn on_construct(&mut self, _instance: &mut T) -> Result<(), ListenerError> {
        Ok(())
    }

    fn on_create(&mut self, _instance: &mut T) -> Result<(), ListenerError> {
        Ok(())
    }

    fn on_recycle(&mut self, _instance: &mut T) -> Result<(), ListenerError> {
        Ok(())
    }
}

/// A freshly built instance together with the listeners to attach to it
pub struct Blueprint<T> {
    pub(crate) instance: T,
    pub(crate) listeners: Listeners<T>,
}

impl<T> Blueprint<T> {
    pub fn new(instance: T) -> Self {
        Self {
            instance,
            listeners: Listeners::new(),
        }
    }

    /// Attach a listener, builder style
    pub fn with_listener<L>(mut self, listener: L) -> Self
    where
        L: LifecycleListener<T> + 'static,
    {
        self.attach(listener);
        self
    }

    pub fn attach<L>(&mut self, listener: L)
    where
        L: LifecycleListener<T> + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    pub fn instance(&self) -> &T {
        &self.instance
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Take the instance back, dropping the listeners
    pub fn into_instance(self) -> T {
        self.instance
    }
}

impl<T> From<T> for Blueprint<T> {
    fn from(instance: T) -> Self {
        Self::new(instance)
    }
}

impl<T: fmt::Debug> fmt::Debug for Blueprint<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Blueprint")
            .field("instance", &self.instance)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

/// Ordered listener table of one instance
pub(crate) struct Listeners<T> {
    entries: Vec<Box<dyn LifecycleListener<T>>>,
}

impl<T> Listeners<T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn push(&mut self, listener: Box<dyn LifecycleListener<T>>) {
        self.entries.push(listener);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Deliver `event` to every listener in attachment order, stopping at the
    /// first failure.
    pub fn notify(&mut self, event: LifecycleEvent, instance: &mut T) -> Result<(), ListenerError> {
        for listener in self.entries.iter_mut() {
            match event {
                LifecycleEvent::Construct => listener.on_construct(instance)?,
                LifecycleEvent::Create => listener.on_create(instance)?,
                LifecycleEvent::Recycle => listener.on_recycle(instance)?,
            }
        }
        Ok(())
    }
}
