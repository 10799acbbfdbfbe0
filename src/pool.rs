//! Core recycling pool engine

use crate::config::PoolConfiguration;
use crate::errors::{PoolError, PoolResult};
use crate::health::HealthStatus;
use crate::instance::{InstanceId, InstanceInfo, Partition, Poolable, TemplateKey};
use crate::lifecycle::{Blueprint, LifecycleEvent, LifecycleListener, Listeners};
use crate::metrics::{MetricsExporter, MetricsTracker, PoolMetrics};
use crate::strategy::ConstructionStrategy;

use std::collections::HashMap;
use std::fmt;
use tracing::{debug, info, trace, warn};

/// A managed instance and its pool-side bookkeeping
struct Slot<T> {
    instance: T,
    partition: Partition,
    listeners: Listeners<T>,
    times_acquired: u64,
}

impl<T> Slot<T> {
    fn notify(&mut self, id: InstanceId, event: LifecycleEvent) -> PoolResult<()> {
        self.listeners
            .notify(event, &mut self.instance)
            .map_err(|source| PoolError::Listener {
                event,
                instance: id,
                source,
            })
    }
}

/// Single-threaded pool that recycles instances instead of rebuilding them
///
/// Instances live in one of two partitions: `active` (handed out by
/// [`acquire`](Self::acquire)) or `inactive` (waiting to be reused). New
/// instances are only built, through the pool's [`ConstructionStrategy`],
/// when no live inactive instance exists. The pool has no size limit.
///
/// Callers hold an [`InstanceId`] between acquire and release and reach the
/// instance through [`get`](Self::get) / [`get_mut`](Self::get_mut). Only
/// [`clear`](Self::clear) destroys instances; dropping the pool just drops
/// the values it holds.
///
/// # Examples
///
/// ```
/// use esox_recyclepool::{Pool, Poolable, TemplateStrategy};
///
/// #[derive(Clone)]
/// struct Spark {
///     heat: u32,
/// }
///
/// impl Poolable for Spark {}
///
/// let mut pool = Pool::new(TemplateStrategy::new(Spark { heat: 10 }));
///
/// let first = pool.acquire().unwrap();
/// pool.get_mut(first).unwrap().heat = 99;
/// pool.release(first).unwrap();
///
/// // The released instance is handed out again, not rebuilt.
/// let second = pool.acquire().unwrap();
/// assert_eq!(first, second);
/// assert_eq!(pool.get(second).unwrap().heat, 99);
/// ```
pub struct Pool<T> {
    active: Vec<InstanceId>,
    inactive: Vec<InstanceId>,
    slots: HashMap<InstanceId, Slot<T>>,
    strategy: Box<dyn ConstructionStrategy<T>>,
    template_key: TemplateKey,
    config: PoolConfiguration,
    metrics: MetricsTracker,
    next_id: u64,
}

impl<T: Poolable> Pool<T> {
    /// Create an empty pool with default configuration
    pub fn new<S>(strategy: S) -> Self
    where
        S: ConstructionStrategy<T> + 'static,
    {
        Self::build(Box::new(strategy), PoolConfiguration::default())
    }

    /// Create a pool and construct `config.warmup_size` instances up front
    pub fn with_config<S>(strategy: S, config: PoolConfiguration) -> PoolResult<Self>
    where
        S: ConstructionStrategy<T> + 'static,
    {
        let warmup = config.warmup_size;
        let mut pool = Self::build(Box::new(strategy), config);
        if let Some(count) = warmup {
            pool.warmup(count)?;
        }
        Ok(pool)
    }

    fn build(strategy: Box<dyn ConstructionStrategy<T>>, config: PoolConfiguration) -> Self {
        let template_key = config.template_key.unwrap_or_else(TemplateKey::generate);
        let capacity = config.initial_capacity;

        debug!(
            pool = %config.name,
            template = %template_key,
            capacity,
            "Created recycling pool"
        );

        Self {
            active: Vec::with_capacity(capacity),
            inactive: Vec::with_capacity(capacity),
            slots: HashMap::with_capacity(capacity),
            strategy,
            template_key,
            config,
            metrics: MetricsTracker::new(),
            next_id: 0,
        }
    }

    /// Hand out an instance, reusing an inactive one when possible
    ///
    /// A fresh instance is constructed (firing `on_construct`) only when the
    /// inactive partition holds no live instance. Either way the instance is
    /// moved to the active partition before `on_create` fires.
    ///
    /// # Errors
    ///
    /// [`PoolError::Construction`] when the strategy cannot build an instance.
    /// No instance is added to either partition, but inactive handles found
    /// destroyed by the host on the way are still discarded.
    /// [`PoolError::Listener`] when an `on_construct` listener fails (the new
    /// instance is destroyed and the partitions are unchanged) or when an
    /// `on_create` listener fails (the instance is already active).
    pub fn acquire(&mut self) -> PoolResult<InstanceId> {
        let id = match self.take_inactive() {
            Some(id) => {
                self.metrics.reused += 1;
                id
            }
            None => self.construct()?,
        };

        let slot = self
            .slots
            .get_mut(&id)
            .ok_or(PoolError::UnknownInstance(id))?;
        slot.partition = Partition::Active;
        slot.times_acquired += 1;
        self.active.push(id);
        self.metrics.acquired += 1;

        trace!(pool = %self.config.name, instance = %id, "Acquired instance");
        slot.notify(id, LifecycleEvent::Create)?;
        Ok(id)
    }

    /// Return an active instance to the inactive partition
    ///
    /// Releasing an unknown or already inactive id does nothing, so duplicate
    /// releases are harmless. An active instance whose underlying object was
    /// destroyed by the host is dropped from the pool instead of recycled.
    ///
    /// # Errors
    ///
    /// [`PoolError::Listener`] when an `on_recycle` listener fails; the
    /// instance is already inactive in that case.
    pub fn release(&mut self, id: InstanceId) -> PoolResult<()> {
        let alive = match self.slots.get(&id) {
            Some(slot) if slot.partition == Partition::Active => slot.instance.is_alive(),
            _ => {
                trace!(pool = %self.config.name, instance = %id, "Ignoring release of instance that is not active");
                return Ok(());
            }
        };

        unlink(&mut self.active, id);

        if !alive {
            self.discard_stale(id);
            return Ok(());
        }

        let slot = self
            .slots
            .get_mut(&id)
            .ok_or(PoolError::UnknownInstance(id))?;
        slot.partition = Partition::Inactive;
        self.inactive.push(id);
        self.metrics.released += 1;

        trace!(pool = %self.config.name, instance = %id, "Released instance");
        slot.notify(id, LifecycleEvent::Recycle)
    }

    /// Release every active instance, most recently acquired first
    ///
    /// Stops at the first listener failure; instances not reached yet stay
    /// active.
    pub fn release_all_active(&mut self) -> PoolResult<()> {
        let ids: Vec<InstanceId> = self.active.iter().rev().copied().collect();
        for id in ids {
            self.release(id)?;
        }
        Ok(())
    }

    /// Destroy every instance in both partitions and empty the pool
    ///
    /// Handles the host already destroyed are skipped. No lifecycle
    /// notifications are sent. Returns the number of instances destroyed.
    pub fn clear(&mut self) -> usize {
        let ids = std::mem::take(&mut self.active)
            .into_iter()
            .chain(std::mem::take(&mut self.inactive));

        let mut destroyed = 0;
        let mut stale = 0;
        for id in ids {
            if let Some(mut slot) = self.slots.remove(&id) {
                if slot.instance.is_alive() {
                    slot.instance.destroy();
                    destroyed += 1;
                } else {
                    stale += 1;
                }
            }
        }
        self.slots.clear();

        self.metrics.destroyed += destroyed as u64;
        self.metrics.stale_discarded += stale as u64;
        info!(pool = %self.config.name, destroyed, stale, "Cleared pool");
        destroyed
    }

    /// Bring an externally built instance under pool management
    ///
    /// The instance goes to the inactive partition without touching the
    /// construction strategy. Its listeners receive `on_construct` here, so
    /// they still see construction before the first `on_create`.
    ///
    /// # Errors
    ///
    /// [`PoolError::InstanceDestroyed`] when the instance is not alive, and
    /// [`PoolError::Listener`] when an `on_construct` listener fails. In the
    /// latter case the instance is destroyed and not adopted.
    pub fn adopt(&mut self, blueprint: impl Into<Blueprint<T>>) -> PoolResult<InstanceId> {
        let blueprint = blueprint.into();
        if !blueprint.instance.is_alive() {
            return Err(PoolError::InstanceDestroyed);
        }

        self.metrics.adopted += 1;
        let id = self.introduce(blueprint)?;
        self.inactive.push(id);
        debug!(pool = %self.config.name, instance = %id, "Adopted instance");
        Ok(id)
    }

    /// Construct `count` instances straight into the inactive partition
    pub fn warmup(&mut self, count: usize) -> PoolResult<()> {
        for _ in 0..count {
            let id = self.construct()?;
            self.inactive.push(id);
        }
        debug!(pool = %self.config.name, count, "Warmed up pool");
        Ok(())
    }

    /// Attach a listener to a managed instance
    ///
    /// The instance's construction has already happened, so the new listener
    /// receives `on_construct` immediately.
    pub fn attach<L>(&mut self, id: InstanceId, mut listener: L) -> PoolResult<()>
    where
        L: LifecycleListener<T> + 'static,
    {
        let slot = self
            .slots
            .get_mut(&id)
            .ok_or(PoolError::UnknownInstance(id))?;

        listener
            .on_construct(&mut slot.instance)
            .map_err(|source| PoolError::Listener {
                event: LifecycleEvent::Construct,
                instance: id,
                source,
            })?;
        slot.listeners.push(Box::new(listener));
        Ok(())
    }

    /// Stop managing an instance and hand it back without destroying it
    pub fn remove(&mut self, id: InstanceId) -> Option<T> {
        let slot = self.slots.remove(&id)?;
        match slot.partition {
            Partition::Active => unlink(&mut self.active, id),
            Partition::Inactive => unlink(&mut self.inactive, id),
        }
        debug!(pool = %self.config.name, instance = %id, "Removed instance from pool");
        Some(slot.instance)
    }

    /// Swap the construction strategy; existing instances are unaffected
    pub fn set_strategy<S>(&mut self, strategy: S)
    where
        S: ConstructionStrategy<T> + 'static,
    {
        self.strategy = Box::new(strategy);
    }

    /// Get health status
    pub fn health_status(&self) -> HealthStatus {
        let stale = self
            .slots
            .values()
            .filter(|slot| !slot.instance.is_alive())
            .count();
        HealthStatus::new(self.active.len(), self.inactive.len(), stale)
    }

    /// Build a new instance through the strategy and fire `on_construct`.
    /// The caller decides which partition it joins.
    fn construct(&mut self) -> PoolResult<InstanceId> {
        let blueprint = self.strategy.construct().inspect_err(|err| {
            warn!(pool = %self.config.name, error = %err, "Failed to construct instance");
        })?;

        self.metrics.constructed += 1;
        let id = self.introduce(blueprint)?;
        debug!(pool = %self.config.name, instance = %id, "Constructed instance");
        Ok(id)
    }

    /// Register a new slot and deliver `on_construct`. If a listener fails
    /// the half-constructed instance is destroyed and dropped, so it can
    /// never be handed out and both partitions stay as they were.
    fn introduce(&mut self, blueprint: Blueprint<T>) -> PoolResult<InstanceId> {
        let id = InstanceId::from_raw(self.next_id);
        self.next_id += 1;

        let Blueprint { instance, listeners } = blueprint;
        let slot = self.slots.entry(id).or_insert(Slot {
            instance,
            partition: Partition::Inactive,
            listeners,
            times_acquired: 0,
        });

        if let Err(err) = slot.notify(id, LifecycleEvent::Construct) {
            if let Some(mut slot) = self.slots.remove(&id) {
                if slot.instance.is_alive() {
                    slot.instance.destroy();
                    self.metrics.destroyed += 1;
                }
            }
            warn!(pool = %self.config.name, instance = %id, error = %err, "Dropped instance after on_construct failure");
            return Err(err);
        }
        Ok(id)
    }

    /// Pop the most recently released live instance, dropping any stale
    /// handles found on the way.
    fn take_inactive(&mut self) -> Option<InstanceId> {
        while let Some(id) = self.inactive.pop() {
            match self.slots.get(&id).map(|slot| slot.instance.is_alive()) {
                Some(true) => return Some(id),
                Some(false) => self.discard_stale(id),
                None => {}
            }
        }
        None
    }

    fn discard_stale(&mut self, id: InstanceId) {
        self.slots.remove(&id);
        self.metrics.stale_discarded += 1;
        debug!(pool = %self.config.name, instance = %id, "Discarded instance destroyed outside the pool");
    }
}

impl<T> Pool<T> {
    /// Borrow a managed instance
    pub fn get(&self, id: InstanceId) -> Option<&T> {
        self.slots.get(&id).map(|slot| &slot.instance)
    }

    /// Mutably borrow a managed instance
    pub fn get_mut(&mut self, id: InstanceId) -> Option<&mut T> {
        self.slots.get_mut(&id).map(|slot| &mut slot.instance)
    }

    /// Get pool-side metadata of an instance
    pub fn info(&self, id: InstanceId) -> Option<InstanceInfo> {
        self.slots.get(&id).map(|slot| InstanceInfo {
            id,
            template: self.template_key,
            partition: slot.partition,
            times_acquired: slot.times_acquired,
            listeners: slot.listeners.len(),
        })
    }

    /// Whether the pool manages this id
    pub fn contains(&self, id: InstanceId) -> bool {
        self.slots.contains_key(&id)
    }

    /// Whether the id is currently checked out
    pub fn is_active(&self, id: InstanceId) -> bool {
        self.slots
            .get(&id)
            .is_some_and(|slot| slot.partition == Partition::Active)
    }

    /// Number of listeners attached to an instance
    pub fn listener_count(&self, id: InstanceId) -> Option<usize> {
        self.slots.get(&id).map(|slot| slot.listeners.len())
    }

    /// Active ids in acquisition order
    pub fn active_ids(&self) -> &[InstanceId] {
        &self.active
    }

    /// Inactive ids; the last one is reused first
    pub fn inactive_ids(&self) -> &[InstanceId] {
        &self.inactive
    }

    /// Get active count
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Get inactive count
    pub fn inactive_count(&self) -> usize {
        self.inactive.len()
    }

    /// Number of managed instances across both partitions
    pub fn len(&self) -> usize {
        self.active.len() + self.inactive.len()
    }

    /// Whether no instance is managed
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get pool name
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Identity marker shared by this pool's instances
    pub fn template_key(&self) -> TemplateKey {
        self.template_key
    }

    /// Get pool metrics
    pub fn get_metrics(&self) -> PoolMetrics {
        self.metrics
            .get_metrics(self.active.len(), self.inactive.len())
    }

    /// Export metrics
    pub fn export_metrics(&self) -> HashMap<String, String> {
        self.get_metrics().export()
    }

    /// Export metrics in Prometheus format, labelled with the pool name
    pub fn export_metrics_prometheus(&self, tags: Option<&HashMap<String, String>>) -> String {
        MetricsExporter::export_prometheus(&self.get_metrics(), &self.config.name, tags)
    }
}

impl<T> fmt::Debug for Pool<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pool")
            .field("name", &self.config.name)
            .field("template_key", &self.template_key)
            .field("active", &self.active)
            .field("inactive", &self.inactive)
            .finish_non_exhaustive()
    }
}

fn unlink(partition: &mut Vec<InstanceId>, id: InstanceId) {
    if let Some(pos) = partition.iter().rposition(|&other| other == id) {
        partition.remove(pos);
    }
}
