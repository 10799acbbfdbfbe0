use esox_recyclepool::*;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

type Log = Rc<RefCell<Vec<(u32, LifecycleEvent)>>>;

#[derive(Clone)]
struct Effect {
    serial: u32,
}

impl Poolable for Effect {}

struct Tracker {
    log: Log,
}

impl LifecycleListener<Effect> for Tracker {
    fn on_construct(&mut self, effect: &mut Effect) -> Result<(), ListenerError> {
        self.log.borrow_mut().push((effect.serial, LifecycleEvent::Construct));
        Ok(())
    }

    fn on_create(&mut self, effect: &mut Effect) -> Result<(), ListenerError> {
        self.log.borrow_mut().push((effect.serial, LifecycleEvent::Create));
        Ok(())
    }

    fn on_recycle(&mut self, effect: &mut Effect) -> Result<(), ListenerError> {
        self.log.borrow_mut().push((effect.serial, LifecycleEvent::Recycle));
        Ok(())
    }
}

fn tracked_pool(log: &Log) -> Pool<Effect> {
    let log = log.clone();
    let serial = Cell::new(0);
    Pool::new(move || -> Result<Blueprint<Effect>, ConstructionError> {
        serial.set(serial.get() + 1);
        Ok(Blueprint::new(Effect { serial: serial.get() }).with_listener(Tracker { log: log.clone() }))
    })
}

fn serial_of(pool: &Pool<Effect>, id: InstanceId) -> u32 {
    pool.get(id).unwrap().serial
}

#[test]
fn test_reuse_scenario() {
    let log: Log = Rc::default();
    let mut pool = tracked_pool(&log);

    let a = pool.acquire().unwrap();
    let b = pool.acquire().unwrap();
    assert_ne!(a, b);
    pool.release(a).unwrap();
    let again = pool.acquire().unwrap();

    assert_eq!(again, a);
    assert_eq!(pool.active_ids(), &[b, a]);
    assert!(pool.inactive_ids().is_empty());

    let (sa, sb) = (serial_of(&pool, a), serial_of(&pool, b));
    assert_eq!(
        *log.borrow(),
        vec![
            (sa, LifecycleEvent::Construct),
            (sa, LifecycleEvent::Create),
            (sb, LifecycleEvent::Construct),
            (sb, LifecycleEvent::Create),
            (sa, LifecycleEvent::Recycle),
            (sa, LifecycleEvent::Create),
        ]
    );
}

#[test]
fn test_release_all_active_scenario() {
    let log: Log = Rc::default();
    let mut pool = tracked_pool(&log);

    let ids: Vec<_> = (0..3).map(|_| pool.acquire().unwrap()).collect();
    log.borrow_mut().clear();

    pool.release_all_active().unwrap();

    assert_eq!(pool.active_count(), 0);
    assert_eq!(pool.inactive_count(), 3);
    for id in &ids {
        assert!(pool.inactive_ids().contains(id));
    }
    let recycled = log
        .borrow()
        .iter()
        .filter(|(_, event)| *event == LifecycleEvent::Recycle)
        .count();
    assert_eq!(recycled, 3);
}

#[test]
fn test_clear_forces_fresh_construction() {
    let log: Log = Rc::default();
    let mut pool = tracked_pool(&log);

    let a = pool.acquire().unwrap();
    let b = pool.acquire().unwrap();
    pool.release(b).unwrap();

    assert_eq!(pool.clear(), 2);
    assert_eq!(pool.active_count(), 0);
    assert_eq!(pool.inactive_count(), 0);

    // Stale handles from before the clear are ignored.
    pool.release(a).unwrap();

    let fresh = pool.acquire().unwrap();
    assert!(fresh != a && fresh != b);
    assert_eq!(
        log.borrow().last().copied(),
        Some((serial_of(&pool, fresh), LifecycleEvent::Create))
    );
    assert_eq!(pool.get_metrics().total_constructed, 3);
}

#[test]
fn test_missing_template_leaves_partitions_unchanged() {
    let mut pool = Pool::new(TemplateStrategy::<Effect>::empty());

    let err = pool.acquire().unwrap_err();

    assert!(err.is_missing_template());
    assert!(pool.is_empty());
    assert_eq!(pool.get_metrics().total_constructed, 0);
}

#[test]
fn test_template_strategy_pool() {
    let log: Log = Rc::default();
    let tracker_log = log.clone();
    let strategy = TemplateStrategy::new(Effect { serial: 42 }).with_listener(move || Tracker {
        log: tracker_log.clone(),
    });
    let mut pool = Pool::with_config(
        strategy,
        PoolConfiguration::new().with_template_key(TemplateKey::new(3)),
    )
    .unwrap();

    let id = pool.acquire().unwrap();

    assert_eq!(serial_of(&pool, id), 42);
    assert_eq!(pool.template_key(), TemplateKey::new(3));
    assert_eq!(
        *log.borrow(),
        vec![(42, LifecycleEvent::Construct), (42, LifecycleEvent::Create)]
    );
}

/// Replay a deterministic mix of operations and check the partition
/// invariants and event ordering after every step.
#[test]
fn test_partition_invariants_hold_under_mixed_operations() {
    let log: Log = Rc::default();
    let mut pool = tracked_pool(&log);
    let mut seen: Vec<InstanceId> = Vec::new();
    let mut state: u64 = 0x2545_f491;

    for _ in 0..500 {
        state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        let before = pool.len();
        let inactive_before = pool.inactive_count();

        match (state >> 33) % 5 {
            0 | 1 => {
                let id = pool.acquire().unwrap();
                if !seen.contains(&id) {
                    seen.push(id);
                }
                if inactive_before == 0 {
                    assert_eq!(pool.len(), before + 1);
                } else {
                    assert_eq!(pool.len(), before);
                }
            }
            2 | 3 => {
                if !seen.is_empty() {
                    let id = seen[(state >> 40) as usize % seen.len()];
                    pool.release(id).unwrap();
                }
                assert_eq!(pool.len(), before);
            }
            _ => {
                pool.release_all_active().unwrap();
                assert_eq!(pool.len(), before);
                assert_eq!(pool.active_count(), 0);
            }
        }

        for id in pool.active_ids() {
            assert!(!pool.inactive_ids().contains(id));
            assert!(pool.is_active(*id));
        }
        for id in &seen {
            assert!(pool.contains(*id));
        }
        assert_eq!(pool.len(), seen.len());
    }

    // Per instance: Construct first, then alternating Create / Recycle.
    for id in &seen {
        let serial = serial_of(&pool, *id);
        let events: Vec<_> = log
            .borrow()
            .iter()
            .filter(|(s, _)| *s == serial)
            .map(|(_, event)| *event)
            .collect();
        assert_eq!(events[0], LifecycleEvent::Construct);
        for (i, event) in events[1..].iter().enumerate() {
            let expected = if i % 2 == 0 {
                LifecycleEvent::Create
            } else {
                LifecycleEvent::Recycle
            };
            assert_eq!(*event, expected);
        }
    }
}

#[test]
fn test_metrics_and_health_after_cycles() {
    let log: Log = Rc::default();
    let mut pool = tracked_pool(&log);

    for _ in 0..4 {
        let a = pool.acquire().unwrap();
        let b = pool.acquire().unwrap();
        pool.release(a).unwrap();
        pool.release(b).unwrap();
    }

    let metrics = pool.get_metrics();
    assert_eq!(metrics.total_constructed, 2);
    assert_eq!(metrics.total_acquired, 8);
    assert_eq!(metrics.total_reused, 6);
    assert_eq!(metrics.total_released, 8);
    assert_eq!(pool.export_metrics()["reuse_ratio"], "0.75");

    let health = pool.health_status();
    assert!(health.is_healthy());
    assert_eq!(health.inactive_objects, 2);
}
