// EsoxSolutions.RecyclePool
// Demo: a burst emitter that recycles its particle nodes

use esox_recyclepool::{
    LifecycleListener, ListenerError, Pool, PoolConfiguration, PoolResult, Poolable,
    TemplateStrategy,
};
use std::cell::Cell;
use std::rc::Rc;

#[derive(Clone)]
struct ParticleNode {
    position: [f32; 3],
    visible: bool,
    freed: Rc<Cell<bool>>,
}

impl ParticleNode {
    fn prototype() -> Self {
        Self {
            position: [0.0; 3],
            visible: false,
            freed: Rc::new(Cell::new(false)),
        }
    }
}

impl Poolable for ParticleNode {
    fn is_alive(&self) -> bool {
        !self.freed.get()
    }

    fn destroy(&mut self) {
        self.freed.set(true);
    }
}

/// Shows the node while in use and resets it when recycled
struct Visibility;

impl LifecycleListener<ParticleNode> for Visibility {
    fn on_construct(&mut self, node: &mut ParticleNode) -> Result<(), ListenerError> {
        // Clones share the prototype's flag; give each node its own.
        node.freed = Rc::new(Cell::new(false));
        Ok(())
    }

    fn on_create(&mut self, node: &mut ParticleNode) -> Result<(), ListenerError> {
        node.visible = true;
        Ok(())
    }

    fn on_recycle(&mut self, node: &mut ParticleNode) -> Result<(), ListenerError> {
        node.visible = false;
        node.position = [0.0; 3];
        Ok(())
    }
}

fn main() -> PoolResult<()> {
    println!("=== EsoxSolutions.RecyclePool ===");
    println!();

    let strategy = TemplateStrategy::new(ParticleNode::prototype()).with_listener(|| Visibility);
    let config = PoolConfiguration::new()
        .with_name("burst")
        .with_initial_capacity(32)
        .with_warmup(8);
    let mut pool = Pool::with_config(strategy, config)?;

    for frame in 0..3 {
        for i in 0..12 {
            let id = pool.acquire()?;
            if let Some(node) = pool.get_mut(id) {
                node.position = [i as f32, frame as f32, 0.0];
            }
        }
        let visible = pool
            .active_ids()
            .iter()
            .filter(|&&id| pool.get(id).is_some_and(|node| node.visible && node.position[1] == frame as f32))
            .count();
        println!(
            "  Frame {}: active {} ({} visible), inactive {}",
            frame,
            pool.active_count(),
            visible,
            pool.inactive_count()
        );
        pool.release_all_active()?;
    }

    let metrics = pool.get_metrics();
    println!();
    println!("  Constructed: {}", metrics.total_constructed);
    println!("  Acquired:    {}", metrics.total_acquired);
    println!("  Reuse ratio: {:.1}%", metrics.reuse_ratio() * 100.0);

    let destroyed = pool.clear();
    println!("  Destroyed on clear: {}", destroyed);
    Ok(())
}
