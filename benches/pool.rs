use criterion::{Criterion, black_box, criterion_group, criterion_main};
use esox_recyclepool::*;

const PARTICLE_BYTES: usize = 64 * 1024;

#[derive(Clone)]
struct Particle {
    buffer: Vec<u8>,
}

impl Poolable for Particle {}

struct ClearOnRecycle;

impl LifecycleListener<Particle> for ClearOnRecycle {
    fn on_recycle(&mut self, particle: &mut Particle) -> Result<(), ListenerError> {
        particle.buffer.iter_mut().for_each(|b| *b = 0);
        Ok(())
    }
}

fn prototype() -> Particle {
    Particle {
        buffer: vec![0; PARTICLE_BYTES],
    }
}

fn acquire_release(c: &mut Criterion) {
    c.bench_function("recyclepool_acquire_release", |b| {
        let mut pool = Pool::with_config(
            TemplateStrategy::new(prototype()).with_listener(|| ClearOnRecycle),
            PoolConfiguration::new().with_warmup(64),
        )
        .unwrap();
        b.iter(|| {
            let id = pool.acquire().unwrap();
            black_box(pool.get(id).map(|p| p.buffer.len()));
            pool.release(id).unwrap();
        })
    });
    c.bench_function("recyclepool_burst_of_64", |b| {
        let mut pool = Pool::new(TemplateStrategy::new(prototype()));
        b.iter(|| {
            for _ in 0..64 {
                black_box(pool.acquire().unwrap());
            }
            pool.release_all_active().unwrap();
        })
    });
    c.bench_function("system_alloc", |b| {
        b.iter(|| {
            let particle = black_box(prototype());
            black_box(particle.buffer.len())
        })
    });
}

criterion_group!(benches, acquire_release);
criterion_main!(benches);
