//! Микробенчмарки шины: полный цикл регистрации и горячий путь доставки.

use std::{
    hint::black_box,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

use criterion::{criterion_group, criterion_main, Criterion};
use vestnik::{Event, EventBus, Listener, Rejected, TypeTag};

struct Tick(u64);

impl Event for Tick {
    fn dispatch_chain(&self) -> Vec<TypeTag> {
        vec![TypeTag::of::<Tick>()]
    }
}

/// Маркер-предок для бенчмарка обхода иерархии.
struct Sample;

struct DeepTick(u64);

impl Event for DeepTick {
    fn dispatch_chain(&self) -> Vec<TypeTag> {
        vec![TypeTag::of::<DeepTick>(), TypeTag::of::<Sample>()]
    }
}

struct CountingListener(Arc<AtomicUsize>);

impl Listener for CountingListener {
    fn on_event(&self, _event: &dyn std::any::Any) -> Result<(), Rejected> {
        self.0.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

fn collector() -> (Arc<AtomicUsize>, Arc<CountingListener>) {
    let count = Arc::new(AtomicUsize::new(0));
    let listener = Arc::new(CountingListener(Arc::clone(&count)));
    (count, listener)
}

/// Полный цикл: connect, две регистрации (токен + тип), три публикации,
/// disconnect.
fn bench_registration_cycle(c: &mut Criterion) {
    let bus = EventBus::new();
    let (_, listener) = collector();
    let (_, typed_listener) = collector();
    let ctx = Arc::new("bench".to_string());

    c.bench_function("registration_cycle", |b| {
        b.iter(|| {
            let token_listener: vestnik::ListenerRef = Arc::clone(&listener) as vestnik::ListenerRef;
            let tick_listener: vestnik::ListenerRef = Arc::clone(&typed_listener) as vestnik::ListenerRef;
            bus.connect(&ctx)
                .listen("string type", token_listener)
                .unwrap()
                .listen(TypeTag::of::<Tick>(), tick_listener)
                .unwrap();
            black_box(bus.post_to("string type", &"event1".to_string()));
            black_box(bus.post_to("wrong string type", &"event2".to_string()));
            black_box(bus.post(&Tick(1)).unwrap());
            bus.disconnect(&ctx).unwrap();
        });
    });
    assert_eq!(bus.connections_count(), 0);
    assert_eq!(bus.listeners_count(), 0);
}

/// Цикл со слабыми соединениями: контекст становится недостижим в конце
/// итерации, утилизацию записи оплачивает `connect` следующей.
fn bench_weak_registration_cycle(c: &mut Criterion) {
    let bus = EventBus::builder().with_weak_connections().build();
    let (_, listener) = collector();

    c.bench_function("weak_registration_cycle", |b| {
        b.iter(|| {
            let ctx = Arc::new(black_box(0u8));
            let chan_listener: vestnik::ListenerRef = Arc::clone(&listener) as vestnik::ListenerRef;
            bus.connect(&ctx)
                .listen("weak chan", chan_listener)
                .unwrap();
            black_box(bus.post_to("weak chan", &"event1".to_string()));
            drop(ctx);
        });
    });

    let keeper = Arc::new(1u8);
    bus.connect(&keeper);
    assert_eq!(bus.connections_count(), 1);
    assert_eq!(bus.listeners_count(), 0);
}

/// Горячий путь: публикация на одиночного слушателя.
fn bench_post_single(c: &mut Criterion) {
    let bus = EventBus::new();
    let ctx = Arc::new(0u8);
    let (_, listener) = collector();
    bus.connect(&ctx)
        .listen(TypeTag::of::<Tick>(), listener)
        .unwrap();

    c.bench_function("post_single", |b| {
        b.iter(|| black_box(bus.post(&Tick(black_box(7))).unwrap()));
    });
}

/// Горячий путь: публикация на составную цель из восьми участников.
fn bench_post_compound(c: &mut Criterion) {
    let bus = EventBus::new();
    for i in 0..8u8 {
        let ctx = Arc::new(i);
        let (_, listener) = collector();
        // Шина держит контекст сильно, локальный Arc можно отпустить.
        bus.connect(&ctx)
            .listen(TypeTag::of::<Tick>(), listener)
            .unwrap();
    }

    c.bench_function("post_compound", |b| {
        b.iter(|| black_box(bus.post(&Tick(black_box(7))).unwrap()));
    });
}

/// Обход иерархии: событие с цепочкой из двух уровней.
fn bench_post_hierarchy(c: &mut Criterion) {
    let bus = EventBus::new();
    let ctx = Arc::new(0u8);
    let (_, listener) = collector();
    bus.connect(&ctx)
        .listen(TypeTag::of::<Sample>(), listener)
        .unwrap();

    c.bench_function("post_hierarchy", |b| {
        b.iter(|| black_box(bus.post(&DeepTick(black_box(7))).unwrap()));
    });
}

criterion_group!(
    benches,
    bench_registration_cycle,
    bench_weak_registration_cycle,
    bench_post_single,
    bench_post_compound,
    bench_post_hierarchy
);
criterion_main!(benches);
