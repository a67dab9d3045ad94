use std::{
    hint::black_box,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

use criterion::{criterion_group, criterion_main, Criterion};
use eventbroker::{
    Broker, Callback, Context, Event, HandlerResult, InterestSource, Member, Registry,
};
use serde_json::json;

#[derive(Default)]
struct Counter {
    hits: AtomicUsize,
}

impl Counter {
    fn hit(
        &self,
        _event: &Event,
    ) -> HandlerResult {
        self.hits.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

impl Context for Counter {
    fn member(
        &self,
        name: &str,
    ) -> Member<Self> {
        match name {
            "hit" => Member::Method(Counter::hit),
            _ => Member::Absent,
        }
    }
}

fn interests() -> InterestSource {
    InterestSource::from([("a", "hit"), ("b", "hit"), ("c", "hit"), ("d", "hit")])
}

fn bench_registry_get_existing(c: &mut Criterion) {
    let registry = Registry::new();
    let _ = registry.get("chan");
    c.bench_function("registry_get_existing", |b| {
        b.iter(|| black_box(registry.get(black_box("chan"))))
    });
}

fn bench_registry_get_destroy(c: &mut Criterion) {
    let registry = Registry::new();
    c.bench_function("registry_get_destroy", |b| {
        b.iter(|| {
            let _broker = black_box(registry.get("chan"));
            registry.destroy("chan");
        })
    });
}

fn bench_register_unregister(c: &mut Criterion) {
    let broker = Broker::new("bench");
    let ctx = Arc::new(Counter::default());
    let source = interests();
    c.bench_function("register_unregister_4", |b| {
        b.iter(|| {
            broker
                .register(source.clone(), &ctx)
                .unwrap()
                .unregister(source.clone(), &ctx)
                .unwrap();
        })
    });
}

fn bench_trigger_0_sub(c: &mut Criterion) {
    let broker = Broker::new("bench");
    c.bench_function("trigger_0_subs", |b| {
        b.iter(|| broker.trigger("a", [black_box(json!(1))]).unwrap())
    });
}

fn bench_trigger_n_subs(
    c: &mut Criterion,
    n: usize,
) {
    let broker = Broker::new("bench");
    let contexts: Vec<Arc<Counter>> = (0..n).map(|_| Arc::new(Counter::default())).collect();
    for ctx in &contexts {
        broker.register(interests(), ctx).unwrap();
    }
    c.bench_function(&format!("trigger_{n}_subs"), |b| {
        b.iter(|| broker.trigger("a", [black_box(json!(1))]).unwrap())
    });
}

fn bench_trigger_1_sub(c: &mut Criterion) {
    bench_trigger_n_subs(c, 1);
}

fn bench_trigger_10_subs(c: &mut Criterion) {
    bench_trigger_n_subs(c, 10);
}

fn bench_trigger_100_subs(c: &mut Criterion) {
    bench_trigger_n_subs(c, 100);
}

fn bench_on_off_closure(c: &mut Criterion) {
    let broker = Broker::new("bench");
    let cb = Callback::new(|_| Ok(()));
    c.bench_function("on_off_closure", |b| {
        b.iter(|| {
            broker.on("chan", cb.clone());
            black_box(broker.off(Some("chan"), Some(&cb)))
        })
    });
}

criterion_group!(
    benches,
    bench_registry_get_existing,
    bench_registry_get_destroy,
    bench_register_unregister,
    bench_trigger_0_sub,
    bench_trigger_1_sub,
    bench_trigger_10_subs,
    bench_trigger_100_subs,
    bench_on_off_closure,
);
criterion_main!(benches);
