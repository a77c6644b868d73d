use std::{hint::black_box, time::Duration};

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use longpoll::LongPoll;
use tokio::runtime::Runtime;

const WAIT: Duration = Duration::from_secs(30);

fn runtime() -> Runtime {
    Runtime::new().expect("tokio runtime")
}

fn bench_subscribe_existing(c: &mut Criterion) {
    let rt = runtime();
    let _guard = rt.enter();
    let broker: LongPoll<u64> = LongPoll::with_defaults();
    broker.subscribe("chan", "u1", WAIT);

    c.bench_function("subscribe_existing", |b| {
        b.iter(|| black_box(broker.subscribe("chan", "u1", WAIT)))
    });
}

fn bench_subscribe_unsubscribe(c: &mut Criterion) {
    let rt = runtime();
    let _guard = rt.enter();
    let broker: LongPoll<u64> = LongPoll::with_defaults();

    c.bench_function("subscribe_unsubscribe", |b| {
        b.iter(|| {
            let sub = broker.subscribe("chan", "u1", WAIT);
            broker.unsubscribe("chan", "u1");
            black_box(sub)
        })
    });
}

fn bench_publish_unknown_topic(c: &mut Criterion) {
    let rt = runtime();
    let _guard = rt.enter();
    let broker: LongPoll<u64> = LongPoll::with_defaults();

    c.bench_function("publish_unknown_topic", |b| {
        b.iter(|| broker.publish(black_box("nobody"), 1))
    });
}

/// Publish followed by every subscriber draining its event.
fn bench_publish_fan_out(c: &mut Criterion) {
    let rt = runtime();
    let mut group = c.benchmark_group("publish_fan_out");

    for subscribers in [1usize, 10, 100] {
        let broker: LongPoll<u64> = rt.block_on(async { LongPoll::with_defaults() });
        let subs: Vec<_> = {
            let _guard = rt.enter();
            (0..subscribers)
                .map(|i| broker.subscribe("chan", &format!("s{i}"), WAIT))
                .collect()
        };

        group.bench_with_input(
            BenchmarkId::from_parameter(subscribers),
            &subscribers,
            |b, _| {
                b.to_async(&rt).iter(|| async {
                    broker.publish("chan", black_box(42));
                    for sub in &subs {
                        black_box(sub.wait_event().await.ok());
                    }
                })
            },
        );
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_subscribe_existing,
    bench_subscribe_unsubscribe,
    bench_publish_unknown_topic,
    bench_publish_fan_out,
);
criterion_main!(benches);
