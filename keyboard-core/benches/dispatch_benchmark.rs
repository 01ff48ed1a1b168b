use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;

use keyboard_core::keyboard::{
    KeyEventType, KeyboardEvent, KeyboardRegistrationManager, key_handler,
};

fn populated_manager(handlers_per_key: usize) -> KeyboardRegistrationManager<KeyboardEvent> {
    let manager = KeyboardRegistrationManager::new();

    for digit in 0..10 {
        let accelerator = format!("Ctrl+{digit}");
        for _ in 0..handlers_per_key {
            manager.add_handler(
                KeyEventType::KeyDown,
                [accelerator.as_str()],
                key_handler(|event: &KeyboardEvent| {
                    black_box(event);
                    Ok(())
                }),
            );
        }
    }

    manager
}

// Benchmark: handler lookup (copy of the cell)
fn bench_get_handlers(c: &mut Criterion) {
    let mut group = c.benchmark_group("get_handlers");

    for handlers_per_key in [1usize, 4, 16] {
        let manager = populated_manager(handlers_per_key);
        group.throughput(Throughput::Elements(handlers_per_key as u64));

        group.bench_with_input(
            BenchmarkId::from_parameter(handlers_per_key),
            &handlers_per_key,
            |b, _| b.iter(|| black_box(manager.get_handlers(KeyEventType::KeyDown, "Ctrl+5"))),
        );
    }

    group.finish();
}

// Benchmark: full dispatch including accelerator normalization
fn bench_dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("dispatch");
    let manager = populated_manager(4);
    let event = KeyboardEvent::new(KeyEventType::KeyDown, "5").with_ctrl();

    group.bench_function("registered", |b| {
        b.iter(|| {
            let accelerator = event.accelerator();
            black_box(
                manager
                    .invoke_handlers(event.event_type, &accelerator, &event)
                    .ok(),
            )
        })
    });

    let miss = KeyboardEvent::new(KeyEventType::KeyDown, "q").with_alt();
    group.bench_function("unregistered", |b| {
        b.iter(|| {
            let accelerator = miss.accelerator();
            black_box(
                manager
                    .invoke_handlers(miss.event_type, &accelerator, &miss)
                    .ok(),
            )
        })
    });

    group.finish();
}

// Benchmark: register + deregister cycle of a binding
fn bench_register_cycle(c: &mut Criterion) {
    let manager = populated_manager(2);
    let handler = key_handler(|_: &KeyboardEvent| Ok(()));

    c.bench_function("register_deregister", |b| {
        b.iter(|| {
            let deregistration = manager.add_handler(
                KeyEventType::KeyDown,
                ["Ctrl+1", "Ctrl+S"],
                handler.clone(),
            );
            deregistration.deregister();
        })
    });
}

criterion_group!(benches, bench_get_handlers, bench_dispatch, bench_register_cycle);
criterion_main!(benches);
