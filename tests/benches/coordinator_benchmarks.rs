//! # Navigation Coordinator Benchmarks
//!
//! | Component | Operation | Expectation |
//! |-----------|-----------|-------------|
//! | Command Queue | Priority insert into a deep backlog | linear in backlog |
//! | Guard Chain | Full evaluation of the standard guards | < 10µs |
//! | State Validator | Validate + clean a maximally nested tree | < 1ms |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use nav_coordinator::domain::{PendingQueue, QueueItem};
use nav_coordinator::{
    Command, GuardChain, GuardContext, NavigationMode, StateNode, StateTree, StateValidator,
};
use std::time::Duration;

// ============================================================================
// Command Queue
// ============================================================================

fn bench_queue_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("command-queue");

    for backlog in [10usize, 100, 1_000] {
        group.throughput(Throughput::Elements(backlog as u64));
        group.bench_with_input(BenchmarkId::new("insert_mixed_priority", backlog), &backlog, |b, &n| {
            b.iter(|| {
                let mut queue = PendingQueue::new();
                let mut completions = Vec::with_capacity(n);
                for i in 0..n {
                    let (item, completion) =
                        QueueItem::new(Command::go_back(), (i % 4) as i32, i as u64);
                    queue.insert(item);
                    completions.push(completion);
                }
                black_box(queue.len())
            })
        });
    }

    group.finish();
}

// ============================================================================
// Guard Chain
// ============================================================================

fn bench_guard_chain(c: &mut Criterion) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("runtime");
    let chain = GuardChain::standard();
    let context = GuardContext::new(true, false, false, NavigationMode::App);

    let mut group = c.benchmark_group("guard-chain");
    group.bench_function("allow_full_chain", |b| {
        let command = Command::navigate("SettingsScreen", None);
        b.iter(|| black_box(runtime.block_on(chain.check_guards(&command, &context))))
    });
    group.bench_function("deny_admin_tab", |b| {
        let command = Command::navigate("AdminTab", None);
        b.iter(|| black_box(runtime.block_on(chain.check_guards(&command, &context))))
    });
    group.finish();
}

// ============================================================================
// State Validator
// ============================================================================

fn nested_tree(depth: usize) -> StateTree {
    let mut tree = StateTree::single(StateNode::leaf("HomeMain"));
    for level in 0..depth {
        tree = StateTree::new(
            vec![
                StateNode::leaf(format!("Sibling{}", level)),
                StateNode::leaf(format!("Level{}", level)).with_state(tree),
            ],
            1,
        );
    }
    tree
}

fn bench_validator(c: &mut Criterion) {
    let validator = StateValidator::default();
    let mut group = c.benchmark_group("state-validator");
    group.measurement_time(Duration::from_secs(5));

    for depth in [1usize, 5, 9] {
        let tree = nested_tree(depth);
        group.bench_with_input(BenchmarkId::new("validate_and_clean", depth), &tree, |b, tree| {
            b.iter(|| {
                let result = validator.validate(Some(tree));
                black_box(result.valid && validator.clean(Some(tree)).is_some())
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_queue_insert, bench_guard_chain, bench_validator);
criterion_main!(benches);
