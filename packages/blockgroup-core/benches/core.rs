use blockgroup_core::{repair, Batch, Document, Editor, Group, GroupId, Leaf, Node};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn chat(n: usize) -> Node {
    Leaf::new("CHATGPT", format!("block-{n}")).into()
}

/// Alternating runs of loose blocks and pairs, with every fourth group left with one child.
fn mixed_document(count: usize) -> Document {
    let content = (0..count)
        .map(|i| match i % 3 {
            0 => chat(i),
            _ if i % 4 == 1 => Group::new(GroupId::from_sequence(i as u64), vec![chat(i)]).into(),
            _ => Group::new(
                GroupId::from_sequence(i as u64),
                vec![chat(i), chat(i + count)],
            )
            .into(),
        })
        .collect();
    Document::new(content)
}

fn bench_repair(c: &mut Criterion) {
    let mut group = c.benchmark_group("repair");
    for count in [100usize, 1_000, 10_000] {
        let doc = mixed_document(count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &doc, |b, doc| {
            b.iter(|| repair::repair(black_box(doc)).expect("repair"))
        });
    }
    group.finish();
}

fn bench_apply(c: &mut Criterion) {
    let mut group = c.benchmark_group("apply_tail_inserts");
    for count in [100usize, 1_000, 10_000] {
        let doc = Document::new((0..count).map(chat).collect());
        let mut batch = Batch::new();
        for i in 0..16 {
            batch.insert(count, vec![chat(count + i)]);
        }
        group.bench_with_input(BenchmarkId::from_parameter(count), &doc, |b, doc| {
            b.iter(|| doc.apply(black_box(&batch)).expect("apply"))
        });
    }
    group.finish();
}

fn bench_drop_grouping(c: &mut Criterion) {
    let mut group = c.benchmark_group("drop_grouping");
    for count in [100usize, 1_000] {
        let doc = Document::new((0..count).map(chat).collect());
        group.bench_with_input(BenchmarkId::from_parameter(count), &doc, |b, doc| {
            b.iter(|| {
                let mut editor = Editor::new(doc.clone());
                editor.drag_start(count - 1);
                let outcome = editor.drop_at(Some(count / 2));
                editor.drag_end();
                black_box(outcome)
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_repair, bench_apply, bench_drop_grouping);
criterion_main!(benches);
