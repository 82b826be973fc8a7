use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use permtree_auth::{PermissionOptions, PermissionTree, get_actions, has_access};

/// Tree with `modules` top-level modules, each with a wildcard grant and a
/// handful of exact entries three levels deep.
fn build_tree(modules: usize) -> PermissionTree {
    let grant = PermissionOptions {
        allow_read: true,
        ..PermissionOptions::EMPTY_GRANT
    };
    let mut entries = Vec::new();
    for m in 0..modules {
        entries.push((format!("module{m}.*"), grant));
        for s in 0..8 {
            entries.push((format!("module{m}.sub{s}.view"), grant));
            entries.push((format!("module{m}.sub{s}.edit"), PermissionOptions::DENIED));
        }
    }
    entries.into_iter().collect()
}

fn bench_resolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolution");

    for modules in [10usize, 100, 1_000] {
        let tree = build_tree(modules);

        group.bench_with_input(BenchmarkId::new("has_access_exact", modules), &tree, |b, tree| {
            b.iter(|| has_access(Some(black_box(tree)), black_box("module3.sub4.view")))
        });

        group.bench_with_input(BenchmarkId::new("has_access_wildcard", modules), &tree, |b, tree| {
            b.iter(|| has_access(Some(black_box(tree)), black_box("module3.sub4.report.detail")))
        });

        group.bench_with_input(BenchmarkId::new("get_actions_miss", modules), &tree, |b, tree| {
            b.iter(|| get_actions(Some(black_box(tree)), black_box("unknown.area.page")))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_resolution);
criterion_main!(benches);
