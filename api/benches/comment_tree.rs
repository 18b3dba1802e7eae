use std::collections::HashMap;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use rand::Rng;

pub fn criterion_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("comment_tree");
    for n in [10, 100, 1000, 10000, 100000].iter() {
        let comments = generate_comments(*n, 0.4);
        group.bench_function(BenchmarkId::new("scan_per_root", n), |b| {
            b.iter(|| scan_per_root(comments.clone()))
        });
        group.bench_function(BenchmarkId::new("indexed", n), |b| {
            b.iter(|| indexed(comments.clone()))
        });
    }
    group.finish();
}

#[derive(Clone)]
struct FlatComment {
    id: u64,
    replied_comment_id: Option<u64>,
    text: String,
}

#[allow(dead_code)]
struct NestedComment {
    id: u64,
    text: String,
    replies: Vec<FlatComment>,
}

fn generate_comments(n: usize, reply_ratio: f64) -> Vec<FlatComment> {
    let mut rng = rand::rng();
    let mut comments = Vec::with_capacity(n);

    for i in 0..n as u64 {
        let replied_comment_id = if i > 0 && rng.random_bool(reply_ratio) {
            Some(rng.random_range(0..i))
        } else {
            None
        };

        comments.push(FlatComment {
            id: i,
            replied_comment_id,
            text: "content".to_string(),
        });
    }

    comments
}

// One pass over the whole batch per root, the way the nesting was first
// written
fn scan_per_root(comments: Vec<FlatComment>) -> Vec<NestedComment> {
    let roots: Vec<&FlatComment> = comments
        .iter()
        .filter(|c| c.replied_comment_id.is_none())
        .collect();

    roots
        .into_iter()
        .map(|root| NestedComment {
            id: root.id,
            text: root.text.clone(),
            replies: comments
                .iter()
                .filter(|c| c.replied_comment_id == Some(root.id))
                .cloned()
                .collect(),
        })
        .collect()
}

// Index the roots once so attaching replies is O(n)
fn indexed(comments: Vec<FlatComment>) -> Vec<NestedComment> {
    let (root_rows, reply_rows): (Vec<_>, Vec<_>) = comments
        .into_iter()
        .partition(|c| c.replied_comment_id.is_none());

    let mut roots = Vec::with_capacity(root_rows.len());
    let mut root_index = HashMap::with_capacity(root_rows.len());

    for comment in root_rows {
        root_index.insert(comment.id, roots.len());
        roots.push(NestedComment {
            id: comment.id,
            text: comment.text,
            replies: vec![],
        });
    }

    for comment in reply_rows {
        let Some(parent_id) = comment.replied_comment_id else {
            continue;
        };

        if let Some(&at) = root_index.get(&parent_id) {
            roots[at].replies.push(comment);
        }
    }

    roots
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
