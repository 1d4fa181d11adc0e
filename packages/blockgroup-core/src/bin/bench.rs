use std::env;
use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use blockgroup_core::{Document, Editor, Group, GroupId, Leaf, Node};

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct Output {
    implementation: &'static str,
    workload: String,
    timestamp: String,
    name: String,
    total_ops: u64,
    duration_ms: f64,
    ops_per_sec: f64,
    extra: Extra,
    source_file: Option<String>,
}

#[derive(serde::Serialize)]
struct Extra {
    count: u64,
}

fn chat(n: u64) -> Node {
    Leaf::new("CHATGPT", format!("block-{n}")).into()
}

/// `count` pairs of blocks, every other pair already grouped.
fn seed_document(count: u64) -> Document {
    let mut content = Vec::new();
    for i in 0..count {
        if i % 2 == 0 {
            let pair = vec![chat(2 * i), chat(2 * i + 1)];
            content.push(Group::new(GroupId::from_sequence(i + 1), pair).into());
        } else {
            content.push(chat(2 * i));
            content.push(chat(2 * i + 1));
        }
    }
    Document::new(content)
}

fn main() {
    let mut count: u64 = 200;
    let mut out_file: Option<PathBuf> = None;
    for arg in env::args().skip(1) {
        if let Some(val) = arg.strip_prefix("--count=") {
            count = val.parse().unwrap_or(count);
        } else if let Some(val) = arg.strip_prefix("--out=") {
            out_file = Some(PathBuf::from(val));
        }
    }

    let mut editor = Editor::new(seed_document(count));

    // ungroup every group from the back, then regroup the ungrouped pairs
    let start = Instant::now();
    let mut ops = 0u64;
    let group_positions: Vec<usize> = editor
        .document()
        .descendants()
        .filter(|entry| entry.node.is_group())
        .map(|entry| entry.pos)
        .collect();
    for pos in group_positions.into_iter().rev() {
        editor.ungroup_block(pos).expect("ungroup");
        ops += 1;
    }
    let mut pos = 0;
    while pos + 1 < editor.document().size() {
        editor.group_blocks(&[pos, pos + 1]).expect("group");
        // the new group spans four units
        pos += 4;
        ops += 1;
    }
    let duration_ms = start.elapsed().as_secs_f64() * 1000.0;

    let workload = format!("ungroup-regroup-{count}");
    let output = Output {
        implementation: "core-editor",
        workload: workload.clone(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        name: workload,
        total_ops: ops,
        duration_ms,
        ops_per_sec: if duration_ms > 0.0 {
            ops as f64 / duration_ms * 1000.0
        } else {
            f64::INFINITY
        },
        extra: Extra { count },
        source_file: out_file.as_ref().map(|p| p.display().to_string()),
    };

    let json = serde_json::to_string_pretty(&output).expect("serialize");
    if let Some(path) = out_file {
        fs::write(&path, &json).expect("write output");
    }
    println!("{}", json);
}
