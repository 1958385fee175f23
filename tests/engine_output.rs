// tests/engine_output.rs

//! Output grouping semantics of the pure core: group banners are emitted
//! only when consecutive output blocks come from different tool groups, and
//! every line carries its tool's output prefix.

mod common;
use crate::common::init_tracing;

use std::sync::Arc;

use parbuild::engine::{ActionOutcome, CoreCommand, CoreRuntime, RuntimeEvent};
use parbuild::graph::{ActionGraph, ActionId, Scheduler};
use parbuild_test_utils::builders::{BuildSetBuilder, TaskBuilder, ToolBuilder};

fn core_with_three_tasks() -> (CoreRuntime, Vec<ActionId>) {
    // Two tools with distinct prefixes; c1/c2 share a group, l1 has its own.
    let build_set = BuildSetBuilder::new()
        .with_tool(
            "cc",
            ToolBuilder::new("true")
                .group_prefix("Compiling")
                .output_prefix("cc> ")
                .build(),
        )
        .with_tool(
            "ld",
            ToolBuilder::new("true")
                .group_prefix("Linking")
                .output_prefix("ld> ")
                .build(),
        )
        .with_task("c1", TaskBuilder::with_tool("cc").build())
        .with_task("c2", TaskBuilder::with_tool("cc").build())
        .with_task("l1", TaskBuilder::with_tool("ld").build())
        .build();

    let graph = Arc::new(ActionGraph::from_build_set(&build_set).expect("build set should load"));
    let ids = ["c1", "c2", "l1"]
        .iter()
        .map(|name| graph.find(name).expect("action exists"))
        .collect();

    let scheduler = Scheduler::new(graph, 4, false);
    let mut core = CoreRuntime::new(scheduler);
    core.step(RuntimeEvent::RunStarted);

    (core, ids)
}

fn complete_with_output(core: &mut CoreRuntime, id: ActionId, lines: &[&str]) -> Vec<CoreCommand> {
    core.step(RuntimeEvent::ActionCompleted {
        action: id,
        outcome: ActionOutcome::Success,
        output: lines.iter().map(|s| s.to_string()).collect(),
    })
    .commands
}

fn emit_of(commands: &[CoreCommand]) -> (Option<String>, Vec<String>) {
    for command in commands {
        if let CoreCommand::EmitOutput { banner, lines } = command {
            return (banner.clone(), lines.clone());
        }
    }
    panic!("no EmitOutput command in {commands:?}");
}

#[test]
fn banner_appears_once_per_group_change() {
    init_tracing();

    let (mut core, ids) = core_with_three_tasks();
    let (c1, c2, l1) = (ids[0], ids[1], ids[2]);

    // First block from the "Compiling" group: banner shown.
    let (banner, lines) = emit_of(&complete_with_output(&mut core, c1, &["one"]));
    assert_eq!(banner.as_deref(), Some("Compiling"));
    assert_eq!(lines, vec!["cc> one"]);

    // Second block from the same group: banner suppressed.
    let (banner, lines) = emit_of(&complete_with_output(&mut core, c2, &["two"]));
    assert_eq!(banner, None);
    assert_eq!(lines, vec!["cc> two"]);

    // A different group: banner shown again.
    let (banner, lines) = emit_of(&complete_with_output(&mut core, l1, &["three"]));
    assert_eq!(banner.as_deref(), Some("Linking"));
    assert_eq!(lines, vec!["ld> three"]);
}

#[test]
fn silent_actions_emit_nothing_and_keep_the_group_cursor() {
    init_tracing();

    let (mut core, ids) = core_with_three_tasks();
    let (c1, c2, _) = (ids[0], ids[1], ids[2]);

    let (banner, _) = emit_of(&complete_with_output(&mut core, c1, &["one"]));
    assert_eq!(banner.as_deref(), Some("Compiling"));

    // No output: no EmitOutput command at all.
    let commands = complete_with_output(&mut core, c2, &[]);
    assert!(
        !commands
            .iter()
            .any(|c| matches!(c, CoreCommand::EmitOutput { .. })),
        "unexpected EmitOutput for a silent action"
    );
}
