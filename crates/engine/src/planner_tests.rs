use super::*;
use pipeline_core::test_support::{stage, stage_depending_on};

#[test]
fn straight_line_chain_produces_one_stage_per_level() {
    let stages = vec![
        stage("a"),
        stage_depending_on("b", &["a"]),
        stage_depending_on("c", &["b"]),
    ];
    let result = plan(&stages);
    assert!(result.issues.is_empty());
    assert_eq!(result.graph.groups.len(), 3);
    for (i, group) in result.graph.groups.iter().enumerate() {
        assert_eq!(group.level, i);
        assert_eq!(group.stages.len(), 1);
    }
    assert_eq!(result.graph.max_parallelism(), 1);
}

#[test]
fn independent_stages_share_a_level_in_declaration_order() {
    let stages = vec![stage("x"), stage("y"), stage("z")];
    let result = plan(&stages);
    assert_eq!(result.graph.groups.len(), 1);
    assert_eq!(result.graph.groups[0].names(), vec!["x", "y", "z"]);
    assert_eq!(result.graph.max_parallelism(), 3);
}

#[test]
fn diamond_dependency_groups_correctly() {
    // a -> (b, c) -> d
    let stages = vec![
        stage("a"),
        stage_depending_on("b", &["a"]),
        stage_depending_on("c", &["a"]),
        stage_depending_on("d", &["b", "c"]),
    ];
    let result = plan(&stages);
    assert!(result.issues.is_empty());
    assert_eq!(result.graph.groups.len(), 3);
    assert_eq!(result.graph.groups[0].names(), vec!["a"]);
    assert_eq!(result.graph.groups[1].names(), vec!["b", "c"]);
    assert_eq!(result.graph.groups[2].names(), vec!["d"]);
}

#[test]
fn cycle_is_excluded_from_the_graph_and_reported() {
    let stages = vec![
        stage_depending_on("a", &["b"]),
        stage_depending_on("b", &["a"]),
        stage("c"),
    ];
    let result = plan(&stages);
    assert_eq!(result.graph.total_stages(), 1);
    assert_eq!(result.graph.groups[0].names(), vec!["c"]);
    match &result.issues[0] {
        PlannerIssue::Cycle { stages } => {
            let mut s = stages.clone();
            s.sort();
            assert_eq!(s, vec!["a".to_string(), "b".to_string()]);
        }
        other => panic!("expected Cycle issue, got {other:?}"),
    }
}

#[test]
fn unknown_dependency_is_reported_as_a_cycle_issue() {
    let stages = vec![stage_depending_on("a", &["missing"])];
    let result = plan(&stages);
    assert_eq!(result.graph.total_stages(), 0);
    assert_eq!(
        result.issues[0],
        PlannerIssue::Cycle {
            stages: vec!["a".to_string()]
        }
    );
}

#[test]
fn disabled_dependency_of_enabled_stage_is_a_warning_not_a_cycle() {
    let mut disabled = stage("gate");
    disabled.enabled = false;
    let stages = vec![disabled, stage_depending_on("deploy", &["gate"])];
    let result = plan(&stages);
    // The disabled stage still occupies a level; the dependent is ready
    // once it's "resolved" at the graph level (enablement is a dispatch
    // concern for the Group Orchestrator).
    assert_eq!(result.graph.total_stages(), 2);
    assert!(result.issues.iter().any(|i| matches!(
        i,
        PlannerIssue::DisabledDependencyOfEnabled { disabled, dependents }
        if disabled == "gate" && dependents == &vec!["deploy".to_string()]
    )));
}

#[test]
fn empty_stage_list_produces_empty_graph() {
    let result = plan(&[]);
    assert!(result.graph.is_empty());
    assert!(result.issues.is_empty());
}
