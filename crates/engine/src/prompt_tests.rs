use super::*;

fn ctx() -> TemplateContext {
    TemplateContext {
        pipeline_name: "release".to_string(),
        run_id: "run-1".to_string(),
        trigger: TriggerKind::Manual,
        timestamp_ms: 1000,
        base_branch: "main".to_string(),
        branch: "main".to_string(),
        initial_commit: "abc123".to_string(),
    }
}

#[test]
fn concatenates_handover_agent_and_context_in_order() {
    let prompt = build_prompt("## Prior stage context\n\nfoo\n", "Do the thing.", &ctx());
    let handover_pos = prompt.find("Prior stage context").unwrap();
    let agent_pos = prompt.find("Do the thing.").unwrap();
    let ctx_pos = prompt.find("## Run context").unwrap();
    assert!(handover_pos < agent_pos);
    assert!(agent_pos < ctx_pos);
    assert!(prompt.contains("runId: run-1"));
    assert!(prompt.contains("initialCommit: abc123"));
}

#[test]
fn empty_handover_context_is_omitted() {
    let prompt = build_prompt("", "Do the thing.", &ctx());
    assert!(prompt.starts_with("Do the thing."));
}
