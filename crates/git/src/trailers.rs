// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Commit message assembly for `commitWithTrailers` / `pipelineCommit`
//! (spec §4.A, §6.4).

/// Append RFC-822-style trailers after a blank line, in insertion order.
pub fn commit_message(subject: &str, body: Option<&str>, trailers: &[(String, String)]) -> String {
    let mut msg = subject.to_string();
    if let Some(body) = body {
        if !body.is_empty() {
            msg.push_str("\n\n");
            msg.push_str(body);
        }
    }
    if !trailers.is_empty() {
        msg.push_str("\n\n");
        let lines: Vec<String> = trailers.iter().map(|(k, v)| format!("{k}: {v}")).collect();
        msg.push_str(&lines.join("\n"));
    }
    msg
}

/// Build the subject + trailers for a `pipelineCommit` (spec §4.A, §6.4).
///
/// `prefix` may contain the literal token `{{stage}}`, substituted with
/// `stage`. If the prefix (after substitution) already ends in whitespace,
/// no extra separator space is inserted before the message (spec §9 Open
/// Question: the trailing-space vs. no-trailing-space distinction is load
/// bearing).
pub fn pipeline_commit_message(
    stage: &str,
    run_id: &str,
    custom_message: Option<&str>,
    prefix: &str,
) -> String {
    let default_message = format!("Apply {stage} changes");
    let message = custom_message.unwrap_or(&default_message);
    let resolved_prefix = prefix.replace("{{stage}}", stage);
    let separator = if resolved_prefix.ends_with(' ') { "" } else { " " };
    let subject = format!("{resolved_prefix}{separator}{message}");

    let trailers = vec![
        ("Pipeline-Run-ID".to_string(), run_id.to_string()),
        ("Pipeline-Stage".to_string(), stage.to_string()),
        ("Agent-Pipeline".to_string(), "true".to_string()),
    ];
    commit_message(&subject, None, &trailers)
}

#[cfg(test)]
#[path = "trailers_tests.rs"]
mod tests;
