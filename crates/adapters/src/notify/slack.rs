// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Slack notification adapter: posts to an incoming webhook URL.
//!
//! The Validator (4.L) already checks the URL has the
//! `https://hooks.slack.com/...` shape before a pipeline runs; this adapter
//! does not re-validate it, it just posts.

use super::{NotifyAdapter, NotifyError};
use async_trait::async_trait;

pub struct SlackNotifyAdapter {
    webhook_url: String,
    client: reqwest::Client,
}

impl SlackNotifyAdapter {
    pub fn new(webhook_url: impl Into<String>) -> Self {
        Self {
            webhook_url: webhook_url.into(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl NotifyAdapter for SlackNotifyAdapter {
    async fn notify(&self, title: &str, message: &str) -> Result<(), NotifyError> {
        let text = format!("*{title}*\n{message}");
        let body = serde_json::json!({ "text": text });

        tracing::info!(webhook = %self.webhook_url, "posting slack notification");
        let response = self
            .client
            .post(&self.webhook_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| NotifyError::SendFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(NotifyError::SendFailed(format!(
                "slack webhook returned {}",
                response.status()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "slack_tests.rs"]
mod tests;
