// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fans a notification out to every channel configured in a pipeline's
//! `NotificationPolicy`, matching spec §4.I's rule that notification
//! errors are never fatal: each channel's failure is logged
//! (`"   <channel>: <error>"`) and the Runner continues.

use super::{
    DesktopNotifyAdapter, EmailNotifyAdapter, NotifyAdapter, NotifyError, SlackNotifyAdapter,
};
use pipeline_core::NotificationPolicy;
use std::sync::Arc;

#[derive(Clone)]
pub struct NotifyBus {
    channels: Vec<(&'static str, Arc<dyn NotifyAdapter>)>,
}

impl Default for NotifyBus {
    fn default() -> Self {
        Self::new()
    }
}

impl NotifyBus {
    pub fn new() -> Self {
        Self {
            channels: Vec::new(),
        }
    }

    pub fn with_channel(mut self, name: &'static str, adapter: Arc<dyn NotifyAdapter>) -> Self {
        self.channels.push((name, adapter));
        self
    }

    /// Build a bus from a pipeline's configured channels. A policy with no
    /// channels configured produces an empty (no-op) bus.
    pub fn from_policy(policy: &NotificationPolicy) -> Self {
        let mut bus = Self::new();
        if let Some(webhook) = &policy.slack_webhook {
            bus = bus.with_channel("slack", Arc::new(SlackNotifyAdapter::new(webhook.clone())));
        }
        if let Some(email) = &policy.email {
            bus = bus.with_channel("email", Arc::new(EmailNotifyAdapter::new(email.clone())));
        }
        if policy.desktop {
            bus = bus.with_channel("desktop", Arc::new(DesktopNotifyAdapter::new()));
        }
        bus
    }

    /// Send `title`/`message` to every configured channel. Returns the
    /// per-channel failures (empty if every channel succeeded, or if no
    /// channels are configured); never returns `Err` itself.
    pub async fn notify(&self, title: &str, message: &str) -> Vec<(&'static str, NotifyError)> {
        let mut failures = Vec::new();
        for (name, adapter) in &self.channels {
            if let Err(error) = adapter.notify(title, message).await {
                tracing::warn!(channel = name, %error, "   {}: {}", name, error);
                failures.push((*name, error));
            }
        }
        failures
    }
}

#[cfg(test)]
#[path = "bus_tests.rs"]
mod tests;
