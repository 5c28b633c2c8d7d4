// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Notification channels for `pipeline.started` / `pipeline.completed` /
//! `pipeline.failed` events (spec §4.I.8). Notification failures are never
//! fatal to a run — the Runner logs each channel's failure and continues.

mod bus;
mod desktop;
mod email;
mod noop;
mod slack;

pub use bus::NotifyBus;
pub use desktop::DesktopNotifyAdapter;
pub use email::EmailNotifyAdapter;
pub use noop::NoOpNotifyAdapter;
pub use slack::SlackNotifyAdapter;

#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeNotifyAdapter, NotifyCall};

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("send failed: {0}")]
    SendFailed(String),
}

/// A single notification channel, e.g. Slack, email, or desktop.
#[async_trait]
pub trait NotifyAdapter: Send + Sync + 'static {
    async fn notify(&self, title: &str, message: &str) -> Result<(), NotifyError>;
}
