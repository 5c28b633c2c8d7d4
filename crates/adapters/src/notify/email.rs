// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Email notification adapter: hands an RFC 5322 message to the local
//! `sendmail` binary, the same transport-agnostic handoff a Unix MTA
//! expects. No SMTP client is bundled — if the host has no working
//! `sendmail`, delivery fails and the caller logs it like any other
//! channel failure.

use super::{NotifyAdapter, NotifyError};
use async_trait::async_trait;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

pub struct EmailNotifyAdapter {
    to: String,
    sendmail_binary: String,
}

impl EmailNotifyAdapter {
    pub fn new(to: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            sendmail_binary: std::env::var("PIPELINE_SENDMAIL_BINARY")
                .unwrap_or_else(|_| "sendmail".into()),
        }
    }
}

#[async_trait]
impl NotifyAdapter for EmailNotifyAdapter {
    async fn notify(&self, title: &str, message: &str) -> Result<(), NotifyError> {
        let rfc822 = format!(
            "To: {}\r\nSubject: {}\r\n\r\n{}\r\n",
            self.to, title, message
        );

        let mut child = Command::new(&self.sendmail_binary)
            .arg("-t")
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| NotifyError::SendFailed(format!("spawning sendmail: {e}")))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| NotifyError::SendFailed("sendmail had no stdin".into()))?;
        stdin
            .write_all(rfc822.as_bytes())
            .await
            .map_err(|e| NotifyError::SendFailed(format!("writing to sendmail: {e}")))?;
        drop(stdin);

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| NotifyError::SendFailed(format!("waiting for sendmail: {e}")))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(NotifyError::SendFailed(format!(
                "sendmail exited with {}: {}",
                output.status, stderr
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "email_tests.rs"]
mod tests;
