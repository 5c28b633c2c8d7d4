// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serial_test::serial;

#[tokio::test]
#[serial]
async fn missing_sendmail_binary_surfaces_as_send_failed() {
    std::env::set_var("PIPELINE_SENDMAIL_BINARY", "/nonexistent/sendmail");
    let adapter = EmailNotifyAdapter::new("ops@example.com");
    let result = adapter.notify("pipeline.failed", "stage x failed").await;
    std::env::remove_var("PIPELINE_SENDMAIL_BINARY");
    assert!(matches!(result, Err(NotifyError::SendFailed(_))));
}
