// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[tokio::test]
async fn notify_surfaces_connection_failure() {
    // Port 0 never accepts connections; exercises the SendFailed mapping
    // without depending on network access in tests.
    let adapter = SlackNotifyAdapter::new("http://127.0.0.1:0/");
    let result = adapter.notify("title", "message").await;
    assert!(matches!(result, Err(NotifyError::SendFailed(_))));
}
