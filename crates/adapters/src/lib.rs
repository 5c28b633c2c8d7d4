// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Adapters for external I/O: the agent runtime contract (§6.2) and the
//! notification channels (Slack/email/desktop).

mod env;
pub mod notify;
pub mod pr;
pub mod runtime;
pub mod subprocess;

pub use env::{has_api_key, resolve_api_key};
pub use notify::{
    DesktopNotifyAdapter, EmailNotifyAdapter, NoOpNotifyAdapter, NotifyAdapter, NotifyBus,
    NotifyError, SlackNotifyAdapter,
};
pub use pr::{GhPrCreator, NoOpPrCreator, PrCreator, PrError, PrRequest};
pub use runtime::{
    AgentRuntime, ClaudeSubprocessRuntime, ExecuteOptions, ExecuteRequest, ExecuteResponse,
    RuntimeCapabilities, RuntimeError, RuntimeTokenUsage, ToolActivityEvent, ToolActivitySink,
};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use notify::{FakeNotifyAdapter, NotifyCall};
#[cfg(any(test, feature = "test-support"))]
pub use pr::FakePrCreator;
#[cfg(any(test, feature = "test-support"))]
pub use runtime::{ExecuteCall, FakeAgentRuntime};
