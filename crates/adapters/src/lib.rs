// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Adapters for external I/O: the remote-exec transport (C1), the
//! workflow-service HTTP transport (part of C3), and the mail transport
//! (part of C8). Everything in here is a thin trait + real/fake pair;
//! the business logic that calls these lives in `bur-engine`.

mod env;
pub mod exec;
pub mod http;
pub mod mail;
pub mod subprocess;

pub use exec::{ExecAdapter, ExecOutput, ProcessExecAdapter};
pub use http::{HttpWorkflowTransport, WorkflowClientError, WorkflowTransport};
pub use mail::{HttpMailTransport, MailError, MailTransport};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use exec::{ExecCall, FakeExecAdapter};
#[cfg(any(test, feature = "test-support"))]
pub use http::{FakeWorkflowTransport, WorkflowTransportCall};
#[cfg(any(test, feature = "test-support"))]
pub use mail::{FakeMailTransport, MailCall};
