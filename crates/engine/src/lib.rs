// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Business logic for the ENM BUR backup sequence: credential resolution
//! (C2), the workflow-service client (C3), blocking-rule evaluation glue
//! (C4/C5), the stage engine (C6), the stage sequencer (C7), the notifier
//! (C8), and the stage dispatcher (C9). Everything here is generic over
//! the `bur-adapters` traits so it runs against both real and fake I/O.

pub mod credential;
pub mod dispatcher;
pub mod error;
pub mod invocation;
pub mod notifier;
pub mod sequencer;
pub mod stages;
pub mod workflow_client;

pub use error::EngineError;
pub use invocation::Invocation;
pub use notifier::Notifier;
pub use workflow_client::{log_workflow, WorkflowClient};
