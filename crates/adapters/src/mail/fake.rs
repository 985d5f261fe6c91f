// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake mail transport for testing.

use super::{MailError, MailTransport};
use parking_lot::Mutex;
use std::sync::Arc;

use async_trait::async_trait;

/// One recorded `send` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailCall {
    pub url: String,
    pub sender: String,
    pub recipient: String,
    pub subject: String,
    pub body: String,
}

struct FakeState {
    calls: Vec<MailCall>,
    should_fail: bool,
}

/// Scriptable stand-in for [`MailTransport`]; records every call instead
/// of sending anything.
#[derive(Clone)]
pub struct FakeMailTransport {
    inner: Arc<Mutex<FakeState>>,
}

impl Default for FakeMailTransport {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeState {
                calls: Vec::new(),
                should_fail: false,
            })),
        }
    }
}

impl FakeMailTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<MailCall> {
        self.inner.lock().calls.clone()
    }

    pub fn set_should_fail(&self, fail: bool) {
        self.inner.lock().should_fail = fail;
    }
}

#[async_trait]
impl MailTransport for FakeMailTransport {
    async fn send(
        &self,
        url: &str,
        sender: &str,
        recipient: &str,
        subject: &str,
        body: &str,
    ) -> Result<(), MailError> {
        let mut state = self.inner.lock();
        state.calls.push(MailCall {
            url: url.to_string(),
            sender: sender.to_string(),
            recipient: recipient.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        });
        if state.should_fail {
            return Err(MailError::Request(url.to_string(), "fake failure".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
