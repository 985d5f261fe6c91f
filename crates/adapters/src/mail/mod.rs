// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Outbound mail transport (part of C8). The mail service itself is an
//! external collaborator — this crate only owns the SendGrid-shaped JSON
//! payload and the trait seam the notifier builds on; subject/body
//! composition lives in `bur-engine`.

mod reqwest_transport;

pub use reqwest_transport::ReqwestMailTransport as HttpMailTransport;

#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeMailTransport, MailCall};

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("request to {0} failed: {1}")]
    Request(String, String),
    #[error("{0} returned HTTP {1}")]
    Status(String, u16),
}

#[derive(Debug, Serialize)]
struct MailTo {
    email: String,
}

#[derive(Debug, Serialize)]
struct Personalization {
    to: Vec<MailTo>,
    subject: String,
}

#[derive(Debug, Serialize)]
struct MailFrom {
    email: String,
}

#[derive(Debug, Serialize)]
struct MailContent {
    #[serde(rename = "type")]
    content_type: &'static str,
    value: String,
}

#[derive(Debug, Serialize)]
struct MailPayload {
    personalizations: Vec<Personalization>,
    from: MailFrom,
    content: Vec<MailContent>,
}

/// Sends one already-composed mail. `url` is the configured mail service
/// endpoint; `sender`/`recipient` and the subject/body are the notifier's
/// responsibility to compose.
#[async_trait]
pub trait MailTransport: Clone + Send + Sync + 'static {
    async fn send(
        &self,
        url: &str,
        sender: &str,
        recipient: &str,
        subject: &str,
        body: &str,
    ) -> Result<(), MailError>;
}
