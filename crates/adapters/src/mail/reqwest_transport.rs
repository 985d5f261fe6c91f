// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `reqwest`-backed [`super::MailTransport`], POSTing a SendGrid-shaped
//! JSON payload.

use super::{MailContent, MailError, MailFrom, MailPayload, MailTo, MailTransport, Personalization};
use crate::env::http_timeout;
use async_trait::async_trait;
use reqwest::Client;
use tracing::info;

#[derive(Debug, Clone)]
pub struct ReqwestMailTransport {
    client: Client,
}

impl ReqwestMailTransport {
    pub fn new() -> Self {
        #[allow(clippy::expect_used)]
        let client = Client::builder()
            .timeout(http_timeout())
            .danger_accept_invalid_certs(true)
            .build()
            .expect("reqwest client with no exotic TLS config should always build");
        Self { client }
    }
}

impl Default for ReqwestMailTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MailTransport for ReqwestMailTransport {
    async fn send(
        &self,
        url: &str,
        sender: &str,
        recipient: &str,
        subject: &str,
        body: &str,
    ) -> Result<(), MailError> {
        info!(sender, recipient, "sending mail");
        let payload = MailPayload {
            personalizations: vec![Personalization {
                to: vec![MailTo {
                    email: recipient.to_string(),
                }],
                subject: subject.to_string(),
            }],
            from: MailFrom {
                email: sender.to_string(),
            },
            content: vec![MailContent {
                content_type: "text/plain",
                value: body.to_string(),
            }],
        };
        let resp = self
            .client
            .post(url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| MailError::Request(url.to_string(), e.to_string()))?;
        if !resp.status().is_success() {
            return Err(MailError::Status(url.to_string(), resp.status().as_u16()));
        }
        Ok(())
    }
}
