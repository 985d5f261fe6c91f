// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The notifier (C8): formats and dispatches failure/warning mail.
//!
//! Disabling mail (`--nomail`) is modelled as a variant of this value
//! rather than a boolean flag threaded through every call site.

use crate::invocation::Invocation;
use bur_adapters::MailTransport;
use tracing::warn;

/// Formats and sends (or silently drops) one notification.
#[derive(Clone)]
pub enum Notifier<M: MailTransport> {
    Enabled {
        mail: M,
        url: String,
        recipient: String,
    },
    Disabled,
}

impl<M: MailTransport> Notifier<M> {
    pub fn enabled(mail: M, url: String, recipient: String) -> Self {
        Notifier::Enabled { mail, url, recipient }
    }

    pub fn disabled() -> Self {
        Notifier::Disabled
    }

    /// Sends a failure (or, if `warning`, a warning) mail about `message`,
    /// appending a `Customer`/`Tag`/`ID`/`WF URL` info block. A no-op when
    /// mail is disabled; transport failures are logged and swallowed
    /// rather than escalated, since a stage's own outcome shouldn't
    /// depend on whether its failure mail delivered.
    pub async fn notify(&self, inv: &Invocation, warning: bool, message: &str) {
        let prefix = if warning { "Backup warning: " } else { "Backup failure: " };
        self.send(inv, prefix, message).await;
    }

    /// Sends the `ALL` stage's overall-success mail. Not a
    /// variant of [`Notifier::notify`]'s warning/failure split — the subject
    /// reads "Backup Successful for CUSTOMER" rather than "CUSTOMER:", so it
    /// gets its own formatting instead of overloading `notify`'s prefix.
    pub async fn notify_success(&self, inv: &Invocation, message: &str) {
        let subject = format!("Backup Successful for {}", inv.tenancy.deployment_id);
        self.send_with_subject(inv, subject, message).await;
    }

    /// Sends the dispatcher's last-resort mail for a genuinely unhandled
    /// failure caught at the outermost boundary, with its own distinct
    /// "issue" subject rather than reusing the failure/warning prefixes.
    pub async fn notify_issue(&self, inv: &Invocation, message: &str) {
        let subject = format!("Backup issue: {}", inv.tenancy.deployment_id);
        self.send_with_subject(inv, subject, message).await;
    }

    async fn send(&self, inv: &Invocation, prefix: &str, message: &str) {
        let subject = format!("{prefix}{}", inv.tenancy.deployment_id);
        self.send_with_subject(inv, subject, message).await;
    }

    async fn send_with_subject(&self, inv: &Invocation, subject: String, message: &str) {
        let (mail, url, recipient) = match self {
            Notifier::Disabled => return,
            Notifier::Enabled { mail, url, recipient } => (mail, url, recipient),
        };

        let body = format_body(inv, message);
        let sender = format!("{}@no-reply.ericsson.net", inv.tenancy.deployment_id);

        if let Err(err) = mail.send(url, &sender, recipient, &subject, &body).await {
            warn!(%err, recipient, "failed to send mail");
        }
    }
}

fn workflow_url(inv: &Invocation) -> String {
    match &inv.backup_id {
        Some(id) if !inv.tenancy.lcm_host.is_empty() => format!(
            "http://{}/index.html#workflows/workflow/enmdeploymentworkflows.--.Backup%20Deployment/workflowinstance/{}",
            inv.tenancy.lcm_host, id
        ),
        _ => "None".to_string(),
    }
}

fn format_body(inv: &Invocation, message: &str) -> String {
    format!(
        "{message}\nCustomer: {}\nTag: {}\nID: {}\nWF URL: {}",
        inv.tenancy.deployment_id,
        inv.tag.as_deref().unwrap_or("None"),
        inv.backup_id.as_deref().unwrap_or("None"),
        workflow_url(inv),
    )
}

#[cfg(test)]
#[path = "notifier_tests.rs"]
mod tests;
