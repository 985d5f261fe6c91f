// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `reqwest`-backed implementation of [`super::WorkflowTransport`].

use super::{
    StartInstanceRequest, StartInstanceVariable, StartInstanceVariables, WorkflowClientError,
    WorkflowDefinitionDto, WorkflowInstanceDto, WorkflowTransport,
};
use crate::env::http_timeout;
use async_trait::async_trait;
use reqwest::Client;
use tracing::info;

/// Talks to the real LCM workflow service over plain HTTP (no TLS
/// expected on this internal endpoint).
#[derive(Debug, Clone)]
pub struct ReqwestWorkflowTransport {
    client: Client,
}

impl ReqwestWorkflowTransport {
    pub fn new() -> Self {
        #[allow(clippy::expect_used)]
        let client = Client::builder()
            .timeout(http_timeout())
            .build()
            .expect("reqwest client with no exotic TLS config should always build");
        Self { client }
    }
}

impl Default for ReqwestWorkflowTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WorkflowTransport for ReqwestWorkflowTransport {
    async fn list_instances(
        &self,
        lcm: &str,
    ) -> Result<Vec<WorkflowInstanceDto>, WorkflowClientError> {
        let url = format!("http://{lcm}/wfs/rest/progresssummaries");
        info!(url, "GET request");
        get_json(&self.client, &url).await
    }

    async fn list_definitions(
        &self,
        lcm: &str,
    ) -> Result<Vec<WorkflowDefinitionDto>, WorkflowClientError> {
        let url = format!("http://{lcm}/wfs/rest/definitions");
        info!(url, "GET request");
        get_json(&self.client, &url).await
    }

    async fn start_instance(
        &self,
        lcm: &str,
        definition_id: &str,
        business_key: &str,
        tag: &str,
    ) -> Result<String, WorkflowClientError> {
        let url = format!("http://{lcm}/wfs/rest/instances");
        info!(url, "POST request");
        let body = StartInstanceRequest {
            definition_id: definition_id.to_string(),
            business_key: business_key.to_string(),
            variables: StartInstanceVariables {
                tag: StartInstanceVariable {
                    var_type: "String",
                    value: tag.to_string(),
                },
            },
        };
        let resp = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| WorkflowClientError::Request(url.clone(), e.to_string()))?;
        if !resp.status().is_success() {
            return Err(WorkflowClientError::Status(url, resp.status().as_u16()));
        }
        let parsed: super::StartInstanceResponse = resp
            .json()
            .await
            .map_err(|e| WorkflowClientError::Decode(url, e.to_string()))?;
        Ok(parsed.instance_id)
    }
}

async fn get_json<T: serde::de::DeserializeOwned>(
    client: &Client,
    url: &str,
) -> Result<T, WorkflowClientError> {
    let resp = client
        .get(url)
        .send()
        .await
        .map_err(|e| WorkflowClientError::Request(url.to_string(), e.to_string()))?;
    if !resp.status().is_success() {
        return Err(WorkflowClientError::Status(
            url.to_string(),
            resp.status().as_u16(),
        ));
    }
    resp.json::<T>()
        .await
        .map_err(|e| WorkflowClientError::Decode(url.to_string(), e.to_string()))
}
