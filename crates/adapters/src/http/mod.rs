// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP transport to the remote workflow service (part of C3).
//!
//! Wire shapes only: decoding `progresssummaries`/`definitions` JSON into
//! DTOs and POSTing a new instance. The business logic that turns these
//! into `bur_core::WorkflowSnapshot`, picks the latest validation
//! definition, and composes a business key lives in `bur-engine`.

mod reqwest_transport;

pub use reqwest_transport::ReqwestWorkflowTransport as HttpWorkflowTransport;

#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeWorkflowTransport, WorkflowTransportCall};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from the workflow-service HTTP transport.
#[derive(Debug, Error)]
pub enum WorkflowClientError {
    #[error("request to {0} failed: {1}")]
    Request(String, String),
    #[error("response from {0} was not valid JSON: {1}")]
    Decode(String, String),
    #[error("{0} returned HTTP {1}")]
    Status(String, u16),
}

/// One record as returned by `GET /wfs/rest/progresssummaries`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorkflowInstanceDto {
    #[serde(rename = "instanceId")]
    pub instance_id: String,
    #[serde(rename = "definitionName")]
    pub definition_name: String,
    #[serde(rename = "startTime", default)]
    pub start_time: Option<String>,
    #[serde(rename = "endTime", default)]
    pub end_time: Option<String>,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub aborted: bool,
    #[serde(rename = "incidentActive", default)]
    pub incident_active: bool,
    #[serde(rename = "endNodeId", default)]
    pub end_node_id: String,
}

/// One record as returned by `GET /wfs/rest/definitions`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorkflowDefinitionDto {
    #[serde(rename = "definitionId")]
    pub definition_id: String,
}

#[derive(Debug, Serialize)]
struct StartInstanceVariable {
    #[serde(rename = "type")]
    var_type: &'static str,
    value: String,
}

#[derive(Debug, Serialize)]
struct StartInstanceRequest {
    #[serde(rename = "definitionId")]
    definition_id: String,
    #[serde(rename = "businessKey")]
    business_key: String,
    variables: StartInstanceVariables,
}

#[derive(Debug, Serialize)]
struct StartInstanceVariables {
    tag: StartInstanceVariable,
}

#[derive(Debug, Deserialize)]
struct StartInstanceResponse {
    #[serde(rename = "instanceId")]
    instance_id: String,
}

/// Transport to the remote workflow HTTP service.
#[async_trait]
pub trait WorkflowTransport: Clone + Send + Sync + 'static {
    /// `GET http://{lcm}/wfs/rest/progresssummaries`
    async fn list_instances(
        &self,
        lcm: &str,
    ) -> Result<Vec<WorkflowInstanceDto>, WorkflowClientError>;

    /// `GET http://{lcm}/wfs/rest/definitions`
    async fn list_definitions(
        &self,
        lcm: &str,
    ) -> Result<Vec<WorkflowDefinitionDto>, WorkflowClientError>;

    /// `POST http://{lcm}/wfs/rest/instances`, returning the new `instanceId`.
    async fn start_instance(
        &self,
        lcm: &str,
        definition_id: &str,
        business_key: &str,
        tag: &str,
    ) -> Result<String, WorkflowClientError>;
}
