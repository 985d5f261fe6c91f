// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake workflow transport for testing.

use super::{WorkflowClientError, WorkflowDefinitionDto, WorkflowInstanceDto, WorkflowTransport};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// One recorded invocation against a [`FakeWorkflowTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowTransportCall {
    ListInstances { lcm: String },
    ListDefinitions { lcm: String },
    StartInstance {
        lcm: String,
        definition_id: String,
        business_key: String,
        tag: String,
    },
}

struct FakeState {
    calls: Vec<WorkflowTransportCall>,
    instances: HashMap<String, Result<Vec<WorkflowInstanceDto>, String>>,
    instance_sequences: HashMap<String, std::collections::VecDeque<Result<Vec<WorkflowInstanceDto>, String>>>,
    definitions: HashMap<String, Result<Vec<WorkflowDefinitionDto>, String>>,
    start_result: Result<String, String>,
}

/// Scriptable stand-in for [`WorkflowTransport`], keyed by `lcm` host.
#[derive(Clone)]
pub struct FakeWorkflowTransport {
    inner: Arc<Mutex<FakeState>>,
}

impl Default for FakeWorkflowTransport {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeState {
                calls: Vec::new(),
                instances: HashMap::new(),
                instance_sequences: HashMap::new(),
                definitions: HashMap::new(),
                start_result: Ok("instance-1".to_string()),
            })),
        }
    }
}

impl FakeWorkflowTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<WorkflowTransportCall> {
        self.inner.lock().calls.clone()
    }

    pub fn set_instances(&self, lcm: &str, records: Vec<WorkflowInstanceDto>) {
        self.inner.lock().instances.insert(lcm.to_string(), Ok(records));
    }

    pub fn fail_instances(&self, lcm: &str, err: &str) {
        self.inner
            .lock()
            .instances
            .insert(lcm.to_string(), Err(err.to_string()));
    }

    /// Scripts a sequence of per-call results for `lcm`'s `list_instances`,
    /// popped one at a time (oldest first); once exhausted, falls back to
    /// whatever [`Self::set_instances`]/[`Self::fail_instances`] left in
    /// place. Used to exercise non-consecutive success/failure polling
    /// patterns a single fixed response can't express.
    pub fn queue_instances(&self, lcm: &str, results: Vec<Result<Vec<WorkflowInstanceDto>, String>>) {
        self.inner
            .lock()
            .instance_sequences
            .insert(lcm.to_string(), results.into());
    }

    pub fn set_definitions(&self, lcm: &str, defs: Vec<WorkflowDefinitionDto>) {
        self.inner.lock().definitions.insert(lcm.to_string(), Ok(defs));
    }

    pub fn fail_definitions(&self, lcm: &str, err: &str) {
        self.inner
            .lock()
            .definitions
            .insert(lcm.to_string(), Err(err.to_string()));
    }

    pub fn set_start_result(&self, instance_id: &str) {
        self.inner.lock().start_result = Ok(instance_id.to_string());
    }

    pub fn fail_start(&self, err: &str) {
        self.inner.lock().start_result = Err(err.to_string());
    }
}

#[async_trait]
impl WorkflowTransport for FakeWorkflowTransport {
    async fn list_instances(
        &self,
        lcm: &str,
    ) -> Result<Vec<WorkflowInstanceDto>, WorkflowClientError> {
        let mut state = self.inner.lock();
        state.calls.push(WorkflowTransportCall::ListInstances {
            lcm: lcm.to_string(),
        });

        let queued = state
            .instance_sequences
            .get_mut(lcm)
            .and_then(|queue| queue.pop_front());

        match queued.or_else(|| state.instances.get(lcm).cloned()) {
            Some(Ok(records)) => Ok(records),
            Some(Err(msg)) => Err(WorkflowClientError::Request(lcm.to_string(), msg)),
            None => Ok(Vec::new()),
        }
    }

    async fn list_definitions(
        &self,
        lcm: &str,
    ) -> Result<Vec<WorkflowDefinitionDto>, WorkflowClientError> {
        let mut state = self.inner.lock();
        state.calls.push(WorkflowTransportCall::ListDefinitions {
            lcm: lcm.to_string(),
        });
        match state.definitions.get(lcm) {
            Some(Ok(defs)) => Ok(defs.clone()),
            Some(Err(msg)) => Err(WorkflowClientError::Request(lcm.to_string(), msg.clone())),
            None => Ok(Vec::new()),
        }
    }

    async fn start_instance(
        &self,
        lcm: &str,
        definition_id: &str,
        business_key: &str,
        tag: &str,
    ) -> Result<String, WorkflowClientError> {
        let mut state = self.inner.lock();
        state.calls.push(WorkflowTransportCall::StartInstance {
            lcm: lcm.to_string(),
            definition_id: definition_id.to_string(),
            business_key: business_key.to_string(),
            tag: tag.to_string(),
        });
        state
            .start_result
            .clone()
            .map_err(|msg| WorkflowClientError::Request(lcm.to_string(), msg))
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
