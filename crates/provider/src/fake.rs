// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake provider for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use std::collections::VecDeque;

use async_trait::async_trait;
use parking_lot::Mutex;
use porter_core::MachineId;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use crate::api::{Machine, MachineConfig, ProviderApi};
use crate::error::ProviderError;

/// Recorded provider call
#[derive(Debug, Clone)]
pub enum ProviderCall {
    Create { overrides: Value },
    Start { id: MachineId },
    Stop { id: MachineId },
    List,
    Get { id: MachineId },
}

#[derive(Default)]
struct FakeProviderState {
    calls: Vec<ProviderCall>,
    machines: Vec<Machine>,
    next_id: u64,
    create_errors: VecDeque<ProviderError>,
    start_errors: VecDeque<ProviderError>,
    stop_errors: VecDeque<ProviderError>,
    list_errors: VecDeque<ProviderError>,
}

/// Fake provider for testing.
///
/// Records every call and serves scripted errors; operations succeed by
/// default. Created machines get sequential ids (`m_1`, `m_2`, ...).
#[derive(Clone, Default)]
pub struct FakeProvider {
    inner: Arc<Mutex<FakeProviderState>>,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<ProviderCall> {
        self.inner.lock().calls.clone()
    }

    pub fn create_count(&self) -> usize {
        self.count(|c| matches!(c, ProviderCall::Create { .. }))
    }

    /// Ids passed to `start_machine`, in call order
    pub fn started(&self) -> Vec<MachineId> {
        self.inner
            .lock()
            .calls
            .iter()
            .filter_map(|c| match c {
                ProviderCall::Start { id } => Some(id.clone()),
                _ => None,
            })
            .collect()
    }

    /// Ids passed to `stop_machine`, in call order
    pub fn stopped(&self) -> Vec<MachineId> {
        self.inner
            .lock()
            .calls
            .iter()
            .filter_map(|c| match c {
                ProviderCall::Stop { id } => Some(id.clone()),
                _ => None,
            })
            .collect()
    }

    fn count(&self, pred: impl Fn(&ProviderCall) -> bool) -> usize {
        self.inner.lock().calls.iter().filter(|c| pred(c)).count()
    }

    /// Queue an error for the next `create_machine` call.
    pub fn fail_create(&self, err: ProviderError) {
        self.inner.lock().create_errors.push_back(err);
    }

    /// Queue an error for the next `start_machine` call.
    pub fn fail_start(&self, err: ProviderError) {
        self.inner.lock().start_errors.push_back(err);
    }

    /// Queue an error for the next `stop_machine` call.
    pub fn fail_stop(&self, err: ProviderError) {
        self.inner.lock().stop_errors.push_back(err);
    }

    /// Queue an error for the next `list_machines` call.
    pub fn fail_list(&self, err: ProviderError) {
        self.inner.lock().list_errors.push_back(err);
    }

    /// Seed a pre-existing machine, as if created in an earlier process life.
    pub fn seed_machine(&self, id: &str, user: &str, repo: &str) {
        let mut env = HashMap::new();
        env.insert("USERNAME".to_string(), user.to_string());
        env.insert("REPO_NAME".to_string(), repo.to_string());
        self.inner.lock().machines.push(Machine {
            id: MachineId::new(id),
            state: "stopped".to_string(),
            config: MachineConfig { env },
        });
    }

    /// Current state of a machine, if known to the fake.
    pub fn machine_state(&self, id: &MachineId) -> Option<String> {
        self.inner
            .lock()
            .machines
            .iter()
            .find(|m| &m.id == id)
            .map(|m| m.state.clone())
    }
}

#[async_trait]
impl ProviderApi for FakeProvider {
    async fn create_machine(
        &self,
        overrides: Value,
    ) -> Result<MachineId, ProviderError> {
        let mut state = self.inner.lock();
        state.calls.push(ProviderCall::Create {
            overrides: overrides.clone(),
        });
        if let Some(err) = state.create_errors.pop_front() {
            return Err(err);
        }
        state.next_id += 1;
        let id = MachineId::new(format!("m_{}", state.next_id));
        let env = overrides
            .pointer("/config/env")
            .and_then(|v| serde_json::from_value::<HashMap<String, String>>(v.clone()).ok())
            .unwrap_or_default();
        state.machines.push(Machine {
            id: id.clone(),
            state: "started".to_string(),
            config: MachineConfig { env },
        });
        Ok(id)
    }

    async fn start_machine(&self, id: &MachineId) -> Result<(), ProviderError> {
        let mut state = self.inner.lock();
        state.calls.push(ProviderCall::Start { id: id.clone() });
        if let Some(err) = state.start_errors.pop_front() {
            return Err(err);
        }
        if let Some(machine) = state.machines.iter_mut().find(|m| &m.id == id) {
            machine.state = "started".to_string();
        }
        Ok(())
    }

    async fn stop_machine(&self, id: &MachineId) -> Result<(), ProviderError> {
        let mut state = self.inner.lock();
        state.calls.push(ProviderCall::Stop { id: id.clone() });
        if let Some(err) = state.stop_errors.pop_front() {
            return Err(err);
        }
        if let Some(machine) = state.machines.iter_mut().find(|m| &m.id == id) {
            machine.state = "stopped".to_string();
        }
        Ok(())
    }

    async fn list_machines(&self) -> Result<Vec<Machine>, ProviderError> {
        let mut state = self.inner.lock();
        state.calls.push(ProviderCall::List);
        if let Some(err) = state.list_errors.pop_front() {
            return Err(err);
        }
        Ok(state.machines.clone())
    }

    async fn get_machine(&self, id: &MachineId) -> Result<Machine, ProviderError> {
        let mut state = self.inner.lock();
        state.calls.push(ProviderCall::Get { id: id.clone() });
        state
            .machines
            .iter()
            .find(|m| &m.id == id)
            .cloned()
            .ok_or_else(|| ProviderError::NotFound(id.to_string()))
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
