// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The per-workspace lifecycle actor.
//!
//! Each actor is a long-lived task consuming a single inbox of typed
//! commands and replying on one-shot channels. All machine-id mutation
//! happens inside the task, so concurrent callers are serialized: the first
//! `EnsureMachine` on a cold key provisions, everyone queued behind it
//! observes the adopted id. The inactivity deadline lives in the same
//! `select!` loop, which makes timer firing and command handling mutually
//! exclusive by construction.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use porter_core::{MachineId, WorkspaceKey};
use porter_provider::{
    retry_if, workspace_overrides, ProviderApi, ProviderError, RetryPolicy,
};
use porter_storage::{MachineRecord, StateStore};
use serde_json::Value;
use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::error::ActorError;
use crate::machine_api::MachineApi;

/// Per-actor tunables
#[derive(Debug, Clone)]
pub struct ActorConfig {
    /// Idle time before the machine is auto-suspended
    pub inactivity_timeout: Duration,
    /// Outer deadline on every handle call
    pub call_timeout: Duration,
    /// Schedule for re-running a machine op after a recovery start
    pub machine_retry: RetryPolicy,
}

impl Default for ActorConfig {
    fn default() -> Self {
        Self {
            inactivity_timeout: Duration::from_secs(30 * 60),
            call_timeout: Duration::from_secs(20),
            machine_retry: RetryPolicy::default(),
        }
    }
}

/// Operation to run against the workspace machine's own API
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MachineOp {
    ListSessions,
}

/// Introspection snapshot of one actor
#[derive(Debug, Clone)]
pub struct WorkspaceStatus {
    pub machine_id: Option<MachineId>,
    pub timer_armed: bool,
}

enum Command {
    MachineId {
        reply: oneshot::Sender<Result<MachineId, ActorError>>,
    },
    Ensure {
        reply: oneshot::Sender<Result<MachineId, ActorError>>,
    },
    Suspend {
        reply: oneshot::Sender<Result<MachineId, ActorError>>,
    },
    MachineRequest {
        op: MachineOp,
        reply: oneshot::Sender<Result<Value, ActorError>>,
    },
    Status {
        reply: oneshot::Sender<WorkspaceStatus>,
    },
}

/// Cheap-to-clone handle to one workspace actor.
///
/// Every call carries the configured outer deadline; on expiry the caller
/// gets [`ActorError::Deadline`] while the actor finishes the operation and
/// updates its own state as usual.
#[derive(Clone)]
pub struct WorkspaceHandle {
    tx: mpsc::Sender<Command>,
    call_timeout: Duration,
}

impl WorkspaceHandle {
    pub async fn machine_id(&self) -> Result<MachineId, ActorError> {
        self.call(|reply| Command::MachineId { reply }).await?
    }

    /// Return the id of a running machine, provisioning one if needed.
    pub async fn ensure_machine(&self) -> Result<MachineId, ActorError> {
        self.call(|reply| Command::Ensure { reply }).await?
    }

    /// Stop the machine, keeping its id for a later restart.
    pub async fn suspend(&self) -> Result<MachineId, ActorError> {
        self.call(|reply| Command::Suspend { reply }).await?
    }

    /// Run an operation against the machine, recovering from suspension.
    pub async fn machine_request(&self, op: MachineOp) -> Result<Value, ActorError> {
        self.call(|reply| Command::MachineRequest { op, reply }).await?
    }

    pub async fn status(&self) -> Result<WorkspaceStatus, ActorError> {
        self.call(|reply| Command::Status { reply }).await
    }

    async fn call<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T, ActorError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        let command = make(reply_tx);
        let exchange = async {
            self.tx
                .send(command)
                .await
                .map_err(|_| ActorError::Closed)?;
            reply_rx.await.map_err(|_| ActorError::Closed)
        };
        match tokio::time::timeout(self.call_timeout, exchange).await {
            Ok(result) => result,
            Err(_) => Err(ActorError::Deadline),
        }
    }
}

/// Spawn the actor task for a key, returning its handle.
pub(crate) fn spawn<P, M>(
    key: WorkspaceKey,
    provider: P,
    machines: M,
    store: StateStore,
    config: ActorConfig,
) -> WorkspaceHandle
where
    P: ProviderApi,
    M: MachineApi,
{
    let (tx, rx) = mpsc::channel(32);
    let call_timeout = config.call_timeout;
    let actor = WorkspaceActor {
        key,
        provider,
        machines,
        store,
        config,
        machine_id: None,
        idle_deadline: None,
        rx,
    };
    tokio::spawn(actor.run());
    WorkspaceHandle { tx, call_timeout }
}

struct WorkspaceActor<P, M> {
    key: WorkspaceKey,
    provider: P,
    machines: M,
    store: StateStore,
    config: ActorConfig,
    machine_id: Option<MachineId>,
    idle_deadline: Option<Instant>,
    rx: mpsc::Receiver<Command>,
}

impl<P, M> WorkspaceActor<P, M>
where
    P: ProviderApi,
    M: MachineApi,
{
    async fn run(mut self) {
        loop {
            let deadline = self.idle_deadline;
            tokio::select! {
                command = self.rx.recv() => match command {
                    Some(command) => self.handle(command).await,
                    // Registry dropped (shutdown); nothing left to serve.
                    None => break,
                },
                _ = tokio::time::sleep_until(deadline.unwrap_or_else(Instant::now)),
                    if deadline.is_some() =>
                {
                    self.on_inactivity().await;
                }
            }
        }
    }

    async fn handle(&mut self, command: Command) {
        match command {
            Command::MachineId { reply } => {
                let result = match self.machine_id.clone() {
                    Some(id) => {
                        // Observing a present machine counts as activity
                        self.arm_timer();
                        Ok(id)
                    }
                    None => Err(ActorError::NoMachine),
                };
                let _ = reply.send(result);
            }
            Command::Ensure { reply } => {
                let _ = reply.send(self.ensure().await);
            }
            Command::Suspend { reply } => {
                let _ = reply.send(self.suspend().await);
            }
            Command::MachineRequest { op, reply } => {
                let _ = reply.send(self.machine_request(op).await);
            }
            Command::Status { reply } => {
                let _ = reply.send(WorkspaceStatus {
                    machine_id: self.machine_id.clone(),
                    timer_armed: self.idle_deadline.is_some(),
                });
            }
        }
    }

    /// EnsureMachine: in-memory id, then the store, then orphan adoption,
    /// then create. Serialization makes this idempotent: concurrent callers
    /// queue behind the first and observe the id it adopted.
    async fn ensure(&mut self) -> Result<MachineId, ActorError> {
        if let Some(id) = self.machine_id.clone() {
            self.arm_timer();
            return Ok(id);
        }

        // Persisted record from an earlier process life
        match self.store.load(&self.key) {
            Ok(Some(record)) => {
                let id = record.machine_id;
                match self.provider.start_machine(&id).await {
                    Ok(()) => {
                        info!(workspace = %self.key, machine = %id, "restarted persisted machine");
                        self.adopt(id.clone(), false);
                        return Ok(id);
                    }
                    Err(err) => {
                        warn!(
                            workspace = %self.key,
                            machine = %id,
                            error = %err,
                            "persisted machine failed to start, rediscovering"
                        );
                    }
                }
            }
            Ok(None) => {}
            Err(err) => {
                warn!(workspace = %self.key, error = %err, "unreadable machine record, rediscovering");
            }
        }

        // Orphaned machine whose env matches this workspace
        match self.provider.list_machines().await {
            Ok(machines) => {
                let mut matches = machines
                    .iter()
                    .filter(|m| m.matches_workspace(&self.key.user, &self.key.repo));
                if let (Some(machine), None) = (matches.next(), matches.next()) {
                    if !machine.id.is_empty() {
                        let id = machine.id.clone();
                        info!(workspace = %self.key, machine = %id, "adopted orphaned machine");
                        self.adopt(id.clone(), true);
                        return Ok(id);
                    }
                }
            }
            Err(err) => {
                warn!(workspace = %self.key, error = %err, "machine listing failed, creating fresh");
            }
        }

        // Fresh machine
        let overrides = workspace_overrides(&self.key.user, &self.key.repo);
        let id = self.provider.create_machine(overrides).await?;
        info!(workspace = %self.key, machine = %id, "created machine");
        self.adopt(id.clone(), true);
        Ok(id)
    }

    /// Suspend: stop via the provider, keep the id for a later restart.
    /// The timer is cancelled even when the stop fails.
    async fn suspend(&mut self) -> Result<MachineId, ActorError> {
        let Some(id) = self.machine_id.clone() else {
            return Err(ActorError::NoMachine);
        };
        self.idle_deadline = None;
        self.provider.stop_machine(&id).await?;
        info!(workspace = %self.key, machine = %id, "suspended machine");
        Ok(id)
    }

    async fn machine_request(&mut self, op: MachineOp) -> Result<Value, ActorError> {
        let id = match self.machine_id.clone() {
            Some(id) => id,
            None => self.ensure().await.map_err(|err| {
                warn!(workspace = %self.key, error = %err, "no machine for request");
                ActorError::NoMachine
            })?,
        };

        match run_op(&self.machines, &op, &id).await {
            Ok(value) => {
                self.arm_timer();
                Ok(value)
            }
            Err(err) if err.is_dns_failure() || err.is_timeout() => {
                // The machine is suspended or still booting: start it, then
                // re-run the op under the conditional retry schedule.
                debug!(workspace = %self.key, machine = %id, error = %err, "machine unreachable, starting");
                if let Err(start_err) = self.provider.start_machine(&id).await {
                    warn!(
                        workspace = %self.key,
                        machine = %id,
                        error = %start_err,
                        "recovery start failed"
                    );
                    return Err(err.into());
                }
                let machines = self.machines.clone();
                let retry_op = op.clone();
                let retry_id = id.clone();
                let retried = retry_if(
                    self.config.machine_retry,
                    |e: &ProviderError| e.is_dns_failure() || e.is_timeout(),
                    move || {
                        let machines = machines.clone();
                        let op = retry_op.clone();
                        let id = retry_id.clone();
                        async move { run_op(&machines, &op, &id).await }
                    },
                )
                .await;
                match retried {
                    Ok(value) => {
                        self.arm_timer();
                        Ok(value)
                    }
                    Err(last) => Err(last.into()),
                }
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn on_inactivity(&mut self) {
        self.idle_deadline = None;
        match self.suspend().await {
            Ok(id) => debug!(workspace = %self.key, machine = %id, "auto-suspended after inactivity"),
            Err(ActorError::NoMachine) => {}
            Err(err) => {
                warn!(workspace = %self.key, error = %err, "auto-suspend failed");
            }
        }
    }

    /// Take ownership of a machine id: remember it, optionally persist it,
    /// and start the inactivity clock.
    fn adopt(&mut self, id: MachineId, persist: bool) {
        if persist {
            let record = MachineRecord {
                machine_id: id.clone(),
                created_at_ms: epoch_ms_now(),
            };
            if let Err(err) = self.store.save(&self.key, &record) {
                // The provider is the ground truth; a failed write only
                // costs a rediscovery on the next cold start.
                warn!(workspace = %self.key, error = %err, "failed to persist machine record");
            }
        }
        self.machine_id = Some(id);
        self.arm_timer();
    }

    fn arm_timer(&mut self) {
        self.idle_deadline = Some(Instant::now() + self.config.inactivity_timeout);
    }
}

async fn run_op<M: MachineApi>(
    machines: &M,
    op: &MachineOp,
    id: &MachineId,
) -> Result<Value, ProviderError> {
    match op {
        MachineOp::ListSessions => machines.list_sessions(id).await,
    }
}

fn epoch_ms_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

#[cfg(test)]
#[path = "actor_tests.rs"]
mod tests;
