// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process-wide registry of workspace actors

use std::collections::HashMap;

use parking_lot::Mutex;
use porter_core::WorkspaceKey;
use porter_provider::ProviderApi;
use porter_storage::StateStore;

use crate::actor::{self, ActorConfig, WorkspaceHandle};
use crate::machine_api::MachineApi;

/// Key → actor map with exclusive-create semantics.
///
/// The actor task is spawned while the map lock is held, so exactly one
/// actor ever exists per key. The registry is empty after a restart; actors
/// re-hydrate their machine id from the state store on first ensure.
pub struct Registry<P, M> {
    provider: P,
    machines: M,
    store: StateStore,
    config: ActorConfig,
    actors: Mutex<HashMap<WorkspaceKey, WorkspaceHandle>>,
}

impl<P, M> Registry<P, M>
where
    P: ProviderApi,
    M: MachineApi,
{
    pub fn new(provider: P, machines: M, store: StateStore, config: ActorConfig) -> Self {
        Self {
            provider,
            machines,
            store,
            config,
            actors: Mutex::new(HashMap::new()),
        }
    }

    /// Return the actor for a key, creating it on first demand.
    pub fn get_or_create(&self, key: &WorkspaceKey) -> WorkspaceHandle {
        let mut actors = self.actors.lock();
        if let Some(handle) = actors.get(key) {
            return handle.clone();
        }
        let handle = actor::spawn(
            key.clone(),
            self.provider.clone(),
            self.machines.clone(),
            self.store.clone(),
            self.config.clone(),
        );
        actors.insert(key.clone(), handle.clone());
        handle
    }

    pub fn contains(&self, key: &WorkspaceKey) -> bool {
        self.actors.lock().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.actors.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.actors.lock().is_empty()
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
