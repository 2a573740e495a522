//! Concurrent mission registry
//!
//! Maps mission ids to their state containers. The outer map lock is held
//! only for lookups and structural changes; each mission carries its own
//! mutex so overlapping operations on the same mission serialize without
//! blocking unrelated missions.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::core::error::{AegisError, Result};

use super::state::MissionState;

/// Shared handle to one mission's state
pub type MissionHandle = Arc<Mutex<MissionState>>;

/// Thread-safe registry of active missions
#[derive(Debug, Default)]
pub struct MissionRegistry {
    missions: RwLock<HashMap<Uuid, MissionHandle>>,
}

impl MissionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new mission. Fails with `MissionConflict` when the id is
    /// already present.
    pub async fn add(&self, mission_id: Uuid, state: MissionState) -> Result<MissionHandle> {
        let mut missions = self.missions.write().await;
        if missions.contains_key(&mission_id) {
            return Err(AegisError::MissionConflict {
                entity_id: mission_id,
            });
        }
        let handle = Arc::new(Mutex::new(state));
        missions.insert(mission_id, Arc::clone(&handle));
        Ok(handle)
    }

    /// Look up a mission's state handle
    pub async fn get(&self, mission_id: Uuid) -> Result<MissionHandle> {
        let missions = self.missions.read().await;
        missions
            .get(&mission_id)
            .map(Arc::clone)
            .ok_or(AegisError::MissionNotFound {
                entity_id: mission_id,
            })
    }

    pub async fn contains(&self, mission_id: Uuid) -> bool {
        self.missions.read().await.contains_key(&mission_id)
    }

    /// Remove a mission and drop its state
    pub async fn remove(&self, mission_id: Uuid) -> Result<()> {
        let mut missions = self.missions.write().await;
        missions
            .remove(&mission_id)
            .map(|_| ())
            .ok_or(AegisError::MissionNotFound {
                entity_id: mission_id,
            })
    }

    /// Drop every registered mission
    pub async fn clear(&self) {
        self.missions.write().await.clear();
    }

    pub async fn len(&self) -> usize {
        self.missions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.missions.read().await.is_empty()
    }
}
