use async_trait::async_trait;
use chrono::{DateTime, Utc};
use devreg_domain::{DeviceId, JsonMap};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// Source that triggered a recorded state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeSource {
    Mqtt,
    Command,
    Scene,
    Automation,
    Manual,
}

/// A single recorded state snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateHistoryEntry {
    pub device_id: DeviceId,
    pub state: JsonMap,
    pub source: ChangeSource,
    pub created_at: DateTime<Utc>,
}

/// Append-only log of device state snapshots. Not consulted by the Registry
/// or the resolver; an external collaborator records changes and queries
/// history independently.
#[async_trait]
pub trait StateHistoryRepository: Send + Sync + 'static {
    async fn record_state_change(
        &self,
        device_id: &DeviceId,
        state: &JsonMap,
        source: ChangeSource,
    ) -> Result<(), StoreError>;

    /// Newest-first, capped at `limit` rows.
    async fn get_history(
        &self,
        device_id: &DeviceId,
        limit: u32,
    ) -> Result<Vec<StateHistoryEntry>, StoreError>;

    /// Returns the number of rows deleted.
    async fn prune_history(&self, older_than: DateTime<Utc>) -> Result<u64, StoreError>;
}
