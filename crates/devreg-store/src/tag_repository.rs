use std::collections::HashMap;

use async_trait::async_trait;
use devreg_domain::DeviceId;

use crate::error::StoreError;

/// Normalized-tag management keyed by device.
///
/// Tags are normalized (lowercase, trimmed) and deduplicated by the
/// implementation; callers may pass raw user input.
#[async_trait]
pub trait TagRepository: Send + Sync + 'static {
    /// Atomic replace (clear-then-insert) of the tag set for `device_id`.
    async fn set_tags(&self, device_id: &DeviceId, tags: &[String]) -> Result<Vec<String>, StoreError>;

    /// Sorted tags for `device_id`.
    async fn get_tags(&self, device_id: &DeviceId) -> Result<Vec<String>, StoreError>;

    /// Idempotent insert.
    async fn add_tag(&self, device_id: &DeviceId, tag: &str) -> Result<(), StoreError>;

    async fn remove_tag(&self, device_id: &DeviceId, tag: &str) -> Result<(), StoreError>;

    async fn list_devices_by_tag(&self, tag: &str) -> Result<Vec<DeviceId>, StoreError>;

    async fn list_all_tags(&self) -> Result<Vec<String>, StoreError>;

    /// Bulk lookup; devices with no tags are present with an empty vec.
    async fn get_tags_for_devices(
        &self,
        device_ids: &[DeviceId],
    ) -> Result<HashMap<DeviceId, Vec<String>>, StoreError>;
}
