use async_trait::async_trait;
use devreg_domain::{DeviceGroup, DeviceId, GroupId, GroupMember};

use crate::error::StoreError;

/// CRUD over `DeviceGroup` plus explicit-member management.
#[async_trait]
pub trait GroupRepository: Send + Sync + 'static {
    async fn create(&self, group: &DeviceGroup) -> Result<DeviceGroup, StoreError>;
    async fn get_by_id(&self, id: &GroupId) -> Result<DeviceGroup, StoreError>;

    /// All groups, ordered by `sort_order` then `name`.
    async fn list(&self) -> Result<Vec<DeviceGroup>, StoreError>;

    async fn update(&self, group: &DeviceGroup) -> Result<DeviceGroup, StoreError>;

    /// Deletes the group and cascades to its members in a single transaction.
    async fn delete(&self, id: &GroupId) -> Result<(), StoreError>;

    /// Atomic replace of explicit membership. Duplicates and empty IDs are
    /// dropped while preserving first-seen order; `sort_order` is assigned by
    /// final position in the deduplicated sequence, starting at 0.
    async fn set_members(
        &self,
        group_id: &GroupId,
        device_ids: &[DeviceId],
    ) -> Result<Vec<GroupMember>, StoreError>;

    /// Members ordered by `sort_order` then `device_id`.
    async fn get_members(&self, group_id: &GroupId) -> Result<Vec<GroupMember>, StoreError>;

    async fn get_member_device_ids(&self, group_id: &GroupId) -> Result<Vec<DeviceId>, StoreError>;
}
