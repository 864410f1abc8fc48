use async_trait::async_trait;
use chrono::{DateTime, Utc};
use devreg_domain::{Device, DeviceId, HealthStatus, JsonMap};

use crate::error::StoreError;

/// The persistence boundary for devices.
///
/// Every operation accepts and returns value snapshots, never references into
/// internal state. A `get_by_id` that follows a successful `create`/`update`/
/// `delete` from the same caller must observe the change (read-your-writes).
#[async_trait]
pub trait DeviceRepository: Send + Sync + 'static {
    async fn get_by_id(&self, id: &DeviceId) -> Result<Device, StoreError>;

    /// All devices, ordered by `name` ascending.
    async fn list(&self) -> Result<Vec<Device>, StoreError>;

    async fn list_by_room(&self, room_id: &str) -> Result<Vec<Device>, StoreError>;
    async fn list_by_area(&self, area_id: &str) -> Result<Vec<Device>, StoreError>;
    async fn list_by_domain(&self, domain: devreg_domain::Domain) -> Result<Vec<Device>, StoreError>;
    async fn list_by_protocol(
        &self,
        protocol: devreg_domain::Protocol,
    ) -> Result<Vec<Device>, StoreError>;

    /// Insert a new device. Fails with `DeviceExists` on a unique-ID or
    /// unique-slug conflict. Sets `created_at`/`updated_at` to now if unset.
    async fn create(&self, device: &Device) -> Result<Device, StoreError>;

    /// Full replace by `id`. Fails `DeviceNotFound` if absent. Refreshes `updated_at`.
    async fn update(&self, device: &Device) -> Result<Device, StoreError>;

    async fn delete(&self, id: &DeviceId) -> Result<(), StoreError>;

    /// Merge `partial_state` key-wise into the stored state: new keys are
    /// added, existing keys overwritten, keys not mentioned are preserved.
    /// Sets `state_updated_at = updated_at = now`. Fails `DeviceNotFound`.
    async fn update_state(&self, id: &DeviceId, partial_state: &JsonMap) -> Result<Device, StoreError>;

    /// Replace `health_status` and `health_last_seen`. Refreshes `updated_at`.
    /// Fails `DeviceNotFound`.
    async fn update_health(
        &self,
        id: &DeviceId,
        status: HealthStatus,
        last_seen: DateTime<Utc>,
    ) -> Result<Device, StoreError>;
}
