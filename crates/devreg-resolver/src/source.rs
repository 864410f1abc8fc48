use async_trait::async_trait;
use devreg_domain::{Device, DeviceId};
use devreg_store::StoreError;

/// The read surface the resolver needs from a device cache.
///
/// Kept as a trait (rather than a direct dependency on `devreg-core`'s
/// `Registry`) so the resolver has no dependency on the crate that embeds it —
/// `Registry` implements this trait alongside its own inherent API.
#[async_trait]
pub trait DeviceSource: Send + Sync {
    /// `Ok(None)` for a miss; only repository failures are `Err`.
    async fn get_device(&self, id: &DeviceId) -> Result<Option<Device>, StoreError>;
    async fn list_devices(&self) -> Result<Vec<Device>, StoreError>;
    async fn get_devices_by_area(&self, area_id: &str) -> Result<Vec<Device>, StoreError>;
    async fn get_devices_by_room(&self, room_id: &str) -> Result<Vec<Device>, StoreError>;
}
