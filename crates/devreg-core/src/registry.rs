use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use devreg_domain::{
    validate_device, Capability, Device, DeviceId, Domain, HealthStatus, JsonMap, Protocol, Stats,
    ValidationLimits,
};
use devreg_resolver::DeviceSource;
use devreg_store::{DeviceRepository, StoreError, TagRepository};
use tokio::sync::RwLock;

use crate::error::RegistryError;
use crate::logger::{event, Logger, NoopLogger};

/// Owns the in-memory device cache and mediates every read/write against the
/// configured [`DeviceRepository`].
///
/// A consistent snapshot of the store as of the last successful mutation
/// routed through this Registry, or the last [`Registry::refresh`]. Writes
/// made directly against the store, bypassing the Registry, are invisible
/// until the next refresh.
pub struct Registry {
    device_repo: Arc<dyn DeviceRepository>,
    tag_repo: Option<Arc<dyn TagRepository>>,
    logger: Arc<dyn Logger>,
    limits: ValidationLimits,
    cache: RwLock<HashMap<DeviceId, Device>>,
}

impl Registry {
    /// Defaults to a [`NoopLogger`] so the Registry is usable with zero
    /// configuration; hosts that want structured logs opt in via
    /// [`Registry::with_logger`].
    pub fn new(device_repo: Arc<dyn DeviceRepository>) -> Self {
        Registry {
            device_repo,
            tag_repo: None,
            logger: Arc::new(NoopLogger),
            limits: ValidationLimits::default(),
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn with_tag_repository(mut self, tag_repo: Arc<dyn TagRepository>) -> Self {
        self.tag_repo = Some(tag_repo);
        self
    }

    pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn with_validation_limits(mut self, limits: ValidationLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Rebuilds the cache from the repository. Failure leaves the prior cache
    /// intact — the new map is built in a scratch variable before the swap.
    pub async fn refresh(&self) -> Result<(), RegistryError> {
        let devices = self.device_repo.list().await?;
        let mut scratch = HashMap::with_capacity(devices.len());
        for mut device in devices {
            if let Some(tag_repo) = &self.tag_repo {
                device.tags = tag_repo.get_tags(&device.id).await?;
            }
            scratch.insert(device.id.clone(), device);
        }
        let count = scratch.len();

        let mut guard = self.cache.write().await;
        *guard = scratch;
        drop(guard);

        self.logger.info(event("device cache refreshed", vec![("count", count.to_string())]));
        Ok(())
    }

    async fn get_device_raw(&self, id: &DeviceId) -> Result<Device, StoreError> {
        if let Some(device) = self.cache.read().await.get(id) {
            return Ok(device.clone());
        }
        let device = self.device_repo.get_by_id(id).await?;
        self.cache.write().await.insert(id.clone(), device.clone());
        Ok(device)
    }

    pub async fn get_device(&self, id: &DeviceId) -> Result<Device, RegistryError> {
        Ok(self.get_device_raw(id).await?)
    }

    async fn list_devices_raw(&self) -> Result<Vec<Device>, StoreError> {
        let cached = self.cache.read().await;
        if !cached.is_empty() {
            let mut devices: Vec<Device> = cached.values().cloned().collect();
            devices.sort_by(|a, b| a.name.cmp(&b.name));
            return Ok(devices);
        }
        drop(cached);
        let mut devices = self.device_repo.list().await?;
        devices.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(devices)
    }

    pub async fn list_devices(&self) -> Result<Vec<Device>, RegistryError> {
        Ok(self.list_devices_raw().await?)
    }

    async fn filtered_or_fallback<F>(
        &self,
        predicate: F,
        fallback: impl std::future::Future<Output = Result<Vec<Device>, StoreError>>,
    ) -> Result<Vec<Device>, StoreError>
    where
        F: Fn(&Device) -> bool,
    {
        let cached = self.cache.read().await;
        if !cached.is_empty() {
            let mut devices: Vec<Device> = cached.values().filter(|d| predicate(d)).cloned().collect();
            devices.sort_by(|a, b| a.name.cmp(&b.name));
            return Ok(devices);
        }
        drop(cached);
        let mut devices = fallback.await?;
        devices.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(devices)
    }

    pub async fn get_devices_by_room(&self, room_id: &str) -> Result<Vec<Device>, RegistryError> {
        let devices = self
            .filtered_or_fallback(
                |d| d.room_id.as_deref() == Some(room_id),
                self.device_repo.list_by_room(room_id),
            )
            .await?;
        Ok(devices)
    }

    pub async fn get_devices_by_area(&self, area_id: &str) -> Result<Vec<Device>, RegistryError> {
        let devices = self
            .filtered_or_fallback(
                |d| d.area_id.as_deref() == Some(area_id),
                self.device_repo.list_by_area(area_id),
            )
            .await?;
        Ok(devices)
    }

    pub async fn get_devices_by_domain(&self, domain: Domain) -> Result<Vec<Device>, RegistryError> {
        let devices = self
            .filtered_or_fallback(|d| d.domain == domain, self.device_repo.list_by_domain(domain))
            .await?;
        Ok(devices)
    }

    pub async fn get_devices_by_protocol(&self, protocol: Protocol) -> Result<Vec<Device>, RegistryError> {
        let devices = self
            .filtered_or_fallback(
                |d| d.protocol == protocol,
                self.device_repo.list_by_protocol(protocol),
            )
            .await?;
        Ok(devices)
    }

    /// Cache-only lookup. `NotFound` if no cached device carries `slug`.
    pub async fn get_device_by_slug(&self, slug: &str) -> Result<Device, RegistryError> {
        self.cache
            .read()
            .await
            .values()
            .find(|d| d.slug == slug)
            .cloned()
            .ok_or_else(|| RegistryError::Store(StoreError::DeviceNotFound(format!("slug '{slug}'"))))
    }

    /// Cache-only filter.
    pub async fn get_devices_by_health_status(&self, status: HealthStatus) -> Vec<Device> {
        let mut devices: Vec<Device> = self
            .cache
            .read()
            .await
            .values()
            .filter(|d| d.health_status == status)
            .cloned()
            .collect();
        devices.sort_by(|a, b| a.name.cmp(&b.name));
        devices
    }

    /// Cache-only filter.
    pub async fn get_devices_by_gateway(&self, gateway_id: &str) -> Vec<Device> {
        let mut devices: Vec<Device> = self
            .cache
            .read()
            .await
            .values()
            .filter(|d| d.gateway_id.as_deref() == Some(gateway_id))
            .cloned()
            .collect();
        devices.sort_by(|a, b| a.name.cmp(&b.name));
        devices
    }

    /// Cache-only filter.
    pub async fn get_devices_by_capability(&self, capability: Capability) -> Vec<Device> {
        let mut devices: Vec<Device> = self
            .cache
            .read()
            .await
            .values()
            .filter(|d| d.capabilities.contains(&capability))
            .cloned()
            .collect();
        devices.sort_by(|a, b| a.name.cmp(&b.name));
        devices
    }

    /// Generates `id`/`slug` if absent, validates, stores, and caches.
    pub async fn create_device(&self, mut device: Device) -> Result<Device, RegistryError> {
        if device.id.as_str().is_empty() {
            device.id = DeviceId::new(devreg_domain::generate_id());
        }
        if device.slug.is_empty() {
            device.slug = devreg_domain::generate_slug(&device.name);
        }
        validate_device(&device, &self.limits)?;

        let stored = self.device_repo.create(&device).await?;
        self.cache.write().await.insert(stored.id.clone(), stored.clone());

        self.logger.info(event(
            "device created",
            vec![("id", stored.id.to_string()), ("name", stored.name.clone())],
        ));
        Ok(stored)
    }

    /// Full replace. Regenerates `slug` if `name` changed but `slug` was left
    /// equal to the cached value (i.e. the caller didn't deliberately override it).
    pub async fn update_device(&self, mut device: Device) -> Result<Device, RegistryError> {
        if let Ok(existing) = self.get_device_raw(&device.id).await {
            if existing.name != device.name && existing.slug == device.slug {
                device.slug = devreg_domain::generate_slug(&device.name);
            }
        }
        validate_device(&device, &self.limits)?;

        let stored = self.device_repo.update(&device).await?;
        self.cache.write().await.insert(stored.id.clone(), stored.clone());

        self.logger.info(event(
            "device updated",
            vec![("id", stored.id.to_string()), ("name", stored.name.clone())],
        ));
        Ok(stored)
    }

    pub async fn delete_device(&self, id: &DeviceId) -> Result<(), RegistryError> {
        self.device_repo.delete(id).await?;
        let removed = self.cache.write().await.remove(id);

        self.logger.info(event(
            "device deleted",
            vec![
                ("id", id.to_string()),
                ("name", removed.map(|d| d.name).unwrap_or_default()),
            ],
        ));
        Ok(())
    }

    /// Repository merge fast path; replaces the cache entry with a fresh copy
    /// rather than mutating it in place, so concurrent readers never observe
    /// a torn state.
    pub async fn set_device_state(&self, id: &DeviceId, partial: &JsonMap) -> Result<Device, RegistryError> {
        let updated = self.device_repo.update_state(id, partial).await?;
        self.cache.write().await.insert(id.clone(), updated.clone());

        self.logger.debug(event("device state updated", vec![("id", id.to_string())]));
        Ok(updated)
    }

    pub async fn set_device_health(&self, id: &DeviceId, status: HealthStatus) -> Result<Device, RegistryError> {
        let now = Utc::now();
        let updated = self.device_repo.update_health(id, status, now).await?;
        self.cache.write().await.insert(id.clone(), updated.clone());

        self.logger.debug(event(
            "device health updated",
            vec![("id", id.to_string()), ("status", status.as_str().to_string())],
        ));
        Ok(updated)
    }

    pub async fn device_count(&self) -> usize {
        self.cache.read().await.len()
    }

    pub async fn stats(&self) -> Stats {
        let cache = self.cache.read().await;
        let mut by_domain: HashMap<String, usize> = HashMap::new();
        let mut by_protocol: HashMap<String, usize> = HashMap::new();
        let mut by_health_status: HashMap<String, usize> = HashMap::new();

        for device in cache.values() {
            *by_domain.entry(device.domain.as_str().to_string()).or_insert(0) += 1;
            *by_protocol.entry(device.protocol.as_str().to_string()).or_insert(0) += 1;
            *by_health_status.entry(device.health_status.as_str().to_string()).or_insert(0) += 1;
        }

        Stats { total: cache.len(), by_domain, by_protocol, by_health_status }
    }
}

#[async_trait]
impl DeviceSource for Registry {
    async fn get_device(&self, id: &DeviceId) -> Result<Option<Device>, StoreError> {
        match self.get_device_raw(id).await {
            Ok(d) => Ok(Some(d)),
            Err(StoreError::DeviceNotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn list_devices(&self) -> Result<Vec<Device>, StoreError> {
        self.list_devices_raw().await
    }

    async fn get_devices_by_area(&self, area_id: &str) -> Result<Vec<Device>, StoreError> {
        self.filtered_or_fallback(
            |d| d.area_id.as_deref() == Some(area_id),
            self.device_repo.list_by_area(area_id),
        )
        .await
    }

    async fn get_devices_by_room(&self, room_id: &str) -> Result<Vec<Device>, StoreError> {
        self.filtered_or_fallback(
            |d| d.room_id.as_deref() == Some(room_id),
            self.device_repo.list_by_room(room_id),
        )
        .await
    }
}
