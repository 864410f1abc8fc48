use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use devreg_domain::{
    normalize_tags, Device, DeviceGroup, DeviceId, Domain, GroupId, GroupMember, HealthStatus,
    JsonMap, Protocol,
};
use tokio::sync::RwLock;

use crate::device_repository::DeviceRepository;
use crate::error::StoreError;
use crate::group_repository::GroupRepository;
use crate::state_history_repository::{ChangeSource, StateHistoryEntry, StateHistoryRepository};
use crate::tag_repository::TagRepository;

#[derive(Debug, Default)]
struct Inner {
    devices: HashMap<DeviceId, Device>,
    slugs: HashSet<String>,
    tags: HashMap<DeviceId, Vec<String>>,
    groups: HashMap<GroupId, DeviceGroup>,
    members: HashMap<GroupId, Vec<GroupMember>>,
    history: Vec<StateHistoryEntry>,
}

/// In-memory implementation of every `devreg-store` repository trait.
///
/// All data is lost on process exit. Suitable for tests and for ephemeral
/// deployments that don't need durability.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<RwLock<Inner>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn sort_by_name(mut devices: Vec<Device>) -> Vec<Device> {
    devices.sort_by(|a, b| a.name.cmp(&b.name));
    devices
}

#[async_trait]
impl DeviceRepository for InMemoryStore {
    async fn get_by_id(&self, id: &DeviceId) -> Result<Device, StoreError> {
        let guard = self.inner.read().await;
        guard
            .devices
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::DeviceNotFound(id.to_string()))
    }

    async fn list(&self) -> Result<Vec<Device>, StoreError> {
        let guard = self.inner.read().await;
        Ok(sort_by_name(guard.devices.values().cloned().collect()))
    }

    async fn list_by_room(&self, room_id: &str) -> Result<Vec<Device>, StoreError> {
        let guard = self.inner.read().await;
        let matches = guard
            .devices
            .values()
            .filter(|d| d.room_id.as_deref() == Some(room_id))
            .cloned()
            .collect();
        Ok(sort_by_name(matches))
    }

    async fn list_by_area(&self, area_id: &str) -> Result<Vec<Device>, StoreError> {
        let guard = self.inner.read().await;
        let matches = guard
            .devices
            .values()
            .filter(|d| d.area_id.as_deref() == Some(area_id))
            .cloned()
            .collect();
        Ok(sort_by_name(matches))
    }

    async fn list_by_domain(&self, domain: Domain) -> Result<Vec<Device>, StoreError> {
        let guard = self.inner.read().await;
        let matches = guard
            .devices
            .values()
            .filter(|d| d.domain == domain)
            .cloned()
            .collect();
        Ok(sort_by_name(matches))
    }

    async fn list_by_protocol(&self, protocol: Protocol) -> Result<Vec<Device>, StoreError> {
        let guard = self.inner.read().await;
        let matches = guard
            .devices
            .values()
            .filter(|d| d.protocol == protocol)
            .cloned()
            .collect();
        Ok(sort_by_name(matches))
    }

    async fn create(&self, device: &Device) -> Result<Device, StoreError> {
        let mut guard = self.inner.write().await;
        if guard.devices.contains_key(&device.id) {
            return Err(StoreError::DeviceExists(device.id.to_string()));
        }
        if !device.slug.is_empty() && guard.slugs.contains(&device.slug) {
            return Err(StoreError::DeviceExists(format!("slug '{}'", device.slug)));
        }
        let now = Utc::now();
        let mut stored = device.clone();
        stored.created_at = now;
        stored.updated_at = now;
        if !stored.slug.is_empty() {
            guard.slugs.insert(stored.slug.clone());
        }
        guard.devices.insert(stored.id.clone(), stored.clone());
        Ok(stored)
    }

    async fn update(&self, device: &Device) -> Result<Device, StoreError> {
        let mut guard = self.inner.write().await;
        let existing = guard
            .devices
            .get(&device.id)
            .cloned()
            .ok_or_else(|| StoreError::DeviceNotFound(device.id.to_string()))?;

        if device.slug != existing.slug {
            if !device.slug.is_empty() && guard.slugs.contains(&device.slug) {
                return Err(StoreError::DeviceExists(format!("slug '{}'", device.slug)));
            }
            guard.slugs.remove(&existing.slug);
            if !device.slug.is_empty() {
                guard.slugs.insert(device.slug.clone());
            }
        }

        let mut stored = device.clone();
        stored.created_at = existing.created_at;
        stored.updated_at = Utc::now();
        guard.devices.insert(stored.id.clone(), stored.clone());
        Ok(stored)
    }

    async fn delete(&self, id: &DeviceId) -> Result<(), StoreError> {
        let mut guard = self.inner.write().await;
        let existing = guard
            .devices
            .remove(id)
            .ok_or_else(|| StoreError::DeviceNotFound(id.to_string()))?;
        guard.slugs.remove(&existing.slug);
        guard.tags.remove(id);
        for members in guard.members.values_mut() {
            members.retain(|m| &m.device_id != id);
        }
        Ok(())
    }

    async fn update_state(&self, id: &DeviceId, partial_state: &JsonMap) -> Result<Device, StoreError> {
        let mut guard = self.inner.write().await;
        let device = guard
            .devices
            .get_mut(id)
            .ok_or_else(|| StoreError::DeviceNotFound(id.to_string()))?;
        for (k, v) in partial_state {
            device.state.insert(k.clone(), v.clone());
        }
        let now = Utc::now();
        device.state_updated_at = Some(now);
        device.updated_at = now;
        Ok(device.clone())
    }

    async fn update_health(
        &self,
        id: &DeviceId,
        status: HealthStatus,
        last_seen: DateTime<Utc>,
    ) -> Result<Device, StoreError> {
        let mut guard = self.inner.write().await;
        let device = guard
            .devices
            .get_mut(id)
            .ok_or_else(|| StoreError::DeviceNotFound(id.to_string()))?;
        device.health_status = status;
        device.health_last_seen = Some(last_seen);
        device.updated_at = Utc::now();
        Ok(device.clone())
    }
}

#[async_trait]
impl TagRepository for InMemoryStore {
    async fn set_tags(&self, device_id: &DeviceId, tags: &[String]) -> Result<Vec<String>, StoreError> {
        let mut normalized = normalize_tags(tags.iter().cloned());
        normalized.sort();
        let mut guard = self.inner.write().await;
        guard.tags.insert(device_id.clone(), normalized.clone());
        Ok(normalized)
    }

    async fn get_tags(&self, device_id: &DeviceId) -> Result<Vec<String>, StoreError> {
        let guard = self.inner.read().await;
        let mut tags = guard.tags.get(device_id).cloned().unwrap_or_default();
        tags.sort();
        Ok(tags)
    }

    async fn add_tag(&self, device_id: &DeviceId, tag: &str) -> Result<(), StoreError> {
        let normalized = devreg_domain::normalize_tag(tag);
        if normalized.is_empty() {
            return Ok(());
        }
        let mut guard = self.inner.write().await;
        let entry = guard.tags.entry(device_id.clone()).or_default();
        if !entry.contains(&normalized) {
            entry.push(normalized);
            entry.sort();
        }
        Ok(())
    }

    async fn remove_tag(&self, device_id: &DeviceId, tag: &str) -> Result<(), StoreError> {
        let normalized = devreg_domain::normalize_tag(tag);
        let mut guard = self.inner.write().await;
        if let Some(entry) = guard.tags.get_mut(device_id) {
            entry.retain(|t| t != &normalized);
        }
        Ok(())
    }

    async fn list_devices_by_tag(&self, tag: &str) -> Result<Vec<DeviceId>, StoreError> {
        let normalized = devreg_domain::normalize_tag(tag);
        let guard = self.inner.read().await;
        let mut ids: Vec<DeviceId> = guard
            .tags
            .iter()
            .filter(|(_, tags)| tags.contains(&normalized))
            .map(|(id, _)| id.clone())
            .collect();
        ids.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        Ok(ids)
    }

    async fn list_all_tags(&self) -> Result<Vec<String>, StoreError> {
        let guard = self.inner.read().await;
        let mut all: Vec<String> = guard
            .tags
            .values()
            .flat_map(|tags| tags.iter().cloned())
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        all.sort();
        Ok(all)
    }

    async fn get_tags_for_devices(
        &self,
        device_ids: &[DeviceId],
    ) -> Result<HashMap<DeviceId, Vec<String>>, StoreError> {
        let guard = self.inner.read().await;
        Ok(device_ids
            .iter()
            .map(|id| (id.clone(), guard.tags.get(id).cloned().unwrap_or_default()))
            .collect())
    }
}

#[async_trait]
impl GroupRepository for InMemoryStore {
    async fn create(&self, group: &DeviceGroup) -> Result<DeviceGroup, StoreError> {
        let mut guard = self.inner.write().await;
        if guard.groups.contains_key(&group.id) {
            return Err(StoreError::GroupExists(group.id.to_string()));
        }
        guard.groups.insert(group.id.clone(), group.clone());
        guard.members.entry(group.id.clone()).or_default();
        Ok(group.clone())
    }

    async fn get_by_id(&self, id: &GroupId) -> Result<DeviceGroup, StoreError> {
        let guard = self.inner.read().await;
        guard
            .groups
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::GroupNotFound(id.to_string()))
    }

    async fn list(&self) -> Result<Vec<DeviceGroup>, StoreError> {
        let guard = self.inner.read().await;
        let mut groups: Vec<DeviceGroup> = guard.groups.values().cloned().collect();
        groups.sort_by(|a, b| a.sort_order.cmp(&b.sort_order).then_with(|| a.name.cmp(&b.name)));
        Ok(groups)
    }

    async fn update(&self, group: &DeviceGroup) -> Result<DeviceGroup, StoreError> {
        let mut guard = self.inner.write().await;
        if !guard.groups.contains_key(&group.id) {
            return Err(StoreError::GroupNotFound(group.id.to_string()));
        }
        guard.groups.insert(group.id.clone(), group.clone());
        Ok(group.clone())
    }

    async fn delete(&self, id: &GroupId) -> Result<(), StoreError> {
        let mut guard = self.inner.write().await;
        if guard.groups.remove(id).is_none() {
            return Err(StoreError::GroupNotFound(id.to_string()));
        }
        guard.members.remove(id);
        Ok(())
    }

    async fn set_members(
        &self,
        group_id: &GroupId,
        device_ids: &[DeviceId],
    ) -> Result<Vec<GroupMember>, StoreError> {
        let mut guard = self.inner.write().await;
        if !guard.groups.contains_key(group_id) {
            return Err(StoreError::GroupNotFound(group_id.to_string()));
        }

        let mut seen = HashSet::new();
        let mut deduped = Vec::new();
        for id in device_ids {
            if id.as_str().is_empty() {
                continue;
            }
            if seen.insert(id.clone()) {
                deduped.push(id.clone());
            }
        }

        let now = Utc::now();
        let members: Vec<GroupMember> = deduped
            .into_iter()
            .enumerate()
            .map(|(i, device_id)| GroupMember {
                group_id: group_id.clone(),
                device_id,
                sort_order: i as i32,
                created_at: now,
            })
            .collect();

        guard.members.insert(group_id.clone(), members.clone());
        Ok(members)
    }

    async fn get_members(&self, group_id: &GroupId) -> Result<Vec<GroupMember>, StoreError> {
        let guard = self.inner.read().await;
        let mut members = guard.members.get(group_id).cloned().unwrap_or_default();
        members.sort_by(|a, b| {
            a.sort_order
                .cmp(&b.sort_order)
                .then_with(|| a.device_id.as_str().cmp(b.device_id.as_str()))
        });
        Ok(members)
    }

    async fn get_member_device_ids(&self, group_id: &GroupId) -> Result<Vec<DeviceId>, StoreError> {
        Ok(self
            .get_members(group_id)
            .await?
            .into_iter()
            .map(|m| m.device_id)
            .collect())
    }
}

#[async_trait]
impl StateHistoryRepository for InMemoryStore {
    async fn record_state_change(
        &self,
        device_id: &DeviceId,
        state: &JsonMap,
        source: ChangeSource,
    ) -> Result<(), StoreError> {
        let mut guard = self.inner.write().await;
        guard.history.push(StateHistoryEntry {
            device_id: device_id.clone(),
            state: state.clone(),
            source,
            created_at: Utc::now(),
        });
        Ok(())
    }

    async fn get_history(
        &self,
        device_id: &DeviceId,
        limit: u32,
    ) -> Result<Vec<StateHistoryEntry>, StoreError> {
        let guard = self.inner.read().await;
        let mut matching: Vec<StateHistoryEntry> = guard
            .history
            .iter()
            .filter(|e| &e.device_id == device_id)
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        matching.truncate(limit as usize);
        Ok(matching)
    }

    async fn prune_history(&self, older_than: DateTime<Utc>) -> Result<u64, StoreError> {
        let mut guard = self.inner.write().await;
        let before = guard.history.len();
        guard.history.retain(|e| e.created_at >= older_than);
        Ok((before - guard.history.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use devreg_domain::{DeviceType, JsonMap};
    use serde_json::json;

    fn dummy_device(id: &str, name: &str) -> Device {
        let now = Utc::now();
        let mut address = JsonMap::new();
        address.insert("group_address".to_string(), json!("1/2/3"));
        Device {
            id: DeviceId::new(id),
            name: name.to_string(),
            slug: devreg_domain::generate_slug(name),
            room_id: None,
            area_id: Some("area-west".to_string()),
            gateway_id: None,
            device_type: DeviceType::LightDimmer,
            domain: Domain::Lighting,
            protocol: Protocol::Knx,
            address,
            capabilities: vec![],
            config: JsonMap::new(),
            state: JsonMap::new(),
            state_updated_at: None,
            health_status: HealthStatus::Unknown,
            health_last_seen: None,
            phm_enabled: false,
            phm_baseline: None,
            manufacturer: None,
            model: None,
            firmware_version: None,
            tags: vec![],
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn create_and_get() {
        let store = InMemoryStore::new();
        let d = dummy_device("dev-1", "Living Room Dimmer");
        let created = store.create(&d).await.unwrap();
        assert_eq!(created.id, d.id);

        let got = store.get_by_id(&DeviceId::new("dev-1")).await.unwrap();
        assert_eq!(got.name, "Living Room Dimmer");
    }

    #[tokio::test]
    async fn create_duplicate_id_fails() {
        let store = InMemoryStore::new();
        let d = dummy_device("dev-1", "A");
        store.create(&d).await.unwrap();
        let err = store.create(&d).await.unwrap_err();
        assert!(matches!(err, StoreError::DeviceExists(_)));
    }

    #[tokio::test]
    async fn create_duplicate_slug_fails() {
        let store = InMemoryStore::new();
        let mut a = dummy_device("dev-1", "Same Name");
        let mut b = dummy_device("dev-2", "Same Name");
        a.slug = "same-name".to_string();
        b.slug = "same-name".to_string();
        store.create(&a).await.unwrap();
        let err = store.create(&b).await.unwrap_err();
        assert!(matches!(err, StoreError::DeviceExists(_)));
    }

    #[tokio::test]
    async fn update_missing_device_fails() {
        let store = InMemoryStore::new();
        let d = dummy_device("dev-1", "A");
        let err = store.update(&d).await.unwrap_err();
        assert!(matches!(err, StoreError::DeviceNotFound(_)));
    }

    #[tokio::test]
    async fn delete_removes_device_and_slug() {
        let store = InMemoryStore::new();
        let d = dummy_device("dev-1", "A");
        store.create(&d).await.unwrap();
        store.delete(&DeviceId::new("dev-1")).await.unwrap();
        assert!(matches!(
            store.get_by_id(&DeviceId::new("dev-1")).await.unwrap_err(),
            StoreError::DeviceNotFound(_)
        ));

        // slug should be free again
        let d2 = dummy_device("dev-2", "A");
        assert!(store.create(&d2).await.is_ok());
    }

    #[tokio::test]
    async fn update_state_merges_keys() {
        let store = InMemoryStore::new();
        let mut d = dummy_device("dev-1", "A");
        d.state.insert("on".to_string(), json!(false));
        d.state.insert("level".to_string(), json!(0));
        store.create(&d).await.unwrap();

        let mut partial = JsonMap::new();
        partial.insert("on".to_string(), json!(true));
        let updated = store.update_state(&DeviceId::new("dev-1"), &partial).await.unwrap();

        assert_eq!(updated.state.get("on"), Some(&json!(true)));
        assert_eq!(updated.state.get("level"), Some(&json!(0)));
        assert!(updated.state_updated_at.is_some());
    }

    #[tokio::test]
    async fn list_by_domain_and_area() {
        let store = InMemoryStore::new();
        store.create(&dummy_device("dev-1", "A")).await.unwrap();
        store.create(&dummy_device("dev-2", "B")).await.unwrap();

        let by_domain = store.list_by_domain(Domain::Lighting).await.unwrap();
        assert_eq!(by_domain.len(), 2);

        let by_area = store.list_by_area("area-west").await.unwrap();
        assert_eq!(by_area.len(), 2);

        let by_other_area = store.list_by_area("area-east").await.unwrap();
        assert!(by_other_area.is_empty());
    }

    #[tokio::test]
    async fn set_members_dedupes_and_assigns_sort_order() {
        let store = InMemoryStore::new();
        let now = Utc::now();
        let group = DeviceGroup {
            id: GroupId::new("grp-1"),
            name: "Group".to_string(),
            slug: "group".to_string(),
            description: None,
            icon: None,
            colour: None,
            group_type: devreg_domain::GroupType::Static,
            filter_rules: None,
            sort_order: 0,
            created_at: now,
            updated_at: now,
        };
        store.create(&group).await.unwrap();

        let ids = vec![
            DeviceId::new("a"),
            DeviceId::new("b"),
            DeviceId::new("a"),
            DeviceId::new(""),
            DeviceId::new("c"),
        ];
        let members = store.set_members(&GroupId::new("grp-1"), &ids).await.unwrap();
        let ordered: Vec<&str> = members.iter().map(|m| m.device_id.as_str()).collect();
        assert_eq!(ordered, vec!["a", "b", "c"]);
        assert_eq!(members[0].sort_order, 0);
        assert_eq!(members[2].sort_order, 2);
    }

    #[tokio::test]
    async fn tags_are_normalized_and_sorted() {
        let store = InMemoryStore::new();
        let tags = store
            .set_tags(&DeviceId::new("dev-1"), &[" Escape_Lighting ".to_string(), "mood".to_string()])
            .await
            .unwrap();
        assert_eq!(tags, vec!["escape_lighting".to_string(), "mood".to_string()]);
    }

    #[tokio::test]
    async fn history_newest_first_and_prunable() {
        let store = InMemoryStore::new();
        let device_id = DeviceId::new("dev-1");
        for i in 0..3 {
            let mut state = JsonMap::new();
            state.insert("level".to_string(), json!(i));
            store
                .record_state_change(&device_id, &state, ChangeSource::Command)
                .await
                .unwrap();
        }
        let history = store.get_history(&device_id, 2).await.unwrap();
        assert_eq!(history.len(), 2);

        let pruned = store.prune_history(Utc::now() + chrono::Duration::seconds(1)).await.unwrap();
        assert_eq!(pruned, 3);
    }
}
