use std::collections::HashSet;

use devreg_domain::{Device, DeviceGroup, DeviceId, FilterRules, GroupType, ScopeType};
use devreg_store::{GroupRepository, TagRepository};

use crate::error::ResolveError;
use crate::source::DeviceSource;

/// Expand a group specification into a deterministic, deduplicated,
/// name-sorted device list.
///
/// Pure with respect to the resolver itself: all state lives in the supplied
/// collaborators. No logging, no caching of its own.
pub async fn resolve_group(
    group: &DeviceGroup,
    registry: &dyn DeviceSource,
    tag_repo: Option<&dyn TagRepository>,
    group_repo: &dyn GroupRepository,
) -> Result<Vec<Device>, ResolveError> {
    let wants_explicit = matches!(group.group_type, GroupType::Static | GroupType::Hybrid);
    let wants_dynamic = matches!(group.group_type, GroupType::Dynamic | GroupType::Hybrid);

    let mut explicit = Vec::new();
    if wants_explicit {
        let member_ids = group_repo.get_member_device_ids(&group.id).await?;
        explicit = fetch_existing(registry, &member_ids).await?;
    }

    let mut dynamic = Vec::new();
    if wants_dynamic {
        if let Some(rules) = &group.filter_rules {
            let base = base_list(registry, rules).await?;
            dynamic = apply_filters(base, rules, tag_repo).await?;
        }
    }

    let mut by_id: Vec<(DeviceId, Device)> = Vec::new();
    let mut seen = HashSet::new();
    for d in explicit.into_iter().chain(dynamic.into_iter()) {
        if seen.insert(d.id.clone()) {
            by_id.push((d.id.clone(), d));
        }
    }
    let mut merged: Vec<Device> = by_id.into_iter().map(|(_, d)| d).collect();

    if let Some(rules) = &group.filter_rules {
        if !rules.exclude_tags.is_empty() {
            let exclude: Vec<String> = rules.exclude_tags.iter().map(|t| devreg_domain::normalize_tag(t)).collect();
            let mut kept = Vec::with_capacity(merged.len());
            for d in merged.into_iter() {
                let tags = effective_tags(&d, tag_repo).await?;
                if !tags.iter().any(|t| exclude.contains(t)) {
                    kept.push(d);
                }
            }
            merged = kept;
        }
    }

    merged.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(merged)
}

async fn fetch_existing(
    registry: &dyn DeviceSource,
    ids: &[DeviceId],
) -> Result<Vec<Device>, ResolveError> {
    let mut out = Vec::with_capacity(ids.len());
    for id in ids {
        if let Some(d) = registry.get_device(id).await? {
            out.push(d);
        }
    }
    Ok(out)
}

async fn base_list(registry: &dyn DeviceSource, rules: &FilterRules) -> Result<Vec<Device>, ResolveError> {
    match rules.scope_type {
        ScopeType::Site => Ok(registry.list_devices().await?),
        ScopeType::Area => match &rules.scope_id {
            Some(id) if !id.is_empty() => Ok(registry.get_devices_by_area(id).await?),
            _ => Ok(Vec::new()),
        },
        ScopeType::Room => match &rules.scope_id {
            Some(id) if !id.is_empty() => Ok(registry.get_devices_by_room(id).await?),
            _ => Ok(Vec::new()),
        },
    }
}

async fn apply_filters(
    base: Vec<Device>,
    rules: &FilterRules,
    tag_repo: Option<&dyn TagRepository>,
) -> Result<Vec<Device>, ResolveError> {
    let mut result = base;

    if !rules.domains.is_empty() {
        result.retain(|d| rules.domains.contains(&d.domain));
    }
    if !rules.device_types.is_empty() {
        result.retain(|d| rules.device_types.contains(&d.device_type));
    }
    if !rules.capabilities.is_empty() {
        result.retain(|d| d.has_all_capabilities(&rules.capabilities));
    }
    if !rules.tags.is_empty() {
        let wanted: Vec<String> = rules.tags.iter().map(|t| devreg_domain::normalize_tag(t)).collect();
        let mut kept = Vec::with_capacity(result.len());
        for d in result.into_iter() {
            let tags = effective_tags(&d, tag_repo).await?;
            if tags.iter().any(|t| wanted.contains(t)) {
                kept.push(d);
            }
        }
        result = kept;
    }

    Ok(result)
}

/// The device's cached tags, falling back to `tag_repo` when the cache has
/// none and a tag repository is supplied.
async fn effective_tags(
    device: &Device,
    tag_repo: Option<&dyn TagRepository>,
) -> Result<Vec<String>, ResolveError> {
    if !device.tags.is_empty() {
        return Ok(device.tags.clone());
    }
    if let Some(repo) = tag_repo {
        return Ok(repo.get_tags(&device.id).await?);
    }
    Ok(Vec::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use devreg_domain::{Capability, Domain, DeviceType, GroupId, HealthStatus, JsonMap, Protocol};
    use devreg_store::{InMemoryStore, StoreError};
    use chrono::Utc;
    use std::collections::HashMap;
    use std::sync::Mutex;

    fn dev(id: &str, name: &str, area: &str, domain: Domain, caps: Vec<Capability>) -> Device {
        let now = Utc::now();
        Device {
            id: DeviceId::new(id),
            name: name.to_string(),
            slug: devreg_domain::generate_slug(name),
            room_id: None,
            area_id: Some(area.to_string()),
            gateway_id: None,
            device_type: DeviceType::LightDimmer,
            domain,
            protocol: Protocol::Knx,
            address: JsonMap::new(),
            capabilities: caps,
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

    struct FakeSource {
        devices: Mutex<HashMap<DeviceId, Device>>,
    }

    #[async_trait]
    impl DeviceSource for FakeSource {
        async fn get_device(&self, id: &DeviceId) -> Result<Option<Device>, StoreError> {
            Ok(self.devices.lock().unwrap().get(id).cloned())
        }

        async fn list_devices(&self) -> Result<Vec<Device>, StoreError> {
            let mut v: Vec<Device> = self.devices.lock().unwrap().values().cloned().collect();
            v.sort_by(|a, b| a.name.cmp(&b.name));
            Ok(v)
        }

        async fn get_devices_by_area(&self, area_id: &str) -> Result<Vec<Device>, StoreError> {
            let mut v: Vec<Device> = self
                .devices
                .lock()
                .unwrap()
                .values()
                .filter(|d| d.area_id.as_deref() == Some(area_id))
                .cloned()
                .collect();
            v.sort_by(|a, b| a.name.cmp(&b.name));
            Ok(v)
        }

        async fn get_devices_by_room(&self, _room_id: &str) -> Result<Vec<Device>, StoreError> {
            Ok(Vec::new())
        }
    }

    fn group(group_type: GroupType, filter_rules: Option<FilterRules>) -> DeviceGroup {
        let now = Utc::now();
        DeviceGroup {
            id: GroupId::new("grp-1"),
            name: "Group".to_string(),
            slug: "group".to_string(),
            description: None,
            icon: None,
            colour: None,
            group_type,
            filter_rules,
            sort_order: 0,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn static_group_expansion() {
        let a = dev("dev-a", "A", "area-west", Domain::Lighting, vec![]);
        let b = dev("dev-b", "B", "area-west", Domain::Lighting, vec![]);
        let c = dev("dev-c", "C", "area-east", Domain::Lighting, vec![]);
        let source = FakeSource {
            devices: Mutex::new(
                [a.clone(), b.clone(), c.clone()]
                    .into_iter()
                    .map(|d| (d.id.clone(), d))
                    .collect(),
            ),
        };

        let group_repo = InMemoryStore::new();
        GroupRepository::create(&group_repo, &group(GroupType::Static, None)).await.unwrap();
        group_repo
            .set_members(&GroupId::new("grp-1"), &[a.id.clone(), b.id.clone(), c.id.clone()])
            .await
            .unwrap();

        let g = group(GroupType::Static, None);
        let result = resolve_group(&g, &source, None, &group_repo).await.unwrap();
        let names: Vec<&str> = result.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
    }

    #[tokio::test]
    async fn dynamic_by_area_and_capability() {
        let a = dev("dev-a", "A", "area-west", Domain::Lighting, vec![Capability::OnOff, Capability::Dim]);
        let b = dev("dev-b", "B", "area-west", Domain::Lighting, vec![Capability::OnOff]);
        let c = dev("dev-c", "C", "area-east", Domain::Lighting, vec![Capability::OnOff, Capability::Dim]);
        let source = FakeSource {
            devices: Mutex::new(
                [a.clone(), b.clone(), c.clone()]
                    .into_iter()
                    .map(|d| (d.id.clone(), d))
                    .collect(),
            ),
        };
        let group_repo = InMemoryStore::new();

        let rules = FilterRules {
            scope_type: ScopeType::Area,
            scope_id: Some("area-west".to_string()),
            domains: vec![Domain::Lighting],
            device_types: vec![],
            capabilities: vec![Capability::OnOff, Capability::Dim],
            tags: vec![],
            exclude_tags: vec![],
        };
        let g = group(GroupType::Dynamic, Some(rules));

        let result = resolve_group(&g, &source, None, &group_repo).await.unwrap();
        let names: Vec<&str> = result.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["A"]);
    }

    #[tokio::test]
    async fn hybrid_excludes_tagged_explicit_member() {
        let mut a = dev("dev-a", "A", "area-west", Domain::Lighting, vec![]);
        let mut b = dev("dev-b", "B", "area-west", Domain::Lighting, vec![]);
        b.tags = vec!["escape_lighting".to_string()];
        a.tags = vec![];
        let source = FakeSource {
            devices: Mutex::new(
                [a.clone(), b.clone()]
                    .into_iter()
                    .map(|d| (d.id.clone(), d))
                    .collect(),
            ),
        };

        let group_repo = InMemoryStore::new();
        GroupRepository::create(&group_repo, &group(GroupType::Hybrid, None)).await.unwrap();
        group_repo
            .set_members(&GroupId::new("grp-1"), &[b.id.clone(), a.id.clone()])
            .await
            .unwrap();

        let rules = FilterRules {
            scope_type: ScopeType::Site,
            scope_id: None,
            domains: vec![Domain::Lighting],
            device_types: vec![],
            capabilities: vec![],
            tags: vec![],
            exclude_tags: vec!["escape_lighting".to_string()],
        };
        let g = group(GroupType::Hybrid, Some(rules));

        let result = resolve_group(&g, &source, None, &group_repo).await.unwrap();
        let names: Vec<&str> = result.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["A"]);
    }

    #[tokio::test]
    async fn empty_scope_id_yields_empty_dynamic_set() {
        let source = FakeSource { devices: Mutex::new(HashMap::new()) };
        let group_repo = InMemoryStore::new();

        let rules = FilterRules {
            scope_type: ScopeType::Area,
            scope_id: None,
            domains: vec![],
            device_types: vec![],
            capabilities: vec![],
            tags: vec![],
            exclude_tags: vec![],
        };
        let g = group(GroupType::Dynamic, Some(rules));
        let result = resolve_group(&g, &source, None, &group_repo).await.unwrap();
        assert!(result.is_empty());
    }
}
