use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::enums::{Capability, DeviceType, Domain, HealthStatus, Protocol};

/// A JSON object used for the free-form, protocol- or device-specific maps
/// (`address`, `config`, `state`, `phm_baseline`).
pub type JsonMap = serde_json::Map<String, Value>;

// ── Identifiers ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceId(pub String);

impl DeviceId {
    pub fn new(s: impl Into<String>) -> Self {
        DeviceId(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DeviceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupId(pub String);

impl GroupId {
    pub fn new(s: impl Into<String>) -> Self {
        GroupId(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for GroupId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ── Device ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub id: DeviceId,
    pub name: String,
    pub slug: String,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub room_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub area_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub gateway_id: Option<String>,

    #[serde(rename = "type")]
    pub device_type: DeviceType,
    pub domain: Domain,
    pub protocol: Protocol,

    #[serde(default)]
    pub address: JsonMap,

    #[serde(default)]
    pub capabilities: Vec<Capability>,

    #[serde(default)]
    pub config: JsonMap,

    #[serde(default)]
    pub state: JsonMap,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub state_updated_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub health_status: HealthStatus,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub health_last_seen: Option<DateTime<Utc>>,

    #[serde(default)]
    pub phm_enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub phm_baseline: Option<JsonMap>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub manufacturer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub firmware_version: Option<String>,

    /// Normalized (lowercase, trimmed, deduplicated) tags. May be populated
    /// lazily from a `TagRepository` rather than stored inline.
    #[serde(default)]
    pub tags: Vec<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Device {
    /// Returns true if `self` carries every capability in `required`.
    pub fn has_all_capabilities(&self, required: &[Capability]) -> bool {
        required.iter().all(|c| self.capabilities.contains(c))
    }

    /// Returns true if `self`'s tags intersect `tags` (case/whitespace already normalized).
    pub fn tags_intersect(&self, tags: &[String]) -> bool {
        tags.iter().any(|t| self.tags.iter().any(|owned| owned == t))
    }
}

// ── DeviceGroup ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupType {
    Static,
    Dynamic,
    Hybrid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeType {
    Site,
    Area,
    Room,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct FilterRules {
    #[serde(default = "default_scope_type")]
    pub scope_type: ScopeType,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub scope_id: Option<String>,
    #[serde(default)]
    pub domains: Vec<Domain>,
    #[serde(default)]
    pub device_types: Vec<DeviceType>,
    #[serde(default)]
    pub capabilities: Vec<Capability>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub exclude_tags: Vec<String>,
}

fn default_scope_type() -> ScopeType {
    ScopeType::Site
}

impl Default for ScopeType {
    fn default() -> Self {
        ScopeType::Site
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceGroup {
    pub id: GroupId,
    pub name: String,
    pub slug: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub colour: Option<String>,
    #[serde(rename = "type")]
    pub group_type: GroupType,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub filter_rules: Option<FilterRules>,
    #[serde(default)]
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An explicit static-membership edge between a group and a device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupMember {
    pub group_id: GroupId,
    pub device_id: DeviceId,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
}

/// Normalize a tag: lowercase, trim whitespace. Does not deduplicate — callers
/// that need a set should dedupe after normalizing the whole collection.
pub fn normalize_tag(tag: &str) -> String {
    tag.trim().to_lowercase()
}

/// Normalize, trim, and deduplicate a collection of tags, preserving the
/// first-seen order of the normalized forms.
pub fn normalize_tags(tags: impl IntoIterator<Item = impl AsRef<str>>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();
    for tag in tags {
        let normalized = normalize_tag(tag.as_ref());
        if normalized.is_empty() {
            continue;
        }
        if seen.insert(normalized.clone()) {
            out.push(normalized);
        }
    }
    out
}

/// Aggregate counts over a device collection, as returned by `Registry::stats`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Stats {
    pub total: usize,
    pub by_domain: HashMap<String, usize>,
    pub by_protocol: HashMap<String, usize>,
    pub by_health_status: HashMap<String, usize>,
}
