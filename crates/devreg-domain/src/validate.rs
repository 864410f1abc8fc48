use serde_json::Value;

use crate::enums::{Capability, DeviceType, Domain, HealthStatus, Protocol};
use crate::error::DomainError;
use crate::slug::is_valid_slug;
use crate::types::{Device, JsonMap};

/// Recursive size bounds applied to every free-form JSON map on a `Device`
/// (`address`, `config`, `state`, `phm_baseline`). Overridable via
/// `devreg-config`; these are the documented defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeBounds {
    /// Maximum length, in bytes, of any string value appearing anywhere in the tree.
    pub max_string_bytes: usize,
    /// Maximum number of keys in any nested object.
    pub max_map_keys: usize,
    /// Maximum number of elements in any nested array.
    pub max_array_elements: usize,
    /// Maximum nesting depth (an object directly under the top-level map is depth 1).
    pub max_depth: usize,
}

impl Default for SizeBounds {
    fn default() -> Self {
        SizeBounds {
            max_string_bytes: 1024,
            max_map_keys: 50,
            max_array_elements: 50,
            max_depth: 10,
        }
    }
}

/// Per-field top-level key caps and the shared recursive bounds used by
/// `validate_device`. Overridable via `devreg-config`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationLimits {
    pub max_name_len: usize,
    pub max_slug_len: usize,
    pub max_capabilities: usize,
    pub max_address_keys: usize,
    pub max_config_keys: usize,
    pub max_state_keys: usize,
    pub max_phm_baseline_keys: usize,
    pub size_bounds: SizeBounds,
}

impl Default for ValidationLimits {
    fn default() -> Self {
        ValidationLimits {
            max_name_len: 100,
            max_slug_len: 50,
            max_capabilities: 50,
            max_address_keys: 20,
            max_config_keys: 50,
            max_state_keys: 100,
            max_phm_baseline_keys: 100,
            size_bounds: SizeBounds::default(),
        }
    }
}

/// Validate a device against all syntactic and size constraints, using the
/// default limits. Equivalent to `validate_device(d, &ValidationLimits::default())`.
pub fn validate_device_default(d: &Device) -> Result<(), DomainError> {
    validate_device(d, &ValidationLimits::default())
}

/// Validate a device against all syntactic and size constraints, before any
/// store call. Does not mutate `d`.
pub fn validate_device(d: &Device, limits: &ValidationLimits) -> Result<(), DomainError> {
    validate_name(&d.name, limits.max_name_len)?;
    if !d.slug.is_empty() {
        validate_slug(&d.slug, limits.max_slug_len)?;
    }
    // device_type, domain, protocol, and health_status are Rust enums: a
    // value that deserialized successfully is already a member of the closed
    // set, so there is nothing further to check here for them.
    let _: Domain = d.domain;
    let _: Protocol = d.protocol;
    let _: DeviceType = d.device_type;
    let _: HealthStatus = d.health_status;

    if d.capabilities.len() > limits.max_capabilities {
        return Err(DomainError::InvalidCapability(format!(
            "capabilities list has {} entries, limit is {}",
            d.capabilities.len(),
            limits.max_capabilities
        )));
    }

    validate_address(d, limits)?;

    if d.config.len() > limits.max_config_keys {
        return Err(DomainError::InvalidConfig(format!(
            "config has {} top-level keys, limit is {}",
            d.config.len(),
            limits.max_config_keys
        )));
    }
    check_size_bounds(&Value::Object(d.config.clone()), &limits.size_bounds, 0)
        .map_err(DomainError::InvalidConfig)?;

    if d.state.len() > limits.max_state_keys {
        return Err(DomainError::InvalidState(format!(
            "state has {} top-level keys, limit is {}",
            d.state.len(),
            limits.max_state_keys
        )));
    }
    check_size_bounds(&Value::Object(d.state.clone()), &limits.size_bounds, 0)
        .map_err(DomainError::InvalidState)?;

    if let Some(baseline) = &d.phm_baseline {
        if baseline.len() > limits.max_phm_baseline_keys {
            return Err(DomainError::InvalidConfig(format!(
                "phm_baseline has {} top-level keys, limit is {}",
                baseline.len(),
                limits.max_phm_baseline_keys
            )));
        }
        check_size_bounds(&Value::Object(baseline.clone()), &limits.size_bounds, 0)
            .map_err(DomainError::InvalidConfig)?;
    }

    Ok(())
}

fn validate_name(name: &str, max_len: usize) -> Result<(), DomainError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(DomainError::InvalidName("name must not be empty".to_string()));
    }
    if trimmed.chars().count() > max_len {
        return Err(DomainError::InvalidName(format!(
            "name exceeds {max_len} characters"
        )));
    }
    Ok(())
}

/// Validate a slug against the canonical pattern and length bound.
pub fn validate_slug(slug: &str, max_len: usize) -> Result<(), DomainError> {
    if slug.chars().count() > max_len {
        return Err(DomainError::InvalidSlug(format!(
            "slug exceeds {max_len} characters"
        )));
    }
    if !is_valid_slug(slug) {
        return Err(DomainError::InvalidSlug(format!(
            "'{slug}' does not match the slug pattern"
        )));
    }
    Ok(())
}

fn validate_address(d: &Device, limits: &ValidationLimits) -> Result<(), DomainError> {
    if d.address.is_empty() {
        return Err(DomainError::InvalidAddress(
            "address must not be empty".to_string(),
        ));
    }
    if d.address.len() > limits.max_address_keys {
        return Err(DomainError::InvalidAddress(format!(
            "address has {} top-level keys, limit is {}",
            d.address.len(),
            limits.max_address_keys
        )));
    }
    check_size_bounds(&Value::Object(d.address.clone()), &limits.size_bounds, 0)
        .map_err(DomainError::InvalidAddress)?;

    validate_address_shape(d.protocol, &d.address)
}

/// Protocol-specific address shape. See the protocol/required-keys table.
fn validate_address_shape(protocol: Protocol, address: &JsonMap) -> Result<(), DomainError> {
    let has_nonempty_string = |key: &str| -> bool {
        matches!(address.get(key), Some(Value::String(s)) if !s.is_empty())
    };
    let has_any_key = |keys: &[&str]| keys.iter().any(|k| address.contains_key(*k));

    match protocol {
        Protocol::Knx => {
            if !has_nonempty_string("group_address") {
                return Err(DomainError::InvalidAddress(
                    "knx address requires a non-empty 'group_address' string".to_string(),
                ));
            }
        }
        Protocol::Dali => {
            if !address.contains_key("gateway") {
                return Err(DomainError::InvalidAddress(
                    "dali address requires 'gateway'".to_string(),
                ));
            }
            if !has_any_key(&["short_address", "group"]) {
                return Err(DomainError::InvalidAddress(
                    "dali address requires one of 'short_address' or 'group'".to_string(),
                ));
            }
        }
        Protocol::ModbusTcp | Protocol::ModbusRtu => {
            if !address.contains_key("unit_id") {
                return Err(DomainError::InvalidAddress(
                    "modbus address requires 'unit_id'".to_string(),
                ));
            }
            if !has_any_key(&["host", "device"]) {
                return Err(DomainError::InvalidAddress(
                    "modbus address requires one of 'host' or 'device'".to_string(),
                ));
            }
        }
        Protocol::Mqtt => {
            if !has_nonempty_string("topic") {
                return Err(DomainError::InvalidAddress(
                    "mqtt address requires a non-empty 'topic' string".to_string(),
                ));
            }
        }
        Protocol::BacnetIp
        | Protocol::BacnetMstp
        | Protocol::Http
        | Protocol::Sip
        | Protocol::Rtsp
        | Protocol::Onvif
        | Protocol::Ocpp
        | Protocol::Rs232
        | Protocol::Rs485 => {
            // Non-empty map is already guaranteed by the caller; detailed
            // validation is deferred to the respective protocol bridge.
        }
    }

    Ok(())
}

/// Walk a JSON value enforcing the string/map/array/depth bounds. `depth` is
/// the depth of `value` itself (0 for the top-level map passed into
/// `validate_device`).
fn check_size_bounds(value: &Value, bounds: &SizeBounds, depth: usize) -> Result<(), String> {
    if depth > bounds.max_depth {
        return Err(format!("nesting depth exceeds {}", bounds.max_depth));
    }
    match value {
        Value::String(s) => {
            if s.len() > bounds.max_string_bytes {
                return Err(format!(
                    "string value exceeds {} bytes",
                    bounds.max_string_bytes
                ));
            }
        }
        Value::Array(items) => {
            if items.len() > bounds.max_array_elements {
                return Err(format!(
                    "array has {} elements, limit is {}",
                    items.len(),
                    bounds.max_array_elements
                ));
            }
            for item in items {
                check_size_bounds(item, bounds, depth + 1)?;
            }
        }
        Value::Object(map) => {
            // depth 0 is the field's own top-level map, whose key count is
            // already bounded by the field-specific cap (e.g. max_state_keys)
            // at the call site; max_map_keys governs only nested objects.
            if depth > 0 && map.len() > bounds.max_map_keys {
                return Err(format!(
                    "object has {} keys, limit is {}",
                    map.len(),
                    bounds.max_map_keys
                ));
            }
            for v in map.values() {
                check_size_bounds(v, bounds, depth + 1)?;
            }
        }
        Value::Number(_) | Value::Bool(_) | Value::Null => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DeviceId, JsonMap};
    use chrono::Utc;
    use serde_json::json;

    fn base_device() -> Device {
        let now = Utc::now();
        let mut address = JsonMap::new();
        address.insert("group_address".to_string(), json!("1/2/3"));
        Device {
            id: DeviceId::new("dev-1"),
            name: "Living Room Dimmer".to_string(),
            slug: "living-room-dimmer".to_string(),
            room_id: None,
            area_id: None,
            gateway_id: None,
            device_type: DeviceType::LightDimmer,
            domain: Domain::Lighting,
            protocol: Protocol::Knx,
            address,
            capabilities: vec![Capability::OnOff, Capability::Dim],
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

    #[test]
    fn valid_device_passes() {
        assert!(validate_device_default(&base_device()).is_ok());
    }

    #[test]
    fn empty_name_rejected() {
        let mut d = base_device();
        d.name = "   ".to_string();
        assert!(matches!(
            validate_device_default(&d),
            Err(DomainError::InvalidName(_))
        ));
    }

    #[test]
    fn name_too_long_rejected() {
        let mut d = base_device();
        d.name = "x".repeat(101);
        assert!(matches!(
            validate_device_default(&d),
            Err(DomainError::InvalidName(_))
        ));
    }

    #[test]
    fn invalid_slug_pattern_rejected() {
        let mut d = base_device();
        d.slug = "Not Valid!".to_string();
        assert!(matches!(
            validate_device_default(&d),
            Err(DomainError::InvalidSlug(_))
        ));
    }

    #[test]
    fn empty_slug_is_allowed() {
        let mut d = base_device();
        d.slug = String::new();
        assert!(validate_device_default(&d).is_ok());
    }

    #[test]
    fn knx_address_requires_group_address() {
        let mut d = base_device();
        d.address = JsonMap::new();
        assert!(matches!(
            validate_device_default(&d),
            Err(DomainError::InvalidAddress(_))
        ));
    }

    #[test]
    fn dali_address_requires_gateway_and_short_address_or_group() {
        let mut d = base_device();
        d.protocol = Protocol::Dali;
        d.address = JsonMap::new();
        d.address.insert("gateway".to_string(), json!("dali-1"));
        assert!(matches!(
            validate_device_default(&d),
            Err(DomainError::InvalidAddress(_))
        ));
        d.address.insert("short_address".to_string(), json!(4));
        assert!(validate_device_default(&d).is_ok());
    }

    #[test]
    fn modbus_address_requires_unit_id_and_host_or_device() {
        let mut d = base_device();
        d.protocol = Protocol::ModbusTcp;
        d.address = JsonMap::new();
        d.address.insert("unit_id".to_string(), json!(1));
        assert!(matches!(
            validate_device_default(&d),
            Err(DomainError::InvalidAddress(_))
        ));
        d.address.insert("host".to_string(), json!("10.0.0.5"));
        assert!(validate_device_default(&d).is_ok());
    }

    #[test]
    fn mqtt_address_requires_topic() {
        let mut d = base_device();
        d.protocol = Protocol::Mqtt;
        d.address = JsonMap::new();
        assert!(matches!(
            validate_device_default(&d),
            Err(DomainError::InvalidAddress(_))
        ));
        d.address.insert("topic".to_string(), json!("site/room/light"));
        assert!(validate_device_default(&d).is_ok());
    }

    #[test]
    fn too_many_capabilities_rejected() {
        let mut d = base_device();
        d.capabilities = vec![Capability::OnOff; 51];
        assert!(matches!(
            validate_device_default(&d),
            Err(DomainError::InvalidCapability(_))
        ));
    }

    #[test]
    fn state_with_60_top_level_keys_passes() {
        let mut d = base_device();
        for i in 0..60 {
            d.state.insert(format!("key{i}"), json!(i));
        }
        assert!(validate_device_default(&d).is_ok());
    }

    #[test]
    fn oversized_string_in_state_rejected() {
        let mut d = base_device();
        d.state.insert("note".to_string(), json!("x".repeat(1025)));
        assert!(matches!(
            validate_device_default(&d),
            Err(DomainError::InvalidState(_))
        ));
    }

    #[test]
    fn nesting_depth_beyond_limit_rejected() {
        let mut value = json!("leaf");
        for _ in 0..12 {
            value = json!({ "nested": value });
        }
        let mut d = base_device();
        d.state = value.as_object().unwrap().clone();
        assert!(matches!(
            validate_device_default(&d),
            Err(DomainError::InvalidState(_))
        ));
    }

    #[test]
    fn too_many_array_elements_rejected() {
        let mut d = base_device();
        let items: Vec<Value> = (0..51).map(|i| json!(i)).collect();
        d.state.insert("history".to_string(), Value::Array(items));
        assert!(matches!(
            validate_device_default(&d),
            Err(DomainError::InvalidState(_))
        ));
    }
}
