pub mod enums;
pub mod error;
pub mod slug;
pub mod types;
pub mod validate;

pub use enums::{Capability, DeviceType, Domain, HealthStatus, Protocol};
pub use error::DomainError;
pub use slug::{generate_id, generate_slug, is_valid_slug};
pub use types::{
    normalize_tag, normalize_tags, Device, DeviceGroup, DeviceId, FilterRules, GroupId,
    GroupMember, GroupType, JsonMap, ScopeType, Stats,
};
pub use validate::{validate_device, validate_device_default, validate_slug, SizeBounds, ValidationLimits};
