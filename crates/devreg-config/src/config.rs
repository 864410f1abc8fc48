use devreg_domain::SizeBounds;

/// Which `DeviceRepository`/`GroupRepository` backend the host should construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Memory,
    Postgres,
}

impl Backend {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "memory" => Some(Backend::Memory),
            "postgres" => Some(Backend::Postgres),
            _ => None,
        }
    }
}

/// The tunable knobs of the core, loaded by [`crate::load`].
///
/// `RegistryConfig::default()` is sufficient to run the in-memory backend
/// with the §4.4 validation bounds — no file or environment variable needed.
#[derive(Debug, Clone, PartialEq)]
pub struct RegistryConfig {
    pub backend: Backend,
    pub postgres_url: Option<String>,
    pub size_bounds: SizeBounds,
    pub log_level: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        RegistryConfig {
            backend: Backend::Memory,
            postgres_url: None,
            size_bounds: SizeBounds::default(),
            log_level: "info".to_string(),
        }
    }
}

impl RegistryConfig {
    pub(crate) fn apply_raw(&mut self, raw: &crate::raw::RawConfig) -> Result<(), crate::error::ConfigError> {
        if let Some(backend) = &raw.backend {
            self.backend = Backend::parse(backend).ok_or_else(|| crate::error::ConfigError::Conversion {
                path: "backend".to_string(),
                message: format!("unknown backend '{backend}'"),
            })?;
        }
        if let Some(url) = &raw.postgres_url {
            self.postgres_url = Some(url.clone());
        }
        if let Some(level) = &raw.log_level {
            self.log_level = level.clone();
        }
        if let Some(v) = raw.max_string_bytes {
            self.size_bounds.max_string_bytes = v;
        }
        if let Some(v) = raw.max_map_keys {
            self.size_bounds.max_map_keys = v;
        }
        if let Some(v) = raw.max_array_elements {
            self.size_bounds.max_array_elements = v;
        }
        if let Some(v) = raw.max_depth {
            self.size_bounds.max_depth = v;
        }
        Ok(())
    }

    pub(crate) fn apply_env(&mut self) -> Result<(), crate::error::ConfigError> {
        if let Ok(backend) = std::env::var("DEVREG_BACKEND") {
            self.backend = Backend::parse(&backend).ok_or_else(|| crate::error::ConfigError::Env {
                name: "DEVREG_BACKEND".to_string(),
                message: format!("unknown backend '{backend}'"),
            })?;
        }
        if let Ok(url) = std::env::var("DEVREG_POSTGRES_URL") {
            self.postgres_url = Some(url);
        }
        if let Ok(level) = std::env::var("DEVREG_LOG_LEVEL") {
            self.log_level = level;
        }
        if let Ok(v) = std::env::var("DEVREG_MAX_STRING_BYTES") {
            self.size_bounds.max_string_bytes = parse_env_usize("DEVREG_MAX_STRING_BYTES", &v)?;
        }
        if let Ok(v) = std::env::var("DEVREG_MAX_MAP_KEYS") {
            self.size_bounds.max_map_keys = parse_env_usize("DEVREG_MAX_MAP_KEYS", &v)?;
        }
        if let Ok(v) = std::env::var("DEVREG_MAX_ARRAY_ELEMENTS") {
            self.size_bounds.max_array_elements = parse_env_usize("DEVREG_MAX_ARRAY_ELEMENTS", &v)?;
        }
        if let Ok(v) = std::env::var("DEVREG_MAX_DEPTH") {
            self.size_bounds.max_depth = parse_env_usize("DEVREG_MAX_DEPTH", &v)?;
        }
        Ok(())
    }
}

fn parse_env_usize(name: &str, raw: &str) -> Result<usize, crate::error::ConfigError> {
    raw.parse().map_err(|_| crate::error::ConfigError::Env {
        name: name.to_string(),
        message: format!("expected a non-negative integer, got '{raw}'"),
    })
}
