use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::RegistryConfig;
use crate::error::ConfigError;
use crate::raw::RawConfig;

/// Load a [`RegistryConfig`].
///
/// Resolution order, each layer overriding the previous:
/// 1. `RegistryConfig::default()`.
/// 2. The YAML file at `path`, or at `$DEVREG_CONFIG` if `path` is `None`. A
///    missing file at either location is not an error — the defaults stand.
/// 3. `DEVREG_*` environment variable overrides.
pub fn load(path: Option<&Path>) -> Result<RegistryConfig, ConfigError> {
    let mut config = RegistryConfig::default();

    if let Some(resolved) = resolve_path(path) {
        if resolved.exists() {
            let content = std::fs::read_to_string(&resolved).map_err(|e| ConfigError::Io {
                path: resolved.display().to_string(),
                source: e,
            })?;
            let raw: RawConfig = serde_yaml::from_str(&content).map_err(|e| ConfigError::YamlParse {
                path: resolved.display().to_string(),
                source: e,
            })?;
            debug!(path = %resolved.display(), "loaded devreg config file");
            config.apply_raw(&raw)?;
        } else {
            debug!(path = %resolved.display(), "devreg config file not found, using defaults");
        }
    }

    config.apply_env()?;
    Ok(config)
}

fn resolve_path(path: Option<&Path>) -> Option<PathBuf> {
    path.map(PathBuf::from)
        .or_else(|| std::env::var("DEVREG_CONFIG").ok().map(PathBuf::from))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Backend;

    #[test]
    fn defaults_when_no_file_and_no_env() {
        let config = load(Some(Path::new("/nonexistent/devreg-config-test.yml"))).unwrap();
        assert_eq!(config.backend, Backend::Memory);
        assert_eq!(config.size_bounds.max_string_bytes, 1024);
    }

    #[test]
    fn loads_yaml_file() {
        let dir = std::env::temp_dir().join(format!("devreg-config-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let file = dir.join("config.yml");
        std::fs::write(
            &file,
            "backend: postgres\npostgres_url: postgres://localhost/devreg\nmax_string_bytes: 2048\n",
        )
        .unwrap();

        let config = load(Some(&file)).unwrap();
        assert_eq!(config.backend, Backend::Postgres);
        assert_eq!(config.postgres_url.as_deref(), Some("postgres://localhost/devreg"));
        assert_eq!(config.size_bounds.max_string_bytes, 2048);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn rejects_unknown_backend() {
        let dir = std::env::temp_dir().join(format!("devreg-config-test-bad-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let file = dir.join("config.yml");
        std::fs::write(&file, "backend: cassandra\n").unwrap();

        let err = load(Some(&file)).unwrap_err();
        assert!(matches!(err, ConfigError::Conversion { .. }));

        std::fs::remove_dir_all(&dir).ok();
    }
}
