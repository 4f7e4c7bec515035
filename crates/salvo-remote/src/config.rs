//! Configuration for the `salvo-remote` binary.
//!
//! Terraform settings are loaded from environment variables with defaults,
//! then overridden by command line flags.

use salvo_sandboxes::{BuildId, ManagerConfig, DEFAULT_TERRAFORM_BIN, DEFAULT_WORKING_DIR};
use std::path::PathBuf;

/// Environment variable naming the Terraform working directory.
pub const ENV_TERRAFORM_DIR: &str = "SALVO_TERRAFORM_DIR";

/// Environment variable naming the Terraform binary.
pub const ENV_TERRAFORM_BIN: &str = "SALVO_TERRAFORM_BIN";

/// Configuration validation error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("--build-id must be a positive integer, got {0}")]
    InvalidBuildId(i64),

    #[error("--build-id-override must not be negative, got {0}")]
    InvalidBuildIdOverride(i64),

    #[error("{0}")]
    Sandbox(#[from] salvo_sandboxes::SandboxError),
}

/// Terraform settings of the remote runner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteConfig {
    /// Directory holding the sandbox Terraform definitions.
    pub terraform_dir: PathBuf,

    /// Terraform binary to run.
    pub terraform_bin: PathBuf,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            terraform_dir: PathBuf::from(DEFAULT_WORKING_DIR),
            terraform_bin: PathBuf::from(DEFAULT_TERRAFORM_BIN),
        }
    }
}

impl RemoteConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `SALVO_TERRAFORM_DIR` | `terraform/` |
    /// | `SALVO_TERRAFORM_BIN` | `terraform` |
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let default = Self::default();
        Self {
            terraform_dir: lookup(ENV_TERRAFORM_DIR)
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
                .unwrap_or(default.terraform_dir),
            terraform_bin: lookup(ENV_TERRAFORM_BIN)
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
                .unwrap_or(default.terraform_bin),
        }
    }

    /// Replace settings given on the command line.
    pub fn with_overrides(mut self, dir: Option<PathBuf>, bin: Option<PathBuf>) -> Self {
        if let Some(dir) = dir {
            self.terraform_dir = dir;
        }
        if let Some(bin) = bin {
            self.terraform_bin = bin;
        }
        self
    }

    /// Build the sandbox manager configuration.
    pub fn to_manager_config(&self) -> Result<ManagerConfig, ConfigError> {
        Ok(ManagerConfig::builder()
            .working_dir(&self.terraform_dir)
            .terraform_path(&self.terraform_bin)
            .build()?)
    }
}

/// Build ID selection for `salvo-remote start`.
///
/// CI passes the build number as `build_id`. A non-zero `build_id_override`
/// replaces it, which lets a developer reuse a sandbox from another build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildSelection {
    pub build_id: i64,
    pub build_id_override: i64,
}

impl BuildSelection {
    /// Pick the build ID to start a sandbox for.
    pub fn resolve(&self) -> Result<BuildId, ConfigError> {
        if self.build_id <= 0 {
            return Err(ConfigError::InvalidBuildId(self.build_id));
        }
        if self.build_id_override < 0 {
            return Err(ConfigError::InvalidBuildIdOverride(self.build_id_override));
        }
        let id = if self.build_id_override != 0 {
            self.build_id_override
        } else {
            self.build_id
        };
        Ok(BuildId::new(id)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = RemoteConfig::default();
        assert_eq!(config.terraform_dir, PathBuf::from("terraform/"));
        assert_eq!(config.terraform_bin, PathBuf::from("terraform"));
    }

    #[test]
    fn test_from_lookup_uses_defaults() {
        assert_eq!(RemoteConfig::from_lookup(lookup(&[])), RemoteConfig::default());
        assert_eq!(
            RemoteConfig::from_lookup(lookup(&[(ENV_TERRAFORM_DIR, "")])),
            RemoteConfig::default()
        );
    }

    #[test]
    fn test_from_lookup_reads_variables() {
        let config = RemoteConfig::from_lookup(lookup(&[
            (ENV_TERRAFORM_DIR, "/srv/salvo/terraform"),
            (ENV_TERRAFORM_BIN, "/usr/local/bin/terraform"),
        ]));
        assert_eq!(config.terraform_dir, PathBuf::from("/srv/salvo/terraform"));
        assert_eq!(config.terraform_bin, PathBuf::from("/usr/local/bin/terraform"));
    }

    #[test]
    fn test_flags_override_environment() {
        let config = RemoteConfig::from_lookup(lookup(&[(ENV_TERRAFORM_DIR, "/env/dir")]))
            .with_overrides(Some(PathBuf::from("/flag/dir")), None);
        assert_eq!(config.terraform_dir, PathBuf::from("/flag/dir"));
        assert_eq!(config.terraform_bin, PathBuf::from("terraform"));

        let manager = config.to_manager_config().unwrap();
        assert_eq!(manager.working_dir, PathBuf::from("/flag/dir"));
        assert_eq!(manager.terraform_path, PathBuf::from("terraform"));
    }

    #[test]
    fn test_empty_override_is_rejected() {
        let config = RemoteConfig::default().with_overrides(Some(PathBuf::new()), None);
        assert!(config.to_manager_config().is_err());
    }

    #[test]
    fn test_build_selection() {
        let pick = |build_id, build_id_override| {
            BuildSelection { build_id, build_id_override }
                .resolve()
                .map(i64::from)
        };

        assert_eq!(pick(42, 0).unwrap(), 42);
        assert_eq!(pick(42, 7).unwrap(), 7);
        assert!(matches!(pick(0, 0), Err(ConfigError::InvalidBuildId(0))));
        assert!(matches!(pick(-3, 7), Err(ConfigError::InvalidBuildId(-3))));
        assert!(matches!(
            pick(42, -1),
            Err(ConfigError::InvalidBuildIdOverride(-1))
        ));
    }
}
