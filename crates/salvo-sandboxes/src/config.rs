//! Sandbox manager configuration types.

use crate::error::SandboxError;
use std::path::PathBuf;

/// Default directory holding the sandbox Terraform definitions.
pub const DEFAULT_WORKING_DIR: &str = "terraform/";

/// Default Terraform binary, looked up in `PATH`.
pub const DEFAULT_TERRAFORM_BIN: &str = "terraform";

/// Configuration for a [`SandboxManager`](crate::SandboxManager).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagerConfig {
    /// Directory with the sandbox Terraform definitions (default: `terraform/`).
    pub working_dir: PathBuf,
    /// Terraform binary (default: `terraform`).
    pub terraform_path: PathBuf,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            working_dir: PathBuf::from(DEFAULT_WORKING_DIR),
            terraform_path: PathBuf::from(DEFAULT_TERRAFORM_BIN),
        }
    }
}

impl ManagerConfig {
    /// Create a new config builder.
    pub fn builder() -> ManagerConfigBuilder {
        ManagerConfigBuilder::default()
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), SandboxError> {
        if self.working_dir.as_os_str().is_empty() {
            return Err(SandboxError::Config("working_dir is required".into()));
        }
        if self.terraform_path.as_os_str().is_empty() {
            return Err(SandboxError::Config("terraform_path is required".into()));
        }
        Ok(())
    }
}

/// Builder for ManagerConfig.
#[derive(Debug, Default)]
pub struct ManagerConfigBuilder {
    config: ManagerConfig,
}

impl ManagerConfigBuilder {
    /// Set the Terraform working directory.
    pub fn working_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.working_dir = path.into();
        self
    }

    /// Set the Terraform binary.
    pub fn terraform_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.terraform_path = path.into();
        self
    }

    /// Build the configuration, validating all required fields.
    pub fn build(self) -> Result<ManagerConfig, SandboxError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = ManagerConfig::default();
        assert_eq!(config.working_dir, PathBuf::from("terraform/"));
        assert_eq!(config.terraform_path, PathBuf::from("terraform"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_validation_empty_working_dir() {
        let result = ManagerConfig::builder().working_dir("").build();
        assert!(result.is_err());
    }

    #[test]
    fn test_builder_validation_empty_binary() {
        let result = ManagerConfig::builder().terraform_path("").build();
        assert!(result.is_err());
    }

    #[test]
    fn test_builder_success() {
        let config = ManagerConfig::builder()
            .working_dir("/srv/salvo/terraform")
            .terraform_path("/usr/local/bin/terraform")
            .build()
            .expect("should build successfully");

        assert_eq!(config.working_dir, PathBuf::from("/srv/salvo/terraform"));
        assert_eq!(
            config.terraform_path,
            PathBuf::from("/usr/local/bin/terraform")
        );
    }
}
