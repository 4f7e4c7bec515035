//! Terraform abstraction and its CLI-backed implementation.
//!
//! The manager only talks to Terraform through [`TerraformApi`] and
//! [`Terraform`], so tests can substitute an in-memory fake for the real
//! binary.

use crate::error::{Result, SandboxError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

/// Maximum number of bytes of tool output quoted in error messages.
const MAX_ERROR_OUTPUT: usize = 4096;

/// One entry of `terraform output -json`.
#[derive(Debug, Serialize, Deserialize)]
pub struct OutputMeta {
    /// Whether Terraform marks the value as sensitive.
    #[serde(default)]
    pub sensitive: bool,
    /// Terraform type of the value, as reported.
    #[serde(rename = "type", default)]
    pub type_: serde_json::Value,
    /// The value, kept as the exact JSON text Terraform printed.
    pub value: Box<RawValue>,
}

impl OutputMeta {
    /// Create an output entry from the JSON text of its value.
    pub fn from_json(value: &str) -> Result<Self> {
        Ok(Self {
            sensitive: false,
            type_: serde_json::Value::Null,
            value: RawValue::from_string(value.to_string())?,
        })
    }
}

/// Terraform outputs keyed by output variable name.
pub type Outputs = HashMap<String, OutputMeta>;

/// Entry point for obtaining an initialized Terraform working directory.
#[async_trait]
pub trait TerraformApi: Send + Sync {
    /// Initialize Terraform in `working_dir` and return a handle to it.
    ///
    /// # Errors
    /// Returns an error if initialization fails.
    async fn init(&self, working_dir: &Path) -> Result<Box<dyn Terraform>>;
}

/// An initialized Terraform working directory.
#[async_trait]
pub trait Terraform: Send + Sync {
    /// Apply the configuration with the given `-var` assignments.
    ///
    /// Applying with no variables tears down everything the variables
    /// previously declared.
    async fn apply(&self, vars: &[String]) -> Result<()>;

    /// Read the root module outputs.
    async fn output(&self) -> Result<Outputs>;
}

/// [`TerraformApi`] backed by the `terraform` binary.
#[derive(Debug, Clone)]
pub struct TerraformCli {
    binary: PathBuf,
}

impl TerraformCli {
    /// Use the Terraform binary at `binary` (a bare name is looked up in `PATH`).
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Path of the Terraform binary.
    pub fn binary(&self) -> &Path {
        &self.binary
    }
}

impl Default for TerraformCli {
    fn default() -> Self {
        Self::new("terraform")
    }
}

#[async_trait]
impl TerraformApi for TerraformCli {
    async fn init(&self, working_dir: &Path) -> Result<Box<dyn Terraform>> {
        let tf = CliTerraform {
            binary: self.binary.clone(),
            working_dir: working_dir.to_path_buf(),
        };
        tracing::info!(
            binary = %self.binary.display(),
            working_dir = %working_dir.display(),
            "Initializing Terraform"
        );
        tf.run(&["init", "-input=false", "-no-color"]).await?;
        Ok(Box::new(tf))
    }
}

/// A working directory driven through the Terraform CLI.
struct CliTerraform {
    binary: PathBuf,
    working_dir: PathBuf,
}

impl CliTerraform {
    /// Run terraform with `args` and return its stdout.
    async fn run<S: AsRef<str>>(&self, args: &[S]) -> Result<Vec<u8>> {
        let args: Vec<&str> = args.iter().map(|a| a.as_ref()).collect();
        tracing::debug!(args = ?args, "Running terraform");

        let out = Command::new(&self.binary)
            .args(&args)
            .current_dir(&self.working_dir)
            .env("TF_IN_AUTOMATION", "1")
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await?;

        if !out.status.success() {
            let stderr = String::from_utf8_lossy(&out.stderr);
            tracing::warn!(
                status = %out.status,
                command = args.first().copied().unwrap_or_default(),
                "terraform exited unsuccessfully"
            );
            return Err(SandboxError::Command(format!(
                "terraform {} => {}: {}",
                args.first().copied().unwrap_or_default(),
                out.status,
                truncate(stderr.trim(), MAX_ERROR_OUTPUT)
            )));
        }
        Ok(out.stdout)
    }
}

#[async_trait]
impl Terraform for CliTerraform {
    async fn apply(&self, vars: &[String]) -> Result<()> {
        let mut args = vec![
            "apply".to_string(),
            "-auto-approve".to_string(),
            "-input=false".to_string(),
            "-no-color".to_string(),
        ];
        for v in vars {
            args.push("-var".to_string());
            args.push(v.clone());
        }
        self.run(&args).await?;
        Ok(())
    }

    async fn output(&self) -> Result<Outputs> {
        let stdout = self.run(&["output", "-json", "-no-color"]).await?;
        Ok(serde_json::from_slice(&stdout)?)
    }
}

/// Truncate a string to at most `max_bytes`, on a UTF-8 boundary.
fn truncate(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_meta_from_terraform_json() {
        let doc = r#"{
            "default_sandbox_x64_build_ids_to_sut_0_control_vm_subnet_ip_list": {
                "sensitive": false,
                "type": ["map", ["list", "string"]],
                "value": {"12345": ["10.0.0.2"]}
            }
        }"#;
        let outputs: Outputs = serde_json::from_str(doc).unwrap();
        let meta = &outputs["default_sandbox_x64_build_ids_to_sut_0_control_vm_subnet_ip_list"];
        assert!(!meta.sensitive);
        assert_eq!(meta.value.get(), r#"{"12345": ["10.0.0.2"]}"#);
    }

    #[test]
    fn test_output_meta_from_json_rejects_invalid() {
        assert!(OutputMeta::from_json("{").is_err());
        assert_eq!(OutputMeta::from_json("[1]").unwrap().value.get(), "[1]");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello", 3), "hel");
        assert_eq!(truncate("héllo", 2), "h");
    }

    #[test]
    fn test_default_binary() {
        assert_eq!(TerraformCli::default().binary(), Path::new("terraform"));
    }
}
