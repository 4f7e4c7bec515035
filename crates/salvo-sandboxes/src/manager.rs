//! Sandbox manager: drives Terraform to start and stop sandbox instances.

use crate::config::ManagerConfig;
use crate::error::{Result, SandboxError, ToolStage};
use crate::models::Instance;
use crate::parser::parse_instances;
use crate::terraform::{TerraformApi, TerraformCli};
use crate::types::{BuildId, SandboxRequest};
use crate::vars::to_tf_vars;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Starts and stops sandbox instances through Terraform.
///
/// The manager keeps no state between calls beyond its configuration;
/// whatever Terraform persists in the working directory is the only record
/// of deployed sandboxes. Concurrent calls against the same working
/// directory are not serialized here.
pub struct SandboxManager {
    config: ManagerConfig,
    terraform: Arc<dyn TerraformApi>,
}

impl SandboxManager {
    /// Create a manager driving the Terraform binary named in `config`.
    pub fn new(config: ManagerConfig) -> Self {
        let terraform = Arc::new(TerraformCli::new(config.terraform_path.clone()));
        Self::with_terraform(config, terraform)
    }

    /// Create a manager with a custom Terraform implementation.
    pub fn with_terraform(config: ManagerConfig, terraform: Arc<dyn TerraformApi>) -> Self {
        Self { config, terraform }
    }

    /// Get the manager configuration.
    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    /// Start the requested sandbox instances and describe what was deployed.
    ///
    /// The request is validated before Terraform is touched. Either every
    /// requested instance is returned, keyed by build ID, or an error.
    pub async fn start(&self, request: &SandboxRequest) -> Result<BTreeMap<BuildId, Instance>> {
        let start = std::time::Instant::now();
        let vars = to_tf_vars(request)?;
        self.config.validate()?;

        let tf = self
            .terraform
            .init(&self.config.working_dir)
            .await
            .map_err(|e| SandboxError::tool(ToolStage::Init, e))?;

        tracing::info!(?request, "Starting Salvo sandboxes");
        tf.apply(&vars).await.map_err(|e| {
            tracing::error!(error = %e, "Terraform apply failed");
            SandboxError::tool(ToolStage::Apply, e)
        })?;

        let output = tf
            .output()
            .await
            .map_err(|e| SandboxError::tool(ToolStage::Output, e))?;
        tracing::debug!(variables = output.len(), "Fetched Terraform output");

        let instances = parse_instances(request, &output)?;
        for (build_id, inst) in &instances {
            tracing::info!(build_id = %build_id, instance = %inst, "Sandbox instance ready");
        }
        tracing::info!(
            instances = instances.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Salvo sandboxes started"
        );
        Ok(instances)
    }

    /// Stop every sandbox instance.
    ///
    /// Applies the Terraform configuration with no variables, which removes
    /// all previously declared instances. Failures are reported, not retried.
    pub async fn stop_all(&self) -> Result<()> {
        self.config.validate()?;
        let tf = self
            .terraform
            .init(&self.config.working_dir)
            .await
            .map_err(|e| SandboxError::tool(ToolStage::TeardownInit, e))?;

        tracing::info!("Stopping all Salvo sandboxes");
        tf.apply(&[]).await.map_err(|e| {
            tracing::error!(error = %e, "Terraform teardown failed");
            SandboxError::tool(ToolStage::TeardownApply, e)
        })?;
        tracing::info!("All Salvo sandboxes stopped");
        Ok(())
    }
}
