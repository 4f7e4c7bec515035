//! # salvo-sandboxes
//!
//! Life cycle of the remote sandboxes Salvo runs performance tests on.
//!
//! Sandboxes are groups of cloud VMs declared by Terraform definitions.
//! This crate turns a request for sandbox instances into Terraform
//! variables, applies them, and parses the Terraform outputs back into
//! typed descriptions of the deployed VMs.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                     salvo-sandboxes                      │
//! ├──────────────────────────────────────────────────────────┤
//! │                                                          │
//! │  SandboxRequest ──▶ to_tf_vars() ──▶ ["<type>=[1,2]"]    │
//! │                                           │              │
//! │  ┌─────────────────┐     ┌────────────────▼─────────┐    │
//! │  │ SandboxManager  │────▶│  TerraformApi::init()    │    │
//! │  │   - start()     │     │  Terraform::apply()      │    │
//! │  │   - stop_all()  │     │  Terraform::output()     │    │
//! │  └─────────────────┘     └────────────────┬─────────┘    │
//! │                                           │ Outputs      │
//! │  ┌─────────────────┐     ┌────────────────▼─────────┐    │
//! │  │ SandboxLayout   │────▶│  parse_instances()       │    │
//! │  │ (per type)      │     │  decode_build_ip_map()   │    │
//! │  └─────────────────┘     └────────────────┬─────────┘    │
//! │                                           ▼              │
//! │                        BTreeMap<BuildId, Instance>       │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```no_run
//! use salvo_sandboxes::{ManagerConfig, SandboxManager, SandboxRequest, SandboxType};
//!
//! # async fn example() -> salvo_sandboxes::Result<()> {
//! let manager = SandboxManager::new(ManagerConfig::default());
//!
//! let request = SandboxRequest::new().with(SandboxType::DefaultSandboxX64, [12345]);
//! let instances = manager.start(&request).await?;
//! for (build_id, instance) in &instances {
//!     println!("{build_id}: {instance}");
//! }
//!
//! manager.stop_all().await?;
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
mod ip_map;
mod layout;
mod manager;
mod models;
mod parser;
mod terraform;
mod types;
mod vars;

pub use config::{ManagerConfig, ManagerConfigBuilder, DEFAULT_TERRAFORM_BIN, DEFAULT_WORKING_DIR};
pub use error::{DecodeError, Result, SandboxError, ToolStage};
pub use ip_map::{decode_build_ip_map, BuildIpMap};
pub use layout::{layout_for, DefaultSandboxX64Layout, OutputBinding, SandboxLayout, LAYOUTS};
pub use manager::SandboxManager;
pub use models::{Instance, Role, Vm, VmField};
pub use parser::parse_instances;
pub use terraform::{OutputMeta, Outputs, Terraform, TerraformApi, TerraformCli};
pub use types::{BuildId, SandboxRequest, SandboxType};
pub use vars::{parse_tf_var, to_tf_vars};
