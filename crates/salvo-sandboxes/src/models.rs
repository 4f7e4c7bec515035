//! Models describing deployed sandbox instances.

use crate::types::SandboxType;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;

/// A VM deployed in a sandbox.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vm {
    /// Primary private IP address of the VM.
    ///
    /// This is the address on the interface that either originates or
    /// receives load.
    pub ip: Option<IpAddr>,
    /// Private IP address the control VM uses to reach this VM.
    pub control_ip: Option<IpAddr>,
}

impl Vm {
    /// Check if neither address has been populated yet.
    pub fn is_placeholder(&self) -> bool {
        self.ip.is_none() && self.control_ip.is_none()
    }

    /// Get a mutable reference to one of the address fields.
    pub fn field_mut(&mut self, field: VmField) -> &mut Option<IpAddr> {
        match field {
            VmField::Ip => &mut self.ip,
            VmField::ControlIp => &mut self.control_ip,
        }
    }
}

/// Role a VM plays in a sandbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Generates test traffic
    LoadGenerator,
    /// System under test
    Sut,
    /// Provides upstream services to the SUT
    Backend,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::LoadGenerator => write!(f, "load_generator"),
            Role::Sut => write!(f, "sut"),
            Role::Backend => write!(f, "backend"),
        }
    }
}

/// Address field of a [`Vm`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VmField {
    /// [`Vm::ip`]
    Ip,
    /// [`Vm::control_ip`]
    ControlIp,
}

/// A single deployed sandbox instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instance {
    /// Type of the sandbox instance.
    pub sandbox_type: SandboxType,
    /// Load generator VMs deployed in the sandbox.
    pub load_generators: Vec<Vm>,
    /// System under test VMs deployed in the sandbox.
    pub suts: Vec<Vm>,
    /// Backend VMs deployed in the sandbox.
    pub backends: Vec<Vm>,
}

impl Instance {
    /// Create an instance with `count` placeholder VMs in each role.
    pub fn with_placeholders(sandbox_type: SandboxType, count: usize) -> Self {
        Self {
            sandbox_type,
            load_generators: vec![Vm::default(); count],
            suts: vec![Vm::default(); count],
            backends: vec![Vm::default(); count],
        }
    }

    /// VMs deployed in the given role.
    pub fn vms(&self, role: Role) -> &[Vm] {
        match role {
            Role::LoadGenerator => &self.load_generators,
            Role::Sut => &self.suts,
            Role::Backend => &self.backends,
        }
    }

    /// Mutable access to the VMs deployed in the given role.
    pub fn vms_mut(&mut self, role: Role) -> &mut [Vm] {
        match role {
            Role::LoadGenerator => &mut self.load_generators,
            Role::Sut => &mut self.suts,
            Role::Backend => &mut self.backends,
        }
    }
}

impl fmt::Display for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}
