//! Per sandbox type knowledge of which Terraform outputs populate which VMs.
//!
//! Each supported [`SandboxType`] has a [`SandboxLayout`] in [`LAYOUTS`].
//! Adding a topology means adding a layout and a table entry; the parser
//! itself only walks the bindings a layout reports.

use crate::models::{Instance, Role, VmField};
use crate::types::SandboxType;

/// Binds a Terraform output variable to one address field of one VM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputBinding {
    /// Name of the Terraform output variable.
    pub variable: &'static str,
    /// Role of the VM the variable describes.
    pub role: Role,
    /// Index of the VM within its role.
    pub index: usize,
    /// Address field the variable populates.
    pub field: VmField,
}

/// Describes the VMs and Terraform outputs of one sandbox type.
pub trait SandboxLayout: Send + Sync {
    /// The sandbox type this layout describes.
    fn sandbox_type(&self) -> SandboxType;

    /// Number of IP addresses Terraform reports per build ID in each output.
    fn ips_per_output(&self) -> usize {
        1
    }

    /// Output variables that must be present, and where their values go.
    fn required_outputs(&self) -> &'static [OutputBinding];

    /// A new instance with every VM slot present but unpopulated.
    fn placeholder(&self) -> Instance;
}

/// Layout of [`SandboxType::DefaultSandboxX64`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultSandboxX64Layout;

const DEFAULT_SANDBOX_X64_OUTPUTS: [OutputBinding; 6] = [
    OutputBinding {
        variable: "default_sandbox_x64_build_ids_to_load_generator_0_control_vm_subnet_ip_list",
        role: Role::LoadGenerator,
        index: 0,
        field: VmField::ControlIp,
    },
    OutputBinding {
        variable: "default_sandbox_x64_build_ids_to_sut_0_control_vm_subnet_ip_list",
        role: Role::Sut,
        index: 0,
        field: VmField::ControlIp,
    },
    OutputBinding {
        variable: "default_sandbox_x64_build_ids_to_backend_0_control_vm_subnet_ip_list",
        role: Role::Backend,
        index: 0,
        field: VmField::ControlIp,
    },
    OutputBinding {
        variable: "default_sandbox_x64_build_ids_to_load_generator_0_load_generator_subnet_ip_list",
        role: Role::LoadGenerator,
        index: 0,
        field: VmField::Ip,
    },
    OutputBinding {
        variable: "default_sandbox_x64_build_ids_to_sut_0_load_generator_subnet_ip_list",
        role: Role::Sut,
        index: 0,
        field: VmField::Ip,
    },
    OutputBinding {
        variable: "default_sandbox_x64_build_ids_to_backend_0_backend_subnet_ip_list",
        role: Role::Backend,
        index: 0,
        field: VmField::Ip,
    },
];

impl SandboxLayout for DefaultSandboxX64Layout {
    fn sandbox_type(&self) -> SandboxType {
        SandboxType::DefaultSandboxX64
    }

    fn required_outputs(&self) -> &'static [OutputBinding] {
        &DEFAULT_SANDBOX_X64_OUTPUTS
    }

    fn placeholder(&self) -> Instance {
        Instance::with_placeholders(SandboxType::DefaultSandboxX64, 1)
    }
}

/// Layouts of all supported sandbox types.
pub static LAYOUTS: &[&dyn SandboxLayout] = &[&DefaultSandboxX64Layout];

/// Look up the layout of a sandbox type.
pub fn layout_for(typ: SandboxType) -> Option<&'static dyn SandboxLayout> {
    LAYOUTS.iter().copied().find(|l| l.sandbox_type() == typ)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_every_type_has_a_layout() {
        for typ in SandboxType::ALL {
            let layout = layout_for(typ).expect("layout registered");
            assert_eq!(layout.sandbox_type(), typ);
        }
    }

    #[test]
    fn test_default_x64_covers_every_slot_once() {
        let layout = layout_for(SandboxType::DefaultSandboxX64).unwrap();
        let placeholder = layout.placeholder();

        let mut slots = HashSet::new();
        for b in layout.required_outputs() {
            assert!(b.variable.starts_with(SandboxType::DefaultSandboxX64.name()));
            assert!(b.index < placeholder.vms(b.role).len());
            assert!(slots.insert((b.role, b.index, b.field)), "{} bound twice", b.variable);
        }
        assert_eq!(slots.len(), 6);
    }
}
