//! Reconstruction of sandbox instances from Terraform outputs.

use crate::error::{Result, SandboxError};
use crate::ip_map::{decode_build_ip_map, BuildIpMap};
use crate::layout::{layout_for, SandboxLayout};
use crate::models::Instance;
use crate::terraform::Outputs;
use crate::types::{BuildId, SandboxRequest};
use std::collections::BTreeMap;

/// Parse Terraform outputs into the sandbox instances of `request`.
///
/// The returned map is keyed by build ID. If two sandbox types request the
/// same build ID, the type iterated last wins.
pub fn parse_instances(
    request: &SandboxRequest,
    output: &Outputs,
) -> Result<BTreeMap<BuildId, Instance>> {
    if request.is_empty() {
        return Err(SandboxError::Parse(
            "at least one sandbox type has to be specified".into(),
        ));
    }

    let mut res = BTreeMap::new();
    for (typ, ids) in request.iter() {
        if ids.is_empty() {
            return Err(SandboxError::Parse(format!(
                "no instances specified for sandbox type {typ}, at least one instance must be specified"
            )));
        }
        let build_ids = ids
            .iter()
            .map(|&id| BuildId::new(id).map_err(|e| SandboxError::Parse(e.to_string())))
            .collect::<Result<Vec<_>>>()?;

        let layout = layout_for(typ)
            .ok_or_else(|| SandboxError::Parse(format!("unsupported sandbox type {typ}")))?;

        res.extend(parse_layout(layout, &build_ids, output)?);
    }
    Ok(res)
}

fn parse_layout(
    layout: &dyn SandboxLayout,
    build_ids: &[BuildId],
    output: &Outputs,
) -> Result<BTreeMap<BuildId, Instance>> {
    let bindings = layout.required_outputs();

    let mut decoded: Vec<BuildIpMap> = Vec::with_capacity(bindings.len());
    for binding in bindings {
        let meta = output.get(binding.variable).ok_or_else(|| {
            SandboxError::Parse(format!(
                "Terraform output doesn't contain variable {:?}",
                binding.variable
            ))
        })?;
        let raw = meta.value.get();
        let ip_map = decode_build_ip_map(raw).map_err(|source| SandboxError::Decode {
            variable: binding.variable.to_string(),
            raw: raw.to_string(),
            source,
        })?;
        tracing::debug!(variable = binding.variable, builds = ip_map.len(), "Decoded output");
        decoded.push(ip_map);
    }

    let want = layout.ips_per_output();
    let mut res = BTreeMap::new();
    for &build_id in build_ids {
        let mut inst = layout.placeholder();

        for (binding, ip_map) in bindings.iter().zip(&decoded) {
            let ips = ip_map.get(&build_id).ok_or_else(|| {
                SandboxError::Parse(format!(
                    "Terraform output doesn't contain sandbox instance {build_id} in variable {:?}, got {ip_map:?}",
                    binding.variable
                ))
            })?;
            if ips.len() != want {
                return Err(SandboxError::Parse(format!(
                    "Terraform returned invalid number({}) of IPs in sandbox instance {build_id}, variable {:?}, wanted {want}, got ips: {ips:?}",
                    ips.len(),
                    binding.variable
                )));
            }

            let vm = inst
                .vms_mut(binding.role)
                .get_mut(binding.index)
                .ok_or_else(|| {
                    SandboxError::Parse(format!(
                        "sandbox type {} has no {} VM {}",
                        layout.sandbox_type(),
                        binding.role,
                        binding.index
                    ))
                })?;
            *vm.field_mut(binding.field) = ips.first().copied();
        }

        tracing::debug!(build_id = %build_id, instance = %inst, "Parsed sandbox instance");
        res.insert(build_id, inst);
    }
    Ok(res)
}
