//! Conversion of sandbox requests to Terraform `-var` assignments.

use crate::error::{Result, SandboxError};
use crate::types::{validate_build_ids, BuildId, SandboxRequest, SandboxType};

/// Validate a request and render one Terraform variable per sandbox type.
///
/// Each entry has the form `<type-name>=[<id1>,<id2>,...]` with the build
/// IDs in request order. The order of entries across sandbox types is not
/// part of the contract. Nothing is returned unless the whole request is
/// valid.
pub fn to_tf_vars(request: &SandboxRequest) -> Result<Vec<String>> {
    if request.is_empty() {
        return Err(SandboxError::Validation(
            "at least one sandbox type must be specified".into(),
        ));
    }

    let mut vars = Vec::with_capacity(request.len());
    for (typ, ids) in request.iter() {
        let build_ids = validate_build_ids(typ, ids)?;
        let var = format_tf_var(typ, &build_ids);
        tracing::debug!(var = %var, "Adding Terraform variable");
        vars.push(var);
    }
    Ok(vars)
}

fn format_tf_var(typ: SandboxType, build_ids: &[BuildId]) -> String {
    let ids: Vec<String> = build_ids.iter().map(ToString::to_string).collect();
    format!("{}=[{}]", typ.name(), ids.join(","))
}

/// Parse a variable produced by [`to_tf_vars`] back into its parts.
pub fn parse_tf_var(var: &str) -> Result<(SandboxType, Vec<BuildId>)> {
    let invalid = |reason: &str| SandboxError::Validation(format!("malformed variable {var:?}: {reason}"));

    let (name, list) = var.split_once('=').ok_or_else(|| invalid("missing '='"))?;
    let typ: SandboxType = name.parse()?;
    let inner = list
        .strip_prefix('[')
        .and_then(|l| l.strip_suffix(']'))
        .ok_or_else(|| invalid("build IDs must be enclosed in []"))?;

    let ids = if inner.is_empty() {
        Vec::new()
    } else {
        inner
            .split(',')
            .map(|s| s.parse::<i64>().map_err(|_| invalid("build IDs must be integers")))
            .collect::<Result<Vec<_>>>()?
    };
    let build_ids = validate_build_ids(typ, &ids)?;
    Ok((typ, build_ids))
}
