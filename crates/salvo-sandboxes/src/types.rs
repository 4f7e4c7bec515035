//! Request types: sandbox types, build IDs and sandbox requests.

use crate::error::SandboxError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// A supported sandbox topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SandboxType {
    /// One load generator, one SUT and one backend on x64 VMs.
    #[serde(rename = "default_sandbox_x64_build_ids")]
    DefaultSandboxX64,
}

impl SandboxType {
    /// Every supported sandbox type.
    pub const ALL: [SandboxType; 1] = [SandboxType::DefaultSandboxX64];

    /// Name used for display and as the Terraform variable name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::DefaultSandboxX64 => "default_sandbox_x64_build_ids",
        }
    }
}

impl fmt::Display for SandboxType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SandboxType {
    type Err = SandboxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.name() == s)
            .ok_or_else(|| SandboxError::Validation(format!("unsupported sandbox type {s:?}")))
    }
}

/// ID of the build whose binaries populate a sandbox instance.
///
/// Always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct BuildId(i64);

impl BuildId {
    /// Smallest valid build ID.
    pub const MIN: i64 = 1;

    /// Create a build ID, rejecting zero and negative values.
    pub fn new(id: i64) -> Result<Self, SandboxError> {
        if id < Self::MIN {
            return Err(SandboxError::Validation(format!(
                "build ID {id} is invalid, the minimum allowed build ID is {}",
                Self::MIN
            )));
        }
        Ok(Self(id))
    }

    /// Get the underlying integer.
    pub fn get(&self) -> i64 {
        self.0
    }
}

impl TryFrom<i64> for BuildId {
    type Error = SandboxError;

    fn try_from(id: i64) -> Result<Self, Self::Error> {
        Self::new(id)
    }
}

impl From<BuildId> for i64 {
    fn from(id: BuildId) -> i64 {
        id.0
    }
}

impl fmt::Display for BuildId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Requested sandbox instances: one instance per build ID, grouped by type.
///
/// A request can be assembled in any shape so that callers get a
/// descriptive error instead of a panic; [`validate`](Self::validate)
/// enforces the invariants before anything is sent to Terraform.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SandboxRequest {
    sandboxes: BTreeMap<SandboxType, Vec<i64>>,
}

impl SandboxRequest {
    /// Create an empty request.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request one instance of `typ` for each of `build_ids`, in order.
    ///
    /// Replaces any build IDs previously requested for `typ`.
    pub fn with(mut self, typ: SandboxType, build_ids: impl IntoIterator<Item = i64>) -> Self {
        self.insert(typ, build_ids);
        self
    }

    /// Request one instance of `typ` for each of `build_ids`, in order.
    pub fn insert(&mut self, typ: SandboxType, build_ids: impl IntoIterator<Item = i64>) {
        self.sandboxes.insert(typ, build_ids.into_iter().collect());
    }

    /// Iterate over the requested types and their build IDs.
    pub fn iter(&self) -> impl Iterator<Item = (SandboxType, &[i64])> {
        self.sandboxes.iter().map(|(t, ids)| (*t, ids.as_slice()))
    }

    /// Number of requested sandbox types.
    pub fn len(&self) -> usize {
        self.sandboxes.len()
    }

    /// Check if no sandbox type was requested.
    pub fn is_empty(&self) -> bool {
        self.sandboxes.is_empty()
    }

    /// Validate the request.
    ///
    /// Requires at least one sandbox type, at least one build ID per type,
    /// no duplicate build IDs within a type and only positive build IDs.
    pub fn validate(&self) -> Result<(), SandboxError> {
        if self.sandboxes.is_empty() {
            return Err(SandboxError::Validation(
                "at least one sandbox type must be specified".into(),
            ));
        }

        for (typ, ids) in &self.sandboxes {
            validate_build_ids(*typ, ids)?;
        }
        Ok(())
    }
}

impl FromIterator<(SandboxType, Vec<i64>)> for SandboxRequest {
    fn from_iter<I: IntoIterator<Item = (SandboxType, Vec<i64>)>>(iter: I) -> Self {
        Self {
            sandboxes: iter.into_iter().collect(),
        }
    }
}

/// Validate the build IDs requested for one sandbox type and convert them.
pub(crate) fn validate_build_ids(typ: SandboxType, ids: &[i64]) -> Result<Vec<BuildId>, SandboxError> {
    if ids.is_empty() {
        return Err(SandboxError::Validation(format!(
            "sandbox type {typ} has zero instances, at least one instance (one build ID) must be specified"
        )));
    }

    let mut seen = Vec::with_capacity(ids.len());
    for &id in ids {
        let build_id = BuildId::new(id).map_err(|_| {
            SandboxError::Validation(format!(
                "sandbox type {typ} has instance (build ID) {id}, the minimum allowed instance is {}",
                BuildId::MIN
            ))
        })?;
        if seen.contains(&build_id) {
            return Err(SandboxError::Validation(format!(
                "sandbox type {typ} has duplicate instance (build ID) {id}"
            )));
        }
        seen.push(build_id);
    }
    Ok(seen)
}
