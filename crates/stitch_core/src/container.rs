//! Component container seam and in-memory reference implementation.
//!
//! # Responsibility
//! - Define the read-only lookup contract the resolution pipeline consumes.
//! - Provide a deterministic in-memory container for embedders and tests.
//!
//! # Invariants
//! - The container owns component lifetime; lookups hand out shared handles.
//! - Lookup results are deterministically ordered (no reliance on hash-map
//!   iteration order).

use crate::model::fragment::{DescriptorError, ImplementationCandidate};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Returns true when `package` is `scope` itself or nested below it.
pub fn scope_contains(scope: &str, package: &str) -> bool {
    package == scope || package.starts_with(&format!("{scope}."))
}

/// Read-only component lookup consumed by the locate/resolve pipeline.
///
/// The production container behind this trait is an external collaborator;
/// this crate only ever reads from it.
pub trait ComponentContainer {
    /// Returns every candidate of `type_name` registered within `scope`.
    fn find_by_type_and_scope(&self, type_name: &str, scope: &str)
        -> Vec<ImplementationCandidate>;

    /// Returns the candidate registered under the assigned `name`, if any.
    fn resolve_by_name(&self, name: &str) -> Option<ImplementationCandidate>;
}

/// Container registration errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContainerError {
    Descriptor(DescriptorError),
    DuplicateComponentName(String),
}

impl Display for ContainerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Descriptor(err) => write!(f, "{err}"),
            Self::DuplicateComponentName(name) => {
                write!(f, "component name already registered: {name}")
            }
        }
    }
}

impl Error for ContainerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Descriptor(err) => Some(err),
            Self::DuplicateComponentName(_) => None,
        }
    }
}

impl From<DescriptorError> for ContainerError {
    fn from(value: DescriptorError) -> Self {
        Self::Descriptor(value)
    }
}

/// BTreeMap-backed component container keyed by assigned component name.
#[derive(Default)]
pub struct InMemoryComponentContainer {
    components: BTreeMap<String, ImplementationCandidate>,
}

impl InMemoryComponentContainer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers one candidate under its assigned name.
    pub fn register(&mut self, candidate: ImplementationCandidate) -> Result<(), ContainerError> {
        candidate.validate()?;
        let name = candidate.assigned_name();
        if self.components.contains_key(name.as_str()) {
            return Err(ContainerError::DuplicateComponentName(name));
        }
        self.components.insert(name, candidate);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Returns sorted assigned component names.
    pub fn component_names(&self) -> Vec<String> {
        self.components.keys().cloned().collect()
    }
}

impl ComponentContainer for InMemoryComponentContainer {
    fn find_by_type_and_scope(
        &self,
        type_name: &str,
        scope: &str,
    ) -> Vec<ImplementationCandidate> {
        self.components
            .values()
            .filter(|candidate| candidate.type_name == type_name)
            .filter(|candidate| scope_contains(scope, &candidate.package))
            .cloned()
            .collect()
    }

    fn resolve_by_name(&self, name: &str) -> Option<ImplementationCandidate> {
        self.components.get(name.trim()).cloned()
    }
}
