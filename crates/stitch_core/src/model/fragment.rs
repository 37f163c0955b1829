//! Fragment descriptor model.
//!
//! # Responsibility
//! - Describe fragment interfaces, their discovered implementation
//!   candidates, and resolved interface/implementation bindings.
//! - Provide the assigned-name and decapitalization rules used by the
//!   ambiguity resolver.
//!
//! # Invariants
//! - Descriptors are immutable once declared.
//! - At most one `ResolvedFragment` exists per fragment interface per
//!   repository.
//! - Candidate provider instances are shared with the component container,
//!   never owned by this crate.

use crate::provider::FragmentProvider;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::sync::Arc;

static TYPE_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z][A-Za-z0-9]*$").expect("valid type name regex"));
static COMPONENT_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z][A-Za-z0-9]*$").expect("valid component name regex"));
static PACKAGE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z][a-z0-9_]*(\.[a-z][a-z0-9_]*)*$").expect("valid package regex")
});

/// Returns true when `value` is an UpperCamel type identifier.
pub fn is_valid_type_name(value: &str) -> bool {
    TYPE_NAME_RE.is_match(value)
}

/// Returns true when `value` is a lowerCamel component name.
pub fn is_valid_component_name(value: &str) -> bool {
    COMPONENT_NAME_RE.is_match(value)
}

/// Returns true when `value` is a dotted lowercase package path.
pub fn is_valid_package(value: &str) -> bool {
    PACKAGE_RE.is_match(value)
}

/// Lowers the first character of a type name to derive a component name.
///
/// Follows the bean-introspection rule: when the first two characters are
/// both uppercase (`URLRepository`), the name is kept unchanged.
pub fn decapitalize(name: &str) -> String {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return String::new();
    };
    if first.is_uppercase() {
        if let Some(second) = chars.clone().next() {
            if second.is_uppercase() {
                return name.to_string();
            }
        }
    }
    first.to_lowercase().chain(chars).collect()
}

/// Method identity used for composition binding and dispatch lookup.
///
/// Arity is part of the identity so that overloads with different parameter
/// counts stay distinct in the dispatch table.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MethodSignature {
    /// Method name, e.g. `save`.
    pub name: String,
    /// Declared parameter count.
    pub arity: usize,
}

impl MethodSignature {
    pub fn new(name: impl Into<String>, arity: usize) -> Self {
        Self {
            name: name.into(),
            arity,
        }
    }
}

impl Display for MethodSignature {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.name, self.arity)
    }
}

/// One declared fragment interface: a name plus its method surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FragmentInterface {
    /// Interface type name, e.g. `CustomizedUserRepository`.
    pub name: String,
    /// Declared method signatures, kept sorted for stable iteration.
    pub methods: BTreeSet<MethodSignature>,
}

impl FragmentInterface {
    pub fn new(
        name: impl Into<String>,
        methods: impl IntoIterator<Item = MethodSignature>,
    ) -> Self {
        Self {
            name: name.into(),
            methods: methods.into_iter().collect(),
        }
    }

    /// Returns true when this interface declares `method`.
    pub fn declares(&self, method: &MethodSignature) -> bool {
        self.methods.contains(method)
    }
}

/// One discovered implementation candidate for a fragment interface.
///
/// Candidates are discovered by the component container, never constructed
/// here; the provider handle stays shared with the container.
#[derive(Clone)]
pub struct ImplementationCandidate {
    /// Implementation type name, e.g. `CustomizedUserRepositoryImpl`.
    pub type_name: String,
    /// Name of the fragment interface this candidate implements.
    pub fragment_name: String,
    /// Explicit component name assigned by configuration, when present.
    pub explicit_name: Option<String>,
    /// Source package of the implementation type.
    pub package: String,
    /// Live component instance owned by the container.
    pub provider: Arc<dyn FragmentProvider>,
}

impl ImplementationCandidate {
    pub fn new(
        type_name: impl Into<String>,
        fragment_name: impl Into<String>,
        package: impl Into<String>,
        provider: Arc<dyn FragmentProvider>,
    ) -> Self {
        Self {
            type_name: type_name.into(),
            fragment_name: fragment_name.into(),
            explicit_name: None,
            package: package.into(),
            provider,
        }
    }

    /// Sets the explicit component name assigned by configuration.
    pub fn with_explicit_name(mut self, name: impl Into<String>) -> Self {
        self.explicit_name = Some(name.into());
        self
    }

    /// Returns the container-visible component name for this candidate.
    ///
    /// The explicit configuration-assigned name wins; otherwise the name is
    /// derived from the type name by decapitalization.
    pub fn assigned_name(&self) -> String {
        match &self.explicit_name {
            Some(name) => name.clone(),
            None => decapitalize(&self.type_name),
        }
    }

    /// Returns `package.TypeName` for diagnostics.
    pub fn qualified_type_name(&self) -> String {
        format!("{}.{}", self.package, self.type_name)
    }

    /// Validates candidate identifiers against descriptor naming rules.
    pub fn validate(&self) -> Result<(), DescriptorError> {
        if !is_valid_type_name(&self.type_name) {
            return Err(DescriptorError::InvalidTypeName(self.type_name.clone()));
        }
        if !is_valid_type_name(&self.fragment_name) {
            return Err(DescriptorError::InvalidTypeName(self.fragment_name.clone()));
        }
        if !is_valid_package(&self.package) {
            return Err(DescriptorError::InvalidPackage(self.package.clone()));
        }
        if let Some(name) = &self.explicit_name {
            if !is_valid_component_name(name) {
                return Err(DescriptorError::InvalidComponentName(name.clone()));
            }
        }
        Ok(())
    }
}

impl Debug for ImplementationCandidate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImplementationCandidate")
            .field("type_name", &self.type_name)
            .field("fragment_name", &self.fragment_name)
            .field("explicit_name", &self.explicit_name)
            .field("package", &self.package)
            .finish_non_exhaustive()
    }
}

impl PartialEq for ImplementationCandidate {
    fn eq(&self, other: &Self) -> bool {
        self.type_name == other.type_name
            && self.fragment_name == other.fragment_name
            && self.explicit_name == other.explicit_name
            && self.package == other.package
    }
}

impl Eq for ImplementationCandidate {}

/// A fragment interface bound to exactly one implementation candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFragment {
    pub interface: FragmentInterface,
    pub candidate: ImplementationCandidate,
}

impl ResolvedFragment {
    pub fn new(interface: FragmentInterface, candidate: ImplementationCandidate) -> Self {
        Self {
            interface,
            candidate,
        }
    }
}

/// Descriptor naming/identifier violations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DescriptorError {
    InvalidTypeName(String),
    InvalidComponentName(String),
    InvalidPackage(String),
}

impl Display for DescriptorError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTypeName(value) => write!(f, "type name is invalid: {value}"),
            Self::InvalidComponentName(value) => {
                write!(f, "component name is invalid: {value}")
            }
            Self::InvalidPackage(value) => write!(f, "package path is invalid: {value}"),
        }
    }
}

impl Error for DescriptorError {}
