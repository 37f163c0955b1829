//! Repository interface declaration model.
//!
//! # Responsibility
//! - Describe one declared repository: entity metadata, ordered custom
//!   fragment list, and per-repository naming overrides.
//!
//! # Invariants
//! - Fragment declaration order is preserved; the composition builder relies
//!   on it for precedence.
//! - Fragment interface names are unique within one repository.

use crate::model::fragment::{
    is_valid_component_name, is_valid_type_name, DescriptorError, FragmentInterface,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Entity metadata handed to base repository implementations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityMetadata {
    /// Entity type name, e.g. `User`.
    pub entity_name: String,
    /// Attribute holding the entity identifier, e.g. `id`.
    pub id_attribute: String,
}

impl EntityMetadata {
    pub fn new(entity_name: impl Into<String>, id_attribute: impl Into<String>) -> Self {
        Self {
            entity_name: entity_name.into(),
            id_attribute: id_attribute.into(),
        }
    }
}

/// One declared repository interface.
///
/// The full method surface is transitive: custom fragments, technology
/// aspects, and the base implementation contribute every dispatchable
/// signature. Query-method derivation is intentionally not modeled here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryInterface {
    /// Repository interface name, e.g. `UserRepository`.
    pub name: String,
    /// Entity served by the base implementation.
    pub entity: EntityMetadata,
    /// Custom fragment interfaces, in declaration order.
    pub fragments: Vec<FragmentInterface>,
    /// Explicit component-name override used by the ambiguity resolver.
    pub component_name_override: Option<String>,
}

impl RepositoryInterface {
    pub fn new(name: impl Into<String>, entity: EntityMetadata) -> Self {
        Self {
            name: name.into(),
            entity,
            fragments: Vec::new(),
            component_name_override: None,
        }
    }

    /// Appends one custom fragment declaration, preserving order.
    pub fn with_fragment(mut self, fragment: FragmentInterface) -> Self {
        self.fragments.push(fragment);
        self
    }

    /// Declares the explicit component-name override for this repository.
    pub fn with_component_name_override(mut self, name: impl Into<String>) -> Self {
        self.component_name_override = Some(name.into());
        self
    }

    /// Validates declaration-level invariants.
    pub fn validate(&self) -> Result<(), RepositoryDeclarationError> {
        if !is_valid_type_name(&self.name) {
            return Err(RepositoryDeclarationError::Descriptor(
                DescriptorError::InvalidTypeName(self.name.clone()),
            ));
        }

        let mut seen = BTreeSet::<&str>::new();
        for fragment in &self.fragments {
            if !is_valid_type_name(&fragment.name) {
                return Err(RepositoryDeclarationError::Descriptor(
                    DescriptorError::InvalidTypeName(fragment.name.clone()),
                ));
            }
            if fragment.methods.is_empty() {
                return Err(RepositoryDeclarationError::EmptyFragment(
                    fragment.name.clone(),
                ));
            }
            if !seen.insert(fragment.name.as_str()) {
                return Err(RepositoryDeclarationError::DuplicateFragment(
                    fragment.name.clone(),
                ));
            }
        }

        if let Some(name) = &self.component_name_override {
            if !is_valid_component_name(name) {
                return Err(RepositoryDeclarationError::Descriptor(
                    DescriptorError::InvalidComponentName(name.clone()),
                ));
            }
        }
        Ok(())
    }
}

/// Repository declaration validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepositoryDeclarationError {
    Descriptor(DescriptorError),
    DuplicateFragment(String),
    EmptyFragment(String),
}

impl Display for RepositoryDeclarationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Descriptor(err) => write!(f, "{err}"),
            Self::DuplicateFragment(name) => {
                write!(f, "fragment interface declared twice: {name}")
            }
            Self::EmptyFragment(name) => {
                write!(f, "fragment interface declares no methods: {name}")
            }
        }
    }
}

impl Error for RepositoryDeclarationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Descriptor(err) => Some(err),
            Self::DuplicateFragment(_) | Self::EmptyFragment(_) => None,
        }
    }
}

impl From<DescriptorError> for RepositoryDeclarationError {
    fn from(value: DescriptorError) -> Self {
        Self::Descriptor(value)
    }
}
