//! Composition builder and immutable composition model.
//!
//! # Responsibility
//! - Order resolved fragments deterministically (custom, then aspects, then
//!   the base implementation) and precompute the method dispatch table.
//! - Detect resolution problems at build time so misconfiguration fails at
//!   startup, not during request handling.
//!
//! # Invariants
//! - Every method in the repository's transitive surface maps to exactly one
//!   provider; first match in precedence order wins.
//! - A `Composition` never mutates after construction; rebuilding means
//!   discarding and constructing a new one.

use crate::model::fragment::{MethodSignature, ResolvedFragment};
use crate::model::repository::RepositoryInterface;
use crate::provider::FragmentProvider;
use std::collections::{BTreeMap, BTreeSet};
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::sync::Arc;
use uuid::Uuid;

/// Precedence tier of one composed provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FragmentRole {
    /// Declared custom fragment; highest precedence.
    Custom,
    /// Technology-provided aspect fragment.
    Aspect,
    /// Base CRUD implementation; always last.
    Base,
}

impl FragmentRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Custom => "custom",
            Self::Aspect => "aspect",
            Self::Base => "base",
        }
    }
}

/// One provider slot in the ordered composition roster.
#[derive(Clone)]
pub struct BoundProvider {
    pub role: FragmentRole,
    /// Fragment interface name, or the repository name for the base slot.
    pub fragment_name: String,
    /// Assigned component name of the backing implementation.
    pub component_name: String,
    /// Methods this slot serves in the dispatch table.
    pub methods: BTreeSet<MethodSignature>,
    /// Shared component instance.
    pub provider: Arc<dyn FragmentProvider>,
}

impl Debug for BoundProvider {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundProvider")
            .field("role", &self.role)
            .field("fragment_name", &self.fragment_name)
            .field("component_name", &self.component_name)
            .field("methods", &self.methods)
            .finish_non_exhaustive()
    }
}

/// Immutable ordered composition with a precomputed dispatch table.
pub struct Composition {
    id: Uuid,
    repository_name: String,
    roster: Vec<BoundProvider>,
    method_map: BTreeMap<MethodSignature, usize>,
}

impl Composition {
    /// Stable identity used for log correlation.
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn repository_name(&self) -> &str {
        &self.repository_name
    }

    /// Ordered provider roster: custom fragments, aspects, base.
    pub fn roster(&self) -> &[BoundProvider] {
        &self.roster
    }

    /// Returns the provider bound to `method`, when the signature belongs to
    /// the repository surface.
    pub fn provider_for(&self, method: &MethodSignature) -> Option<&BoundProvider> {
        self.method_map
            .get(method)
            .and_then(|index| self.roster.get(*index))
    }

    /// Sorted transitive method surface of the repository.
    pub fn surface(&self) -> Vec<&MethodSignature> {
        self.method_map.keys().collect()
    }

    pub fn method_count(&self) -> usize {
        self.method_map.len()
    }
}

impl Debug for Composition {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Composition")
            .field("id", &self.id)
            .field("repository_name", &self.repository_name)
            .field("roster", &self.roster)
            .field("method_count", &self.method_map.len())
            .finish()
    }
}

/// Composition build errors, fatal at setup time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompositionError {
    /// A resolved implementation does not serve a method its fragment
    /// interface declares.
    UndeclaredMethod {
        fragment: String,
        component_name: String,
        method: MethodSignature,
    },
    /// Strict mode only: two fragments in the same precedence tier declare
    /// the same signature.
    DuplicateMethod {
        method: MethodSignature,
        first_fragment: String,
        second_fragment: String,
    },
}

impl Display for CompositionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UndeclaredMethod {
                fragment,
                component_name,
                method,
            } => write!(
                f,
                "implementation `{component_name}` does not declare {method} required by fragment interface {fragment}"
            ),
            Self::DuplicateMethod {
                method,
                first_fragment,
                second_fragment,
            } => write!(
                f,
                "method {method} declared by both {first_fragment} and {second_fragment} in the same precedence tier"
            ),
        }
    }
}

impl Error for CompositionError {}

/// Builds immutable compositions from resolved fragments.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompositionBuilder {
    strict_collisions: bool,
}

impl CompositionBuilder {
    pub fn new(strict_collisions: bool) -> Self {
        Self { strict_collisions }
    }

    /// Builds the ordered composition and dispatch table.
    ///
    /// Ordering is fixed: `custom_fragments` in declaration order, then
    /// `aspects` sorted by fragment interface name (the stable aspect-tier
    /// order), then `base` last. The base slot serves every method the base
    /// provider declares; fragment slots serve exactly their interface
    /// methods.
    pub fn build(
        &self,
        repository: &RepositoryInterface,
        custom_fragments: Vec<ResolvedFragment>,
        aspects: Vec<ResolvedFragment>,
        base: Arc<dyn FragmentProvider>,
    ) -> Result<Composition, CompositionError> {
        let mut roster = Vec::with_capacity(custom_fragments.len() + aspects.len() + 1);

        self.push_tier(&mut roster, FragmentRole::Custom, custom_fragments)?;

        let mut ordered_aspects = aspects;
        ordered_aspects.sort_by(|a, b| a.interface.name.cmp(&b.interface.name));
        self.push_tier(&mut roster, FragmentRole::Aspect, ordered_aspects)?;

        roster.push(BoundProvider {
            role: FragmentRole::Base,
            fragment_name: repository.name.clone(),
            component_name: "base".to_string(),
            methods: base.declared_methods().into_iter().collect(),
            provider: base,
        });

        let mut method_map = BTreeMap::new();
        for (index, slot) in roster.iter().enumerate() {
            for method in &slot.methods {
                // First match wins; later tiers never override earlier ones.
                method_map.entry(method.clone()).or_insert(index);
            }
        }

        Ok(Composition {
            id: Uuid::new_v4(),
            repository_name: repository.name.clone(),
            roster,
            method_map,
        })
    }

    fn push_tier(
        &self,
        roster: &mut Vec<BoundProvider>,
        role: FragmentRole,
        fragments: Vec<ResolvedFragment>,
    ) -> Result<(), CompositionError> {
        let mut tier_methods = BTreeMap::<MethodSignature, String>::new();

        for resolved in fragments {
            let served: BTreeSet<MethodSignature> =
                resolved.candidate.provider.declared_methods().into_iter().collect();
            for method in &resolved.interface.methods {
                if !served.contains(method) {
                    return Err(CompositionError::UndeclaredMethod {
                        fragment: resolved.interface.name.clone(),
                        component_name: resolved.candidate.assigned_name(),
                        method: method.clone(),
                    });
                }
                if self.strict_collisions {
                    if let Some(first) = tier_methods.get(method) {
                        return Err(CompositionError::DuplicateMethod {
                            method: method.clone(),
                            first_fragment: first.clone(),
                            second_fragment: resolved.interface.name.clone(),
                        });
                    }
                    tier_methods.insert(method.clone(), resolved.interface.name.clone());
                }
            }

            roster.push(BoundProvider {
                role,
                fragment_name: resolved.interface.name.clone(),
                component_name: resolved.candidate.assigned_name(),
                methods: resolved.interface.methods.clone(),
                provider: Arc::clone(&resolved.candidate.provider),
            });
        }
        Ok(())
    }
}
