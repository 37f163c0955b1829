//! Implementation locator.
//!
//! # Responsibility
//! - Find every candidate implementation matching the naming convention
//!   `<FragmentInterfaceName><namingPostfix>` inside the search scope.
//!
//! # Invariants
//! - Side-effect free and idempotent: repeated calls with the same inputs
//!   return the same ordered candidate list.
//! - An empty result is not an error here; missing-implementation handling
//!   belongs to the ambiguity resolver.

use crate::container::{scope_contains, ComponentContainer};
use crate::model::fragment::{FragmentInterface, ImplementationCandidate};

/// Returns the conventional implementation type name for a fragment.
pub fn conventional_type_name(fragment_name: &str, naming_postfix: &str) -> String {
    format!("{fragment_name}{naming_postfix}")
}

/// Locates candidate implementations for one fragment interface.
///
/// The container is queried by conventional type name and scope; results are
/// re-filtered here so the locator contract holds even for containers with a
/// looser lookup, then sorted for deterministic downstream resolution.
pub fn locate(
    container: &dyn ComponentContainer,
    fragment: &FragmentInterface,
    naming_postfix: &str,
    search_scope: &str,
) -> Vec<ImplementationCandidate> {
    let expected_type = conventional_type_name(&fragment.name, naming_postfix);
    let mut candidates: Vec<ImplementationCandidate> = container
        .find_by_type_and_scope(&expected_type, search_scope)
        .into_iter()
        .filter(|candidate| candidate.type_name == expected_type)
        .filter(|candidate| scope_contains(search_scope, &candidate.package))
        .collect();

    candidates.sort_by(|a, b| {
        a.assigned_name()
            .cmp(&b.assigned_name())
            .then_with(|| a.package.cmp(&b.package))
    });
    candidates
}
