//! Ambiguity resolver.
//!
//! # Responsibility
//! - Reduce a located candidate set to exactly one implementation per
//!   fragment interface, or fail with a diagnosable error.
//!
//! # Invariants
//! - Resolution is deterministic for a given candidate set and override
//!   state; container iteration order never influences the outcome.
//! - Ambiguity errors enumerate every candidate plus the expected name that
//!   failed to match uniquely.

use crate::model::fragment::{
    decapitalize, FragmentInterface, ImplementationCandidate, ResolvedFragment,
};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ResolveResult<T> = Result<T, ResolveError>;

/// Fragment resolution errors, all fatal at composition-setup time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// No candidate satisfied the naming convention for a required fragment.
    MissingImplementation { fragment: String },
    /// Multiple candidates remained and expected-name matching did not pick
    /// exactly one.
    AmbiguousImplementation {
        fragment: String,
        expected_name: String,
        candidates: Vec<String>,
    },
}

impl Display for ResolveError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingImplementation { fragment } => {
                write!(f, "no implementation found for fragment interface: {fragment}")
            }
            Self::AmbiguousImplementation {
                fragment,
                expected_name,
                candidates,
            } => write!(
                f,
                "ambiguous implementation for fragment interface {fragment}: expected component name `{expected_name}`, candidates: [{}]",
                candidates.join(", ")
            ),
        }
    }
}

impl Error for ResolveError {}

/// Computes the expected component name used for disambiguation.
///
/// Default: decapitalized fragment interface name plus the naming postfix.
/// A declared override replaces the decapitalized interface name, letting two
/// identically named implementation types in different scopes be told apart
/// without code changes.
pub fn expected_component_name(
    fragment_name: &str,
    naming_postfix: &str,
    override_name: Option<&str>,
) -> String {
    match override_name {
        Some(name) => format!("{name}{naming_postfix}"),
        None => format!("{}{naming_postfix}", decapitalize(fragment_name)),
    }
}

/// Resolves one fragment interface to exactly one candidate.
pub fn resolve(
    fragment: &FragmentInterface,
    candidates: Vec<ImplementationCandidate>,
    naming_postfix: &str,
    override_name: Option<&str>,
) -> ResolveResult<ResolvedFragment> {
    if candidates.is_empty() {
        return Err(ResolveError::MissingImplementation {
            fragment: fragment.name.clone(),
        });
    }
    if candidates.len() == 1 {
        let candidate = candidates
            .into_iter()
            .next()
            .ok_or(ResolveError::MissingImplementation {
                fragment: fragment.name.clone(),
            })?;
        return Ok(ResolvedFragment::new(fragment.clone(), candidate));
    }

    let expected = expected_component_name(&fragment.name, naming_postfix, override_name);
    let mut matched: Vec<ImplementationCandidate> = candidates
        .iter()
        .filter(|candidate| candidate.assigned_name() == expected)
        .cloned()
        .collect();

    if matched.len() == 1 {
        let candidate = matched.remove(0);
        return Ok(ResolvedFragment::new(fragment.clone(), candidate));
    }

    Err(ResolveError::AmbiguousImplementation {
        fragment: fragment.name.clone(),
        expected_name: expected,
        candidates: candidates
            .iter()
            .map(|candidate| {
                format!(
                    "{} (name={})",
                    candidate.qualified_type_name(),
                    candidate.assigned_name()
                )
            })
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::{expected_component_name, resolve, ResolveError};
    use crate::model::fragment::{FragmentInterface, ImplementationCandidate, MethodSignature};
    use crate::provider::{CallArgs, CallValue, FragmentProvider, ProviderResult};
    use std::sync::Arc;

    struct NoopProvider;

    impl FragmentProvider for NoopProvider {
        fn declared_methods(&self) -> Vec<MethodSignature> {
            vec![]
        }

        fn invoke(&self, _method: &MethodSignature, _args: CallArgs) -> ProviderResult<CallValue> {
            Ok(CallValue::Null)
        }
    }

    fn fragment() -> FragmentInterface {
        FragmentInterface::new(
            "CustomizedUserRepository",
            [MethodSignature::new("custom_find", 1)],
        )
    }

    fn candidate(package: &str) -> ImplementationCandidate {
        ImplementationCandidate::new(
            "CustomizedUserRepositoryImpl",
            "CustomizedUserRepository",
            package,
            Arc::new(NoopProvider),
        )
    }

    #[test]
    fn expected_name_uses_decapitalized_interface_name() {
        assert_eq!(
            expected_component_name("CustomizedUserRepository", "Impl", None),
            "customizedUserRepositoryImpl"
        );
    }

    #[test]
    fn expected_name_uses_declared_override() {
        assert_eq!(
            expected_component_name("CustomizedUserRepository", "Impl", Some("specialCustom")),
            "specialCustomImpl"
        );
    }

    #[test]
    fn zero_candidates_is_missing_implementation() {
        let err = resolve(&fragment(), vec![], "Impl", None)
            .expect_err("empty candidate set must fail");
        assert_eq!(
            err,
            ResolveError::MissingImplementation {
                fragment: "CustomizedUserRepository".to_string()
            }
        );
    }

    #[test]
    fn single_candidate_resolves_trivially() {
        let resolved = resolve(&fragment(), vec![candidate("com.acme.user")], "Impl", None)
            .expect("single candidate should resolve");
        assert_eq!(resolved.candidate.package, "com.acme.user");
        assert_eq!(resolved.interface.name, "CustomizedUserRepository");
    }

    #[test]
    fn convention_match_wins_among_multiple_candidates() {
        let candidates = vec![
            candidate("com.acme.user"),
            candidate("com.acme.other").with_explicit_name("specialCustomImpl"),
        ];
        let resolved = resolve(&fragment(), candidates, "Impl", None)
            .expect("default expected name should match once");
        assert_eq!(
            resolved.candidate.assigned_name(),
            "customizedUserRepositoryImpl"
        );
    }

    #[test]
    fn override_redirects_expected_name() {
        let candidates = vec![
            candidate("com.acme.user"),
            candidate("com.acme.other").with_explicit_name("specialCustomImpl"),
        ];
        let resolved = resolve(&fragment(), candidates, "Impl", Some("specialCustom"))
            .expect("override expected name should match the explicit candidate");
        assert_eq!(resolved.candidate.assigned_name(), "specialCustomImpl");
        assert_eq!(resolved.candidate.package, "com.acme.other");
    }

    #[test]
    fn unmatched_expected_name_is_ambiguous_and_enumerates_candidates() {
        let candidates = vec![
            candidate("com.acme.user").with_explicit_name("firstImpl"),
            candidate("com.acme.other").with_explicit_name("secondImpl"),
        ];
        let err = resolve(&fragment(), candidates, "Impl", None)
            .expect_err("no candidate matches the expected name");
        match err {
            ResolveError::AmbiguousImplementation {
                fragment,
                expected_name,
                candidates,
            } => {
                assert_eq!(fragment, "CustomizedUserRepository");
                assert_eq!(expected_name, "customizedUserRepositoryImpl");
                assert_eq!(candidates.len(), 2);
                assert!(candidates[0].contains("firstImpl"));
                assert!(candidates[1].contains("secondImpl"));
            }
            other => panic!("expected ambiguity, got {other:?}"),
        }
    }

    #[test]
    fn multiple_expected_name_matches_are_ambiguous() {
        // Two containers can each hold a convention-named candidate; merged
        // candidate sets then carry the same assigned name twice.
        let candidates = vec![candidate("com.acme.user"), candidate("com.acme.admin")];
        let err = resolve(&fragment(), candidates, "Impl", None)
            .expect_err("two expected-name matches must fail");
        match err {
            ResolveError::AmbiguousImplementation {
                expected_name,
                candidates,
                ..
            } => {
                assert_eq!(expected_name, "customizedUserRepositoryImpl");
                assert_eq!(candidates.len(), 2);
            }
            other => panic!("expected ambiguity, got {other:?}"),
        }
    }

    #[test]
    fn resolution_is_deterministic_across_candidate_order() {
        let forward = vec![
            candidate("com.acme.user"),
            candidate("com.acme.other").with_explicit_name("specialCustomImpl"),
        ];
        let reversed = vec![
            candidate("com.acme.other").with_explicit_name("specialCustomImpl"),
            candidate("com.acme.user"),
        ];

        let first = resolve(&fragment(), forward, "Impl", None).expect("forward order");
        let second = resolve(&fragment(), reversed, "Impl", None).expect("reversed order");
        assert_eq!(first.candidate, second.candidate);
    }
}
