use serde_json::json;
use std::sync::Arc;
use stitch_core::{
    CallArgs, CallValue, ComposeError, CompositionConfig, FragmentInterface, FragmentProvider,
    FragmentRole, ImplementationCandidate, InMemoryComponentContainer, MethodSignature,
    ProviderResult, RepositoryComposer, RepositoryInterface, ResolveError, ResolvedFragment,
};
use stitch_core::{CompositionError, EntityMetadata};

struct ScriptedProvider {
    label: &'static str,
    methods: Vec<MethodSignature>,
}

impl ScriptedProvider {
    fn new(label: &'static str, methods: impl IntoIterator<Item = MethodSignature>) -> Arc<Self> {
        Arc::new(Self {
            label,
            methods: methods.into_iter().collect(),
        })
    }
}

impl FragmentProvider for ScriptedProvider {
    fn declared_methods(&self) -> Vec<MethodSignature> {
        self.methods.clone()
    }

    fn invoke(&self, method: &MethodSignature, args: CallArgs) -> ProviderResult<CallValue> {
        Ok(json!({
            "served_by": self.label,
            "method": method.to_string(),
            "args": args,
        }))
    }
}

fn sig(name: &str, arity: usize) -> MethodSignature {
    MethodSignature::new(name, arity)
}

fn composer() -> RepositoryComposer {
    RepositoryComposer::new(CompositionConfig::for_scope("com.acme")).unwrap()
}

fn user_repository() -> RepositoryInterface {
    RepositoryInterface::new("UserRepository", EntityMetadata::new("User", "id"))
}

#[test]
fn single_convention_candidate_resolves_and_binds_its_methods() {
    let mut container = InMemoryComponentContainer::new();
    container
        .register(ImplementationCandidate::new(
            "CustomizedUserRepositoryImpl",
            "CustomizedUserRepository",
            "com.acme.user",
            ScriptedProvider::new("custom", [sig("custom_find", 1)]),
        ))
        .unwrap();

    let repository = user_repository().with_fragment(FragmentInterface::new(
        "CustomizedUserRepository",
        [sig("custom_find", 1)],
    ));

    let handle = composer()
        .compose(&container, &repository, vec![], None)
        .unwrap();
    assert_eq!(
        handle.provider_name_for(&sig("custom_find", 1)),
        Some("customizedUserRepositoryImpl")
    );

    let result = handle
        .invoke(&sig("custom_find", 1), vec![json!("u-1")])
        .unwrap();
    assert_eq!(result["served_by"], "custom");
}

#[test]
fn multiple_candidates_resolve_by_expected_component_name() {
    let mut container = InMemoryComponentContainer::new();
    container
        .register(ImplementationCandidate::new(
            "CustomizedUserRepositoryImpl",
            "CustomizedUserRepository",
            "com.acme.user",
            ScriptedProvider::new("first", [sig("custom_find", 1)]),
        ))
        .unwrap();
    // Same type name in a sibling package; explicit name avoids the
    // container-level duplicate, but both still satisfy the convention.
    container
        .register(
            ImplementationCandidate::new(
                "CustomizedUserRepositoryImpl",
                "CustomizedUserRepository",
                "com.acme.admin",
                ScriptedProvider::new("second", [sig("custom_find", 1)]),
            )
            .with_explicit_name("adminVariantImpl"),
        )
        .unwrap();
    container
        .register(
            ImplementationCandidate::new(
                "CustomizedUserRepositoryImpl",
                "CustomizedUserRepository",
                "com.acme.support",
                ScriptedProvider::new("third", [sig("custom_find", 1)]),
            )
            .with_explicit_name("supportVariantImpl"),
        )
        .unwrap();

    let repository = user_repository().with_fragment(FragmentInterface::new(
        "CustomizedUserRepository",
        [sig("custom_find", 1)],
    ));

    // Three candidates, exactly one matching the default expected name:
    // resolution still succeeds deterministically.
    let handle = composer()
        .compose(&container, &repository, vec![], None)
        .unwrap();
    assert_eq!(
        handle.provider_name_for(&sig("custom_find", 1)),
        Some("customizedUserRepositoryImpl")
    );
}

#[test]
fn no_candidate_matching_expected_name_enumerates_all_candidates() {
    let mut container = InMemoryComponentContainer::new();
    for (package, name) in [
        ("com.acme.user", "firstVariantImpl"),
        ("com.acme.admin", "secondVariantImpl"),
    ] {
        container
            .register(
                ImplementationCandidate::new(
                    "CustomizedUserRepositoryImpl",
                    "CustomizedUserRepository",
                    package,
                    ScriptedProvider::new("variant", [sig("custom_find", 1)]),
                )
                .with_explicit_name(name),
            )
            .unwrap();
    }

    let repository = user_repository().with_fragment(FragmentInterface::new(
        "CustomizedUserRepository",
        [sig("custom_find", 1)],
    ));

    let err = composer()
        .compose(&container, &repository, vec![], None)
        .unwrap_err();
    match err {
        ComposeError::Resolve(ResolveError::AmbiguousImplementation {
            fragment,
            expected_name,
            candidates,
        }) => {
            assert_eq!(fragment, "CustomizedUserRepository");
            assert_eq!(expected_name, "customizedUserRepositoryImpl");
            assert_eq!(candidates.len(), 2);
        }
        other => panic!("expected ambiguity, got {other:?}"),
    }
}

#[test]
fn declared_override_selects_explicitly_named_candidate_in_other_scope() {
    let mut container = InMemoryComponentContainer::new();
    container
        .register(ImplementationCandidate::new(
            "CustomizedUserRepositoryImpl",
            "CustomizedUserRepository",
            "com.acme.user",
            ScriptedProvider::new("in_scope", [sig("custom_find", 1)]),
        ))
        .unwrap();
    // The explicitly named candidate lives outside the search scope; only
    // the container name lookup can reach it.
    container
        .register(
            ImplementationCandidate::new(
                "CustomizedUserRepositoryImpl",
                "CustomizedUserRepository",
                "org.plugins.user",
                ScriptedProvider::new("special", [sig("custom_find", 1)]),
            )
            .with_explicit_name("specialCustomImpl"),
        )
        .unwrap();

    let repository = user_repository()
        .with_fragment(FragmentInterface::new(
            "CustomizedUserRepository",
            [sig("custom_find", 1)],
        ))
        .with_component_name_override("specialCustom");

    let handle = composer()
        .compose(&container, &repository, vec![], None)
        .unwrap();
    assert_eq!(
        handle.provider_name_for(&sig("custom_find", 1)),
        Some("specialCustomImpl")
    );

    let result = handle
        .invoke(&sig("custom_find", 1), vec![json!("u-1")])
        .unwrap();
    assert_eq!(result["served_by"], "special");
}

#[test]
fn fragment_save_override_beats_base_save() {
    let mut container = InMemoryComponentContainer::new();
    container
        .register(ImplementationCandidate::new(
            "CustomizedSaveImpl",
            "CustomizedSave",
            "com.acme.user",
            ScriptedProvider::new("custom_save", [sig("save", 1)]),
        ))
        .unwrap();

    let repository = user_repository()
        .with_fragment(FragmentInterface::new("CustomizedSave", [sig("save", 1)]));

    let handle = composer()
        .compose(&container, &repository, vec![], None)
        .unwrap();

    let slot = handle
        .composition()
        .provider_for(&sig("save", 1))
        .unwrap();
    assert_eq!(slot.role, FragmentRole::Custom);
    assert_eq!(slot.fragment_name, "CustomizedSave");

    // The rest of the base surface still falls through to the base slot.
    let base_slot = handle
        .composition()
        .provider_for(&sig("find_by_id", 1))
        .unwrap();
    assert_eq!(base_slot.role, FragmentRole::Base);
}

#[test]
fn every_surface_method_binds_to_earliest_declaring_provider() {
    let mut container = InMemoryComponentContainer::new();
    container
        .register(ImplementationCandidate::new(
            "CustomizedUserRepositoryImpl",
            "CustomizedUserRepository",
            "com.acme.user",
            ScriptedProvider::new("custom", [sig("custom_find", 1), sig("count", 0)]),
        ))
        .unwrap();

    let aspect = ResolvedFragment::new(
        FragmentInterface::new("AuditAspect", [sig("count", 0), sig("touch", 1)]),
        ImplementationCandidate::new(
            "AuditAspectImpl",
            "AuditAspect",
            "com.acme.audit",
            ScriptedProvider::new("aspect", [sig("count", 0), sig("touch", 1)]),
        ),
    );

    let repository = user_repository().with_fragment(FragmentInterface::new(
        "CustomizedUserRepository",
        [sig("custom_find", 1), sig("count", 0)],
    ));

    let handle = composer()
        .compose(&container, &repository, vec![aspect], None)
        .unwrap();
    let composition = handle.composition();

    for method in composition.surface() {
        let slot = composition.provider_for(method).unwrap();
        // No earlier slot in the roster may also declare the method.
        let bound_index = composition
            .roster()
            .iter()
            .position(|entry| std::ptr::eq(entry, slot))
            .unwrap();
        for earlier in &composition.roster()[..bound_index] {
            assert!(
                !earlier.methods.contains(method),
                "{method} bound to {} but {} declares it earlier",
                slot.fragment_name,
                earlier.fragment_name
            );
        }
    }

    // count/0 is declared by custom, aspect, and base; custom wins.
    assert_eq!(
        composition.provider_for(&sig("count", 0)).unwrap().role,
        FragmentRole::Custom
    );
    // touch/1 only exists on the aspect tier.
    assert_eq!(
        composition.provider_for(&sig("touch", 1)).unwrap().role,
        FragmentRole::Aspect
    );
}

#[test]
fn strict_mode_fails_same_tier_collisions_at_setup() {
    let mut container = InMemoryComponentContainer::new();
    for fragment_name in ["ExportFragment", "ReportFragment"] {
        container
            .register(ImplementationCandidate::new(
                format!("{fragment_name}Impl"),
                fragment_name,
                "com.acme.user",
                ScriptedProvider::new("collider", [sig("render", 1)]),
            ))
            .unwrap();
    }

    let repository = user_repository()
        .with_fragment(FragmentInterface::new("ExportFragment", [sig("render", 1)]))
        .with_fragment(FragmentInterface::new("ReportFragment", [sig("render", 1)]));

    let strict = RepositoryComposer::new(
        CompositionConfig::for_scope("com.acme").with_strict_collisions(),
    )
    .unwrap();
    let err = strict
        .compose(&container, &repository, vec![], None)
        .unwrap_err();
    assert!(matches!(
        err,
        ComposeError::Composition(CompositionError::DuplicateMethod { .. })
    ));

    // Lenient policy applies declaration-order precedence instead.
    let handle = composer()
        .compose(&container, &repository, vec![], None)
        .unwrap();
    assert_eq!(
        handle
            .composition()
            .provider_for(&sig("render", 1))
            .unwrap()
            .fragment_name,
        "ExportFragment"
    );
}

#[test]
fn alternate_naming_postfix_drives_discovery() {
    let mut container = InMemoryComponentContainer::new();
    container
        .register(ImplementationCandidate::new(
            "CustomizedUserRepositoryAdapter",
            "CustomizedUserRepository",
            "com.acme.user",
            ScriptedProvider::new("adapter", [sig("custom_find", 1)]),
        ))
        .unwrap();

    let repository = user_repository().with_fragment(FragmentInterface::new(
        "CustomizedUserRepository",
        [sig("custom_find", 1)],
    ));

    // Default postfix finds nothing.
    let err = composer()
        .compose(&container, &repository, vec![], None)
        .unwrap_err();
    assert!(matches!(
        err,
        ComposeError::Resolve(ResolveError::MissingImplementation { .. })
    ));

    let adapter_composer = RepositoryComposer::new(
        CompositionConfig::for_scope("com.acme").with_naming_postfix("Adapter"),
    )
    .unwrap();
    let handle = adapter_composer
        .compose(&container, &repository, vec![], None)
        .unwrap();
    assert_eq!(
        handle.provider_name_for(&sig("custom_find", 1)),
        Some("customizedUserRepositoryAdapter")
    );
}
