//! CLI smoke entry point.
//!
//! # Responsibility
//! - Compose a small demo repository to verify `stitch_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

use serde_json::json;
use std::error::Error;
use std::sync::Arc;
use stitch_core::{
    CallArgs, CallValue, CompositionConfig, EntityMetadata, FragmentInterface, FragmentProvider,
    ImplementationCandidate, InMemoryComponentContainer, MethodSignature, ProviderResult,
    RepositoryComposer, RepositoryHandle, RepositoryInterface,
};

struct GreetingFragment;

impl FragmentProvider for GreetingFragment {
    fn declared_methods(&self) -> Vec<MethodSignature> {
        vec![MethodSignature::new("greet", 1)]
    }

    fn invoke(&self, _method: &MethodSignature, args: CallArgs) -> ProviderResult<CallValue> {
        let name = args
            .first()
            .and_then(|value| value.as_str())
            .unwrap_or("world");
        Ok(json!(format!("hello, {name}")))
    }
}

fn compose_demo() -> Result<RepositoryHandle, Box<dyn Error>> {
    let mut container = InMemoryComponentContainer::new();
    container.register(ImplementationCandidate::new(
        "GreetingRepositoryImpl",
        "GreetingRepository",
        "demo.greeting",
        Arc::new(GreetingFragment),
    ))?;

    let repository = RepositoryInterface::new("UserRepository", EntityMetadata::new("User", "id"))
        .with_fragment(FragmentInterface::new(
            "GreetingRepository",
            [MethodSignature::new("greet", 1)],
        ));

    let composer = RepositoryComposer::new(CompositionConfig::for_scope("demo"))?;
    let handle = composer.compose(&container, &repository, vec![], None)?;
    Ok(handle)
}

fn main() {
    println!("stitch_core ping={}", stitch_core::ping());
    println!("stitch_core version={}", stitch_core::core_version());

    let handle = match compose_demo() {
        Ok(handle) => handle,
        Err(err) => {
            eprintln!("demo composition failed: {err}");
            std::process::exit(1);
        }
    };

    let composition = handle.composition();
    println!("repository={}", composition.repository_name());
    for method in composition.surface() {
        if let Some(slot) = composition.provider_for(method) {
            println!(
                "bind {method} -> {} role={}",
                slot.component_name,
                slot.role.as_str()
            );
        }
    }

    match handle.invoke(&MethodSignature::new("greet", 1), vec![json!("stitch")]) {
        Ok(result) => println!("greet(stitch)={result}"),
        Err(err) => {
            eprintln!("dispatch failed: {err}");
            std::process::exit(1);
        }
    }
}
