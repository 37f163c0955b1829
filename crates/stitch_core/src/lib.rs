//! Core composition logic for Stitch.
//! This crate is the single source of truth for fragment resolution and
//! dispatch invariants.

pub mod base;
pub mod compose;
pub mod composer;
pub mod config;
pub mod container;
pub mod dispatch;
pub mod locate;
pub mod logging;
pub mod model;
pub mod provider;
pub mod resolve;

pub use base::{base_method_surface, InMemoryBaseRepository, TechnologyContext};
pub use compose::{BoundProvider, Composition, CompositionBuilder, CompositionError, FragmentRole};
pub use composer::{ComposeError, ComposeResult, RepositoryComposer};
pub use config::{CompositionConfig, ConfigError, DEFAULT_NAMING_POSTFIX};
pub use container::{ComponentContainer, ContainerError, InMemoryComponentContainer};
pub use dispatch::{DispatchError, DispatchResult, RepositoryHandle};
pub use locate::locate;
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::fragment::{
    FragmentInterface, ImplementationCandidate, MethodSignature, ResolvedFragment,
};
pub use model::repository::{EntityMetadata, RepositoryInterface};
pub use provider::{CallArgs, CallValue, FragmentProvider, ProviderError, ProviderResult};
pub use resolve::{resolve, ResolveError, ResolveResult};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
