//! End-to-end repository composition facade.
//!
//! # Responsibility
//! - Run the locate -> resolve -> build pipeline for one repository
//!   declaration and hand back a dispatchable handle.
//! - Surface every resolution failure at setup time with structured log
//!   events.
//!
//! # Invariants
//! - Composition is a one-time, single-threaded setup phase per repository;
//!   independent repositories share no mutable state and may compose
//!   concurrently.
//! - The composer never mutates the container.

use crate::base::{InMemoryBaseRepository, TechnologyContext};
use crate::compose::{CompositionBuilder, CompositionError};
use crate::config::{CompositionConfig, ConfigError};
use crate::container::ComponentContainer;
use crate::dispatch::RepositoryHandle;
use crate::locate::locate;
use crate::model::fragment::ResolvedFragment;
use crate::model::repository::{RepositoryDeclarationError, RepositoryInterface};
use crate::provider::FragmentProvider;
use crate::resolve::{expected_component_name, resolve, ResolveError};
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

pub type ComposeResult<T> = Result<T, ComposeError>;

/// Any failure of the composition pipeline, all fatal at setup time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComposeError {
    Config(ConfigError),
    Declaration(RepositoryDeclarationError),
    Resolve(ResolveError),
    Composition(CompositionError),
}

impl Display for ComposeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(err) => write!(f, "{err}"),
            Self::Declaration(err) => write!(f, "{err}"),
            Self::Resolve(err) => write!(f, "{err}"),
            Self::Composition(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ComposeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Declaration(err) => Some(err),
            Self::Resolve(err) => Some(err),
            Self::Composition(err) => Some(err),
        }
    }
}

impl From<ConfigError> for ComposeError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<RepositoryDeclarationError> for ComposeError {
    fn from(value: RepositoryDeclarationError) -> Self {
        Self::Declaration(value)
    }
}

impl From<ResolveError> for ComposeError {
    fn from(value: ResolveError) -> Self {
        Self::Resolve(value)
    }
}

impl From<CompositionError> for ComposeError {
    fn from(value: CompositionError) -> Self {
        Self::Composition(value)
    }
}

/// Composes repository handles from declarations and a component container.
pub struct RepositoryComposer {
    config: CompositionConfig,
}

impl RepositoryComposer {
    /// Creates a composer after validating `config`.
    pub fn new(config: CompositionConfig) -> ComposeResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &CompositionConfig {
        &self.config
    }

    /// Composes one repository.
    ///
    /// `aspects` are the technology-provided aspect fragments, already bound
    /// to their implementations by the technology integration. When
    /// `base_override` is absent the in-memory reference base is constructed
    /// from the repository's entity metadata.
    pub fn compose(
        &self,
        container: &dyn ComponentContainer,
        repository: &RepositoryInterface,
        aspects: Vec<ResolvedFragment>,
        base_override: Option<Arc<dyn FragmentProvider>>,
    ) -> ComposeResult<RepositoryHandle> {
        repository.validate()?;

        let mut resolved = Vec::with_capacity(repository.fragments.len());
        for fragment in &repository.fragments {
            let mut candidates = locate(
                container,
                fragment,
                &self.config.naming_postfix,
                &self.config.search_scope,
            );

            // The override path goes through the container's name lookup, so
            // an explicitly named component outside the search scope can
            // still win.
            if let Some(override_name) = repository.component_name_override.as_deref() {
                let expected = expected_component_name(
                    &fragment.name,
                    &self.config.naming_postfix,
                    Some(override_name),
                );
                if let Some(candidate) = container.resolve_by_name(&expected) {
                    let already_listed = candidates
                        .iter()
                        .any(|known| known.assigned_name() == candidate.assigned_name());
                    if candidate.fragment_name == fragment.name && !already_listed {
                        candidates.push(candidate);
                    }
                }
            }

            match resolve(
                fragment,
                candidates,
                &self.config.naming_postfix,
                repository.component_name_override.as_deref(),
            ) {
                Ok(binding) => {
                    info!(
                        "event=fragment_resolved module=composer status=ok repository={} fragment={} component={}",
                        repository.name,
                        fragment.name,
                        binding.candidate.assigned_name()
                    );
                    resolved.push(binding);
                }
                Err(err) => {
                    error!(
                        "event=fragment_resolve_failed module=composer status=error repository={} fragment={} reason={err}",
                        repository.name, fragment.name
                    );
                    return Err(err.into());
                }
            }
        }

        let base: Arc<dyn FragmentProvider> = match base_override {
            Some(base) => base,
            None => Arc::new(InMemoryBaseRepository::new(
                repository.entity.clone(),
                TechnologyContext::in_memory(),
            )),
        };

        let builder = CompositionBuilder::new(self.config.strict_collisions);
        match builder.build(repository, resolved, aspects, base) {
            Ok(composition) => {
                info!(
                    "event=composition_built module=composer status=ok repository={} composition_id={} providers={} methods={}",
                    repository.name,
                    composition.id(),
                    composition.roster().len(),
                    composition.method_count()
                );
                Ok(RepositoryHandle::new(composition))
            }
            Err(err) => {
                error!(
                    "event=composition_build_failed module=composer status=error repository={} reason={err}",
                    repository.name
                );
                Err(err.into())
            }
        }
    }
}
