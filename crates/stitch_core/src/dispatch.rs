//! Dispatch proxy over an immutable composition.
//!
//! # Responsibility
//! - Route each invocation to the provider the composition bound for the
//!   method signature, forwarding arguments untouched.
//!
//! # Invariants
//! - Pure routing: no retries, no result caching, no mutable state beyond
//!   the shared composition reference.
//! - Provider failures propagate unchanged; an unbound signature is a fatal
//!   contract violation, never expected in correct operation.

use crate::compose::Composition;
use crate::model::fragment::MethodSignature;
use crate::provider::{CallArgs, CallValue, ProviderError};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use uuid::Uuid;

pub type DispatchResult<T> = Result<T, DispatchError>;

/// Dispatch-time errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// The signature is absent from the composition's dispatch table. Means
    /// the composition was built against a different interface.
    UnboundMethod {
        repository: String,
        method: MethodSignature,
    },
    /// Failure reported by the invoked provider, carried unchanged.
    Provider(ProviderError),
}

impl Display for DispatchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnboundMethod { repository, method } => {
                write!(f, "method {method} is not bound on repository {repository}")
            }
            Self::Provider(err) => write!(f, "{err}"),
        }
    }
}

impl Error for DispatchError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::UnboundMethod { .. } => None,
            Self::Provider(err) => Some(err),
        }
    }
}

impl From<ProviderError> for DispatchError {
    fn from(value: ProviderError) -> Self {
        Self::Provider(value)
    }
}

/// The composed repository object handed to callers.
///
/// Holds the composition behind an `Arc`; cloning the handle shares the same
/// immutable dispatch table, so concurrent invocation needs no locking.
#[derive(Debug, Clone)]
pub struct RepositoryHandle {
    composition: Arc<Composition>,
}

impl RepositoryHandle {
    pub fn new(composition: Composition) -> Self {
        Self {
            composition: Arc::new(composition),
        }
    }

    pub fn composition(&self) -> &Composition {
        &self.composition
    }

    /// Composition identity, for log correlation.
    pub fn composition_id(&self) -> Uuid {
        self.composition.id()
    }

    /// Returns the component name serving `method`, when bound.
    pub fn provider_name_for(&self, method: &MethodSignature) -> Option<&str> {
        self.composition
            .provider_for(method)
            .map(|slot| slot.component_name.as_str())
    }

    /// Routes one invocation to the bound provider.
    pub fn invoke(&self, method: &MethodSignature, args: CallArgs) -> DispatchResult<CallValue> {
        let Some(slot) = self.composition.provider_for(method) else {
            return Err(DispatchError::UnboundMethod {
                repository: self.composition.repository_name().to_string(),
                method: method.clone(),
            });
        };
        slot.provider.invoke(method, args).map_err(DispatchError::from)
    }
}
