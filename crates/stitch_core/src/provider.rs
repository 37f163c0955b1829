//! Fragment provider invocation contract.
//!
//! # Responsibility
//! - Define the object-safe call surface every composable component exposes.
//! - Keep argument/result encoding uniform across providers so dispatch can
//!   forward calls without knowing the implementation.
//!
//! # Invariants
//! - Providers are shared, immutable handles; invocation must be safe from
//!   multiple threads.
//! - Provider failures carry stable codes and cross the dispatch boundary
//!   unchanged.

use crate::model::fragment::MethodSignature;
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Positional call arguments forwarded verbatim by the dispatch proxy.
pub type CallArgs = Vec<Value>;

/// Dynamic call result value.
pub type CallValue = Value;

pub type ProviderResult<T> = Result<T, ProviderError>;

/// Opaque provider failure.
///
/// Dispatch never wraps or rewrites these; whatever the provider reports is
/// what the caller sees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderError {
    /// Stable machine-readable code, e.g. `missing_id`.
    pub code: String,
    /// Human-readable failure description.
    pub message: String,
}

impl ProviderError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

impl Display for ProviderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "provider error [{}]: {}", self.code, self.message)
    }
}

impl Error for ProviderError {}

/// Call surface implemented by every composable component: custom fragment
/// implementations, technology aspects, and base repositories alike.
pub trait FragmentProvider: Send + Sync {
    /// Returns every method signature this provider can serve.
    fn declared_methods(&self) -> Vec<MethodSignature>;

    /// Executes one method with positional arguments.
    ///
    /// Implementations should reject signatures they do not declare with a
    /// provider error rather than panicking.
    fn invoke(&self, method: &MethodSignature, args: CallArgs) -> ProviderResult<CallValue>;
}
