//! Default base repository implementation and its method surface.
//!
//! # Responsibility
//! - Define the CRUD surface every base implementation must expose.
//! - Provide the in-memory reference base used when no override is supplied.
//!
//! # Invariants
//! - A replacement base implementation must declare the same method surface
//!   and accept the same construction inputs (entity metadata plus a
//!   technology context); the composition builder cannot tell substitutes
//!   apart.
//! - Entity rows are keyed by the id attribute named in entity metadata.

use crate::model::fragment::MethodSignature;
use crate::model::repository::EntityMetadata;
use crate::provider::{CallArgs, CallValue, FragmentProvider, ProviderError, ProviderResult};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Mutex;

/// Base surface method name: persist one entity.
pub const METHOD_SAVE: &str = "save";
/// Base surface method name: fetch one entity by id.
pub const METHOD_FIND_BY_ID: &str = "find_by_id";
/// Base surface method name: fetch all entities.
pub const METHOD_FIND_ALL: &str = "find_all";
/// Base surface method name: id existence probe.
pub const METHOD_EXISTS_BY_ID: &str = "exists_by_id";
/// Base surface method name: entity count.
pub const METHOD_COUNT: &str = "count";
/// Base surface method name: delete one entity by id.
pub const METHOD_DELETE_BY_ID: &str = "delete_by_id";

/// Returns the method surface contract for base implementations.
pub fn base_method_surface() -> Vec<MethodSignature> {
    vec![
        MethodSignature::new(METHOD_SAVE, 1),
        MethodSignature::new(METHOD_FIND_BY_ID, 1),
        MethodSignature::new(METHOD_FIND_ALL, 0),
        MethodSignature::new(METHOD_EXISTS_BY_ID, 1),
        MethodSignature::new(METHOD_COUNT, 0),
        MethodSignature::new(METHOD_DELETE_BY_ID, 1),
    ]
}

/// Technology-specific construction context for base implementations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TechnologyContext {
    /// Persistence technology label, e.g. `in_memory`.
    pub technology: String,
    /// Free-form technology settings.
    pub settings: BTreeMap<String, String>,
}

impl TechnologyContext {
    pub fn new(technology: impl Into<String>) -> Self {
        Self {
            technology: technology.into(),
            settings: BTreeMap::new(),
        }
    }

    /// Context for the in-memory reference store.
    pub fn in_memory() -> Self {
        Self::new("in_memory")
    }
}

/// In-memory reference base repository over JSON entity values.
///
/// Concurrency: a single mutex guards the row map; base operations are
/// short-lived lookups/inserts, so contention stays in the store, never in
/// the dispatch layer.
pub struct InMemoryBaseRepository {
    metadata: EntityMetadata,
    context: TechnologyContext,
    rows: Mutex<BTreeMap<String, Value>>,
}

impl InMemoryBaseRepository {
    pub fn new(metadata: EntityMetadata, context: TechnologyContext) -> Self {
        Self {
            metadata,
            context,
            rows: Mutex::new(BTreeMap::new()),
        }
    }

    pub fn metadata(&self) -> &EntityMetadata {
        &self.metadata
    }

    pub fn technology(&self) -> &str {
        &self.context.technology
    }

    fn with_rows<T>(
        &self,
        operation: impl FnOnce(&mut BTreeMap<String, Value>) -> ProviderResult<T>,
    ) -> ProviderResult<T> {
        let mut rows = self.rows.lock().map_err(|_| {
            ProviderError::new(
                "store_poisoned",
                format!("entity store for {} is poisoned", self.metadata.entity_name),
            )
        })?;
        operation(&mut rows)
    }

    fn entity_key(&self, entity: &Value) -> ProviderResult<String> {
        let id = entity.get(&self.metadata.id_attribute).ok_or_else(|| {
            ProviderError::new(
                "missing_id",
                format!(
                    "entity {} has no `{}` attribute",
                    self.metadata.entity_name, self.metadata.id_attribute
                ),
            )
        })?;
        id_key(id)
    }
}

fn id_key(id: &Value) -> ProviderResult<String> {
    match id {
        Value::String(value) => Ok(value.clone()),
        Value::Number(value) => Ok(value.to_string()),
        other => Err(ProviderError::new(
            "invalid_id",
            format!("unsupported id value: {other}"),
        )),
    }
}

fn single_arg(method: &MethodSignature, mut args: CallArgs) -> ProviderResult<Value> {
    if args.len() != 1 {
        return Err(ProviderError::new(
            "invalid_arguments",
            format!("{method} expects 1 argument, got {}", args.len()),
        ));
    }
    Ok(args.remove(0))
}

fn no_args(method: &MethodSignature, args: &CallArgs) -> ProviderResult<()> {
    if !args.is_empty() {
        return Err(ProviderError::new(
            "invalid_arguments",
            format!("{method} expects no arguments, got {}", args.len()),
        ));
    }
    Ok(())
}

impl FragmentProvider for InMemoryBaseRepository {
    fn declared_methods(&self) -> Vec<MethodSignature> {
        base_method_surface()
    }

    fn invoke(&self, method: &MethodSignature, args: CallArgs) -> ProviderResult<CallValue> {
        match (method.name.as_str(), method.arity) {
            (METHOD_SAVE, 1) => {
                let entity = single_arg(method, args)?;
                let key = self.entity_key(&entity)?;
                self.with_rows(|rows| {
                    rows.insert(key, entity.clone());
                    Ok(entity)
                })
            }
            (METHOD_FIND_BY_ID, 1) => {
                let key = id_key(&single_arg(method, args)?)?;
                self.with_rows(|rows| Ok(rows.get(&key).cloned().unwrap_or(Value::Null)))
            }
            (METHOD_FIND_ALL, 0) => {
                no_args(method, &args)?;
                self.with_rows(|rows| Ok(Value::Array(rows.values().cloned().collect())))
            }
            (METHOD_EXISTS_BY_ID, 1) => {
                let key = id_key(&single_arg(method, args)?)?;
                self.with_rows(|rows| Ok(Value::Bool(rows.contains_key(&key))))
            }
            (METHOD_COUNT, 0) => {
                no_args(method, &args)?;
                self.with_rows(|rows| Ok(Value::from(rows.len() as u64)))
            }
            (METHOD_DELETE_BY_ID, 1) => {
                let key = id_key(&single_arg(method, args)?)?;
                self.with_rows(|rows| Ok(Value::Bool(rows.remove(&key).is_some())))
            }
            _ => Err(ProviderError::new(
                "unsupported_method",
                format!(
                    "base repository for {} does not declare {method}",
                    self.metadata.entity_name
                ),
            )),
        }
    }
}
