//! Traits that describe a remotely-managed resource type to the lifecycle client.

use crate::error::{ResourceError, ResourceResult};
use sagekit_abstraction::{lookup_field, Field, FieldDescriptor, Payload};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::{Debug, Display};

/// Control-plane operation names for one resource type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationNames {
    pub create: &'static str,
    pub describe: &'static str,
    pub list: &'static str,
    pub update: &'static str,
    pub stop: &'static str,
    pub delete: &'static str,
}

/// Static description of a resource type, generated from `schema/*.toml`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceSchema {
    /// Resource type name (e.g. "TrainingJob").
    pub type_name: &'static str,
    /// Wire key of the unique name.
    pub identifier: &'static str,
    /// Wire key of the ARN returned on creation.
    pub arn: &'static str,
    /// Wire key of the lifecycle status.
    pub status: &'static str,
    /// Wire key of the failure reason reported on a failed status.
    pub failure_reason: &'static str,
    /// Wire key holding the items of a list response.
    pub list_key: &'static str,
    pub operations: OperationNames,
    pub fields: &'static [FieldDescriptor],
}

impl ResourceSchema {
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&'static FieldDescriptor> {
        lookup_field(self.fields, key)
    }

    pub fn required_fields(&self) -> impl Iterator<Item = &'static FieldDescriptor> {
        self.fields.iter().filter(|f| f.required)
    }

    pub fn updatable_fields(&self) -> impl Iterator<Item = &'static FieldDescriptor> {
        self.fields.iter().filter(|f| f.updatable)
    }

    /// Checks a serialized create payload against the required entries of the field table.
    pub fn check_required(&self, payload: &Payload) -> ResourceResult<()> {
        let missing: Vec<&str> = self
            .required_fields()
            .filter(|f| match payload.get(f.wire_name) {
                None | Some(serde_json::Value::Null) => true,
                Some(serde_json::Value::String(s)) => s.trim().is_empty(),
                Some(_) => false,
            })
            .map(|f| f.wire_name)
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ResourceError::InvalidSpec(format!(
                "{} is missing required fields: {}",
                self.type_name,
                missing.join(", ")
            )))
        }
    }
}

/// Lifecycle status enum owned and advanced by the control plane.
pub trait LifecycleStatus: Clone + Debug + Display + PartialEq + Send + Sync {
    /// No further transition happens without explicit recreation.
    fn is_terminal(&self) -> bool;

    /// Terminal state that must be surfaced as a failure.
    fn is_failed(&self) -> bool;
}

/// Snapshot struct generated per resource type.
pub trait ResourceSnapshot:
    Serialize + DeserializeOwned + Default + Clone + Debug + Send + Sync
{
    /// Looks up an attribute by snake_case name or wire name.
    ///
    /// `Ok(None)` means the name is not in the field table.
    fn attribute(&self, key: &str) -> ResourceResult<Option<Field<serde_json::Value>>>;

    /// Field-wise merge: attributes `Unset` in `newer` keep their current value.
    fn merge(&mut self, newer: Self);
}

/// Lightweight list item.
pub trait ResourceSummary: DeserializeOwned + Clone + Debug + Send {
    fn name(&self) -> &str;
}

/// A resource type the lifecycle client can manage.
pub trait ResourceKind: Send + Sync + 'static {
    type Snapshot: ResourceSnapshot;
    type Summary: ResourceSummary;
    type Status: LifecycleStatus;
    type CreateSpec: Serialize + Debug;

    fn schema() -> &'static ResourceSchema;

    /// Unique name the spec will create.
    fn create_name(spec: &Self::CreateSpec) -> &str;

    /// Deep validation of a creation spec, run before any remote call.
    fn validate_create(spec: &Self::CreateSpec) -> ResourceResult<()>;

    fn status(snapshot: &Self::Snapshot) -> Option<&Self::Status>;

    fn failure_reason(snapshot: &Self::Snapshot) -> Option<&str>;

    /// Finer-grained progress for logging while waiting.
    fn progress_detail(_snapshot: &Self::Snapshot) -> Option<String> {
        None
    }
}

/// Converts a typed field into its JSON attribute form.
///
/// A value that fails to serialize is an error, never a `Null`.
pub fn to_attribute<T: Serialize>(field: &Field<T>) -> ResourceResult<Field<serde_json::Value>> {
    Ok(match field {
        Field::Unset => Field::Unset,
        Field::Null => Field::Null,
        Field::Value(v) => Field::Value(serde_json::to_value(v)?),
    })
}

/// A partial specification for an update call, keyed by attribute name.
///
/// Keys may be snake_case attribute names or wire names; both are resolved
/// against the resource's field table before anything is sent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeUpdate {
    values: BTreeMap<String, serde_json::Value>,
}

impl AttributeUpdate {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets an attribute to a new value.
    pub fn set<V: Serialize>(mut self, key: impl Into<String>, value: V) -> ResourceResult<Self> {
        self.values.insert(key.into(), serde_json::to_value(value)?);
        Ok(self)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Resolves every key against `schema` and builds the wire payload.
    ///
    /// Fails on empty updates, unknown attributes, and attributes the
    /// control plane does not allow to change after creation.
    pub fn to_payload(&self, schema: &ResourceSchema) -> ResourceResult<Payload> {
        if self.values.is_empty() {
            return Err(ResourceError::InvalidUpdate(format!(
                "update for {} sets no attributes",
                schema.type_name
            )));
        }

        let mut payload = Payload::new();
        for (key, value) in &self.values {
            let descriptor = schema.field(key).ok_or_else(|| {
                ResourceError::InvalidUpdate(format!("{} has no attribute {key}", schema.type_name))
            })?;
            if !descriptor.updatable {
                return Err(ResourceError::InvalidUpdate(format!(
                    "{}.{} is immutable after creation",
                    schema.type_name, descriptor.wire_name
                )));
            }
            payload.insert(descriptor.wire_name.to_string(), value.clone());
        }
        Ok(payload)
    }
}
