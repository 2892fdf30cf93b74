//! Tri-state attribute values and static field descriptors.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// An attribute slot on a resource snapshot.
///
/// `Unset` means the control plane has not reported the attribute yet;
/// `Null` means it reported the attribute as explicitly empty.
///
/// Use it with `#[serde(default, skip_serializing_if = "Field::is_unset")]`:
/// a missing key deserializes to `Unset`, `null` to `Null`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Field<T> {
    /// Not yet known.
    Unset,
    /// Known to be empty.
    Null,
    /// Known value.
    Value(T),
}

impl<T> Default for Field<T> {
    fn default() -> Self {
        Self::Unset
    }
}

impl<T> Field<T> {
    #[must_use]
    pub fn is_unset(&self) -> bool {
        matches!(self, Self::Unset)
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn is_value(&self) -> bool {
        matches!(self, Self::Value(_))
    }

    /// Returns the value if one is known.
    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Value(v) => Some(v),
            Self::Unset | Self::Null => None,
        }
    }

    pub fn into_value(self) -> Option<T> {
        match self {
            Self::Value(v) => Some(v),
            Self::Unset | Self::Null => None,
        }
    }

    pub fn as_ref(&self) -> Field<&T> {
        match self {
            Self::Unset => Field::Unset,
            Self::Null => Field::Null,
            Self::Value(v) => Field::Value(v),
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Field<U> {
        match self {
            Self::Unset => Field::Unset,
            Self::Null => Field::Null,
            Self::Value(v) => Field::Value(f(v)),
        }
    }

    /// Overwrites `self` with `newer` unless `newer` is `Unset`.
    pub fn merge(&mut self, newer: Self) {
        if !newer.is_unset() {
            *self = newer;
        }
    }
}

impl<T> From<T> for Field<T> {
    fn from(value: T) -> Self {
        Self::Value(value)
    }
}

impl<T> From<Option<T>> for Field<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Self::Value)
    }
}

impl<T: Serialize> Serialize for Field<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Value(v) => v.serialize(serializer),
            // Unset is normally skipped by the containing struct.
            Self::Unset | Self::Null => serializer.serialize_none(),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Field<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Option::<T>::deserialize(deserializer)?.map_or(Self::Null, Self::Value))
    }
}

/// Static description of one resource attribute.
///
/// Tables of these are generated at build time from the resource schemas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// snake_case attribute name used on the Rust side.
    pub name: &'static str,
    /// PascalCase key used in control-plane payloads.
    pub wire_name: &'static str,
    /// Rust type of the attribute, as written in the schema.
    pub rust_type: &'static str,
    /// Must be present in a create request.
    pub required: bool,
    /// May be changed by an update request after creation.
    pub updatable: bool,
}

/// Finds a descriptor by either its attribute name or its wire name.
pub fn lookup_field(table: &'static [FieldDescriptor], key: &str) -> Option<&'static FieldDescriptor> {
    table.iter().find(|d| d.name == key || d.wire_name == key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, Serialize, Deserialize, PartialEq)]
    #[serde(rename_all = "PascalCase")]
    struct Snapshot {
        #[serde(default, skip_serializing_if = "Field::is_unset")]
        failure_reason: Field<String>,
        #[serde(default, skip_serializing_if = "Field::is_unset")]
        billable_time_in_seconds: Field<u64>,
    }

    #[test]
    fn test_missing_key_is_unset_and_null_is_null() {
        let snap: Snapshot = serde_json::from_str(r#"{"FailureReason": null}"#).unwrap();
        assert!(snap.failure_reason.is_null());
        assert!(snap.billable_time_in_seconds.is_unset());
    }

    #[test]
    fn test_value_deserializes() {
        let snap: Snapshot = serde_json::from_str(r#"{"BillableTimeInSeconds": 42}"#).unwrap();
        assert_eq!(snap.billable_time_in_seconds, Field::Value(42));
        assert_eq!(snap.billable_time_in_seconds.value(), Some(&42));
    }

    #[test]
    fn test_unset_is_skipped_and_null_is_written() {
        let snap = Snapshot { failure_reason: Field::Null, billable_time_in_seconds: Field::Unset };
        let json = serde_json::to_value(&snap).unwrap();
        assert_eq!(json, serde_json::json!({"FailureReason": null}));
    }

    #[test]
    fn test_merge_keeps_known_values_when_newer_is_unset() {
        let mut current = Field::Value("arn:1".to_string());
        current.merge(Field::Unset);
        assert_eq!(current, Field::Value("arn:1".to_string()));

        current.merge(Field::Null);
        assert!(current.is_null());
    }

    #[test]
    fn test_lookup_by_name_or_wire_name() {
        static TABLE: &[FieldDescriptor] = &[FieldDescriptor {
            name: "role_arn",
            wire_name: "RoleArn",
            rust_type: "String",
            required: true,
            updatable: false,
        }];

        assert!(lookup_field(TABLE, "role_arn").is_some());
        assert!(lookup_field(TABLE, "RoleArn").is_some());
        assert!(lookup_field(TABLE, "Nope").is_none());
    }
}
