use chrono::{DateTime, SecondsFormat, Utc};
use sagekit_abstraction::Payload;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortBy {
    Name,
    CreationTime,
    Status,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// Filter parameters accepted by list operations.
///
/// Unset filters are omitted from the request entirely.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListFilters {
    pub creation_time_after: Option<DateTime<Utc>>,
    pub creation_time_before: Option<DateTime<Utc>>,
    pub last_modified_time_after: Option<DateTime<Utc>>,
    pub last_modified_time_before: Option<DateTime<Utc>>,
    pub name_contains: Option<String>,
    pub status_equals: Option<String>,
    pub sort_by: Option<SortBy>,
    pub sort_order: Option<SortOrder>,
    /// Page size requested from the control plane.
    pub max_results: Option<u32>,
}

impl ListFilters {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn created_after(mut self, at: DateTime<Utc>) -> Self {
        self.creation_time_after = Some(at);
        self
    }

    #[must_use]
    pub fn modified_after(mut self, at: DateTime<Utc>) -> Self {
        self.last_modified_time_after = Some(at);
        self
    }

    #[must_use]
    pub fn modified_before(mut self, at: DateTime<Utc>) -> Self {
        self.last_modified_time_before = Some(at);
        self
    }

    #[must_use]
    pub fn name_contains(mut self, fragment: impl Into<String>) -> Self {
        self.name_contains = Some(fragment.into());
        self
    }

    #[must_use]
    pub fn status_equals(mut self, status: impl Into<String>) -> Self {
        self.status_equals = Some(status.into());
        self
    }

    #[must_use]
    pub fn max_results(mut self, page_size: u32) -> Self {
        self.max_results = Some(page_size);
        self
    }

    /// Builds the filter part of a list request.
    pub fn to_payload(&self) -> Payload {
        let mut payload = Payload::new();
        let mut time = |key: &str, value: Option<DateTime<Utc>>| {
            if let Some(at) = value {
                payload.insert(key.to_string(), at.to_rfc3339_opts(SecondsFormat::Secs, true).into());
            }
        };
        time("CreationTimeAfter", self.creation_time_after);
        time("CreationTimeBefore", self.creation_time_before);
        time("LastModifiedTimeAfter", self.last_modified_time_after);
        time("LastModifiedTimeBefore", self.last_modified_time_before);

        if let Some(fragment) = &self.name_contains {
            payload.insert("NameContains".to_string(), fragment.clone().into());
        }
        if let Some(status) = &self.status_equals {
            payload.insert("StatusEquals".to_string(), status.clone().into());
        }
        if let Some(sort_by) = self.sort_by {
            payload.insert("SortBy".to_string(), serde_json::to_value(sort_by).unwrap_or_default());
        }
        if let Some(order) = self.sort_order {
            payload.insert("SortOrder".to_string(), serde_json::to_value(order).unwrap_or_default());
        }
        if let Some(max) = self.max_results {
            payload.insert("MaxResults".to_string(), max.into());
        }
        payload
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_empty_filters_produce_empty_payload() {
        assert!(ListFilters::new().to_payload().is_empty());
    }

    #[test]
    fn test_filters_use_wire_keys() {
        let after = Utc.with_ymd_and_hms(2026, 10, 1, 0, 0, 0).unwrap();
        let filters = ListFilters {
            sort_by: Some(SortBy::CreationTime),
            sort_order: Some(SortOrder::Descending),
            ..ListFilters::new().created_after(after).name_contains("xgboost").max_results(2)
        };

        let payload = filters.to_payload();
        assert_eq!(payload.get("CreationTimeAfter"), Some(&json!("2026-10-01T00:00:00Z")));
        assert_eq!(payload.get("NameContains"), Some(&json!("xgboost")));
        assert_eq!(payload.get("SortBy"), Some(&json!("CreationTime")));
        assert_eq!(payload.get("SortOrder"), Some(&json!("Descending")));
        assert_eq!(payload.get("MaxResults"), Some(&json!(2)));
        assert!(payload.get("StatusEquals").is_none());
    }
}
