//! Schema index fields for the client-side resource store.
//!
//! The store indexes schemas by normalized id and group. Those index fields
//! are derived values: adding or removing them produces a new `Schema` and
//! leaves the input untouched.

use serde::{Deserialize, Serialize};

/// A resource type schema as served by the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Schema {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<SchemaAttributes>,
    /// Normalized id, present only on indexed schemas.
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub index_id: Option<String>,
    /// Normalized group, present only on indexed schemas.
    #[serde(rename = "_group", default, skip_serializing_if = "Option::is_none")]
    pub index_group: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SchemaAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
}

/// Normalize a type name for lookups: trimmed and lowercased.
pub fn normalize_type(ty: Option<&str>) -> String {
    ty.unwrap_or_default().trim().to_lowercase()
}

/// Normalized schema id.
pub fn schema_id(schema: &Schema) -> String {
    normalize_type(Some(schema.id.as_str()))
}

/// Normalized schema group; empty for core types.
pub fn schema_group(schema: &Schema) -> String {
    normalize_type(
        schema
            .attributes
            .as_ref()
            .and_then(|a| a.group.as_deref()),
    )
}

impl Schema {
    /// Copy of this schema with `_id` and `_group` populated.
    pub fn with_index_fields(&self) -> Schema {
        Schema {
            index_id: Some(schema_id(self)),
            index_group: Some(schema_group(self)),
            ..self.clone()
        }
    }

    /// Copy of this schema with `_id` and `_group` removed.
    pub fn without_index_fields(&self) -> Schema {
        Schema {
            index_id: None,
            index_group: None,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> Schema {
        Schema {
            id: " Rio.Cattle.io.v1.Service ".to_string(),
            attributes: Some(SchemaAttributes {
                group: Some("RIO.cattle.io".to_string()),
            }),
            ..Default::default()
        }
    }

    #[test]
    fn normalize_type_values() {
        assert_eq!(normalize_type(Some("Pod")), "pod");
        assert_eq!(normalize_type(Some("  apps.Deployment ")), "apps.deployment");
        assert_eq!(normalize_type(None), "");
    }

    #[test]
    fn index_fields_do_not_touch_input() {
        let original = schema();
        let indexed = original.with_index_fields();

        assert_eq!(indexed.index_id.as_deref(), Some("rio.cattle.io.v1.service"));
        assert_eq!(indexed.index_group.as_deref(), Some("rio.cattle.io"));
        assert_eq!(original.index_id, None);
        assert_eq!(original.index_group, None);

        let stripped = indexed.without_index_fields();
        assert_eq!(stripped, original);
        assert!(indexed.index_id.is_some());
    }

    #[test]
    fn missing_group_indexes_as_empty() {
        let s = Schema {
            id: "Pod".to_string(),
            ..Default::default()
        };
        assert_eq!(schema_group(&s), "");
        assert_eq!(s.with_index_fields().index_group.as_deref(), Some(""));
    }

    #[test]
    fn index_fields_serialize_with_underscore_names() {
        let json = serde_json::to_value(schema().with_index_fields()).unwrap();
        assert_eq!(json["_id"], "rio.cattle.io.v1.service");
        assert_eq!(json["_group"], "rio.cattle.io");

        let plain = serde_json::to_value(schema()).unwrap();
        assert!(plain.get("_id").is_none());
    }
}
