//! Field classification
//!
//! Resolves a filter field name to the storage representation it targets.
//! Rules are applied in order: reserved collection fields, the reserved
//! parent field, configured top-level columns, then JSON metadata paths.

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;

use super::operator::FieldClass;
use crate::domain::FilterError;

/// Field names that address the collection membership array
pub const COLLECTION_FIELDS: &[&str] = &["collection_ids", "collection_id"];

/// Column backing the collection membership fields
pub const COLLECTION_COLUMN: &str = "collection_ids";

/// Field name of the parent reference column
pub const PARENT_FIELD: &str = "parent_id";

/// Default JSON metadata column
pub const DEFAULT_JSON_COLUMN: &str = "metadata";

/// Columns treated as plain columns when the caller configures none
pub const DEFAULT_TOP_LEVEL_COLUMNS: &[&str] = &[
    "id",
    "document_id",
    "chunk_id",
    "owner_id",
    "user_id",
    "status",
    "type",
    "title",
    "name",
    "description",
    "text",
    "created_at",
    "updated_at",
    "ingestion_status",
    "extraction_status",
    "version",
    "size_in_bytes",
];

static DEFAULT_COLUMN_SET: Lazy<BTreeSet<String>> = Lazy::new(|| {
    DEFAULT_TOP_LEVEL_COLUMNS
        .iter()
        .map(|c| c.to_string())
        .collect()
});

static IDENTIFIER_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap());

/// Whether `name` can be emitted unquoted as a SQL identifier
pub fn is_valid_identifier(name: &str) -> bool {
    IDENTIFIER_PATTERN.is_match(name)
}

/// A field name resolved to its class and SQL target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedField {
    pub class: FieldClass,
    /// Column expression the condition is built on
    pub column: String,
    /// Path below the JSON column (MetadataPath only)
    pub path: Vec<String>,
}

#[derive(Debug, Clone, Copy)]
pub struct FieldClassifier<'a> {
    top_level_columns: &'a BTreeSet<String>,
    json_column: &'a str,
}

impl<'a> FieldClassifier<'a> {
    /// An empty column set falls back to [`DEFAULT_TOP_LEVEL_COLUMNS`]
    pub fn new(top_level_columns: &'a BTreeSet<String>, json_column: &'a str) -> Self {
        let top_level_columns = if top_level_columns.is_empty() {
            &*DEFAULT_COLUMN_SET
        } else {
            top_level_columns
        };
        Self {
            top_level_columns,
            json_column,
        }
    }

    pub fn json_column(&self) -> &'a str {
        self.json_column
    }

    pub fn classify(&self, field: &str) -> Result<ClassifiedField, FilterError> {
        if COLLECTION_FIELDS.contains(&field) {
            return Ok(ClassifiedField {
                class: FieldClass::ArrayMembership,
                column: COLLECTION_COLUMN.to_string(),
                path: Vec::new(),
            });
        }

        if field == PARENT_FIELD {
            return Ok(ClassifiedField {
                class: FieldClass::HierarchicalReference,
                column: PARENT_FIELD.to_string(),
                path: Vec::new(),
            });
        }

        let first_segment = field.split('.').next().unwrap_or(field);

        if first_segment != self.json_column && self.top_level_columns.contains(first_segment) {
            if !field.split('.').all(is_valid_identifier) {
                return Err(FilterError::invalid_field(field));
            }
            return Ok(ClassifiedField {
                class: FieldClass::StandardColumn,
                column: field.to_string(),
                path: Vec::new(),
            });
        }

        let relative = match field.strip_prefix(self.json_column) {
            Some("") => "",
            Some(rest) => match rest.strip_prefix('.') {
                Some(path) if !path.is_empty() => path,
                Some(_) => return Err(FilterError::invalid_field(field)),
                None => field,
            },
            None => field,
        };

        let path: Vec<String> = if relative.is_empty() {
            Vec::new()
        } else {
            relative.split('.').map(str::to_string).collect()
        };

        if path.iter().any(|segment| segment.is_empty()) {
            return Err(FilterError::invalid_field(field));
        }

        Ok(ClassifiedField {
            class: FieldClass::MetadataPath,
            column: self.json_column.to_string(),
            path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns() -> BTreeSet<String> {
        DEFAULT_TOP_LEVEL_COLUMNS
            .iter()
            .map(|c| c.to_string())
            .collect()
    }

    #[test]
    fn test_reserved_fields() {
        let cols = columns();
        let classifier = FieldClassifier::new(&cols, "metadata");

        let collection = classifier.classify("collection_id").unwrap();
        assert_eq!(collection.class, FieldClass::ArrayMembership);
        assert_eq!(collection.column, "collection_ids");

        let parent = classifier.classify("parent_id").unwrap();
        assert_eq!(parent.class, FieldClass::HierarchicalReference);
    }

    #[test]
    fn test_empty_column_set_uses_defaults() {
        let cols = BTreeSet::new();
        let classifier = FieldClassifier::new(&cols, "metadata");

        let field = classifier.classify("status").unwrap();
        assert_eq!(field.class, FieldClass::StandardColumn);
        assert_eq!(field.column, "status");
        assert_eq!(
            classifier.classify("topic").unwrap().class,
            FieldClass::MetadataPath
        );
    }

    #[test]
    fn test_standard_column() {
        let cols = columns();
        let classifier = FieldClassifier::new(&cols, "metadata");

        let field = classifier.classify("status").unwrap();
        assert_eq!(field.class, FieldClass::StandardColumn);
        assert_eq!(field.column, "status");

        let dotted = classifier.classify("id.value").unwrap();
        assert_eq!(dotted.class, FieldClass::StandardColumn);
        assert_eq!(dotted.column, "id.value");
    }

    #[test]
    fn test_standard_column_rejects_unsafe_names() {
        let cols = columns();
        let classifier = FieldClassifier::new(&cols, "metadata");

        assert!(matches!(
            classifier.classify("id.x; DROP TABLE t"),
            Err(FilterError::InvalidField { .. })
        ));
    }

    #[test]
    fn test_metadata_paths() {
        let cols = columns();
        let classifier = FieldClassifier::new(&cols, "metadata");

        let plain = classifier.classify("score").unwrap();
        assert_eq!(plain.class, FieldClass::MetadataPath);
        assert_eq!(plain.column, "metadata");
        assert_eq!(plain.path, vec!["score"]);

        let prefixed = classifier.classify("metadata.author.name").unwrap();
        assert_eq!(prefixed.path, vec!["author", "name"]);

        let whole = classifier.classify("metadata").unwrap();
        assert_eq!(whole.class, FieldClass::MetadataPath);
        assert!(whole.path.is_empty());

        let lookalike = classifier.classify("metadatax.a").unwrap();
        assert_eq!(lookalike.path, vec!["metadatax", "a"]);
    }

    #[test]
    fn test_json_column_wins_over_top_level_columns() {
        let mut cols = columns();
        cols.insert("attrs".to_string());
        let classifier = FieldClassifier::new(&cols, "attrs");

        let field = classifier.classify("attrs.kind").unwrap();
        assert_eq!(field.class, FieldClass::MetadataPath);
        assert_eq!(field.column, "attrs");
        assert_eq!(field.path, vec!["kind"]);
    }

    #[test]
    fn test_empty_segments_rejected() {
        let cols = columns();
        let classifier = FieldClassifier::new(&cols, "metadata");
        assert!(classifier.classify("a..b").is_err());
        assert!(classifier.classify("metadata.").is_err());
    }

    #[test]
    fn test_is_valid_identifier() {
        assert!(is_valid_identifier("metadata"));
        assert!(is_valid_identifier("_private1"));
        assert!(!is_valid_identifier("1abc"));
        assert!(!is_valid_identifier("a-b"));
        assert!(!is_valid_identifier(""));
    }
}
