//! Field projections and list request parameters.
//!
//! Each entity has a static table mapping its public field names to the
//! storage fields of its envelope document. List requests name public
//! fields; the store is queried with the matching storage fields and the
//! resulting rows are keyed by public name again.

use tracing::debug;

use crate::codec::entities::fields;
use crate::codec::envelope::ID_FIELD;
use crate::model::Document;

/// Public field name of the identity, always part of a projection.
pub const ID: &str = "id";

/// `(public name, storage field)` pairs of one entity.
pub type FieldTable = &'static [(&'static str, &'static str)];

pub const STRUCTURE_FIELDS: FieldTable = &[(ID, ID_FIELD), ("elements", fields::ELEMENTS)];

pub const COMPUTATION_FIELDS: FieldTable = &[
    (ID, ID_FIELD),
    ("structureId", fields::STRUCTURE_ID),
    ("elementName", fields::ELEMENT_NAME),
    ("expression", fields::EXPRESSION),
    ("status", fields::STATUS),
    ("result", fields::RESULT),
];

/// Parsed `ids` and `fields` parameters of a list request.
///
/// Empty `ids` selects every row; empty `fields` selects every field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub ids: Vec<String>,
    pub fields: Vec<String>,
}

impl ListQuery {
    pub fn new(ids: Vec<String>, fields: Vec<String>) -> Self {
        Self { ids, fields }
    }

    /// Builds a query from raw comma-separated parameters.
    pub fn parse(ids: Option<&str>, fields: Option<&str>) -> Self {
        Self {
            ids: ids.map(parse_ids).unwrap_or_default(),
            fields: fields.map(parse_fields).unwrap_or_default(),
        }
    }
}

/// Splits a comma-separated id list, dropping empty segments and repeats.
pub fn parse_ids(raw: &str) -> Vec<String> {
    split_list(raw)
}

/// Splits a comma-separated field list, dropping empty segments and repeats.
pub fn parse_fields(raw: &str) -> Vec<String> {
    split_list(raw)
}

fn split_list(raw: &str) -> Vec<String> {
    let mut values: Vec<String> = Vec::new();
    for segment in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        if !values.iter().any(|v| v == segment) {
            values.push(segment.to_string());
        }
    }
    values
}

/// The table entries selected by `requested` public names.
///
/// The id entry is always first. Unknown names are skipped. An empty
/// request selects the whole table.
pub fn select(table: FieldTable, requested: &[String]) -> Vec<(&'static str, &'static str)> {
    if requested.is_empty() {
        return table.to_vec();
    }

    for name in requested {
        if !table.iter().any(|(public, _)| public == name) {
            debug!(field = %name, "ignoring unknown projection field");
        }
    }

    table
        .iter()
        .filter(|(public, _)| *public == ID || requested.iter().any(|r| r == public))
        .copied()
        .collect()
}

/// Storage fields to fetch for `requested` public names.
pub fn projection(table: FieldTable, requested: &[String]) -> Vec<&'static str> {
    select(table, requested)
        .into_iter()
        .map(|(_, storage)| storage)
        .collect()
}

/// Re-keys a stored document by public field name.
///
/// Only the `selected` entries are copied, and only when the document
/// carries them.
pub fn to_row(document: &Document, selected: &[(&'static str, &'static str)]) -> Document {
    selected
        .iter()
        .filter_map(|(public, storage)| {
            document
                .get(storage)
                .map(|value| (*public, value.clone()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Bson;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_lists() {
        assert_eq!(parse_ids("a,b,,a, c ,"), strings(&["a", "b", "c"]));
        assert!(parse_ids("").is_empty());
        assert!(parse_fields(",,").is_empty());
        assert_eq!(parse_fields("status,id,status"), strings(&["status", "id"]));
    }

    #[test]
    fn test_list_query_parse() {
        let query = ListQuery::parse(Some("x,y"), None);
        assert_eq!(query.ids, strings(&["x", "y"]));
        assert!(query.fields.is_empty());
        assert_eq!(ListQuery::parse(None, None), ListQuery::default());
    }

    #[test]
    fn test_projection_always_has_id() {
        assert_eq!(
            projection(COMPUTATION_FIELDS, &strings(&["status"])),
            vec!["_id", "status"]
        );
        assert_eq!(
            projection(COMPUTATION_FIELDS, &strings(&["result", "nope", "structureId"])),
            vec!["_id", "structureId", "result"]
        );
        assert_eq!(projection(STRUCTURE_FIELDS, &strings(&["id"])), vec!["_id"]);
        assert_eq!(projection(STRUCTURE_FIELDS, &[]), vec!["_id", "elements"]);
    }

    #[test]
    fn test_to_row_uses_public_names() {
        let mut stored = Document::new();
        stored.insert("_id", "c-1");
        stored.insert("_version", 2i32);
        stored.insert("structureId", "s-1");
        stored.insert("status", "NEW");

        let selected = select(COMPUTATION_FIELDS, &strings(&["structureId", "result"]));
        let row = to_row(&stored, &selected);
        assert_eq!(row.keys().collect::<Vec<_>>(), vec!["id", "structureId"]);
        assert_eq!(row.get("id"), Some(&Bson::from("c-1")));
    }
}
