//! Structured Data statement extraction
//!
//! Turns a raw `wbgetentities` response into per-property value lists for
//! the first declared entity. Extraction follows a partial-result policy:
//! a malformed property is dropped with a logged warning, everything else
//! is kept.

use crate::types::ItemMetadata;
use tracing::{debug, warn};

/// Extract statements from a raw entities response.
///
/// For each property key, collects the `mainsnak.datavalue.value` of every
/// entry that has one. Entries without a datavalue (novalue/somevalue
/// snaks) are skipped; a property whose entry list is not an array is
/// dropped entirely.
pub fn extract_statements(raw: &serde_json::Value) -> ItemMetadata {
    let mut parsed = ItemMetadata::new();

    let Some(entities) = raw.get("entities").and_then(|v| v.as_object()) else {
        warn!("Statements response has no entities object");
        return parsed;
    };

    let Some((entity_id, entity)) = entities.iter().next() else {
        debug!("Statements response declares no entities");
        return parsed;
    };

    let Some(statements) = entity.get("statements").and_then(|v| v.as_object()) else {
        debug!("Entity {} carries no statements", entity_id);
        return parsed;
    };

    for (property, entries) in statements {
        let Some(entries) = entries.as_array() else {
            warn!(
                "Skipping malformed statement list for property {} on {}",
                property, entity_id
            );
            continue;
        };

        let values: Vec<serde_json::Value> = entries
            .iter()
            .filter_map(|entry| entry.pointer("/mainsnak/datavalue/value").cloned())
            .collect();

        parsed.insert(property.clone(), values);
    }

    parsed
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_response() -> serde_json::Value {
        json!({
            "entities": {
                "M12345": {
                    "statements": {
                        "P180": [
                            { "mainsnak": { "datavalue": { "value": { "id": "Q5113" } } } },
                            { "mainsnak": { "datavalue": { "value": { "id": "Q25349" } } } }
                        ],
                        "P571": [
                            { "mainsnak": { "datavalue": { "value": "+1885-00-00T00:00:00Z" } } }
                        ]
                    }
                }
            }
        })
    }

    #[test]
    fn test_extracts_values_per_property() {
        let parsed = extract_statements(&sample_response());

        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed["P180"].len(), 2);
        assert_eq!(parsed["P180"][0]["id"], "Q5113");
        assert_eq!(parsed["P571"][0], "+1885-00-00T00:00:00Z");
    }

    #[test]
    fn test_entries_without_datavalue_are_skipped() {
        let raw = json!({
            "entities": {
                "M1": {
                    "statements": {
                        "P180": [
                            { "mainsnak": { "snaktype": "novalue" } },
                            { "mainsnak": { "datavalue": { "value": "kept" } } }
                        ]
                    }
                }
            }
        });

        let parsed = extract_statements(&raw);
        assert_eq!(parsed["P180"], vec![json!("kept")]);
    }

    #[test]
    fn test_malformed_property_dropped_rest_kept() {
        let raw = json!({
            "entities": {
                "M1": {
                    "statements": {
                        "P180": { "not": "an array" },
                        "P571": [
                            { "mainsnak": { "datavalue": { "value": "kept" } } }
                        ]
                    }
                }
            }
        });

        let parsed = extract_statements(&raw);
        assert!(!parsed.contains_key("P180"));
        assert_eq!(parsed["P571"].len(), 1);
    }

    #[test]
    fn test_missing_entities_yields_empty_metadata() {
        assert!(extract_statements(&json!({})).is_empty());
        assert!(extract_statements(&json!({ "entities": {} })).is_empty());
    }

    #[test]
    fn test_entity_without_statements_yields_empty_metadata() {
        let raw = json!({ "entities": { "M1": {} } });
        assert!(extract_statements(&raw).is_empty());
    }
}
