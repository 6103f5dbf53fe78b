#![allow(clippy::needless_pass_by_value)]

use schemars::schema_for;
use serde::Serialize;
use serde_json::Value;

use super::{IntentCategory, IntentInfo};

/// A registry entry: metadata + JSON schema for the options.
#[derive(Debug, Clone, Serialize)]
pub struct IntentRegistryEntry {
    pub name: &'static str,
    pub description: &'static str,
    pub category: IntentCategory,
    pub discovery: bool,
    pub link: bool,
    pub option_schema: Value,
}

pub(super) fn empty_object_schema() -> Value {
    serde_json::json!({ "type": "object", "properties": {} })
}

pub(super) fn schema_value<T: schemars::JsonSchema>() -> Value {
    let root = schema_for!(T);
    serde_json::to_value(root).unwrap_or(empty_object_schema())
}

pub(super) fn entry(info: IntentInfo, option_schema: Value) -> IntentRegistryEntry {
    IntentRegistryEntry {
        name: info.name,
        description: info.description,
        category: info.category,
        discovery: info.discovery,
        link: info.link,
        option_schema,
    }
}

pub(super) fn de<T: serde::de::DeserializeOwned>(input: &Value) -> Result<T, String> {
    // Hosts send `null` for intents without options.
    if input.is_null() {
        return serde_json::from_value(serde_json::json!({})).map_err(|e| e.to_string());
    }
    serde_json::from_value(input.clone()).map_err(|e| e.to_string())
}

/// The complete intent registry, auto-generated from option struct schemas.
pub fn intent_registry() -> Vec<IntentRegistryEntry> {
    super::Intent::registry_entries()
}

/// Help text for the CLI.
/// Three tiers: no topic → categories, category → intent list, intent → full schema.
pub fn help_text(topic: Option<&str>) -> String {
    let registry = intent_registry();

    match topic {
        None => {
            let mut lines = vec!["Available intent categories:".to_string()];
            for cat in IntentCategory::all() {
                let count = registry.iter().filter(|e| e.category == *cat).count();
                if count > 0 {
                    lines.push(format!("  {} ({count}): {}", cat.slug(), cat.description()));
                }
            }
            lines.push(String::new());
            lines.push("Use `help slide` to list intents in a category.".to_string());
            lines.push("Use `help slide_number` for option details.".to_string());
            lines.join("\n")
        }
        Some(topic) => {
            if let Some(entry) = registry.iter().find(|e| e.name == topic) {
                let schema_str = serde_json::to_string_pretty(&entry.option_schema)
                    .unwrap_or_else(|_| "{}".to_string());
                return format!(
                    "{}: {}\nCategory: {} | Transport: {}{}\n\nOptions:\n{}",
                    entry.name,
                    entry.description,
                    entry.category.slug(),
                    if entry.link { "link" } else { "socket" },
                    if entry.discovery { " (discovery)" } else { "" },
                    schema_str,
                );
            }

            let cat_lower = topic.to_lowercase();
            let matching: Vec<&IntentRegistryEntry> = registry
                .iter()
                .filter(|e| e.category.slug() == cat_lower)
                .collect();

            if matching.is_empty() {
                format!("Unknown topic: \"{topic}\". Use `help` to see categories.")
            } else {
                let mut lines = vec![format!("{topic} intents:")];
                for entry in &matching {
                    lines.push(format!("  - {}: {}", entry.name, entry.description));
                }
                lines.join("\n")
            }
        }
    }
}

/// JSON Schema formatted intent list (for the HTTP API).
pub fn to_json_schema() -> Value {
    Value::Array(
        intent_registry()
            .iter()
            .map(|e| {
                serde_json::json!({
                    "name": e.name,
                    "description": e.description,
                    "category": e.category,
                    "transport": if e.link { "link" } else { "socket" },
                    "discovery": e.discovery,
                    "inputSchema": e.option_schema,
                })
            })
            .collect(),
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn registry_names_are_unique() {
        let registry = intent_registry();
        let mut names: Vec<&str> = registry.iter().map(|e| e.name).collect();
        let total = names.len();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), total);
        assert!(total >= 30);
    }

    #[test]
    fn every_category_has_intents() {
        let registry = intent_registry();
        for cat in IntentCategory::all() {
            assert!(registry.iter().any(|e| e.category == *cat), "{cat:?} empty");
        }
    }

    #[test]
    fn help_tiers() {
        assert!(help_text(None).contains("slide ("));
        assert!(help_text(Some("clock")).contains("clock_update"));
        let detail = help_text(Some("group_slide"));
        assert!(detail.contains("(discovery)"));
        assert!(detail.contains("group_name"));
        assert!(help_text(Some("bogus")).starts_with("Unknown topic"));
    }

    #[test]
    fn schema_lists_link_transport() {
        let schema = to_json_schema();
        let prop = schema
            .as_array()
            .unwrap()
            .iter()
            .find(|e| e["name"] == "link_prop_trigger")
            .unwrap();
        assert_eq!(prop["transport"], "link");
    }
}
