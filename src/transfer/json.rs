/// JSON list-of-groups documents
use super::ParsedGroup;
use crate::error::ImportError;
use crate::tab_data::{Group, TabRecord};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportedGroup<'a> {
    id: &'a str,
    custom_name: String,
    create_time: &'a str,
    tabs: &'a [TabRecord],
}

pub fn export(groups: &[Group]) -> String {
    let exported: Vec<ExportedGroup<'_>> = groups
        .iter()
        .map(|g| ExportedGroup {
            id: &g.id,
            custom_name: g.display_name(),
            create_time: &g.create_time,
            tabs: &g.tabs,
        })
        .collect();

    // a list of plain structs always serializes
    serde_json::to_string_pretty(&exported).unwrap_or_else(|_| "[]".to_string())
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct ImportedGroup {
    custom_name: Option<String>,
    create_time: Option<String>,
    tabs: Vec<Value>,
}

/// Keeps every object element that has a non-empty `tabs` array; anything
/// else in the list is skipped
pub fn parse(text: &str) -> Result<Vec<ParsedGroup>, ImportError> {
    let document: Value =
        serde_json::from_str(text).map_err(|e| ImportError::Json(e.to_string()))?;
    let Value::Array(items) = document else {
        return Err(ImportError::NotAList);
    };

    Ok(items
        .into_iter()
        .filter_map(|item| serde_json::from_value::<ImportedGroup>(item).ok())
        .filter(|g| !g.tabs.is_empty())
        .map(|g| ParsedGroup {
            name: g.custom_name,
            create_time: g.create_time,
            tabs: g
                .tabs
                .into_iter()
                .map(|tab| serde_json::from_value::<TabRecord>(tab).unwrap_or_default())
                .collect(),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_shape() {
        let group = Group {
            id: "g1".to_string(),
            create_time: "2026-10-19 08:00:00".to_string(),
            custom_name: String::new(),
            tabs: vec![TabRecord::new("Rust", "https://rust-lang.org", "")],
        };

        let value: Value = serde_json::from_str(&export(&[group])).unwrap();

        assert_eq!(value[0]["id"], "g1");
        assert_eq!(value[0]["customName"], "2026-10-19 08:00:00");
        assert_eq!(value[0]["tabs"][0]["favIconUrl"], "");
    }

    #[test]
    fn test_parse_rejects_invalid_json() {
        assert!(matches!(parse("[{"), Err(ImportError::Json(_))));
    }

    #[test]
    fn test_parse_rejects_non_list() {
        assert_eq!(parse(r#"{"tabs": []}"#), Err(ImportError::NotAList));
    }

    #[test]
    fn test_parse_skips_malformed_entries() {
        let text = r#"[
            {"customName": "Keep", "tabs": [{"title": "A", "url": "https://a.io"}]},
            {"customName": "No tabs", "tabs": []},
            {"customName": "Wrong type", "tabs": "nope"},
            42,
            {"tabs": [{"url": "https://b.io"}, "junk"]}
        ]"#;

        let parsed = parse(text).unwrap();

        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].name.as_deref(), Some("Keep"));
        assert_eq!(parsed[1].tabs.len(), 2);
        assert_eq!(parsed[1].tabs[1], TabRecord::default());
    }
}
