//! Declarative shape contracts for the two structured artifacts.
//!
//! The schemas are handed verbatim to the backend's structured-output
//! parameter; the backend is asked to conform, and [`validate`] re-checks
//! the parsed result locally so a non-conforming response fails with a
//! schema violation naming the offending path instead of a downstream
//! deserialization mismatch.
//!
//! Only the keywords the backend supports are used: `type`, `properties`,
//! `required`, `items`, `enum`, `description`.

use serde_json::{json, Value};

/// Shape contract for [`crate::report::ResearchPlan`].
///
/// Nested `required` lists appear at every object level: absence of a field
/// is invalid even where an empty array is fine.
pub fn research_plan_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "subreddits": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "name": { "type": "string" },
                        "queries": { "type": "array", "items": { "type": "string" } }
                    },
                    "required": ["name", "queries"]
                }
            },
            "softwareCategories": { "type": "array", "items": { "type": "string" } },
            "competitorApps": { "type": "array", "items": { "type": "string" } },
            "searchStrings": { "type": "array", "items": { "type": "string" } },
            "nicheForums": { "type": "array", "items": { "type": "string" } }
        },
        "required": [
            "subreddits",
            "softwareCategories",
            "competitorApps",
            "searchStrings",
            "nicheForums"
        ]
    })
}

/// Shape contract for [`crate::report::SignalReport`].
pub fn signal_report_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "executiveSummary": { "type": "string" },
            "patterns": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "id": { "type": "string" },
                        "title": { "type": "string" },
                        "description": { "type": "string" },
                        "scores": {
                            "type": "object",
                            "properties": {
                                "frequency": { "type": "number" },
                                "desperation": { "type": "number" },
                                "willingnessToPay": { "type": "number" },
                                "trend": { "type": "number" }
                            },
                            "required": ["frequency", "desperation", "willingnessToPay", "trend"]
                        },
                        "classification": {
                            "type": "string",
                            "enum": ["Strong Signal", "Weak Signal", "Noise"]
                        },
                        "quotes": {
                            "type": "array",
                            "items": {
                                "type": "object",
                                "properties": {
                                    "text": { "type": "string" },
                                    "source": { "type": "string" },
                                    "date": { "type": "string" },
                                    "url": { "type": "string" }
                                },
                                "required": ["text", "source", "date", "url"]
                            }
                        }
                    },
                    "required": ["id", "title", "description", "scores", "classification", "quotes"]
                }
            },
            "nextSteps": { "type": "array", "items": { "type": "string" } }
        },
        "required": ["executiveSummary", "patterns", "nextSteps"]
    })
}

/// A single point where a value fails its declared shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// JSONPath-style location, e.g. `$.patterns[0].scores`.
    pub path: String,
    pub message: String,
}

/// Validate `value` against a declarative schema of the kind this module
/// builds. Returns the first violation found, depth-first.
pub fn validate(value: &Value, schema: &Value) -> Result<(), Violation> {
    walk(value, schema, "$")
}

fn walk(value: &Value, schema: &Value, path: &str) -> Result<(), Violation> {
    let expected = schema.get("type").and_then(Value::as_str).unwrap_or("any");

    match expected {
        "object" => {
            let map = value.as_object().ok_or_else(|| Violation {
                path: path.to_string(),
                message: format!("expected object, got {}", type_name(value)),
            })?;

            if let Some(required) = schema.get("required").and_then(Value::as_array) {
                for field in required.iter().filter_map(Value::as_str) {
                    if !map.contains_key(field) {
                        return Err(Violation {
                            path: path.to_string(),
                            message: format!("missing required field '{field}'"),
                        });
                    }
                }
            }

            if let Some(props) = schema.get("properties").and_then(Value::as_object) {
                for (key, sub_schema) in props {
                    if let Some(sub_value) = map.get(key) {
                        walk(sub_value, sub_schema, &format!("{path}.{key}"))?;
                    }
                }
            }
            Ok(())
        }
        "array" => {
            let items = value.as_array().ok_or_else(|| Violation {
                path: path.to_string(),
                message: format!("expected array, got {}", type_name(value)),
            })?;
            if let Some(item_schema) = schema.get("items") {
                for (i, item) in items.iter().enumerate() {
                    walk(item, item_schema, &format!("{path}[{i}]"))?;
                }
            }
            Ok(())
        }
        "string" => {
            let s = value.as_str().ok_or_else(|| Violation {
                path: path.to_string(),
                message: format!("expected string, got {}", type_name(value)),
            })?;
            if let Some(allowed) = schema.get("enum").and_then(Value::as_array) {
                if !allowed.iter().any(|a| a.as_str() == Some(s)) {
                    return Err(Violation {
                        path: path.to_string(),
                        message: format!("'{s}' is not one of the allowed values"),
                    });
                }
            }
            Ok(())
        }
        "number" => {
            if value.as_f64().is_none() {
                return Err(Violation {
                    path: path.to_string(),
                    message: format!("expected number, got {}", type_name(value)),
                });
            }
            Ok(())
        }
        "boolean" => {
            if !value.is_boolean() {
                return Err(Violation {
                    path: path.to_string(),
                    message: format!("expected boolean, got {}", type_name(value)),
                });
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_schema_requires_all_five_fields() {
        let schema = research_plan_schema();
        let required: Vec<&str> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect();
        assert_eq!(
            required,
            vec![
                "subreddits",
                "softwareCategories",
                "competitorApps",
                "searchStrings",
                "nicheForums"
            ]
        );
        // Nested required list on each subreddit entry too.
        let sub_required = &schema["properties"]["subreddits"]["items"]["required"];
        assert_eq!(sub_required, &serde_json::json!(["name", "queries"]));
    }

    #[test]
    fn test_report_schema_nests_required_at_every_level() {
        let schema = signal_report_schema();
        let pattern = &schema["properties"]["patterns"]["items"];
        assert!(pattern["required"].as_array().unwrap().len() == 6);
        assert!(pattern["properties"]["scores"]["required"]
            .as_array()
            .unwrap()
            .contains(&serde_json::json!("willingnessToPay")));
        assert!(pattern["properties"]["quotes"]["items"]["required"]
            .as_array()
            .unwrap()
            .contains(&serde_json::json!("url")));
    }

    #[test]
    fn test_validate_accepts_conforming_plan() {
        let value = serde_json::json!({
            "subreddits": [{"name": "r/gymowners", "queries": ["software frustrations"]}],
            "softwareCategories": [],
            "competitorApps": [],
            "searchStrings": [],
            "nicheForums": []
        });
        assert!(validate(&value, &research_plan_schema()).is_ok());
    }

    #[test]
    fn test_validate_flags_missing_field_with_path() {
        let value = serde_json::json!({
            "subreddits": [{"name": "r/gymowners"}],
            "softwareCategories": [],
            "competitorApps": [],
            "searchStrings": [],
            "nicheForums": []
        });
        let violation = validate(&value, &research_plan_schema()).unwrap_err();
        assert_eq!(violation.path, "$.subreddits[0]");
        assert_eq!(violation.message, "missing required field 'queries'");
    }

    #[test]
    fn test_validate_flags_wrong_type() {
        let value = serde_json::json!({
            "subreddits": "not-an-array",
            "softwareCategories": [],
            "competitorApps": [],
            "searchStrings": [],
            "nicheForums": []
        });
        let violation = validate(&value, &research_plan_schema()).unwrap_err();
        assert_eq!(violation.path, "$.subreddits");
        assert_eq!(violation.message, "expected array, got string");
    }

    #[test]
    fn test_validate_flags_unknown_classification() {
        let value = serde_json::json!({
            "executiveSummary": "s",
            "patterns": [{
                "id": "p1",
                "title": "t",
                "description": "d",
                "scores": {"frequency": 1, "desperation": 1, "willingnessToPay": 1, "trend": 1},
                "classification": "Mild Signal",
                "quotes": []
            }],
            "nextSteps": []
        });
        let violation = validate(&value, &signal_report_schema()).unwrap_err();
        assert_eq!(violation.path, "$.patterns[0].classification");
        assert!(violation.message.contains("not one of the allowed values"));
    }
}
