//! Input validation against per-type schemas (spec §4.10): required
//! fields, field types, and field constraints (`min_length`,
//! `max_length`, `pattern`, `min_items`, `min_value`, `max_value`).
//!
//! Inputs arrive as loosely-typed JSON (patent records, search results,
//! or analysis payloads), so schemas are checked against `serde_json::Value`
//! rather than a fixed Rust struct, mirroring `PatentDataValidator`'s
//! dict-based rules.

use crate::types::{QualityCheckResult, QualityCheckType, QualityMetric};
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

#[derive(Clone, Copy)]
pub enum FieldKind {
    Str,
    List,
    Dict,
    Int,
    Float,
}

pub enum Constraint {
    MinLength(usize),
    MaxLength(usize),
    Pattern(&'static str),
    MinItems(usize),
    MinValue(f64),
    MaxValue(f64),
}

pub struct FieldRule {
    pub field: &'static str,
    pub kind: FieldKind,
}

pub struct ConstraintRule {
    pub field: &'static str,
    pub constraint: Constraint,
}

pub struct DataSchema {
    pub name: &'static str,
    pub required_fields: &'static [&'static str],
    pub field_types: &'static [FieldRule],
    pub constraints: &'static [ConstraintRule],
}

pub const PATENT_DATA: DataSchema = DataSchema {
    name: "patent_data",
    required_fields: &["title", "application_number", "applicants"],
    field_types: &[
        FieldRule { field: "title", kind: FieldKind::Str },
        FieldRule { field: "application_number", kind: FieldKind::Str },
        FieldRule { field: "applicants", kind: FieldKind::List },
        FieldRule { field: "application_date", kind: FieldKind::Str },
        FieldRule { field: "ipc_classes", kind: FieldKind::List },
    ],
    constraints: &[
        ConstraintRule { field: "title", constraint: Constraint::MinLength(5) },
        ConstraintRule { field: "title", constraint: Constraint::MaxLength(500) },
        ConstraintRule { field: "application_number", constraint: Constraint::Pattern(r"^[A-Z]{2}\d+") },
        ConstraintRule { field: "applicants", constraint: Constraint::MinItems(1) },
    ],
};

pub const SEARCH_RESULTS: DataSchema = DataSchema {
    name: "search_results",
    required_fields: &["query", "results", "total_count"],
    field_types: &[
        FieldRule { field: "query", kind: FieldKind::Str },
        FieldRule { field: "results", kind: FieldKind::List },
        FieldRule { field: "total_count", kind: FieldKind::Int },
    ],
    constraints: &[
        ConstraintRule { field: "query", constraint: Constraint::MinLength(1) },
        ConstraintRule { field: "total_count", constraint: Constraint::MinValue(0.0) },
    ],
};

pub const ANALYSIS_RESULTS: DataSchema = DataSchema {
    name: "analysis_results",
    required_fields: &["analysis_type", "results", "confidence"],
    field_types: &[
        FieldRule { field: "analysis_type", kind: FieldKind::Str },
        FieldRule { field: "results", kind: FieldKind::Dict },
        FieldRule { field: "confidence", kind: FieldKind::Float },
    ],
    constraints: &[
        ConstraintRule { field: "confidence", constraint: Constraint::MinValue(0.0) },
        ConstraintRule { field: "confidence", constraint: Constraint::MaxValue(1.0) },
    ],
};

fn schema_for(data_type: &str) -> Option<&'static DataSchema> {
    match data_type {
        "patent_data" => Some(&PATENT_DATA),
        "search_results" => Some(&SEARCH_RESULTS),
        "analysis_results" => Some(&ANALYSIS_RESULTS),
        _ => None,
    }
}

/// Picks the schema a payload most plausibly belongs to, mirroring
/// `WorkflowQualityController._determine_data_type`.
pub fn determine_data_type(data: &Value) -> &'static str {
    let has = |k: &str| data.get(k).is_some();
    if has("query") && has("results") {
        "search_results"
    } else if has("analysis_type") && has("results") {
        "analysis_results"
    } else if has("title") || has("application_number") {
        "patent_data"
    } else {
        "generic_data"
    }
}

static APPLICATION_NUMBER_PATTERN_CACHE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z]{2}\d+").expect("valid application-number pattern"));

fn pattern_regex(pattern: &str) -> Regex {
    if pattern == r"^[A-Z]{2}\d+" {
        APPLICATION_NUMBER_PATTERN_CACHE.clone()
    } else {
        Regex::new(pattern).expect("valid constraint pattern")
    }
}

fn check_required_fields(data: &Value, required: &[&str], issues: &mut Vec<String>) -> f64 {
    let missing: Vec<&str> = required.iter().filter(|f| data.get(**f).is_none()).copied().collect();
    for field in &missing {
        issues.push(format!("Missing required field: {field}"));
    }
    (required.len() - missing.len()) as f64 / required.len() as f64
}

fn value_matches_kind(value: &Value, kind: FieldKind) -> bool {
    match kind {
        FieldKind::Str => value.is_string(),
        FieldKind::List => value.is_array(),
        FieldKind::Dict => value.is_object(),
        FieldKind::Int => value.is_i64() || value.is_u64(),
        FieldKind::Float => value.is_f64() || value.is_i64() || value.is_u64(),
    }
}

fn kind_name(kind: FieldKind) -> &'static str {
    match kind {
        FieldKind::Str => "str",
        FieldKind::List => "list",
        FieldKind::Dict => "dict",
        FieldKind::Int => "int",
        FieldKind::Float => "float",
    }
}

fn check_field_types(data: &Value, rules: &[FieldRule], issues: &mut Vec<String>) -> f64 {
    let mut correct = 0;
    let mut total = 0;
    for rule in rules {
        if let Some(value) = data.get(rule.field) {
            total += 1;
            if value_matches_kind(value, rule.kind) {
                correct += 1;
            } else {
                issues.push(format!("Field '{}' has incorrect type: expected {}", rule.field, kind_name(rule.kind)));
            }
        }
    }
    if total > 0 {
        correct as f64 / total as f64
    } else {
        1.0
    }
}

fn check_field_constraints(data: &Value, constraints: &[ConstraintRule], issues: &mut Vec<String>) -> f64 {
    let mut satisfied = 0;
    let mut total = 0;
    for rule in constraints {
        let Some(value) = data.get(rule.field) else { continue };
        total += 1;
        let ok = match &rule.constraint {
            Constraint::MinLength(min) => value.as_str().map(|s| s.chars().count() >= *min).unwrap_or(false),
            Constraint::MaxLength(max) => value.as_str().map(|s| s.chars().count() <= *max).unwrap_or(true),
            Constraint::Pattern(pattern) => value.as_str().map(|s| pattern_regex(pattern).is_match(s)).unwrap_or(false),
            Constraint::MinItems(min) => value.as_array().map(|a| a.len() >= *min).unwrap_or(false),
            Constraint::MinValue(min) => value.as_f64().map(|v| v >= *min).unwrap_or(false),
            Constraint::MaxValue(max) => value.as_f64().map(|v| v <= *max).unwrap_or(false),
        };
        if ok {
            satisfied += 1;
        } else {
            issues.push(format!("Field '{}' violates a constraint", rule.field));
        }
    }
    if total > 0 {
        satisfied as f64 / total as f64
    } else {
        1.0
    }
}

/// Non-empty-string / non-empty-collection ratio across present fields,
/// a stand-in for Python's `value not in (None, "", [])` completeness pass.
fn check_data_completeness(data: &Value, issues: &mut Vec<String>) -> f64 {
    let Some(map) = data.as_object() else {
        issues.push("Payload is not a JSON object".to_string());
        return 0.0;
    };
    if map.is_empty() {
        return 0.0;
    }
    let meaningful = map
        .values()
        .filter(|v| match v {
            Value::Null => false,
            Value::String(s) => !s.is_empty(),
            Value::Array(a) => !a.is_empty(),
            Value::Object(o) => !o.is_empty(),
            _ => true,
        })
        .count();
    let ratio = meaningful as f64 / map.len() as f64;
    if ratio < 0.7 {
        issues.push("Payload has several empty or null fields".to_string());
    }
    ratio
}

fn generate_recommendations(metrics: &[QualityMetric], _issues: &[String]) -> Vec<String> {
    let mut recommendations = Vec::new();
    for metric in metrics {
        if metric.passed {
            continue;
        }
        match metric.metric_name.as_str() {
            "required_fields" => recommendations.push("supply all required fields before submitting this payload".to_string()),
            "field_types" => recommendations.push("fix field types to match the expected schema".to_string()),
            "field_constraints" => recommendations.push("review field-level constraints (length, pattern, range)".to_string()),
            "data_completeness" => recommendations.push("fill in missing or empty optional fields for better completeness".to_string()),
            _ => {}
        }
    }
    recommendations
}

pub fn validate(data_type: &str, data: &Value, target_id: &str, now: DateTime<Utc>) -> QualityCheckResult {
    let Some(schema) = schema_for(data_type) else {
        return QualityCheckResult::failed(
            QualityCheckType::DataValidation,
            target_id.to_string(),
            vec![format!("Unknown data type: {data_type}")],
            vec!["use a supported data type".to_string()],
            now,
        );
    };

    let mut issues = Vec::new();
    let required_score = check_required_fields(data, schema.required_fields, &mut issues);
    let type_score = check_field_types(data, schema.field_types, &mut issues);
    let constraint_score = check_field_constraints(data, schema.constraints, &mut issues);
    let completeness_score = check_data_completeness(data, &mut issues);

    let metrics = vec![
        QualityMetric::new("required_fields", required_score, 1.0, 0.3, required_score >= 1.0, "all required fields present"),
        QualityMetric::new("field_types", type_score, 0.9, 0.2, type_score >= 0.9, "field types are correct"),
        QualityMetric::new("field_constraints", constraint_score, 0.8, 0.3, constraint_score >= 0.8, "field constraints satisfied"),
        QualityMetric::new("data_completeness", completeness_score, 0.7, 0.2, completeness_score >= 0.7, "data is reasonably complete"),
    ];

    let overall_score = metrics.iter().map(|m| m.value * m.weight).sum();
    let passed = metrics.iter().all(|m| m.passed);
    let recommendations = generate_recommendations(&metrics, &issues);

    QualityCheckResult::new(QualityCheckType::DataValidation, target_id.to_string(), overall_score, metrics, issues, recommendations, passed, now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unknown_data_type_fails_outright() {
        let result = validate("nonsense", &json!({}), "x", Utc::now());
        assert!(!result.passed);
        assert_eq!(result.overall_score, 0.0);
    }

    #[test]
    fn well_formed_patent_data_passes() {
        let data = json!({
            "title": "A novel widget assembly",
            "application_number": "US12345678",
            "applicants": ["Acme Corp"],
            "application_date": "2020-01-01",
            "ipc_classes": ["G06F1/00"],
        });
        let result = validate("patent_data", &data, "p1", Utc::now());
        assert!(result.passed, "issues: {:?}", result.issues);
        assert!(result.overall_score > 0.9);
    }

    #[test]
    fn missing_required_fields_lowers_score_and_lists_issue() {
        let data = json!({"title": "Too short but has a title field present here"});
        let result = validate("patent_data", &data, "p2", Utc::now());
        assert!(!result.passed);
        assert!(result.issues.iter().any(|i| i.contains("application_number")));
    }

    #[test]
    fn pattern_constraint_rejects_malformed_application_number() {
        let data = json!({
            "title": "A novel widget assembly mechanism",
            "application_number": "not-a-valid-number",
            "applicants": ["Acme Corp"],
        });
        let result = validate("patent_data", &data, "p3", Utc::now());
        assert!(result.issues.iter().any(|i| i.contains("application_number")));
    }

    #[test]
    fn determine_data_type_routes_by_shape() {
        assert_eq!(determine_data_type(&json!({"query": "x", "results": []})), "search_results");
        assert_eq!(determine_data_type(&json!({"analysis_type": "trend", "results": {}})), "analysis_results");
        assert_eq!(determine_data_type(&json!({"title": "x"})), "patent_data");
        assert_eq!(determine_data_type(&json!({"foo": "bar"})), "generic_data");
    }
}
