//! Normalization of server validation issues.
//!
//! The service reports 422 bodies in two shapes: `{"errors": [{"field",
//! "message"}]}` and the FastAPI-style `{"detail": [{"loc", "msg"}]}` where
//! `loc` is an array that may start with a "body" segment and contain
//! numeric indices. A bare `{"detail": "..."}` carries no field issues and
//! degrades to a generic failure.

use serde_json::Value;

/// One field-level validation issue from a 422 response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// Dotted path into the submitted payload.
    pub field_path: String,
    pub message: String,
}

/// Extract field issues from a 422 body, tolerating both wire shapes.
pub fn normalize_issues(body: &Value) -> Vec<ValidationIssue> {
    let raw = body
        .get("errors")
        .and_then(Value::as_array)
        .or_else(|| body.get("detail").and_then(Value::as_array));
    let Some(raw) = raw else {
        return Vec::new();
    };

    raw.iter().filter_map(issue_from_entry).collect()
}

fn issue_from_entry(entry: &Value) -> Option<ValidationIssue> {
    let field_path = match entry.get("field").and_then(Value::as_str) {
        Some(field) => field.to_string(),
        None => path_from_loc(entry.get("loc")?)?,
    };
    let message = entry
        .get("message")
        .or_else(|| entry.get("msg"))
        .and_then(Value::as_str)
        .unwrap_or("invalid value")
        .to_string();
    Some(ValidationIssue {
        field_path,
        message,
    })
}

fn path_from_loc(loc: &Value) -> Option<String> {
    let parts: Vec<String> = loc
        .as_array()?
        .iter()
        .filter_map(|part| match part {
            Value::String(s) if s != "body" && !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("."))
    }
}

/// Best-effort human message from a non-validation error body:
/// `detail.message`, `message`, or a string `detail`.
pub fn detail_message(body: &Value) -> Option<String> {
    if let Some(message) = body
        .get("detail")
        .and_then(|d| d.get("message"))
        .and_then(Value::as_str)
    {
        return Some(message.to_string());
    }
    if let Some(message) = body.get("message").and_then(Value::as_str) {
        return Some(message.to_string());
    }
    body.get("detail")
        .and_then(Value::as_str)
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn normalizes_the_errors_shape() {
        let body = json!({
            "errors": [
                { "field": "settings.prompt", "message": "required" },
                { "field": "display_name", "message": "too long" }
            ]
        });
        let issues = normalize_issues(&body);
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].field_path, "settings.prompt");
        assert_eq!(issues[0].message, "required");
    }

    #[test]
    fn normalizes_the_fastapi_detail_shape() {
        let body = json!({
            "detail": [
                { "loc": ["body", "settings", "prompt"], "msg": "field required" },
                { "loc": ["body", "template_media", 0, "media_object_id"], "msg": "unknown id" }
            ]
        });
        let issues = normalize_issues(&body);
        assert_eq!(issues[0].field_path, "settings.prompt");
        assert_eq!(issues[0].message, "field required");
        assert_eq!(issues[1].field_path, "template_media.0.media_object_id");
    }

    #[test]
    fn string_detail_yields_no_field_issues() {
        let body = json!({ "detail": "slot is archived" });
        assert!(normalize_issues(&body).is_empty());
        assert_eq!(detail_message(&body).as_deref(), Some("slot is archived"));
    }

    #[test]
    fn detail_message_prefers_the_nested_message() {
        let body = json!({ "detail": { "message": "provider unavailable" } });
        assert_eq!(
            detail_message(&body).as_deref(),
            Some("provider unavailable")
        );
        assert_eq!(detail_message(&json!({})), None);
    }

    #[test]
    fn issues_without_a_usable_path_are_dropped() {
        let body = json!({ "detail": [ { "loc": ["body"], "msg": "bad" }, { "msg": "no loc" } ] });
        assert!(normalize_issues(&body).is_empty());
    }
}
