use serde_json::Value;

use crate::error::AppError;
use crate::models::UpdateTaskRequest;
use crate::validation::{validate_due_date, validate_title};

/// Columns staged for a single `UPDATE`. `None` means "leave untouched".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub due_date: Option<Option<String>>,
    pub completed: Option<bool>,
    pub updated_at: Option<String>,
}

impl TaskPatch {
    /// Validates `req` and stages every key it carries. `updated_at` is
    /// stamped with `now` only when at least one column was staged.
    pub fn from_request(
        req: UpdateTaskRequest,
        now: impl FnOnce() -> String,
    ) -> Result<Self, AppError> {
        if let Some(title) = &req.title {
            validate_title(title.as_deref())?;
        }
        if let Some(due_date) = &req.due_date {
            validate_due_date(due_date.as_deref())?;
        }

        let mut patch = TaskPatch {
            title: req
                .title
                .flatten()
                .map(|title| title.trim().to_string()),
            description: req.description,
            due_date: req.due_date,
            completed: req.completed.as_ref().map(truthy),
            updated_at: None,
        };

        if patch.has_changes() {
            patch.updated_at = Some(now());
        }
        Ok(patch)
    }

    pub fn has_changes(&self) -> bool {
        self.title.is_some()
            || self.description.is_some()
            || self.due_date.is_some()
            || self.completed.is_some()
    }
}

/// Boolean coercion for `completed`: empty and zero-like values are false.
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    const NOW: &str = "2025-02-01T12:00:00.000000Z";

    fn patch(body: Value) -> Result<TaskPatch, AppError> {
        let req: UpdateTaskRequest = serde_json::from_value(body).unwrap();
        TaskPatch::from_request(req, || NOW.to_string())
    }

    #[test]
    fn empty_payload_stages_nothing() {
        let patch = patch(json!({})).unwrap();
        assert!(!patch.has_changes());
        assert_eq!(patch, TaskPatch::default());
    }

    #[test]
    fn unknown_keys_stage_nothing() {
        let patch = patch(json!({ "priority": "high" })).unwrap();
        assert!(!patch.has_changes());
        assert_eq!(patch.updated_at, None);
    }

    #[test]
    fn completed_only_touches_completed_and_stamp() {
        let patch = patch(json!({ "completed": true })).unwrap();
        assert_eq!(
            patch,
            TaskPatch {
                completed: Some(true),
                updated_at: Some(NOW.to_string()),
                ..TaskPatch::default()
            }
        );
    }

    #[test]
    fn title_is_trimmed() {
        let patch = patch(json!({ "title": "  Ship it  " })).unwrap();
        assert_eq!(patch.title.as_deref(), Some("Ship it"));
    }

    #[rstest]
    #[case(json!({ "title": "" }))]
    #[case(json!({ "title": "   " }))]
    #[case(json!({ "title": null }))]
    #[case(json!({ "title": " ", "completed": true }))]
    fn blank_title_is_rejected(#[case] body: Value) {
        assert!(matches!(patch(body), Err(AppError::EmptyTitle)));
    }

    #[test]
    fn bad_due_date_is_rejected() {
        assert!(matches!(
            patch(json!({ "due_date": "next week" })),
            Err(AppError::BadDateFormat)
        ));
    }

    #[test]
    fn null_due_date_clears_the_column() {
        let patch = patch(json!({ "due_date": null, "description": null })).unwrap();
        assert_eq!(patch.due_date, Some(None));
        assert_eq!(patch.description, Some(None));
        assert_eq!(patch.updated_at.as_deref(), Some(NOW));
    }

    #[test]
    fn empty_due_date_is_written_verbatim() {
        let patch = patch(json!({ "due_date": "" })).unwrap();
        assert_eq!(patch.due_date, Some(Some(String::new())));
    }

    #[test]
    fn valid_due_date_is_written_verbatim() {
        let patch = patch(json!({ "due_date": "2024-01-01T00:00:00Z" })).unwrap();
        assert_eq!(patch.due_date, Some(Some("2024-01-01T00:00:00Z".to_string())));
    }

    #[test]
    fn clock_is_not_read_without_changes() {
        let req = UpdateTaskRequest::default();
        let patch = TaskPatch::from_request(req, || panic!("clock read")).unwrap();
        assert!(patch.updated_at.is_none());
    }

    #[rstest]
    #[case(json!(null), false)]
    #[case(json!(false), false)]
    #[case(json!(true), true)]
    #[case(json!(0), false)]
    #[case(json!(0.0), false)]
    #[case(json!(2), true)]
    #[case(json!(""), false)]
    #[case(json!("no"), true)]
    #[case(json!([]), false)]
    #[case(json!([0]), true)]
    #[case(json!({}), false)]
    fn completed_is_coerced(#[case] value: Value, #[case] expected: bool) {
        assert_eq!(truthy(&value), expected);
    }
}
