use serde_json::Value;

use crate::model::ResolutionAction;

/// New value of a conflicting field. `Merge` appends the local value to the
/// server's string form with a single space; a missing or empty server
/// value yields the local value alone.
pub fn resolve_conflict(server: Option<&Value>, local: &str, action: ResolutionAction) -> Value {
    match action {
        ResolutionAction::Overwrite => Value::String(local.to_string()),
        ResolutionAction::Merge => {
            let existing = match server {
                None | Some(Value::Null) => String::new(),
                Some(Value::String(s)) => s.clone(),
                Some(other) => other.to_string(),
            };
            if existing.is_empty() {
                Value::String(local.to_string())
            } else {
                Value::String(format!("{} {}", existing, local))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_overwrite() {
        let resolved = resolve_conflict(Some(&json!("old")), "new", ResolutionAction::Overwrite);
        assert_eq!(resolved, json!("new"));
    }

    #[test]
    fn test_merge_appends_with_space() {
        let resolved = resolve_conflict(Some(&json!("Sowed wheat")), "and mustard", ResolutionAction::Merge);
        assert_eq!(resolved, json!("Sowed wheat and mustard"));
    }

    #[test]
    fn test_merge_into_missing_field() {
        assert_eq!(resolve_conflict(None, "first", ResolutionAction::Merge), json!("first"));
        assert_eq!(resolve_conflict(Some(&json!(12)), "kg", ResolutionAction::Merge), json!("12 kg"));
    }
}
