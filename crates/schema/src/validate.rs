//! Schema validation walk.

use serde_json::Value;

use crate::error::ValidationError;
use crate::schema::Schema;

/// Validate `value` against `schema`.
///
/// Returns the first failure encountered, path-qualified. Side-effect free:
/// the value is never mutated and no state is kept between calls.
pub fn validate(value: &Value, schema: &Schema) -> Result<(), ValidationError> {
    validate_at(&mut Vec::new(), Some(value), schema)
}

/// The JSON type name used in error messages. A missing value (key absent
/// from its parent object) reports as `undefined`, distinct from an explicit
/// JSON `null`.
fn type_name(value: Option<&Value>) -> &'static str {
    match value {
        None => "undefined",
        Some(Value::Null) => "null",
        Some(Value::Bool(_)) => "boolean",
        Some(Value::Number(_)) => "number",
        Some(Value::String(_)) => "string",
        Some(Value::Array(_)) => "array",
        Some(Value::Object(_)) => "object",
    }
}

fn type_mismatch(path: &[String], expected: &str, actual: Option<&Value>) -> ValidationError {
    ValidationError::at(
        path,
        format!(
            "expected value of type [{expected}] but got [{}]",
            type_name(actual)
        ),
    )
}

fn not_plain_object(path: &[String], actual: Option<&Value>) -> ValidationError {
    ValidationError::at(
        path,
        format!(
            "expected a plain object value, but found [{}] instead.",
            type_name(actual)
        ),
    )
}

fn validate_at(
    path: &mut Vec<String>,
    value: Option<&Value>,
    schema: &Schema,
) -> Result<(), ValidationError> {
    match schema {
        Schema::String { min_length } => {
            let Some(Value::String(s)) = value else {
                return Err(type_mismatch(path, "string", value));
            };
            if let Some(min) = min_length {
                let len = s.chars().count();
                if len < *min {
                    return Err(ValidationError::at(
                        path,
                        format!(
                            "value has length [{len}] but it must have a minimum length of [{min}]."
                        ),
                    ));
                }
            }
            Ok(())
        }
        Schema::Number => match value {
            Some(Value::Number(_)) => Ok(()),
            // Numeric strings coerce, matching the wire contract for fields
            // like `version` that arrive from query strings.
            Some(Value::String(s)) if !s.is_empty() && s.parse::<f64>().is_ok() => Ok(()),
            other => Err(type_mismatch(path, "number", other)),
        },
        Schema::Boolean => match value {
            Some(Value::Bool(_)) => Ok(()),
            other => Err(type_mismatch(path, "boolean", other)),
        },
        Schema::PlainObject => match value {
            Some(Value::Object(_)) => Ok(()),
            other => Err(not_plain_object(path, other)),
        },
        Schema::Object { fields } => {
            let Some(Value::Object(map)) = value else {
                return Err(not_plain_object(path, value));
            };

            for (name, field) in fields {
                let child = map.get(name);
                if child.is_none() && !field.required {
                    continue;
                }
                path.push(name.clone());
                let result = validate_at(path, child, &field.schema);
                path.pop();
                result?;
            }

            // Closed object: anything not declared is an error.
            for key in map.keys() {
                if !fields.contains_key(key) {
                    path.push(key.clone());
                    let err = ValidationError::at(path, "definition for this key is missing");
                    path.pop();
                    return Err(err);
                }
            }

            Ok(())
        }
        Schema::Array { items, min_size } => {
            let Some(Value::Array(elements)) = value else {
                return Err(type_mismatch(path, "array", value));
            };
            if let Some(min) = min_size {
                if elements.len() < *min {
                    return Err(ValidationError::at(
                        path,
                        format!(
                            "array size is [{}], but cannot be smaller than [{min}]",
                            elements.len()
                        ),
                    ));
                }
            }
            for (index, element) in elements.iter().enumerate() {
                path.push(index.to_string());
                let result = validate_at(path, Some(element), items);
                path.pop();
                result?;
            }
            Ok(())
        }
        Schema::OneOf(alternatives) => {
            let mut failures = Vec::with_capacity(alternatives.len());
            for (index, alternative) in alternatives.iter().enumerate() {
                path.push(index.to_string());
                let result = validate_at(path, value, alternative);
                path.pop();
                match result {
                    Ok(()) => return Ok(()),
                    Err(err) => failures.push(err),
                }
            }
            let mut body = String::from("types that failed validation:");
            for failure in &failures {
                body.push_str("\n- ");
                body.push_str(&failure.message);
            }
            Err(ValidationError::at(path, body))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn string_accepts_and_reports_type() {
        let schema = Schema::string();
        assert!(validate(&json!("foo"), &schema).is_ok());

        let err = validate(&json!(123), &schema).unwrap_err();
        assert_eq!(
            err.message,
            "expected value of type [string] but got [number]"
        );
    }

    #[test]
    fn string_min_length() {
        let schema = Schema::string().min_length(1);
        assert!(validate(&json!("a"), &schema).is_ok());

        let err = validate(&json!(""), &schema).unwrap_err();
        assert_eq!(
            err.message,
            "value has length [0] but it must have a minimum length of [1]."
        );
    }

    #[test]
    fn number_coerces_numeric_strings() {
        let schema = Schema::number();
        assert!(validate(&json!(1), &schema).is_ok());
        assert!(validate(&json!(1.5), &schema).is_ok());
        assert!(validate(&json!("1"), &schema).is_ok());
        assert!(validate(&json!("2.5"), &schema).is_ok());

        let err = validate(&json!("abc"), &schema).unwrap_err();
        assert_eq!(
            err.message,
            "expected value of type [number] but got [string]"
        );
        let err = validate(&json!(""), &schema).unwrap_err();
        assert_eq!(
            err.message,
            "expected value of type [number] but got [string]"
        );
    }

    #[test]
    fn boolean_mismatch() {
        let err = validate(&json!("true"), &Schema::boolean()).unwrap_err();
        assert_eq!(
            err.message,
            "expected value of type [boolean] but got [string]"
        );
    }

    #[test]
    fn closed_object_rejects_unknown_keys() {
        let schema = Schema::object([("name", Schema::string().required())]);
        assert!(validate(&json!({ "name": "quire" }), &schema).is_ok());

        let err = validate(&json!({ "name": "quire", "unknown": 1 }), &schema).unwrap_err();
        assert_eq!(err.message, "[unknown]: definition for this key is missing");
    }

    #[test]
    fn missing_required_field_reports_undefined() {
        let schema = Schema::object([("name", Schema::string().required())]);
        let err = validate(&json!({}), &schema).unwrap_err();
        assert_eq!(
            err.message,
            "[name]: expected value of type [string] but got [undefined]"
        );
    }

    #[test]
    fn explicit_null_is_not_undefined() {
        let schema = Schema::object([("name", Schema::string().required())]);
        let err = validate(&json!({ "name": null }), &schema).unwrap_err();
        assert_eq!(
            err.message,
            "[name]: expected value of type [string] but got [null]"
        );
    }

    #[test]
    fn optional_field_may_be_absent_but_still_validates() {
        let schema = Schema::object([("options", Schema::plain_object().optional())]);
        assert!(validate(&json!({}), &schema).is_ok());
        assert!(validate(&json!({ "options": {} }), &schema).is_ok());

        let err = validate(&json!({ "options": 123 }), &schema).unwrap_err();
        assert_eq!(
            err.message,
            "[options]: expected a plain object value, but found [number] instead."
        );
    }

    #[test]
    fn array_minimum_size() {
        let schema = Schema::array_of(Schema::string()).min_size(1);
        let err = validate(&json!([]), &schema).unwrap_err();
        assert_eq!(err.message, "array size is [0], but cannot be smaller than [1]");
    }

    #[test]
    fn array_items_report_indexed_paths() {
        let schema = Schema::object([(
            "ids",
            Schema::array_of(Schema::string().min_length(1)).min_size(1).required(),
        )]);

        let err = validate(&json!({ "ids": [""] }), &schema).unwrap_err();
        assert_eq!(
            err.message,
            "[ids.0]: value has length [0] but it must have a minimum length of [1]."
        );

        let err = validate(&json!({ "ids": ["ok", 7] }), &schema).unwrap_err();
        assert_eq!(
            err.message,
            "[ids.1]: expected value of type [string] but got [number]"
        );
    }

    #[test]
    fn array_type_mismatch() {
        let schema = Schema::object([(
            "ids",
            Schema::array_of(Schema::string()).required(),
        )]);
        let err = validate(&json!({ "ids": 123 }), &schema).unwrap_err();
        assert_eq!(
            err.message,
            "[ids]: expected value of type [array] but got [number]"
        );
    }

    #[test]
    fn nested_object_paths_use_dots() {
        let schema = Schema::object([(
            "outer",
            Schema::object([("inner", Schema::number().required())]).required(),
        )]);
        let err = validate(&json!({ "outer": { "inner": "x" } }), &schema).unwrap_err();
        assert_eq!(
            err.message,
            "[outer.inner]: expected value of type [number] but got [string]"
        );
    }

    #[test]
    fn one_of_accepts_any_matching_alternative() {
        let schema = Schema::one_of([
            Schema::plain_object(),
            Schema::array_of(Schema::plain_object()),
        ]);
        assert!(validate(&json!({ "any": "object" }), &schema).is_ok());
        assert!(validate(&json!([{ "any": "object" }]), &schema).is_ok());
    }

    #[test]
    fn one_of_combines_all_failures() {
        let schema = Schema::one_of([
            Schema::plain_object(),
            Schema::array_of(Schema::plain_object()),
        ]);
        let err = validate(&json!(123), &schema).unwrap_err();
        assert!(err.message.starts_with("types that failed validation:"));
        assert!(
            err.message
                .contains("[0]: expected a plain object value, but found [number] instead.")
        );
        assert!(
            err.message
                .contains("[1]: expected value of type [array] but got [number]")
        );
    }

    #[test]
    fn one_of_failure_is_path_qualified_when_nested() {
        let schema = Schema::object([(
            "result",
            Schema::one_of([Schema::plain_object(), Schema::boolean()]).required(),
        )]);
        let err = validate(&json!({ "result": 1 }), &schema).unwrap_err();
        assert!(err.message.starts_with("[result]: types that failed validation:"));
        assert!(
            err.message
                .contains("[result.0]: expected a plain object value, but found [number] instead.")
        );
    }

    #[test]
    fn root_level_errors_carry_no_path_prefix() {
        let err = validate(&json!(42), &Schema::plain_object()).unwrap_err();
        assert_eq!(
            err.message,
            "expected a plain object value, but found [number] instead."
        );
    }
}
