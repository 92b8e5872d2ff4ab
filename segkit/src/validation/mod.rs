//! JSON Schema validation for segmentation documents.
//!
//! Generic draft 7 validation plus the embedded segmentation schema
//! (`schemas/segmentation.json`), which pins the document shape the
//! platform reads positionally:
//!
//! - root `and` with exactly three children
//! - `pref equals <string>`, then `unsub empty ""`
//! - an `or` of `equals` leaves whose values are integer strings
//!
//! # Example
//!
//! ```rust,ignore
//! use serde_json::json;
//! use segkit::validation::{validate, format_violations};
//!
//! let schema = json!({ "type": "object", "required": ["name"] });
//! if let Err(violations) = validate(&schema, &json!({})) {
//!     eprintln!("{}", format_violations(&violations));
//! }
//! ```

use jsonschema::Validator;
use once_cell::sync::Lazy;
use serde::Serialize;
use serde_json::Value;

static SEGMENTATION_SCHEMA: Lazy<Value> = Lazy::new(|| {
    serde_json::from_str(include_str!("../../schemas/segmentation.json"))
        .expect("Invalid embedded schema")
});

static SEGMENTATION_VALIDATOR: Lazy<Validator> = Lazy::new(|| {
    jsonschema::draft7::new(&SEGMENTATION_SCHEMA).expect("Invalid embedded schema")
});

/// One schema violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaViolation {
    /// JSON pointer of the failing instance, `(root)` for the document itself.
    pub path: String,
    pub message: String,
}

impl std::fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.path, self.message)
    }
}

fn collect(validator: &Validator, data: &Value) -> Result<(), Vec<SchemaViolation>> {
    let violations: Vec<SchemaViolation> = validator
        .iter_errors(data)
        .map(|e| {
            let path = e.instance_path().to_string();
            SchemaViolation {
                path: if path.is_empty() { "(root)".to_string() } else { path },
                message: e.to_string(),
            }
        })
        .collect();

    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}

/// Validate `data` against a draft 7 `schema`.
///
/// An invalid schema is reported as a single violation at `(schema)`.
///
/// # Example
/// ```ignore
/// use serde_json::json;
/// use segkit::validation::validate;
///
/// let schema = json!({
///     "type": "object",
///     "required": ["name"],
///     "properties": {
///         "name": { "type": "string" }
///     }
/// });
///
/// assert!(validate(&schema, &json!({ "name": "test" })).is_ok());
/// assert!(validate(&schema, &json!({ "age": 42 })).is_err());
/// ```
pub fn validate(schema: &Value, data: &Value) -> Result<(), Vec<SchemaViolation>> {
    let validator = jsonschema::draft7::new(schema).map_err(|e| {
        vec![SchemaViolation {
            path: "(schema)".to_string(),
            message: format!("Invalid schema: {}", e),
        }]
    })?;
    collect(&validator, data)
}

/// Quick check, no error details.
pub fn is_valid(schema: &Value, data: &Value) -> bool {
    jsonschema::draft7::is_valid(schema, data)
}

/// Validate one segmentation document.
pub fn validate_segmentation(data: &Value) -> Result<(), Vec<SchemaViolation>> {
    collect(&SEGMENTATION_VALIDATOR, data)
}

/// Quick check against the segmentation schema.
pub fn is_valid_segmentation(data: &Value) -> bool {
    SEGMENTATION_VALIDATOR.is_valid(data)
}

/// One violation per line, `"{path} {message}"`.
pub fn format_violations(violations: &[SchemaViolation]) -> String {
    violations
        .iter()
        .map(SchemaViolation::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}
