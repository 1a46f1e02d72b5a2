//! Schema conversion: descriptors → reusable validators.
//!
//! [`convert`] turns an ordered [`ParameterSet`] into one composite
//! [`ObjectValidator`]. The validator is immutable after construction and safe
//! to reuse across any number of concurrent validations.
//!
//! Validation walks the candidate once, collects **every** violated constraint
//! with a path-qualified message (`profile.age`, `tags[2]`), and returns the
//! normalized record on success. Normalization applies safe coercions (numeric
//! strings for number/integer fields, `"true"`/`"false"` for boolean fields)
//! and passes through only declared keys; undeclared keys are dropped without
//! erroring. Coercion is idempotent: re-validating a normalized value yields
//! the same value.

use crate::descriptor::{ParamType, ParameterDescriptor, ParameterSet};
use crate::error::{Result, SchemaError};
use regex::Regex;
use serde_json::{Map, Value};
use std::fmt;
use url::Url;

/// One violated constraint, qualified by the path of the offending value.
///
/// An empty path refers to the candidate record itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub path: String,
    pub message: String,
}

impl Violation {
    fn new(path: &str, message: impl Into<String>) -> Self {
        Self {
            path: path.to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

/// Validation failure: every violated constraint found in one pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub violations: Vec<Violation>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for v in &self.violations {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{v}")?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// String `format` constraints the converter recognizes.
///
/// Unrecognized format names are accepted without adding a constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringFormat {
    Email,
    Url,
    Uuid,
}

impl StringFormat {
    fn parse(format: &str) -> Option<Self> {
        match format {
            "email" => Some(StringFormat::Email),
            "uri" | "url" => Some(StringFormat::Url),
            "uuid" => Some(StringFormat::Uuid),
            _ => None,
        }
    }

    fn label(self) -> &'static str {
        match self {
            StringFormat::Email => "email address",
            StringFormat::Url => "URL",
            StringFormat::Uuid => "UUID",
        }
    }
}

/// Constraints for string-typed values.
#[derive(Debug, Clone, Default)]
pub struct StringRules {
    pub format: Option<StringFormat>,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    /// Substring match (`Regex::is_match`), not full-anchor.
    pub pattern: Option<Regex>,
}

/// Inclusive bounds for numeric values.
#[derive(Debug, Clone, Copy, Default)]
pub struct NumberRules {
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
}

/// Constraints for array-typed values.
#[derive(Debug, Clone)]
pub struct ArrayRules {
    pub items: Validator,
    pub min_items: Option<usize>,
    pub max_items: Option<usize>,
}

/// A constructed validator for one value position.
///
/// Closed set of variants; dispatch is a plain match so behavior stays
/// exhaustively testable.
#[derive(Debug, Clone)]
pub enum Validator {
    String(StringRules),
    Number(NumberRules),
    Integer(NumberRules),
    Boolean,
    Array(Box<ArrayRules>),
    Object(ObjectValidator),
    /// Unconstrained key-value mapping (object with no declared properties).
    Record,
    /// Exact match against a closed list of string literals. Replaces the base
    /// type validator whenever a descriptor carries a non-empty `enum`.
    Enum(Vec<String>),
    /// Accepts any value (unrecognized declared types).
    Any,
}

/// One named field of a composite validator.
#[derive(Debug, Clone)]
pub struct FieldValidator {
    pub name: String,
    pub validator: Validator,
    /// When false, omitting the key passes trivially; a present key still must
    /// satisfy the validator.
    pub required: bool,
    /// Documentation metadata; never affects pass/fail.
    pub description: Option<String>,
}

/// Composite validator over a record of named fields.
///
/// An empty composite accepts exactly the empty record (undeclared keys are
/// dropped, not rejected).
#[derive(Debug, Clone, Default)]
pub struct ObjectValidator {
    fields: Vec<FieldValidator>,
}

impl ObjectValidator {
    #[must_use]
    pub fn fields(&self) -> &[FieldValidator] {
        &self.fields
    }

    /// Check-and-normalize a candidate argument record.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] enumerating every violated constraint if
    /// any required key is missing or any present key fails its validator.
    pub fn validate(&self, candidate: &Value) -> std::result::Result<Value, ValidationError> {
        let mut violations = Vec::new();
        let normalized = self.check(candidate, "", &mut violations);
        if violations.is_empty() {
            Ok(normalized)
        } else {
            Err(ValidationError { violations })
        }
    }

    fn check(&self, candidate: &Value, path: &str, violations: &mut Vec<Violation>) -> Value {
        let Some(record) = candidate.as_object() else {
            violations.push(Violation::new(path, "expected an object"));
            return Value::Object(Map::new());
        };

        let mut normalized = Map::new();
        for field in &self.fields {
            let field_path = join_path(path, &field.name);
            match record.get(&field.name) {
                None => {
                    if field.required {
                        violations.push(Violation::new(&field_path, "required parameter is missing"));
                    }
                }
                Some(value) => {
                    let checked = check_value(&field.validator, value, &field_path, violations);
                    normalized.insert(field.name.clone(), checked);
                }
            }
        }

        Value::Object(normalized)
    }
}

/// Build the composite validator for an ordered parameter set.
///
/// # Errors
///
/// Returns an error if a `pattern` constraint fails to compile.
pub fn convert(set: &ParameterSet) -> Result<ObjectValidator> {
    let mut fields = Vec::with_capacity(set.len());
    for desc in set.iter() {
        fields.push(build_field(desc)?);
    }
    tracing::debug!(fields = fields.len(), "built composite validator");
    Ok(ObjectValidator { fields })
}

fn build_field(desc: &ParameterDescriptor) -> Result<FieldValidator> {
    let base = build_validator(desc)?;

    // A non-empty enum replaces the base type validator outright, for any
    // declared type. Optionality and description are orthogonal and applied
    // at the field level.
    let validator = if desc.enum_values.is_empty() {
        base
    } else {
        Validator::Enum(desc.enum_values.clone())
    };

    Ok(FieldValidator {
        name: desc.name.clone(),
        validator,
        required: desc.required,
        description: desc.description.clone(),
    })
}

fn build_validator(desc: &ParameterDescriptor) -> Result<Validator> {
    match desc.ty {
        ParamType::String => Ok(Validator::String(string_rules(desc)?)),
        ParamType::Number => Ok(Validator::Number(number_rules(desc))),
        ParamType::Integer => Ok(Validator::Integer(number_rules(desc))),
        ParamType::Boolean => Ok(Validator::Boolean),
        ParamType::Array => Ok(array_validator(desc)),
        ParamType::Object => Ok(object_validator(desc)),
        ParamType::Any => Ok(Validator::Any),
    }
}

fn string_rules(desc: &ParameterDescriptor) -> Result<StringRules> {
    let format = desc.format.as_deref().and_then(|f| {
        let parsed = StringFormat::parse(f);
        if parsed.is_none() {
            tracing::debug!(parameter = %desc.name, format = %f, "ignoring unrecognized string format");
        }
        parsed
    });

    let pattern = desc
        .pattern
        .as_deref()
        .map(|p| {
            Regex::new(p).map_err(|source| SchemaError::Pattern {
                name: desc.name.clone(),
                source,
            })
        })
        .transpose()?;

    Ok(StringRules {
        format,
        min_length: desc.min_length,
        max_length: desc.max_length,
        pattern,
    })
}

fn number_rules(desc: &ParameterDescriptor) -> NumberRules {
    NumberRules {
        minimum: desc.minimum,
        maximum: desc.maximum,
    }
}

fn array_validator(desc: &ParameterDescriptor) -> Validator {
    let items = match desc.items {
        Some(ty) => validator_for_bare_type(ty),
        None => Validator::Any,
    };
    Validator::Array(Box::new(ArrayRules {
        items,
        min_items: desc.min_items,
        max_items: desc.max_items,
    }))
}

fn object_validator(desc: &ParameterDescriptor) -> Validator {
    let Some(shape) = &desc.object else {
        return Validator::Record;
    };

    let fields = shape
        .properties
        .iter()
        .map(|(child, ty)| FieldValidator {
            name: child.clone(),
            validator: validator_for_bare_type(*ty),
            required: shape.required_children.iter().any(|r| r == child),
            description: None,
        })
        .collect();

    Validator::Object(ObjectValidator { fields })
}

/// Validator for a type with no attached constraints (array items and nested
/// object children carry only their declared type).
fn validator_for_bare_type(ty: ParamType) -> Validator {
    match ty {
        ParamType::String => Validator::String(StringRules::default()),
        ParamType::Number => Validator::Number(NumberRules::default()),
        ParamType::Integer => Validator::Integer(NumberRules::default()),
        ParamType::Boolean => Validator::Boolean,
        ParamType::Array => Validator::Array(Box::new(ArrayRules {
            items: Validator::Any,
            min_items: None,
            max_items: None,
        })),
        ParamType::Object => Validator::Record,
        ParamType::Any => Validator::Any,
    }
}

fn check_value(
    validator: &Validator,
    value: &Value,
    path: &str,
    violations: &mut Vec<Violation>,
) -> Value {
    match validator {
        Validator::Any => value.clone(),
        Validator::Enum(options) => check_enum(options, value, path, violations),
        Validator::String(rules) => check_string(rules, value, path, violations),
        Validator::Number(rules) => check_number(rules, false, value, path, violations),
        Validator::Integer(rules) => check_number(rules, true, value, path, violations),
        Validator::Boolean => check_boolean(value, path, violations),
        Validator::Array(rules) => check_array(rules, value, path, violations),
        Validator::Object(object) => object.check(value, path, violations),
        Validator::Record => {
            if !value.is_object() {
                violations.push(Violation::new(path, "expected an object"));
            }
            value.clone()
        }
    }
}

fn check_enum(options: &[String], value: &Value, path: &str, violations: &mut Vec<Violation>) -> Value {
    match value.as_str() {
        Some(s) if options.iter().any(|o| o == s) => {}
        _ => {
            violations.push(Violation::new(
                path,
                format!("must be one of: {}", options.join(", ")),
            ));
        }
    }
    value.clone()
}

fn check_string(
    rules: &StringRules,
    value: &Value,
    path: &str,
    violations: &mut Vec<Violation>,
) -> Value {
    let Some(s) = value.as_str() else {
        violations.push(Violation::new(path, "expected a string"));
        return value.clone();
    };

    if let Some(format) = rules.format
        && !format_matches(format, s)
    {
        violations.push(Violation::new(path, format!("not a valid {}", format.label())));
    }

    // Length bounds are inclusive and counted in characters.
    let length = s.chars().count();
    if let Some(min) = rules.min_length
        && length < min
    {
        violations.push(Violation::new(
            path,
            format!("must be at least {min} characters (got {length})"),
        ));
    }
    if let Some(max) = rules.max_length
        && length > max
    {
        violations.push(Violation::new(
            path,
            format!("must be at most {max} characters (got {length})"),
        ));
    }

    if let Some(pattern) = &rules.pattern
        && !pattern.is_match(s)
    {
        violations.push(Violation::new(
            path,
            format!("does not match pattern '{}'", pattern.as_str()),
        ));
    }

    value.clone()
}

fn check_number(
    rules: &NumberRules,
    integer: bool,
    value: &Value,
    path: &str,
    violations: &mut Vec<Violation>,
) -> Value {
    let (numeric, normalized) = match value {
        Value::Number(n) => (n.as_f64(), value.clone()),
        Value::String(s) => match s.parse::<f64>() {
            Ok(n) => {
                // Safe coercion: numeric strings become numbers in the
                // normalized output.
                let coerced = if integer {
                    s.parse::<i64>().ok().map(Value::from)
                } else {
                    serde_json::Number::from_f64(n).map(Value::Number)
                };
                (Some(n), coerced.unwrap_or_else(|| value.clone()))
            }
            Err(_) => (None, value.clone()),
        },
        _ => (None, value.clone()),
    };

    let Some(n) = numeric else {
        let expected = if integer { "an integer" } else { "a number" };
        violations.push(Violation::new(path, format!("expected {expected}")));
        return value.clone();
    };

    if integer && n.fract() != 0.0 {
        violations.push(Violation::new(
            path,
            "expected an integer, got a fractional value",
        ));
    }
    if let Some(min) = rules.minimum
        && n < min
    {
        violations.push(Violation::new(path, format!("must be at least {min}")));
    }
    if let Some(max) = rules.maximum
        && n > max
    {
        violations.push(Violation::new(path, format!("must be at most {max}")));
    }

    normalized
}

fn check_boolean(value: &Value, path: &str, violations: &mut Vec<Violation>) -> Value {
    match value {
        Value::Bool(_) => value.clone(),
        Value::String(s) if s == "true" => Value::Bool(true),
        Value::String(s) if s == "false" => Value::Bool(false),
        _ => {
            violations.push(Violation::new(path, "expected a boolean"));
            value.clone()
        }
    }
}

fn check_array(
    rules: &ArrayRules,
    value: &Value,
    path: &str,
    violations: &mut Vec<Violation>,
) -> Value {
    let Some(elements) = value.as_array() else {
        violations.push(Violation::new(path, "expected an array"));
        return value.clone();
    };

    if let Some(min) = rules.min_items
        && elements.len() < min
    {
        violations.push(Violation::new(
            path,
            format!("must contain at least {min} items (got {})", elements.len()),
        ));
    }
    if let Some(max) = rules.max_items
        && elements.len() > max
    {
        violations.push(Violation::new(
            path,
            format!("must contain at most {max} items (got {})", elements.len()),
        ));
    }

    let normalized = elements
        .iter()
        .enumerate()
        .map(|(i, element)| check_value(&rules.items, element, &format!("{path}[{i}]"), violations))
        .collect();
    Value::Array(normalized)
}

fn format_matches(format: StringFormat, s: &str) -> bool {
    match format {
        StringFormat::Email => is_email(s),
        StringFormat::Url => Url::parse(s).is_ok(),
        StringFormat::Uuid => is_uuid(s),
    }
}

fn is_email(s: &str) -> bool {
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !s.chars().any(char::is_whitespace)
}

fn is_uuid(s: &str) -> bool {
    let bytes = s.as_bytes();
    if bytes.len() != 36 {
        return false;
    }
    bytes.iter().enumerate().all(|(i, &b)| match i {
        8 | 13 | 18 | 23 => b == b'-',
        _ => b.is_ascii_hexdigit(),
    })
}

fn join_path(path: &str, name: &str) -> String {
    if path.is_empty() {
        name.to_string()
    } else {
        format!("{path}.{name}")
    }
}
