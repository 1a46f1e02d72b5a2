//! Parameter descriptors and normalization of raw descriptor containers.
//!
//! Tool catalogs deliver parameter descriptions in two shapes:
//!
//! 1. JSON-Schema-style: an object with a `properties` map and a top-level
//!    `required` name list.
//! 2. Flat record: a mapping of name → ad hoc shape whose own `type`/`required`
//!    fields are read directly.
//!
//! Both are resolved here, once, into the single canonical
//! [`ParameterDescriptor`] shape. Downstream components never see the raw
//! container again.
//!
//! Insertion order of the source container is preserved (it determines the
//! order in which the composite validator is assembled), which is why this
//! crate enables `serde_json`'s `preserve_order` feature.

use serde_json::{Map, Value, json};

/// Declared parameter type.
///
/// The set is closed: anything the catalog declares that is not one of the six
/// known type strings maps to [`ParamType::Any`], which accepts every value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    String,
    Number,
    Integer,
    Boolean,
    Array,
    Object,
    Any,
}

impl ParamType {
    /// Parse a declared `type` string.
    ///
    /// Absent or empty declarations default to `String` (the catalog's
    /// convention for bare leaves); unrecognized declarations degrade to
    /// `Any`.
    #[must_use]
    pub fn parse(declared: Option<&str>) -> Self {
        let Some(declared) = declared else {
            return ParamType::String;
        };
        match declared.to_ascii_lowercase().as_str() {
            "" | "string" => ParamType::String,
            "number" => ParamType::Number,
            "integer" => ParamType::Integer,
            "boolean" => ParamType::Boolean,
            "array" => ParamType::Array,
            "object" => ParamType::Object,
            _ => ParamType::Any,
        }
    }

    /// The JSON Schema type keyword for this type, if it has one.
    #[must_use]
    pub fn as_str(self) -> Option<&'static str> {
        match self {
            ParamType::String => Some("string"),
            ParamType::Number => Some("number"),
            ParamType::Integer => Some("integer"),
            ParamType::Boolean => Some("boolean"),
            ParamType::Array => Some("array"),
            ParamType::Object => Some("object"),
            ParamType::Any => None,
        }
    }
}

/// Nested shape of an `object`-typed descriptor.
///
/// Note the dual meaning of `required` in the source containers: at the top
/// level it is a per-parameter boolean, but inside an object descriptor it is
/// a list of mandatory child names. The two are kept as distinct fields
/// ([`ParameterDescriptor::required`] vs [`ObjectShape::required_children`])
/// so no runtime shape-checking is needed on access.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectShape {
    /// Child name → declared child type, in declaration order.
    pub properties: Vec<(String, ParamType)>,
    /// Names of children that are mandatory within this object.
    pub required_children: Vec<String>,
}

/// One declared parameter of a tool.
///
/// Constraint fields apply by type (length/format/pattern for strings, bounds
/// for numbers, item shape/count for arrays, nested shape for objects);
/// inapplicable fields are simply ignored by the validator builder.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterDescriptor {
    pub name: String,
    pub ty: ParamType,
    /// Carried through for documentation only; never affects validation.
    pub description: Option<String>,
    pub required: bool,
    /// Closed list of string literals. When non-empty, replaces the base type
    /// validator with an exact-match check.
    pub enum_values: Vec<String>,
    pub format: Option<String>,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    pub pattern: Option<String>,
    /// Element type for arrays. Absent means elements are unconstrained.
    pub items: Option<ParamType>,
    pub min_items: Option<usize>,
    pub max_items: Option<usize>,
    /// Nested shape for objects. Absent means any key-value mapping passes.
    pub object: Option<ObjectShape>,
}

impl ParameterDescriptor {
    /// Create a bare descriptor with no constraints.
    #[must_use]
    pub fn new(name: impl Into<String>, ty: ParamType) -> Self {
        Self {
            name: name.into(),
            ty,
            description: None,
            required: false,
            enum_values: Vec::new(),
            format: None,
            min_length: None,
            max_length: None,
            minimum: None,
            maximum: None,
            pattern: None,
            items: None,
            min_items: None,
            max_items: None,
            object: None,
        }
    }

    /// Render this descriptor back as a JSON-Schema-style property value
    /// (used for tool advertisement).
    #[must_use]
    pub fn to_schema_value(&self) -> Value {
        let mut schema = Map::new();
        if let Some(ty) = self.ty.as_str() {
            schema.insert("type".to_string(), json!(ty));
        }
        if let Some(desc) = &self.description {
            schema.insert("description".to_string(), json!(desc));
        }
        if !self.enum_values.is_empty() {
            schema.insert("enum".to_string(), json!(self.enum_values));
        }
        if let Some(format) = &self.format {
            schema.insert("format".to_string(), json!(format));
        }
        if let Some(v) = self.min_length {
            schema.insert("minLength".to_string(), json!(v));
        }
        if let Some(v) = self.max_length {
            schema.insert("maxLength".to_string(), json!(v));
        }
        if let Some(v) = self.minimum {
            schema.insert("minimum".to_string(), json!(v));
        }
        if let Some(v) = self.maximum {
            schema.insert("maximum".to_string(), json!(v));
        }
        if let Some(p) = &self.pattern {
            schema.insert("pattern".to_string(), json!(p));
        }
        if let Some(item_ty) = self.items {
            let mut item = Map::new();
            if let Some(ty) = item_ty.as_str() {
                item.insert("type".to_string(), json!(ty));
            }
            schema.insert("items".to_string(), Value::Object(item));
        }
        if let Some(v) = self.min_items {
            schema.insert("minItems".to_string(), json!(v));
        }
        if let Some(v) = self.max_items {
            schema.insert("maxItems".to_string(), json!(v));
        }
        if let Some(shape) = &self.object {
            let mut props = Map::new();
            for (child, ty) in &shape.properties {
                let mut child_schema = Map::new();
                if let Some(ty) = ty.as_str() {
                    child_schema.insert("type".to_string(), json!(ty));
                }
                props.insert(child.clone(), Value::Object(child_schema));
            }
            schema.insert("properties".to_string(), Value::Object(props));
            if !shape.required_children.is_empty() {
                schema.insert("required".to_string(), json!(shape.required_children));
            }
        }
        Value::Object(schema)
    }
}

/// Ordered set of parameter descriptors: the source of truth for one tool's
/// call signature. May be empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterSet {
    params: Vec<ParameterDescriptor>,
}

impl ParameterSet {
    /// Normalize a free-form parameter container into an ordered set.
    ///
    /// Absent or non-object input yields an empty set; malformed entries
    /// degrade to best-effort descriptors. This never fails.
    #[must_use]
    pub fn from_raw(parameters: Option<&Value>) -> Self {
        let Some(Value::Object(container)) = parameters else {
            return Self::default();
        };

        // JSON-Schema-style container: an object-typed `properties` key plus
        // an optional top-level `required` name list.
        if let Some(Value::Object(props)) = container.get("properties") {
            let required: Vec<&str> = container
                .get("required")
                .and_then(Value::as_array)
                .map(|names| names.iter().filter_map(Value::as_str).collect())
                .unwrap_or_default();

            let params = props
                .iter()
                .map(|(name, schema)| {
                    descriptor_from_schema(name, schema, required.contains(&name.as_str()))
                })
                .collect();
            return Self { params };
        }

        // Flat record: each entry's own shape carries `type` and a boolean
        // `required` directly.
        let params = container
            .iter()
            .map(|(name, shape)| {
                let mut desc = ParameterDescriptor::new(
                    name,
                    ParamType::parse(shape.get("type").and_then(Value::as_str)),
                );
                desc.description = shape
                    .get("description")
                    .and_then(Value::as_str)
                    .map(str::to_string);
                desc.required = shape
                    .get("required")
                    .and_then(Value::as_bool)
                    .unwrap_or(false);
                desc
            })
            .collect();
        Self { params }
    }

    /// Construct a set from already-built descriptors (declaration order is
    /// the slice order).
    #[must_use]
    pub fn from_descriptors(params: Vec<ParameterDescriptor>) -> Self {
        Self { params }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ParameterDescriptor> {
        self.params.iter()
    }

    /// Render the set as a JSON-Schema-style object for tool advertisement.
    #[must_use]
    pub fn to_input_schema(&self) -> Value {
        let mut properties = Map::new();
        let mut required: Vec<String> = Vec::new();

        for desc in &self.params {
            properties.insert(desc.name.clone(), desc.to_schema_value());
            if desc.required {
                required.push(desc.name.clone());
            }
        }

        let mut schema = json!({
            "type": "object",
            "properties": properties,
        });
        if !required.is_empty() {
            schema["required"] = json!(required);
        }

        schema
    }
}

/// Build one descriptor from a JSON-Schema-style property entry.
fn descriptor_from_schema(name: &str, schema: &Value, required: bool) -> ParameterDescriptor {
    let mut desc =
        ParameterDescriptor::new(name, ParamType::parse(schema.get("type").and_then(Value::as_str)));
    desc.required = required;
    desc.description = schema
        .get("description")
        .and_then(Value::as_str)
        .map(str::to_string);
    desc.enum_values = schema
        .get("enum")
        .and_then(Value::as_array)
        .map(|values| {
            values
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();
    desc.format = schema
        .get("format")
        .and_then(Value::as_str)
        .map(str::to_string);
    desc.min_length = read_count(schema, "minLength");
    desc.max_length = read_count(schema, "maxLength");
    desc.minimum = schema.get("minimum").and_then(Value::as_f64);
    desc.maximum = schema.get("maximum").and_then(Value::as_f64);
    desc.pattern = schema
        .get("pattern")
        .and_then(Value::as_str)
        .map(str::to_string);
    desc.items = schema
        .get("items")
        .map(|items| ParamType::parse(items.get("type").and_then(Value::as_str)));
    desc.min_items = read_count(schema, "minItems");
    desc.max_items = read_count(schema, "maxItems");

    if let Some(props) = schema.get("properties").and_then(Value::as_object) {
        let required_children = schema
            .get("required")
            .and_then(Value::as_array)
            .map(|names| {
                names
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        let properties = props
            .iter()
            .map(|(child, child_schema)| {
                (
                    child.clone(),
                    ParamType::parse(child_schema.get("type").and_then(Value::as_str)),
                )
            })
            .collect();
        desc.object = Some(ObjectShape {
            properties,
            required_children,
        });
    }

    desc
}

fn read_count(schema: &Value, key: &str) -> Option<usize> {
    schema
        .get(key)
        .and_then(Value::as_u64)
        .and_then(|v| usize::try_from(v).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_param_type_parse() {
        assert_eq!(ParamType::parse(None), ParamType::String);
        assert_eq!(ParamType::parse(Some("")), ParamType::String);
        assert_eq!(ParamType::parse(Some("String")), ParamType::String);
        assert_eq!(ParamType::parse(Some("integer")), ParamType::Integer);
        assert_eq!(ParamType::parse(Some("tuple")), ParamType::Any);
    }

    #[test]
    fn test_absent_or_non_object_container_yields_empty_set() {
        assert!(ParameterSet::from_raw(None).is_empty());
        assert!(ParameterSet::from_raw(Some(&json!(null))).is_empty());
        assert!(ParameterSet::from_raw(Some(&json!("params"))).is_empty());
        assert!(ParameterSet::from_raw(Some(&json!([1, 2]))).is_empty());
    }

    #[test]
    fn test_json_schema_container_reads_required_list() {
        let raw = json!({
            "properties": {
                "channel": {"type": "string", "description": "Target channel"},
                "limit": {"type": "integer", "minimum": 1, "maximum": 100}
            },
            "required": ["channel"]
        });
        let set = ParameterSet::from_raw(Some(&raw));
        assert_eq!(set.len(), 2);

        let channel = set.iter().find(|p| p.name == "channel").unwrap();
        assert_eq!(channel.ty, ParamType::String);
        assert!(channel.required);
        assert_eq!(channel.description.as_deref(), Some("Target channel"));

        let limit = set.iter().find(|p| p.name == "limit").unwrap();
        assert_eq!(limit.ty, ParamType::Integer);
        assert!(!limit.required);
        assert_eq!(limit.minimum, Some(1.0));
        assert_eq!(limit.maximum, Some(100.0));
    }

    #[test]
    fn test_flat_record_reads_per_entry_required() {
        let raw = json!({
            "a": {"type": "string", "required": true},
            "b": {"type": "boolean"}
        });
        let set = ParameterSet::from_raw(Some(&raw));
        let a = set.iter().find(|p| p.name == "a").unwrap();
        let b = set.iter().find(|p| p.name == "b").unwrap();
        assert!(a.required);
        assert_eq!(b.ty, ParamType::Boolean);
        assert!(!b.required);
    }

    #[test]
    fn test_both_container_shapes_normalize_equivalently() {
        let json_schema_style = json!({
            "properties": {"a": {"type": "string"}},
            "required": ["a"]
        });
        let flat_record = json!({
            "a": {"type": "string", "required": true}
        });
        assert_eq!(
            ParameterSet::from_raw(Some(&json_schema_style)),
            ParameterSet::from_raw(Some(&flat_record))
        );
    }

    #[test]
    fn test_nested_object_required_is_a_name_list() {
        let raw = json!({
            "properties": {
                "profile": {
                    "type": "object",
                    "properties": {
                        "name": {"type": "string"},
                        "age": {"type": "integer"}
                    },
                    "required": ["name"]
                }
            },
            "required": []
        });
        let set = ParameterSet::from_raw(Some(&raw));
        let profile = set.iter().next().unwrap();
        assert!(!profile.required);
        let shape = profile.object.as_ref().unwrap();
        assert_eq!(shape.required_children, vec!["name".to_string()]);
        assert_eq!(shape.properties.len(), 2);
    }

    #[test]
    fn test_declaration_order_is_preserved() {
        let raw = json!({
            "properties": {
                "zebra": {"type": "string"},
                "apple": {"type": "string"},
                "mango": {"type": "string"}
            }
        });
        let set = ParameterSet::from_raw(Some(&raw));
        let names: Vec<&str> = set.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["zebra", "apple", "mango"]);
    }

    #[test]
    fn test_items_without_type_defaults_to_string() {
        let raw = json!({
            "properties": {
                "tags": {"type": "array", "items": {}}
            }
        });
        let set = ParameterSet::from_raw(Some(&raw));
        let tags = set.iter().next().unwrap();
        assert_eq!(tags.items, Some(ParamType::String));
    }

    #[test]
    fn test_input_schema_round_trip() {
        let raw = json!({
            "properties": {
                "status": {"type": "string", "enum": ["active", "inactive"]},
                "count": {"type": "integer", "minimum": 0}
            },
            "required": ["status"]
        });
        let set = ParameterSet::from_raw(Some(&raw));
        let advertised = set.to_input_schema();

        assert_eq!(advertised["type"], json!("object"));
        // Normalizing the advertisement again yields the same set.
        let round_tripped = ParameterSet::from_raw(Some(&advertised));
        assert_eq!(round_tripped, set);
    }
}
