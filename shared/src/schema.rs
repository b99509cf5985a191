//! Model schemas: named field descriptors attached to a data model, and
//! the evaluator that runs them against incoming JSON.

use serde_json::{Map, Value};

use crate::failure::ValidationFailureNode;
use crate::fields::FieldDescriptor;
use crate::rules::{Check, Rule};

/// Path of the node that roots a model's failure tree
pub const ROOT_PATH: &str = "body";

/// Rule name reported when the input is not a JSON object
pub const IS_OBJECT: &str = "isObject";

/// The field descriptors attached to one data model, in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSchema {
    name: String,
    fields: Vec<(String, FieldDescriptor)>,
}

impl ModelSchema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Attach a descriptor to a field. Attaching to an existing field
    /// replaces its descriptor in place.
    pub fn field(mut self, name: impl Into<String>, descriptor: FieldDescriptor) -> Self {
        let name = name.into();
        match self.fields.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = descriptor,
            None => self.fields.push((name, descriptor)),
        }
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldDescriptor)> {
        self.fields.iter().map(|(name, d)| (name.as_str(), d))
    }

    pub fn descriptor(&self, field: &str) -> Option<&FieldDescriptor> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, d)| d)
    }

    /// Transform and validate `input`.
    ///
    /// Returns the transformed object, or a root failure node whose children
    /// are the failing fields in declaration order. Fields not declared in
    /// the schema pass through untouched.
    pub fn validate(&self, input: Value) -> Result<Value, ValidationFailureNode> {
        let Value::Object(object) = input else {
            return Err(ValidationFailureNode::new(ROOT_PATH).violate(IS_OBJECT, None));
        };
        self.validate_object("", object).map(Value::Object).map_err(|children| {
            let mut root = ValidationFailureNode::new(ROOT_PATH);
            root.children = children;
            root
        })
    }

    pub(crate) fn validate_object(
        &self,
        prefix: &str,
        mut object: Map<String, Value>,
    ) -> Result<Map<String, Value>, Vec<ValidationFailureNode>> {
        let mut failures = Vec::new();

        for (name, descriptor) in &self.fields {
            let path = if prefix.is_empty() {
                name.clone()
            } else {
                format!("{}.{}", prefix, name)
            };
            let (value, failure) = descriptor.evaluate(&path, object.remove(name));
            if let Some(value) = value {
                object.insert(name.clone(), value);
            }
            if let Some(failure) = failure {
                failures.push(failure);
            }
        }

        if failures.is_empty() {
            Ok(object)
        } else {
            Err(failures)
        }
    }
}

impl FieldDescriptor {
    /// Run this field's rules against one value.
    ///
    /// Transforms run first, in declaration order; then every check runs and
    /// each violation is recorded, so a node may carry several rule names.
    /// Returns the transformed value (`None` when absent) and the failure
    /// node, if any check failed.
    pub fn evaluate(
        &self,
        path: &str,
        value: Option<Value>,
    ) -> (Option<Value>, Option<ValidationFailureNode>) {
        if matches!(value, None | Some(Value::Null)) && self.allows_absent() {
            return (value, None);
        }

        let mut value = value;
        for rule in self.rules() {
            if let Rule::Transform(transform) = rule {
                value = transform.apply(value);
            }
        }

        let mut node = ValidationFailureNode::new(path);
        for rule in self.rules() {
            let Rule::Validate(check, failure_key) = rule else {
                continue;
            };
            match (check, value.take()) {
                (Check::Nested(schema), Some(Value::Object(object))) => {
                    match schema.validate_object(path, object.clone()) {
                        Ok(nested) => value = Some(Value::Object(nested)),
                        Err(children) => {
                            value = Some(Value::Object(object));
                            node.children.extend(children);
                        }
                    }
                }
                (check, current) => {
                    if !check.passes(current.as_ref()) {
                        node = node.violate(check.name(), failure_key.clone());
                    }
                    value = current;
                }
            }
        }

        let failure = if node.is_empty() { None } else { Some(node) };
        (value, failure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::*;
    use crate::rules::PhoneRegion;
    use serde_json::json;

    fn violated_names(node: &ValidationFailureNode) -> Vec<&str> {
        node.violated.keys().map(String::as_str).collect()
    }

    #[test]
    fn test_number_over_maximum_violates_only_max() {
        let field = number_field(NumberOptions {
            minimum: Some(1.0),
            maximum: Some(10.0),
            ..Default::default()
        });
        let (_, failure) = field.evaluate("count", Some(json!(11)));
        let failure = failure.expect("11 is above the maximum");
        assert_eq!(violated_names(&failure), vec!["max"]);

        let (value, failure) = field.evaluate("count", Some(json!("7")));
        assert!(failure.is_none());
        assert_eq!(value, Some(json!(7)));
    }

    #[test]
    fn test_phone_default_pattern() {
        let field = phone_field(PhoneOptions::default());
        for number in ["0912345678", "+84912345678"] {
            let (_, failure) = field.evaluate("phone", Some(json!(number)));
            assert!(failure.is_none(), "{} should be accepted", number);
        }

        let (_, failure) = field.evaluate("phone", Some(json!("123")));
        let failure = failure.expect("123 is not a phone number");
        assert_eq!(
            failure.violated.get("matches"),
            Some(&Some("validation.PHONE_NUMBER_IS_INVALID".to_string()))
        );
    }

    #[test]
    fn test_phone_region() {
        let field = phone_field(PhoneOptions {
            region: Some(PhoneRegion::Us),
            ..Default::default()
        });
        assert!(field.evaluate("phone", Some(json!("+1 415 555 2671"))).1.is_none());
        assert!(field.evaluate("phone", Some(json!("0912345678"))).1.is_some());
    }

    #[test]
    fn test_text_trims_before_checking_length() {
        let field = text_field(TextOptions {
            min_length: Some(3),
            to_lowercase: true,
            ..Default::default()
        });
        let (value, failure) = field.evaluate("name", Some(json!("  Ab   C ")));
        assert!(failure.is_none());
        assert_eq!(value, Some(json!("ab c")));

        let (_, failure) = field.evaluate("name", Some(json!("  a ")));
        assert_eq!(violated_names(&failure.unwrap()), vec!["minLength"]);
    }

    #[test]
    fn test_missing_required_text_records_every_violation() {
        let field = text_field(TextOptions {
            min_length: Some(2),
            ..Default::default()
        });
        let (_, failure) = field.evaluate("name", None);
        assert_eq!(
            violated_names(&failure.unwrap()),
            vec!["isNotEmpty", "isString", "minLength"]
        );
    }

    #[test]
    fn test_optional_field_skips_absent_values() {
        let field = text_field_optional(TextOptions {
            min_length: Some(2),
            ..Default::default()
        });
        assert_eq!(field.evaluate("nickname", None), (None, None));
        assert_eq!(
            field.evaluate("nickname", Some(Value::Null)),
            (Some(Value::Null), None)
        );
        assert!(field.evaluate("nickname", Some(json!("x"))).1.is_some());
    }

    #[test]
    fn test_identifier_each_coerces_scalar() {
        let field = identifier_field(IdentifierOptions {
            each: true,
            ..Default::default()
        });
        let id = "9b2f4c1e-8d3a-4f5b-9c6d-7e8f9a0b1c2d";
        let (value, failure) = field.evaluate("ids", Some(json!(id)));
        assert!(failure.is_none());
        assert_eq!(value, Some(json!([id])));

        let (_, failure) = field.evaluate("ids", Some(json!([])));
        assert_eq!(violated_names(&failure.unwrap()), vec!["arrayNotEmpty"]);
    }

    #[test]
    fn test_enum_each() {
        let field = enum_field(["red", "green"], EnumOptions { each: true, ..Default::default() });
        assert!(field.evaluate("colors", Some(json!("red"))).1.is_none());
        let (_, failure) = field.evaluate("colors", Some(json!(["red", "blue"])));
        assert_eq!(violated_names(&failure.unwrap()), vec!["isEnum"]);
    }

    #[test]
    fn test_date_field() {
        let field = date_field(DateOptions::default());
        let (value, failure) = field.evaluate("birthday", Some(json!("1990-05-17")));
        assert!(failure.is_none());
        assert_eq!(value, Some(json!("1990-05-17T00:00:00.000Z")));

        let (_, failure) = field.evaluate("birthday", Some(json!("yesterday")));
        assert_eq!(
            failure.unwrap().violated.get("isDate"),
            Some(&Some("validation.DATE_IS_INVALID".to_string()))
        );
    }

    #[test]
    fn test_point_nested_failures_become_children() {
        let field = point_field(PointOptions::default());
        let (_, failure) = field.evaluate(
            "location",
            Some(json!({"type": 5, "coordinates": [1.0, "north"]})),
        );
        let failure = failure.unwrap();
        let child_paths: Vec<_> = failure.children.iter().map(|c| c.field_path.as_str()).collect();
        assert_eq!(child_paths, vec!["location.type", "location.coordinates"]);
        assert_eq!(violated_names(&failure), vec!["isPointField"]);

        let ok = json!({"type": "Point", "coordinates": [38.8951, -77.0364]});
        assert!(field.evaluate("location", Some(ok)).1.is_none());

        let (_, failure) = field.evaluate("location", Some(json!("here")));
        assert_eq!(
            violated_names(&failure.unwrap()),
            vec!["nestedValidation", "isPointField"]
        );
    }

    #[test]
    fn test_schema_validate() {
        let schema = ModelSchema::new("CreateUser")
            .field("name", text_field(TextOptions::default()))
            .field("email", email_field(EmailOptions::default()))
            .field("age", number_field_optional(NumberOptions::default()));

        let out = schema
            .validate(json!({"name": " Ann ", "email": "ANN@Example.com", "extra": true}))
            .unwrap();
        assert_eq!(out, json!({"name": "Ann", "email": "ann@example.com", "extra": true}));

        let root = schema.validate(json!({"email": "nope"})).unwrap_err();
        assert_eq!(root.field_path, ROOT_PATH);
        assert!(root.violated.is_empty());
        let paths: Vec<_> = root.children.iter().map(|c| c.field_path.as_str()).collect();
        assert_eq!(paths, vec!["name", "email"]);
    }

    #[test]
    fn test_schema_rejects_non_object() {
        let schema = ModelSchema::new("Empty");
        let root = schema.validate(json!([1, 2])).unwrap_err();
        assert_eq!(root.field_path, "body");
        assert!(root.children.is_empty());
        assert_eq!(violated_names(&root), vec![IS_OBJECT]);
    }

    #[test]
    fn test_attaching_twice_replaces() {
        let schema = ModelSchema::new("M")
            .field("a", text_field(TextOptions::default()))
            .field("a", number_field(NumberOptions::default()));
        assert_eq!(schema.fields().count(), 1);
        assert_eq!(schema.descriptor("a").unwrap().kind(), FieldKind::Number);
    }
}
