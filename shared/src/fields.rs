//! Field descriptor builders.
//!
//! Each builder turns a field kind and its options into an ordered rule
//! list: the transforms to run, the checks to enforce and the documentation
//! fragment to publish. The `*_optional` builders are thin wrappers over the
//! required builders and never carry rules of their own.

use serde::Serialize;
use serde_json::{json, Value};

use crate::patterns::{VIETNAM_MOBILE_PATTERN, VIETNAM_MOBILE_REGEX};
use crate::rules::{Check, DocFragment, EmailFormat, Pattern, PhoneRegion, Rule, Transform};
use crate::schema::ModelSchema;

/// Failure key of the default phone pattern
pub const PHONE_NUMBER_IS_INVALID: &str = "validation.PHONE_NUMBER_IS_INVALID";
/// Failure key of date fields
pub const DATE_IS_INVALID: &str = "validation.DATE_IS_INVALID";
/// Failure key of geographic point fields
pub const POINT_IS_INVALID: &str = "validation.POINT_IS_INVALID";

/// Documented example of phone fields
pub const PHONE_EXAMPLE: &str = "0352146857";
/// Documented example of date fields
pub const DATE_EXAMPLE: &str = "2024-01-01T00:00:00.000Z";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FieldKind {
    Text,
    Number,
    Identifier,
    Email,
    Phone,
    Enum,
    Date,
    GeoPoint,
}

/// The immutable rule bundle attached to one model field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    kind: FieldKind,
    rules: Vec<Rule>,
    optional: bool,
}

impl FieldDescriptor {
    /// Build a descriptor from a hand-written rule list
    pub fn custom(kind: FieldKind, rules: Vec<Rule>) -> Self {
        let optional = rules.first() == Some(&Rule::AllowAbsent);
        Self {
            kind,
            rules,
            optional,
        }
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }

    /// All document fragments merged in declaration order
    pub fn documentation(&self) -> DocFragment {
        let mut merged = DocFragment::new();
        for rule in &self.rules {
            if let Rule::Document(fragment) = rule {
                merged.merge(fragment);
            }
        }
        merged
    }

    pub fn allows_absent(&self) -> bool {
        self.rules.iter().any(|rule| matches!(rule, Rule::AllowAbsent))
    }
}

/// Wrap a descriptor so that absent values pass.
pub fn optional(base: FieldDescriptor) -> FieldDescriptor {
    let mut rules = Vec::with_capacity(base.rules.len() + 1);
    rules.push(Rule::AllowAbsent);
    rules.extend(base.rules);
    FieldDescriptor {
        kind: base.kind,
        rules,
        optional: true,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Options
// ─────────────────────────────────────────────────────────────────────────────

/// Documentation options shared by every field kind.
#[derive(Debug, Clone, PartialEq)]
pub struct DocOptions {
    pub description: Option<String>,
    pub example: Option<Value>,
    /// Listed as required in the published schema
    pub required: bool,
    /// Publish a documentation fragment at all (text and email fields)
    pub swagger: bool,
}

impl Default for DocOptions {
    fn default() -> Self {
        Self {
            description: None,
            example: None,
            required: true,
            swagger: true,
        }
    }
}

impl DocOptions {
    fn fragment(&self, schema_type: &str) -> DocFragment {
        DocFragment::new()
            .with("type", schema_type)
            .with_opt("description", self.description.clone())
            .with_opt("example", self.example.clone())
            .with("required", self.required)
    }
}

/// Pattern check with its own failure key.
#[derive(Debug, Clone, PartialEq)]
pub struct RegexRule {
    pub pattern: Pattern,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextOptions {
    pub doc: DocOptions,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub to_lowercase: bool,
    pub to_uppercase: bool,
    pub regex: Option<RegexRule>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NumberOptions {
    pub doc: DocOptions,
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    /// Require an integer
    pub int: bool,
    /// Failure key used by the bound checks
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct IdentifierOptions {
    pub doc: DocOptions,
    /// The field holds a non-empty list of identifiers
    pub each: bool,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmailOptions {
    pub text: TextOptions,
    pub format: EmailFormat,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PhoneOptions {
    pub doc: DocOptions,
    /// Without a region, numbers must match [`VIETNAM_MOBILE_PATTERN`]
    pub region: Option<PhoneRegion>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnumOptions {
    pub doc: DocOptions,
    /// The field holds a list of members
    pub each: bool,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DateOptions {
    pub doc: DocOptions,
    /// Replaces the default failure key
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointOptions {
    pub doc: DocOptions,
    /// Replaces the default failure key
    pub message: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Builders
// ─────────────────────────────────────────────────────────────────────────────

pub fn text_field(options: TextOptions) -> FieldDescriptor {
    let mut rules = vec![
        Rule::validate(Check::NotEmpty),
        Rule::validate(Check::IsString),
        Rule::Transform(Transform::Trim),
    ];

    if options.doc.swagger {
        let fragment = options
            .doc
            .fragment("string")
            .with_opt("minLength", options.min_length)
            .with_opt("maxLength", options.max_length)
            .with_opt("pattern", options.regex.as_ref().map(|r| r.pattern.as_str().to_string()));
        rules.push(Rule::Document(fragment));
    }
    if let Some(min) = options.min_length {
        rules.push(Rule::validate(Check::MinLength(min)));
    }
    if let Some(max) = options.max_length {
        rules.push(Rule::validate(Check::MaxLength(max)));
    }
    if options.to_lowercase {
        rules.push(Rule::Transform(Transform::Lowercase));
    }
    if options.to_uppercase {
        rules.push(Rule::Transform(Transform::Uppercase));
    }
    if let Some(regex) = options.regex {
        rules.push(Rule::validate_with(Check::Matches(regex.pattern), regex.message));
    }

    FieldDescriptor::custom(FieldKind::Text, rules)
}

pub fn text_field_optional(mut options: TextOptions) -> FieldDescriptor {
    options.doc.required = false;
    optional(text_field(options))
}

pub fn number_field(options: NumberOptions) -> FieldDescriptor {
    let mut doc = options.doc.clone();
    if doc.example.is_none() {
        doc.example = Some(json!(1));
    }
    let fragment = doc
        .fragment(if options.int { "integer" } else { "number" })
        .with_opt("minimum", options.minimum)
        .with_opt("maximum", options.maximum);

    let mut rules = vec![
        Rule::Document(fragment),
        Rule::validate(Check::IsNumber),
        Rule::Transform(Transform::ToNumber),
    ];
    if options.int {
        rules.push(Rule::validate(Check::IsInt));
    }
    if let Some(max) = options.maximum {
        rules.push(Rule::validate_with(Check::Max(max), options.message.clone()));
    }
    if let Some(min) = options.minimum {
        rules.push(Rule::validate_with(Check::Min(min), options.message.clone()));
    }

    FieldDescriptor::custom(FieldKind::Number, rules)
}

pub fn number_field_optional(mut options: NumberOptions) -> FieldDescriptor {
    options.doc.required = false;
    optional(number_field(options))
}

pub fn identifier_field(options: IdentifierOptions) -> FieldDescriptor {
    let uuid = DocFragment::new().with("type", "string").with("format", "uuid");
    let fragment = if options.each {
        options
            .doc
            .fragment("array")
            .with("items", uuid.into_map())
    } else {
        options.doc.fragment("string").with("format", "uuid")
    };

    let (is_string, is_uuid) = if options.each {
        (Check::IsString.each(), Check::IsUuid.each())
    } else {
        (Check::IsString, Check::IsUuid)
    };
    let mut rules = vec![
        Rule::Document(fragment),
        Rule::validate_with(is_string, options.message.clone()),
        Rule::validate_with(is_uuid, options.message.clone()),
    ];
    if options.each {
        rules.push(Rule::validate_with(Check::ArrayNotEmpty, options.message));
        rules.push(Rule::Transform(Transform::ToArray));
    }

    FieldDescriptor::custom(FieldKind::Identifier, rules)
}

pub fn identifier_field_optional(mut options: IdentifierOptions) -> FieldDescriptor {
    options.doc.required = false;
    optional(identifier_field(options))
}

/// Email fields carry every text rule with lowercasing forced on. They are
/// documented as plain strings with an `email` format.
pub fn email_field(options: EmailOptions) -> FieldDescriptor {
    let swagger = options.text.doc.swagger;
    let fragment = options.text.doc.fragment("string").with("format", "email");

    let mut rules = vec![Rule::validate_with(
        Check::IsEmail(options.format),
        options.message,
    )];
    let text = text_field(TextOptions {
        to_lowercase: true,
        ..options.text
    });
    rules.extend(text.rules);
    if swagger {
        rules.push(Rule::Document(fragment));
    }

    FieldDescriptor::custom(FieldKind::Email, rules)
}

pub fn email_field_optional(mut options: EmailOptions) -> FieldDescriptor {
    options.text.doc.required = false;
    optional(email_field(options))
}

pub fn phone_field(options: PhoneOptions) -> FieldDescriptor {
    let mut doc = options.doc.clone();
    if doc.example.is_none() {
        doc.example = Some(json!(PHONE_EXAMPLE));
    }
    let mut fragment = doc.fragment("string");

    let check = match options.region {
        Some(region) => {
            fragment = fragment.with("x-phone-region", region.code());
            Rule::validate_with(Check::IsPhoneNumber(region), options.message)
        }
        None => {
            fragment = fragment.with("pattern", VIETNAM_MOBILE_PATTERN);
            Rule::validate_with(
                Check::Matches(Pattern::from(&*VIETNAM_MOBILE_REGEX)),
                Some(PHONE_NUMBER_IS_INVALID.to_string()),
            )
        }
    };

    FieldDescriptor::custom(FieldKind::Phone, vec![Rule::Document(fragment), check])
}

pub fn phone_field_optional(mut options: PhoneOptions) -> FieldDescriptor {
    options.doc.required = false;
    optional(phone_field(options))
}

/// Membership in `values`. The documented type is inferred from the members
/// and left out when they mix strings and numbers.
pub fn enum_field<I, V>(values: I, options: EnumOptions) -> FieldDescriptor
where
    I: IntoIterator<Item = V>,
    V: Into<Value>,
{
    let values: Vec<Value> = values.into_iter().map(Into::into).collect();
    let member_type = if values.iter().all(Value::is_string) {
        Some("string")
    } else if values.iter().all(Value::is_number) {
        Some("number")
    } else {
        None
    };
    let members = DocFragment::new()
        .with_opt("type", member_type)
        .with("enum", values.clone());
    let fragment = if options.each {
        options.doc.fragment("array").with("items", members.into_map())
    } else {
        let mut fragment = options.doc.fragment(member_type.unwrap_or_default());
        if member_type.is_none() {
            fragment.remove("type");
        }
        fragment.merge(&members);
        fragment
    };

    let check = if options.each {
        Check::IsEnum(values).each()
    } else {
        Check::IsEnum(values)
    };
    let mut rules = vec![
        Rule::Document(fragment),
        Rule::validate_with(check, options.message),
    ];
    if options.each {
        rules.push(Rule::Transform(Transform::ToArray));
    }

    FieldDescriptor::custom(FieldKind::Enum, rules)
}

pub fn enum_field_optional<I, V>(values: I, mut options: EnumOptions) -> FieldDescriptor
where
    I: IntoIterator<Item = V>,
    V: Into<Value>,
{
    options.doc.required = false;
    optional(enum_field(values, options))
}

pub fn date_field(options: DateOptions) -> FieldDescriptor {
    let mut doc = options.doc.clone();
    if doc.example.is_none() {
        doc.example = Some(json!(DATE_EXAMPLE));
    }
    let fragment = doc.fragment("string").with("format", "date-time");

    FieldDescriptor::custom(
        FieldKind::Date,
        vec![
            Rule::Document(fragment),
            Rule::Transform(Transform::ToDate),
            Rule::validate_with(
                Check::IsDate,
                Some(options.message.unwrap_or_else(|| DATE_IS_INVALID.to_string())),
            ),
        ],
    )
}

pub fn date_field_optional(mut options: DateOptions) -> FieldDescriptor {
    options.doc.required = false;
    optional(date_field(options))
}

/// A GeoJSON point: `{"type": "Point", "coordinates": [lat, long]}`.
pub fn point_field(options: PointOptions) -> FieldDescriptor {
    let mut doc = options.doc.clone();
    if doc.example.is_none() {
        doc.example = Some(json!({"type": "Point", "coordinates": [38.8951, -77.0364]}));
    }
    let fragment = doc.fragment("object");

    FieldDescriptor::custom(
        FieldKind::GeoPoint,
        vec![
            Rule::Document(fragment),
            Rule::validate(Check::Nested(Box::new(coordinate_schema()))),
            Rule::validate_with(
                Check::IsPoint,
                Some(options.message.unwrap_or_else(|| POINT_IS_INVALID.to_string())),
            ),
        ],
    )
}

pub fn point_field_optional(mut options: PointOptions) -> FieldDescriptor {
    options.doc.required = false;
    optional(point_field(options))
}

/// Shape of the object behind a point field
pub fn coordinate_schema() -> ModelSchema {
    ModelSchema::new("Coordinate")
        .field(
            "type",
            FieldDescriptor::custom(
                FieldKind::Text,
                vec![
                    Rule::Document(
                        DocFragment::new()
                            .with("type", "string")
                            .with("example", "Point")
                            .with("required", true),
                    ),
                    Rule::validate(Check::IsString),
                ],
            ),
        )
        .field(
            "coordinates",
            FieldDescriptor::custom(
                FieldKind::Number,
                vec![
                    Rule::Document(
                        DocFragment::new()
                            .with("type", "array")
                            .with("items", json!({"type": "number"}))
                            .with("example", json!([38.8951, -77.0364]))
                            .with("required", true),
                    ),
                    Rule::validate(Check::IsNumber.each()),
                ],
            ),
        )
}
