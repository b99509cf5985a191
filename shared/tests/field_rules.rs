// tests/field_rules.rs
//
// End-to-end checks of the field builders, the evaluator and the failure
// normalizer working together through the public API.

use serde_json::json;
use shared::{
    email_field, enum_field_optional, normalize, number_field, optional, phone_field, point_field_optional,
    text_field, text_field_optional, Catalog, DocOptions, EmailOptions, EnumOptions, ModelSchema,
    NumberOptions, Passthrough, PhoneOptions, PointOptions, Rule, TextOptions,
};

fn signup_schema() -> ModelSchema {
    ModelSchema::new("SignupRequest")
        .field(
            "name",
            text_field(TextOptions {
                min_length: Some(2),
                max_length: Some(50),
                ..Default::default()
            }),
        )
        .field("email", email_field(EmailOptions::default()))
        .field("phone", phone_field(PhoneOptions::default()))
        .field(
            "age",
            number_field(NumberOptions {
                minimum: Some(18.0),
                maximum: Some(120.0),
                int: true,
                ..Default::default()
            }),
        )
        .field(
            "role",
            enum_field_optional(["admin", "member"], EnumOptions::default()),
        )
        .field("location", point_field_optional(PointOptions::default()))
}

// ─── Wrapper invariant ───────────────────────────────────────────────────────

#[test]
fn test_optional_text_equals_allow_absent_plus_base() {
    let variants = vec![
        TextOptions::default(),
        TextOptions {
            min_length: Some(1),
            max_length: Some(3),
            ..Default::default()
        },
        TextOptions {
            to_lowercase: true,
            to_uppercase: true,
            doc: DocOptions {
                swagger: false,
                ..Default::default()
            },
            ..Default::default()
        },
    ];

    for opts in variants {
        let wrapped = text_field_optional(opts.clone());
        let base = text_field(TextOptions {
            doc: DocOptions {
                required: false,
                ..opts.doc.clone()
            },
            ..opts
        });

        let mut expected = vec![Rule::AllowAbsent];
        expected.extend_from_slice(base.rules());
        assert_eq!(wrapped.rules(), expected.as_slice());
        assert_eq!(wrapped, optional(base));
    }
}

// ─── Behaviour through a schema ─────────────────────────────────────────────

#[test]
fn test_valid_signup_is_transformed() {
    let out = signup_schema()
        .validate(json!({
            "name": "  Nguyen   Van A ",
            "email": "A.Nguyen@Example.COM",
            "phone": "+84912345678",
            "age": "30",
        }))
        .unwrap();

    assert_eq!(out["name"], json!("Nguyen Van A"));
    assert_eq!(out["email"], json!("a.nguyen@example.com"));
    assert_eq!(out["age"], json!(30));
    assert!(out.get("role").is_none());
}

#[test]
fn test_invalid_signup_reports_one_message_per_field() {
    let failure = signup_schema()
        .validate(json!({
            "name": "",
            "email": "not-an-email",
            "phone": "123",
            "age": 150,
            "role": "owner",
            "location": {"type": "Point", "coordinates": ["x", 2]},
        }))
        .unwrap_err();

    let messages = normalize(&failure, &Passthrough);
    let fields: Vec<_> = messages.keys().map(String::as_str).collect();
    assert_eq!(
        fields,
        vec!["name", "email", "phone", "age", "role", "location.coordinates"]
    );
    assert_eq!(messages["name"], "error.fields.is_not_empty");
    assert_eq!(messages["email"], "error.fields.is_email");
    assert_eq!(messages["phone"], "validation.PHONE_NUMBER_IS_INVALID");
    assert_eq!(messages["age"], "error.fields.max");
    assert_eq!(messages["role"], "error.fields.is_enum");
    assert_eq!(messages["location.coordinates"], "error.fields.is_number");
}

#[test]
fn test_messages_are_localized() {
    let catalog = Catalog::with_defaults("en").unwrap();
    let failure = signup_schema()
        .validate(json!({
            "name": "Ann",
            "email": "ann@example.com",
            "phone": "123",
            "age": 30,
        }))
        .unwrap_err();

    let en = normalize(&failure, &catalog.locale("en-US"));
    assert_eq!(en["phone"], "Phone number is invalid");

    let vi = normalize(&failure, &catalog.locale("vi"));
    assert_eq!(vi["phone"], "Số điện thoại không hợp lệ");
}

#[test]
fn test_number_bounds_report_single_rule() {
    let field = number_field(NumberOptions {
        minimum: Some(1.0),
        maximum: Some(10.0),
        ..Default::default()
    });
    let (_, failure) = field.evaluate("quantity", Some(json!(11)));
    let failure = failure.unwrap();
    assert_eq!(failure.violated.len(), 1);
    assert!(failure.violated.contains_key("max"));
}

#[test]
fn test_custom_bound_message_is_used() {
    let field = number_field(NumberOptions {
        maximum: Some(5.0),
        message: Some("validation.TOO_MANY".to_string()),
        ..Default::default()
    });
    let schema = ModelSchema::new("Order").field("quantity", field);
    let failure = schema.validate(json!({"quantity": 6})).unwrap_err();
    assert_eq!(normalize(&failure, &Passthrough)["quantity"], "validation.TOO_MANY");
}
