//! Rule primitives: the transforms, checks and documentation fragments a
//! field descriptor is made of.
//!
//! Transforms and checks are closed enums rather than closures so that a
//! rule list can be compared, printed and inspected by documentation
//! generators.

use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Number, Value};
use uuid::Uuid;

use crate::patterns::{
    DISPLAY_NAME_REGEX, DOMAIN_LABEL_REGEX, EMAIL_LOCAL_REGEX, PHONE_GB_REGEX, PHONE_JP_REGEX,
    PHONE_SEPARATORS, PHONE_SG_REGEX, PHONE_US_REGEX, PHONE_VN_REGEX, TLD_REGEX, WHITESPACE_RUN,
};
use crate::schema::ModelSchema;

/// One entry of a field's ordered rule list.
#[derive(Debug, Clone, PartialEq)]
pub enum Rule {
    /// Absent or `null` values skip every other rule.
    AllowAbsent,
    /// Rewrites the incoming value before any check runs.
    Transform(Transform),
    /// A check and the failure key reported when it is violated.
    /// `None` leaves the key to the normalizer.
    Validate(Check, Option<String>),
    /// Documentation metadata; never affects evaluation.
    Document(DocFragment),
}

impl Rule {
    pub fn validate(check: Check) -> Self {
        Rule::Validate(check, None)
    }

    pub fn validate_with(check: Check, failure_key: Option<String>) -> Self {
        Rule::Validate(check, failure_key)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Transforms
// ─────────────────────────────────────────────────────────────────────────────

/// Value rewrites applied before validation.
///
/// `None` stands for an absent value. Transforms that only make sense for
/// strings leave other value types untouched so that the following checks
/// can report them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    /// Trim and collapse inner whitespace runs to a single space
    Trim,
    Lowercase,
    Uppercase,
    /// Absent becomes `[]`, a scalar becomes a one-element array
    ToArray,
    /// Numeric strings become numbers
    ToNumber,
    /// Date strings and epoch milliseconds become canonical RFC 3339 strings
    ToDate,
    /// Reverses a `[lat, long]` pair and coerces both entries to numbers
    ToLongLat,
}

impl Transform {
    pub fn apply(self, value: Option<Value>) -> Option<Value> {
        match self {
            Transform::Trim => value.map(|v| map_strings(v, trim_collapse)),
            Transform::Lowercase => value.map(|v| map_strings(v, |s| s.to_lowercase())),
            Transform::Uppercase => value.map(|v| map_strings(v, |s| s.to_uppercase())),
            Transform::ToArray => Some(match value {
                None | Some(Value::Null) => Value::Array(Vec::new()),
                Some(Value::Array(items)) => Value::Array(items),
                Some(other) => Value::Array(vec![other]),
            }),
            Transform::ToNumber => value.map(to_number),
            Transform::ToDate => value.map(to_date),
            Transform::ToLongLat => Some(match value {
                None | Some(Value::Null) => Value::Array(Vec::new()),
                Some(Value::Array(mut items)) => {
                    items.reverse();
                    Value::Array(items.into_iter().map(to_number).collect())
                }
                Some(other) => other,
            }),
        }
    }
}

fn map_strings(value: Value, f: impl Fn(&str) -> String) -> Value {
    match value {
        Value::String(s) => Value::String(f(&s)),
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|item| match item {
                    Value::String(s) => Value::String(f(&s)),
                    other => other,
                })
                .collect(),
        ),
        other => other,
    }
}

/// Trim a string and collapse whitespace runs into one space
pub fn trim_collapse(value: &str) -> String {
    WHITESPACE_RUN.replace_all(value.trim(), " ").into_owned()
}

fn to_number(value: Value) -> Value {
    let Value::String(s) = &value else {
        return value;
    };
    let trimmed = s.trim();
    if let Ok(int) = trimmed.parse::<i64>() {
        return Value::Number(int.into());
    }
    match trimmed.parse::<f64>().ok().and_then(Number::from_f64) {
        Some(number) => Value::Number(number),
        None => value,
    }
}

fn to_date(value: Value) -> Value {
    let parsed = match &value {
        Value::String(s) => parse_date(s),
        Value::Number(n) => n.as_i64().and_then(DateTime::<Utc>::from_timestamp_millis),
        _ => None,
    };
    match parsed {
        Some(date) => Value::String(date.to_rfc3339_opts(SecondsFormat::Millis, true)),
        None => value,
    }
}

/// Parse an RFC 3339 timestamp or a bare `YYYY-MM-DD` date
pub fn parse_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(date) = DateTime::parse_from_rfc3339(value) {
        return Some(date.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

// ─────────────────────────────────────────────────────────────────────────────
// Checks
// ─────────────────────────────────────────────────────────────────────────────

/// A validation predicate. Each check reports under a stable rule name.
#[derive(Debug, Clone, PartialEq)]
pub enum Check {
    /// Not absent, `null` or the empty string
    NotEmpty,
    IsString,
    /// Minimum length in characters
    MinLength(usize),
    /// Maximum length in characters
    MaxLength(usize),
    Matches(Pattern),
    IsNumber,
    IsInt,
    /// Inclusive upper bound
    Max(f64),
    /// Inclusive lower bound
    Min(f64),
    /// UUID, version 4
    IsUuid,
    ArrayNotEmpty,
    IsEmail(EmailFormat),
    IsPhoneNumber(PhoneRegion),
    /// Membership in a fixed value set
    IsEnum(Vec<Value>),
    /// An RFC 3339 timestamp or `YYYY-MM-DD` date string
    IsDate,
    /// A GeoJSON-like object whose `type` is `"Point"`; absent passes
    IsPoint,
    /// Validates an embedded object against its own schema. Failures of the
    /// nested fields surface as child nodes; absent passes.
    Nested(Box<ModelSchema>),
    /// Applies the inner check to every element of an array, or to the
    /// value itself when it is not an array
    Each(Box<Check>),
}

impl Check {
    /// Name the violation is reported under
    pub fn name(&self) -> &'static str {
        match self {
            Check::NotEmpty => "isNotEmpty",
            Check::IsString => "isString",
            Check::MinLength(_) => "minLength",
            Check::MaxLength(_) => "maxLength",
            Check::Matches(_) => "matches",
            Check::IsNumber => "isNumber",
            Check::IsInt => "isInt",
            Check::Max(_) => "max",
            Check::Min(_) => "min",
            Check::IsUuid => "isUuid",
            Check::ArrayNotEmpty => "arrayNotEmpty",
            Check::IsEmail(_) => "isEmail",
            Check::IsPhoneNumber(_) => "isPhoneNumber",
            Check::IsEnum(_) => "isEnum",
            Check::IsDate => "isDate",
            Check::IsPoint => "isPointField",
            Check::Nested(_) => "nestedValidation",
            Check::Each(inner) => inner.name(),
        }
    }

    pub fn each(self) -> Check {
        Check::Each(Box::new(self))
    }

    /// Whether `value` satisfies the check. `None` is an absent value.
    ///
    /// For [`Check::Nested`] this only checks the outer shape; the nested
    /// fields are evaluated by the schema.
    pub fn passes(&self, value: Option<&Value>) -> bool {
        match self {
            Check::NotEmpty => !matches!(value, None | Some(Value::Null))
                && value.and_then(Value::as_str) != Some(""),
            Check::IsString => matches!(value, Some(Value::String(_))),
            Check::MinLength(min) => str_of(value).is_some_and(|s| s.chars().count() >= *min),
            Check::MaxLength(max) => str_of(value).is_some_and(|s| s.chars().count() <= *max),
            Check::Matches(pattern) => str_of(value).is_some_and(|s| pattern.is_match(s)),
            Check::IsNumber => number_of(value).is_some(),
            Check::IsInt => number_of(value).is_some_and(|n| n.fract() == 0.0),
            Check::Max(max) => number_of(value).is_some_and(|n| n <= *max),
            Check::Min(min) => number_of(value).is_some_and(|n| n >= *min),
            Check::IsUuid => str_of(value)
                .and_then(|s| Uuid::parse_str(s).ok())
                .is_some_and(|uuid| uuid.get_version_num() == 4),
            Check::ArrayNotEmpty => value
                .and_then(Value::as_array)
                .is_some_and(|items| !items.is_empty()),
            Check::IsEmail(format) => str_of(value).is_some_and(|s| format.accepts(s)),
            Check::IsPhoneNumber(region) => str_of(value).is_some_and(|s| region.accepts(s)),
            Check::IsEnum(values) => value.is_some_and(|v| values.contains(v)),
            Check::IsDate => str_of(value).and_then(parse_date).is_some(),
            Check::IsPoint => match value {
                None | Some(Value::Null) => true,
                Some(v) => v.get("type").and_then(Value::as_str) == Some("Point"),
            },
            Check::Nested(_) => matches!(value, None | Some(Value::Null) | Some(Value::Object(_))),
            Check::Each(inner) => match value {
                Some(Value::Array(items)) => items.iter().all(|item| inner.passes(Some(item))),
                other => inner.passes(other),
            },
        }
    }
}

fn str_of(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str)
}

fn number_of(value: Option<&Value>) -> Option<f64> {
    value.and_then(Value::as_f64)
}

/// A compiled regex compared by its source text.
#[derive(Debug, Clone)]
pub struct Pattern(Regex);

impl Pattern {
    pub fn new(regex: Regex) -> Self {
        Self(regex)
    }

    pub fn is_match(&self, value: &str) -> bool {
        self.0.is_match(value)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.0.as_str() == other.0.as_str()
    }
}

impl From<Regex> for Pattern {
    fn from(regex: Regex) -> Self {
        Self(regex)
    }
}

impl From<&Regex> for Pattern {
    fn from(regex: &Regex) -> Self {
        Self(regex.clone())
    }
}

/// Format switches for [`Check::IsEmail`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmailFormat {
    /// Accept `Display Name <user@example.com>`
    pub allow_display_name: bool,
    /// Require a top-level domain (`user@localhost` fails)
    pub require_tld: bool,
    /// Accept an IP literal as the domain, e.g. `user@[10.0.0.1]`
    pub allow_ip_domain: bool,
}

impl Default for EmailFormat {
    fn default() -> Self {
        Self {
            allow_display_name: false,
            require_tld: true,
            allow_ip_domain: false,
        }
    }
}

impl EmailFormat {
    pub fn accepts(&self, value: &str) -> bool {
        let address = match DISPLAY_NAME_REGEX.captures(value) {
            Some(caps) if self.allow_display_name => caps.get(1).map_or("", |m| m.as_str()),
            Some(_) => return false,
            None => value,
        };

        let Some((local, domain)) = address.rsplit_once('@') else {
            return false;
        };
        if local.len() > 64 || address.len() > 254 || !EMAIL_LOCAL_REGEX.is_match(local) {
            return false;
        }

        if self.allow_ip_domain {
            let literal = domain
                .strip_prefix('[')
                .and_then(|d| d.strip_suffix(']'))
                .unwrap_or(domain);
            if IpAddr::from_str(literal).is_ok() {
                return true;
            }
        }

        let labels: Vec<&str> = domain.split('.').collect();
        if labels.iter().any(|label| !DOMAIN_LABEL_REGEX.is_match(label)) {
            return false;
        }
        if self.require_tld {
            return labels.len() >= 2 && labels.last().is_some_and(|tld| TLD_REGEX.is_match(tld));
        }
        true
    }
}

/// Regions with a dedicated phone-number format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PhoneRegion {
    Vn,
    Us,
    Gb,
    Sg,
    Jp,
}

impl PhoneRegion {
    pub fn code(self) -> &'static str {
        match self {
            PhoneRegion::Vn => "VN",
            PhoneRegion::Us => "US",
            PhoneRegion::Gb => "GB",
            PhoneRegion::Sg => "SG",
            PhoneRegion::Jp => "JP",
        }
    }

    /// Check a number after stripping spaces, dashes, dots and parentheses
    pub fn accepts(self, value: &str) -> bool {
        let digits = PHONE_SEPARATORS.replace_all(value, "");
        let regex = match self {
            PhoneRegion::Vn => &*PHONE_VN_REGEX,
            PhoneRegion::Us => &*PHONE_US_REGEX,
            PhoneRegion::Gb => &*PHONE_GB_REGEX,
            PhoneRegion::Sg => &*PHONE_SG_REGEX,
            PhoneRegion::Jp => &*PHONE_JP_REGEX,
        };
        regex.is_match(&digits)
    }
}

impl FromStr for PhoneRegion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "VN" => Ok(PhoneRegion::Vn),
            "US" => Ok(PhoneRegion::Us),
            "GB" | "UK" => Ok(PhoneRegion::Gb),
            "SG" => Ok(PhoneRegion::Sg),
            "JP" => Ok(PhoneRegion::Jp),
            other => Err(format!("unsupported phone region: {}", other)),
        }
    }
}

impl fmt::Display for PhoneRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Documentation fragments
// ─────────────────────────────────────────────────────────────────────────────

/// A piece of OpenAPI schema metadata for one field.
///
/// Fragments accumulate by override: merging copies every key of the later
/// fragment over the earlier one.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct DocFragment(Map<String, Value>);

impl DocFragment {
    pub fn new() -> Self {
        Self(Map::new())
    }

    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    pub fn with_opt<V: Into<Value>>(self, key: &str, value: Option<V>) -> Self {
        match value {
            Some(value) => self.with(key, value),
            None => self,
        }
    }

    pub fn merge(&mut self, later: &DocFragment) {
        for (key, value) in &later.0 {
            self.0.insert(key.clone(), value.clone());
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_trim_collapses_whitespace() {
        let out = Transform::Trim.apply(Some(json!("  John    Smith \t ")));
        assert_eq!(out, Some(json!("John Smith")));

        let out = Transform::Trim.apply(Some(json!([" a  b ", 3])));
        assert_eq!(out, Some(json!(["a b", 3])));

        assert_eq!(Transform::Trim.apply(None), None);
    }

    #[test]
    fn test_case_transforms() {
        assert_eq!(Transform::Lowercase.apply(Some(json!("MiXeD"))), Some(json!("mixed")));
        assert_eq!(Transform::Uppercase.apply(Some(json!(["ab", "cd"]))), Some(json!(["AB", "CD"])));
        assert_eq!(Transform::Lowercase.apply(Some(json!(12))), Some(json!(12)));
    }

    #[test]
    fn test_to_array() {
        assert_eq!(Transform::ToArray.apply(None), Some(json!([])));
        assert_eq!(Transform::ToArray.apply(Some(Value::Null)), Some(json!([])));
        assert_eq!(Transform::ToArray.apply(Some(json!("x"))), Some(json!(["x"])));
        assert_eq!(Transform::ToArray.apply(Some(json!(["x", "y"]))), Some(json!(["x", "y"])));
    }

    #[test]
    fn test_to_number() {
        assert_eq!(Transform::ToNumber.apply(Some(json!("42"))), Some(json!(42)));
        assert_eq!(Transform::ToNumber.apply(Some(json!(" 2.5 "))), Some(json!(2.5)));
        assert_eq!(Transform::ToNumber.apply(Some(json!("abc"))), Some(json!("abc")));
        assert_eq!(Transform::ToNumber.apply(Some(json!(7))), Some(json!(7)));
    }

    #[test]
    fn test_to_date() {
        assert_eq!(
            Transform::ToDate.apply(Some(json!("2024-03-01"))),
            Some(json!("2024-03-01T00:00:00.000Z"))
        );
        assert_eq!(
            Transform::ToDate.apply(Some(json!("2024-03-01T10:00:00+02:00"))),
            Some(json!("2024-03-01T08:00:00.000Z"))
        );
        assert_eq!(
            Transform::ToDate.apply(Some(json!(0))),
            Some(json!("1970-01-01T00:00:00.000Z"))
        );
        assert_eq!(Transform::ToDate.apply(Some(json!("soon"))), Some(json!("soon")));
    }

    #[test]
    fn test_to_long_lat() {
        assert_eq!(
            Transform::ToLongLat.apply(Some(json!(["38.8951", "-77.0364"]))),
            Some(json!([-77.0364, 38.8951]))
        );
        assert_eq!(Transform::ToLongLat.apply(None), Some(json!([])));
    }

    #[test]
    fn test_not_empty() {
        assert!(!Check::NotEmpty.passes(None));
        assert!(!Check::NotEmpty.passes(Some(&Value::Null)));
        assert!(!Check::NotEmpty.passes(Some(&json!(""))));
        assert!(Check::NotEmpty.passes(Some(&json!(" "))));
        assert!(Check::NotEmpty.passes(Some(&json!(0))));
    }

    #[test]
    fn test_length_counts_chars() {
        assert!(Check::MinLength(3).passes(Some(&json!("héé"))));
        assert!(Check::MaxLength(3).passes(Some(&json!("héé"))));
        assert!(!Check::MinLength(3).passes(Some(&json!(123))));
    }

    #[test]
    fn test_numeric_checks() {
        assert!(Check::IsNumber.passes(Some(&json!(1.5))));
        assert!(!Check::IsNumber.passes(Some(&json!("1.5"))));
        assert!(Check::IsInt.passes(Some(&json!(4))));
        assert!(!Check::IsInt.passes(Some(&json!(4.2))));
        assert!(Check::Max(10.0).passes(Some(&json!(10))));
        assert!(!Check::Max(10.0).passes(Some(&json!(11))));
        assert!(Check::Min(1.0).passes(Some(&json!(1))));
        assert!(!Check::Min(1.0).passes(Some(&json!(0))));
    }

    #[test]
    fn test_uuid_v4_only() {
        assert!(Check::IsUuid.passes(Some(&json!("9b2f4c1e-8d3a-4f5b-9c6d-7e8f9a0b1c2d"))));
        // version 1
        assert!(!Check::IsUuid.passes(Some(&json!("c232ab00-9414-11ec-b3c8-9f6bdeced846"))));
        assert!(!Check::IsUuid.passes(Some(&json!("not-a-uuid"))));
    }

    #[test]
    fn test_each_applies_per_element() {
        let check = Check::IsUuid.each();
        assert_eq!(check.name(), "isUuid");
        assert!(check.passes(Some(&json!(["9b2f4c1e-8d3a-4f5b-9c6d-7e8f9a0b1c2d"]))));
        assert!(!check.passes(Some(&json!(["9b2f4c1e-8d3a-4f5b-9c6d-7e8f9a0b1c2d", "x"]))));
        assert!(check.passes(Some(&json!("9b2f4c1e-8d3a-4f5b-9c6d-7e8f9a0b1c2d"))));
    }

    #[test]
    fn test_email_format() {
        let strict = EmailFormat::default();
        assert!(strict.accepts("jane.doe@example.com"));
        assert!(!strict.accepts("jane@localhost"));
        assert!(!strict.accepts("Jane <jane@example.com>"));
        assert!(!strict.accepts("jane@@example.com"));
        assert!(!strict.accepts("jane@exa_mple.com"));

        let lenient = EmailFormat {
            allow_display_name: true,
            require_tld: false,
            allow_ip_domain: true,
        };
        assert!(lenient.accepts("Jane <jane@example.com>"));
        assert!(lenient.accepts("jane@localhost"));
        assert!(lenient.accepts("jane@[10.0.0.1]"));
    }

    #[test]
    fn test_phone_region() {
        assert!(PhoneRegion::Us.accepts("+1 (415) 555-2671"));
        assert!(!PhoneRegion::Us.accepts("0912345678"));
        assert_eq!("uk".parse::<PhoneRegion>(), Ok(PhoneRegion::Gb));
        assert!("ZZ".parse::<PhoneRegion>().is_err());
    }

    #[test]
    fn test_point_check() {
        assert!(Check::IsPoint.passes(None));
        assert!(Check::IsPoint.passes(Some(&json!({"type": "Point", "coordinates": [1, 2]}))));
        assert!(!Check::IsPoint.passes(Some(&json!({"type": "Polygon"}))));
    }

    #[test]
    fn test_fragment_merge_overrides() {
        let mut base = DocFragment::new().with("type", "string").with("example", "a");
        base.merge(&DocFragment::new().with("example", "b").with("format", "email"));
        assert_eq!(base.get("type"), Some(&json!("string")));
        assert_eq!(base.get("example"), Some(&json!("b")));
        assert_eq!(base.get("format"), Some(&json!("email")));
    }
}
