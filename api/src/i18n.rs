//! Request locale resolution.

use axum::{
    extract::Query,
    http::{header, HeaderMap, Uri},
};
use std::collections::HashMap;

pub const LANG_QUERY: &str = "lang";
pub const LANG_HEADER: &str = "x-lang";

/// Locale requested by a client, in order of precedence: the `lang` query
/// parameter, the `x-lang` header, then the highest weighted
/// `Accept-Language` tag.
pub fn resolve_locale(uri: &Uri, headers: &HeaderMap, default: &str) -> String {
    query_lang(uri)
        .or_else(|| header_value(headers, LANG_HEADER))
        .or_else(|| {
            header_value(headers, header::ACCEPT_LANGUAGE.as_str())
                .and_then(|accept| first_language(&accept))
        })
        .unwrap_or_else(|| default.to_string())
}

fn query_lang(uri: &Uri) -> Option<String> {
    let Query(params) = Query::<HashMap<String, String>>::try_from_uri(uri).ok()?;
    params
        .get(LANG_QUERY)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(String::from)
}

/// The tag with the highest `q` weight. Ties go to the earlier tag; `*` and
/// tags with `q=0` are never picked.
fn first_language(accept: &str) -> Option<String> {
    let mut best: Option<(&str, f32)> = None;
    for part in accept.split(',') {
        let mut params = part.split(';');
        let tag = params.next().unwrap_or_default().trim();
        if tag.is_empty() || tag == "*" {
            continue;
        }
        let weight = params
            .filter_map(|param| param.trim().strip_prefix("q="))
            .find_map(|q| q.trim().parse::<f32>().ok())
            .unwrap_or(1.0);
        if weight <= 0.0 {
            continue;
        }
        if best.map_or(true, |(_, top)| weight > top) {
            best = Some((tag, weight));
        }
    }
    best.map(|(tag, _)| tag.to_string())
}
