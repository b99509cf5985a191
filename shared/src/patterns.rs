//! Compiled regular expressions shared by the transforms and checks.

use lazy_static::lazy_static;
use regex::Regex;

/// Source of the default phone pattern used when no region is configured.
///
/// Matches Vietnamese mobile numbers: a `+84`, `84` or `0` prefix, a
/// network digit (`3`, `5`, `7`, `8`, `9` or the legacy `12`/`16`/`18`/`19`),
/// then eight subscriber digits.
pub const VIETNAM_MOBILE_PATTERN: &str = r"^(?:\+84|84|0)(?:3|5|7|8|9|1[2689])[0-9]{8}$";

lazy_static! {
    /// Compiled form of [`VIETNAM_MOBILE_PATTERN`]
    pub static ref VIETNAM_MOBILE_REGEX: Regex = Regex::new(VIETNAM_MOBILE_PATTERN).unwrap();

    /// Runs of two or more whitespace characters
    pub static ref WHITESPACE_RUN: Regex = Regex::new(r"\s\s+").unwrap();

    /// Local part of an email address (dot-atom form)
    pub static ref EMAIL_LOCAL_REGEX: Regex = Regex::new(
        r"^[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+)*$"
    ).unwrap();

    /// One DNS label of an email domain
    pub static ref DOMAIN_LABEL_REGEX: Regex =
        Regex::new(r"^[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?$").unwrap();

    /// Top-level domain: letters only, at least two of them
    pub static ref TLD_REGEX: Regex = Regex::new(r"^[A-Za-z]{2,63}$").unwrap();

    /// `Display Name <address>` form
    pub static ref DISPLAY_NAME_REGEX: Regex = Regex::new(r"^[^<>]*<([^<>]+)>$").unwrap();

    /// Characters stripped from phone numbers before region matching
    pub static ref PHONE_SEPARATORS: Regex = Regex::new(r"[\s\-().]").unwrap();

    pub static ref PHONE_VN_REGEX: Regex = Regex::new(r"^(?:\+84|84|0)(?:[35789][0-9]{8}|2[0-9]{9})$").unwrap();
    pub static ref PHONE_US_REGEX: Regex = Regex::new(r"^(?:\+?1)?[2-9][0-9]{2}[2-9][0-9]{6}$").unwrap();
    pub static ref PHONE_GB_REGEX: Regex = Regex::new(r"^(?:\+44|0)[1-9][0-9]{8,9}$").unwrap();
    pub static ref PHONE_SG_REGEX: Regex = Regex::new(r"^(?:\+65)?[689][0-9]{7}$").unwrap();
    pub static ref PHONE_JP_REGEX: Regex = Regex::new(r"^(?:\+81|0)[1-9][0-9]{8,9}$").unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vietnam_mobile_pattern() {
        assert!(VIETNAM_MOBILE_REGEX.is_match("0912345678"));
        assert!(VIETNAM_MOBILE_REGEX.is_match("+84912345678"));
        assert!(VIETNAM_MOBILE_REGEX.is_match("84352146857"));
        assert!(VIETNAM_MOBILE_REGEX.is_match("01689123456"));

        assert!(!VIETNAM_MOBILE_REGEX.is_match("123"));
        assert!(!VIETNAM_MOBILE_REGEX.is_match("0412345678"));
        assert!(!VIETNAM_MOBILE_REGEX.is_match("09123456789"));
        assert!(!VIETNAM_MOBILE_REGEX.is_match("call 0912345678"));
    }

    #[test]
    fn test_region_patterns() {
        assert!(PHONE_US_REGEX.is_match("+14155552671"));
        assert!(PHONE_US_REGEX.is_match("4155552671"));
        assert!(!PHONE_US_REGEX.is_match("1155552671"));

        assert!(PHONE_GB_REGEX.is_match("+447911123456"));
        assert!(PHONE_SG_REGEX.is_match("+6591234567"));
        assert!(PHONE_JP_REGEX.is_match("09012345678"));
        assert!(PHONE_VN_REGEX.is_match("02838123456"));
    }
}
