//! The persisted settings record and its sanitization.
//!
//! Settings are a single flat record: a master toggle, the free-tier rule
//! toggles, the pro-gated structured settings, the commerce toggles, and
//! the embedded entitlement cache. Unknown or malformed persisted fields
//! are coerced to documented defaults on load (serde defaults), never
//! surfaced as errors.

use serde::{Deserialize, Serialize};

use crate::entitlement::{EntitlementCache, TOKEN_MAX_LEN};

/// Maximum number of exclusion substrings kept after sanitization.
pub const EXCLUDE_MAX_LINES: usize = 200;

/// Maximum number of entries kept in the taxonomy / post-type allow-lists.
pub const LIST_MAX_ENTRIES: usize = 50;

/// The complete settings record, one per install.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Master toggle.
    pub enabled: bool,

    #[serde(flatten)]
    pub entitlement: EntitlementCache,

    pub noindex_search: bool,
    pub noindex_author: bool,
    pub noindex_tag: bool,
    pub noindex_category: bool,
    pub noindex_date: bool,
    pub noindex_paged: bool,
    pub noindex_attachment: bool,

    /// Pro: noindex search pages with fewer results than the threshold.
    pub search_min_results_enabled: bool,
    pub search_min_results: u32,

    /// Pro: noindex taxonomy archives whose taxonomy is in the list.
    pub taxonomies_enabled: bool,
    pub taxonomies: Vec<String>,

    /// Pro: noindex post-type archives whose post type is in the list.
    pub post_type_archives_enabled: bool,
    pub post_type_archives: Vec<String>,

    /// Commerce system pages, gated only on commerce being present.
    pub noindex_cart: bool,
    pub noindex_checkout: bool,
    pub noindex_account: bool,

    /// Pro: never noindex when the URL contains any of these substrings.
    pub exclude_url_contains: Vec<String>,

    /// Overwrite any existing indexability directive on a rule match.
    pub force_apply: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            enabled: true,
            entitlement: EntitlementCache::default(),
            noindex_search: true,
            noindex_author: true,
            noindex_tag: true,
            noindex_category: false,
            noindex_date: true,
            noindex_paged: true,
            noindex_attachment: true,
            search_min_results_enabled: false,
            search_min_results: 1,
            taxonomies_enabled: false,
            taxonomies: Vec::new(),
            post_type_archives_enabled: false,
            post_type_archives: Vec::new(),
            noindex_cart: true,
            noindex_checkout: true,
            noindex_account: true,
            exclude_url_contains: Vec::new(),
            force_apply: true,
        }
    }
}

/// Normalize a submitted token: trim, strip all inner whitespace, cap length.
pub fn sanitize_token(raw: &str) -> String {
    let stripped: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    stripped.chars().take(TOKEN_MAX_LEN).collect()
}

/// Lowercase a machine name and keep only `[a-z0-9_-]`, as stored taxonomy
/// and post-type keys are.
fn sanitize_key(raw: &str) -> String {
    raw.to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '_' || *c == '-')
        .collect()
}

/// Filter a submitted name list against an allow-list, dropping duplicates.
fn sanitize_name_list(input: &[String], allowed: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for raw in input {
        let key = sanitize_key(raw);
        if key.is_empty() || !allowed.iter().any(|a| a == &key) || out.contains(&key) {
            continue;
        }
        out.push(key);
        if out.len() >= LIST_MAX_ENTRIES {
            break;
        }
    }
    out
}

/// Normalize exclusion substrings: trim, drop empties, cap the line count.
fn sanitize_exclusions(input: &[String]) -> Vec<String> {
    input
        .iter()
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
        .take(EXCLUDE_MAX_LINES)
        .collect()
}

/// Sanitize a submitted settings record against the existing one.
///
/// The entitlement status fields (`pro_status`, `pro_last_check`,
/// `pro_grace_until`) always carry over from `existing`. The token is taken
/// from `submitted_token` when present (an explicit empty submission clears
/// it); a submission without the field keeps the stored token. Pro-gated
/// fields are forcibly reset when `pro` is false, so stale pro
/// configuration never survives a save once entitlement has lapsed.
pub fn sanitize_settings(
    input: &Settings,
    submitted_token: Option<&str>,
    existing: &EntitlementCache,
    pro: bool,
    allowed_taxonomies: &[String],
    allowed_post_types: &[String],
) -> Settings {
    let defaults = Settings::default();

    let pro_token = match submitted_token {
        Some(token) => sanitize_token(token),
        None => existing.pro_token.clone(),
    };

    let mut out = Settings {
        enabled: input.enabled,
        entitlement: EntitlementCache {
            pro_token,
            pro_status: existing.pro_status,
            pro_last_check: existing.pro_last_check,
            pro_grace_until: existing.pro_grace_until,
        },
        noindex_search: input.noindex_search,
        noindex_author: input.noindex_author,
        noindex_tag: input.noindex_tag,
        noindex_category: input.noindex_category,
        noindex_date: input.noindex_date,
        noindex_paged: input.noindex_paged,
        noindex_attachment: input.noindex_attachment,
        search_min_results_enabled: input.search_min_results_enabled,
        search_min_results: input.search_min_results,
        taxonomies_enabled: input.taxonomies_enabled,
        taxonomies: sanitize_name_list(&input.taxonomies, allowed_taxonomies),
        post_type_archives_enabled: input.post_type_archives_enabled,
        post_type_archives: sanitize_name_list(&input.post_type_archives, allowed_post_types),
        noindex_cart: input.noindex_cart,
        noindex_checkout: input.noindex_checkout,
        noindex_account: input.noindex_account,
        exclude_url_contains: sanitize_exclusions(&input.exclude_url_contains),
        force_apply: input.force_apply,
    };

    if !pro {
        out.search_min_results_enabled = false;
        out.search_min_results = defaults.search_min_results;
        out.taxonomies_enabled = false;
        out.taxonomies = Vec::new();
        out.post_type_archives_enabled = false;
        out.post_type_archives = Vec::new();
        out.exclude_url_contains = Vec::new();
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entitlement::ProStatus;

    fn allowed() -> Vec<String> {
        vec!["category".to_string(), "post_tag".to_string(), "genre".to_string()]
    }

    #[test]
    fn defaults_match_install_record() {
        let s = Settings::default();
        assert!(s.enabled);
        assert!(s.noindex_search);
        assert!(!s.noindex_category);
        assert!(s.force_apply);
        assert_eq!(s.search_min_results, 1);
        assert!(s.taxonomies.is_empty());
    }

    #[test]
    fn malformed_persisted_record_coerces_to_defaults() {
        // Wrong types and unknown keys fall back field-by-field.
        let s: Settings = serde_json::from_str(r#"{"noindex_category": true, "bogus": 3}"#).unwrap();
        assert!(s.noindex_category);
        assert!(s.enabled);
        assert_eq!(s.entitlement.pro_status, ProStatus::Unknown);
    }

    #[test]
    fn token_is_trimmed_stripped_and_capped() {
        assert_eq!(sanitize_token("  abc def\n"), "abcdef");
        let long = "x".repeat(300);
        assert_eq!(sanitize_token(&long).len(), 200);
    }

    #[test]
    fn name_lists_filter_against_allowed_set() {
        let input = vec![
            "Genre".to_string(),
            "genre".to_string(),
            "made-up".to_string(),
            "category".to_string(),
        ];
        let out = sanitize_name_list(&input, &allowed());
        assert_eq!(out, vec!["genre".to_string(), "category".to_string()]);
    }

    #[test]
    fn exclusions_are_trimmed_and_capped() {
        let mut input: Vec<String> = (0..250).map(|i| format!(" /p{i}/ ")).collect();
        input.push(String::new());
        let out = sanitize_exclusions(&input);
        assert_eq!(out.len(), EXCLUDE_MAX_LINES);
        assert_eq!(out[0], "/p0/");
    }

    #[test]
    fn entitlement_status_fields_carry_from_existing() {
        let mut input = Settings::default();
        input.entitlement.pro_status = ProStatus::Active;
        input.entitlement.pro_last_check = 999;

        let existing = EntitlementCache {
            pro_token: "old".to_string(),
            pro_status: ProStatus::Grace,
            pro_last_check: 5,
            pro_grace_until: 10,
        };

        let out = sanitize_settings(&input, Some(" new-token "), &existing, true, &allowed(), &[]);
        assert_eq!(out.entitlement.pro_token, "new-token");
        assert_eq!(out.entitlement.pro_status, ProStatus::Grace);
        assert_eq!(out.entitlement.pro_last_check, 5);
        assert_eq!(out.entitlement.pro_grace_until, 10);
    }

    #[test]
    fn omitted_token_keeps_stored_token() {
        let existing = EntitlementCache {
            pro_token: "keep-me".to_string(),
            ..EntitlementCache::default()
        };

        let out = sanitize_settings(&Settings::default(), None, &existing, false, &[], &[]);
        assert_eq!(out.entitlement.pro_token, "keep-me");

        // An explicit empty submission still clears it.
        let out = sanitize_settings(&Settings::default(), Some(""), &existing, false, &[], &[]);
        assert_eq!(out.entitlement.pro_token, "");
    }

    #[test]
    fn pro_disabled_clears_gated_fields() {
        let mut input = Settings::default();
        input.search_min_results_enabled = true;
        input.search_min_results = 9;
        input.taxonomies_enabled = true;
        input.taxonomies = vec!["genre".to_string()];
        input.post_type_archives_enabled = true;
        input.post_type_archives = vec!["genre".to_string()];
        input.exclude_url_contains = vec!["/shop/".to_string()];

        let out = sanitize_settings(
            &input,
            None,
            &EntitlementCache::default(),
            false,
            &allowed(),
            &allowed(),
        );
        assert!(!out.search_min_results_enabled);
        assert_eq!(out.search_min_results, 1);
        assert!(!out.taxonomies_enabled);
        assert!(out.taxonomies.is_empty());
        assert!(!out.post_type_archives_enabled);
        assert!(out.post_type_archives.is_empty());
        assert!(out.exclude_url_contains.is_empty());
    }
}
