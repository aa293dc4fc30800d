//! The noindex rule evaluator and robots-directive merge.
//!
//! `decide` is a pure function over the settings record, the classified
//! page context, and the pro-enabled flag. `apply` is a pure transform of
//! an existing robots-directive bag; the caller owns reading the context
//! and writing the result back to whatever output sink hosts it.

use serde::{Deserialize, Serialize};

use crate::settings::Settings;

/// Classified request context, answered by the host's page classifier.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PageContext {
    /// Request URL (path + query), matched against exclusion substrings.
    pub request_uri: String,

    pub is_search: bool,
    /// Total result count of the current search query.
    pub search_result_count: u32,

    pub is_author: bool,
    pub is_tag: bool,
    pub is_category: bool,
    pub is_date: bool,
    pub is_paged: bool,
    pub is_attachment: bool,

    pub is_taxonomy_archive: bool,
    /// Taxonomy name of the current taxonomy archive, if any.
    pub taxonomy: Option<String>,

    pub is_post_type_archive: bool,
    /// Post type name of the current post-type archive, if any.
    pub post_type: Option<String>,

    /// Whether the host commerce system is present at all.
    pub commerce_present: bool,
    pub is_cart: bool,
    pub is_checkout: bool,
    pub is_account: bool,
}

/// Mutable robots-directive bag shared with other collaborators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RobotsDirectives {
    pub index: bool,
    pub noindex: bool,
    pub follow: bool,
}

/// The evaluator's output: whether a rule matched, and how to apply it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub noindex: bool,
    pub force: bool,
}

impl Decision {
    /// Merge this decision into an existing directive bag.
    ///
    /// On any match `follow` is forced true. Force mode unconditionally
    /// overwrites indexability; cooperative mode only raises `noindex`
    /// where nothing already requested it, and never touches `index`.
    pub fn apply(self, mut robots: RobotsDirectives) -> RobotsDirectives {
        if !self.noindex {
            return robots;
        }

        robots.follow = true;

        if self.force {
            robots.index = false;
            robots.noindex = true;
            return robots;
        }

        if !robots.noindex {
            robots.noindex = true;
        }

        robots
    }
}

/// Evaluate the configured rules against the current request.
pub fn decide(s: &Settings, ctx: &PageContext, pro: bool) -> Decision {
    Decision {
        noindex: should_noindex(s, ctx, pro),
        force: s.force_apply,
    }
}

fn is_excluded(s: &Settings, ctx: &PageContext) -> bool {
    if ctx.request_uri.is_empty() {
        return false;
    }
    let uri = ctx.request_uri.to_lowercase();
    s.exclude_url_contains
        .iter()
        .filter(|needle| !needle.is_empty())
        .any(|needle| uri.contains(&needle.to_lowercase()))
}

fn search_is_thin(s: &Settings, ctx: &PageContext) -> bool {
    s.search_min_results_enabled && ctx.is_search && ctx.search_result_count < s.search_min_results
}

/// First matching rule wins; exclusions override everything below them.
fn should_noindex(s: &Settings, ctx: &PageContext, pro: bool) -> bool {
    if !s.enabled {
        return false;
    }

    if pro && is_excluded(s, ctx) {
        return false;
    }

    if s.noindex_search && ctx.is_search {
        return true;
    }
    if pro && search_is_thin(s, ctx) {
        return true;
    }

    if s.noindex_author && ctx.is_author {
        return true;
    }
    if s.noindex_tag && ctx.is_tag {
        return true;
    }
    if s.noindex_category && ctx.is_category {
        return true;
    }
    if s.noindex_date && ctx.is_date {
        return true;
    }
    if s.noindex_paged && ctx.is_paged {
        return true;
    }
    if s.noindex_attachment && ctx.is_attachment {
        return true;
    }

    if pro && s.taxonomies_enabled && ctx.is_taxonomy_archive {
        if let Some(tax) = &ctx.taxonomy {
            if !tax.is_empty() && s.taxonomies.iter().any(|t| t == tax) {
                return true;
            }
        }
    }

    if pro && s.post_type_archives_enabled && ctx.is_post_type_archive {
        if let Some(pt) = &ctx.post_type {
            if !pt.is_empty() && s.post_type_archives.iter().any(|p| p == pt) {
                return true;
            }
        }
    }

    if ctx.commerce_present {
        if s.noindex_cart && ctx.is_cart {
            return true;
        }
        if s.noindex_checkout && ctx.is_checkout {
            return true;
        }
        if s.noindex_account && ctx.is_account {
            return true;
        }
    }

    false
}
