//! Campaign identity shared by Google Ads spend and tracker revenue.
//!
//! The two sources name the same campaign differently: the tracker label
//! usually carries the account as a `"<account> - "` prefix and the landing
//! domain as a `" (<domain>)"` suffix. Media buyers embed a dated id such as
//! `250417_02` in both names, which is the preferred join key.

use once_cell::sync::Lazy;
use regex::Regex;

static CAMPAIGN_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d{6}_\d{2}").expect("campaign id pattern is valid"));

static PARENTHETICAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\([^)]*\)").expect("parenthetical pattern is valid"));

/// Separator between the account prefix and the campaign in tracker labels
pub const ACCOUNT_SEPARATOR: &str = " - ";

/// Join key derived from a campaign name
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CampaignKey(String);

impl CampaignKey {
    /// Derive the key for a campaign name.
    ///
    /// Returns `None` when nothing usable remains, in which case the record
    /// never takes part in the join.
    pub fn derive(name: &str) -> Option<Self> {
        if let Some(id) = extract_campaign_id(name) {
            return Some(Self(id.to_string()));
        }
        let normalized = normalize_campaign_name(name);
        if normalized.is_empty() {
            None
        } else {
            Some(Self(normalized))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CampaignKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// First `DDDDDD_DD` campaign id embedded in the name
pub fn extract_campaign_id(name: &str) -> Option<&str> {
    CAMPAIGN_ID.find(name).map(|m| m.as_str())
}

/// Name with parenthetical groups and account prefix removed, whitespace collapsed
pub fn normalize_campaign_name(name: &str) -> String {
    let without_parens = PARENTHETICAL.replace_all(name, "");
    let collapsed = collapse_whitespace(&without_parens);
    match collapsed.split_once(ACCOUNT_SEPARATOR) {
        Some((_, campaign)) if !campaign.trim().is_empty() => collapse_whitespace(campaign),
        _ => collapsed,
    }
}

/// Account prefix of a `"<account> - <campaign>"` label, if present
pub fn account_prefix(name: &str) -> Option<&str> {
    if !name.contains(ACCOUNT_SEPARATOR) {
        return None;
    }
    name.split(ACCOUNT_SEPARATOR).next().map(str::trim)
}

/// Display name with the `" (<domain>)"` suffix cut off
pub fn strip_domain_suffix(name: &str) -> &str {
    name.split(" (").next().unwrap_or(name).trim()
}

fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}
