//! Domain guard: keeps the assistant inside its region.
//!
//! The policy comes from the `guard` config section. Screening is a pure
//! function of the text; nothing is retrieved or generated here.

use crate::intent::Intent;
use crate::text::{first_match, normalize};
use guide_core::config::GuardSettings;
use guide_core::{AppError, AppResult};

/// Outcome of screening a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    InDomain,
    /// `matched` is the deny-list term that fired, or `None` when the query
    /// named no in-region place for an intent that needs one.
    OutOfDomain { matched: Option<String> },
}

impl GuardDecision {
    pub fn is_rejected(&self) -> bool {
        matches!(self, GuardDecision::OutOfDomain { .. })
    }
}

#[derive(Debug, Clone)]
pub struct DomainGuard {
    allow: Vec<String>,
    deny: Vec<String>,
    require_region_for: Vec<Intent>,
    allow_overrides_deny: bool,
}

impl DomainGuard {
    /// Build the guard, rejecting unknown intent names in `require_region_for`.
    pub fn from_settings(settings: &GuardSettings) -> AppResult<Self> {
        let require_region_for = settings
            .require_region_for
            .iter()
            .map(|name| {
                Intent::parse(name).ok_or_else(|| {
                    AppError::Config(format!(
                        "guard.require_region_for: unknown intent '{}'",
                        name
                    ))
                })
            })
            .collect::<AppResult<Vec<_>>>()?;

        Ok(Self {
            allow: clean_terms(&settings.allow),
            deny: clean_terms(&settings.deny),
            require_region_for,
            allow_overrides_deny: settings.allow_overrides_deny,
        })
    }

    /// Apply the deny/allow lists to normalized query text.
    pub fn screen(&self, normalized: &str) -> GuardDecision {
        let Some(denied) = first_match(normalized, &self.deny) else {
            return GuardDecision::InDomain;
        };

        if self.allow_overrides_deny && self.mentions_region(normalized) {
            tracing::debug!("Deny term '{}' overridden by allow list", denied);
            return GuardDecision::InDomain;
        }

        GuardDecision::OutOfDomain {
            matched: Some(denied.to_string()),
        }
    }

    /// Apply `require_region_for` once the intent is known.
    ///
    /// `context` is extra normalized text (earlier user turns) that may name
    /// the place the current message refers back to.
    pub fn screen_intent(&self, normalized: &str, context: &str, intent: Intent) -> GuardDecision {
        if !self.require_region_for.contains(&intent) {
            return GuardDecision::InDomain;
        }
        if self.mentions_region(normalized) || self.mentions_region(context) {
            GuardDecision::InDomain
        } else {
            GuardDecision::OutOfDomain { matched: None }
        }
    }

    /// Whether any allow-list term occurs in the text.
    pub fn mentions_region(&self, normalized: &str) -> bool {
        first_match(normalized, &self.allow).is_some()
    }

    /// In-region terms, as configured (normalized).
    pub fn allow_terms(&self) -> &[String] {
        &self.allow
    }
}

fn clean_terms(terms: &[String]) -> Vec<String> {
    terms
        .iter()
        .map(|t| normalize(t))
        .filter(|t| !t.is_empty())
        .collect()
}
