//! Brand resolution from Instagram account names.
//!
//! Exports from Meta Business Suite carry the account name rather than a
//! brand. A list of `pattern=Label` rules maps accounts onto brands; the
//! first rule whose pattern occurs in the account name (case-insensitive)
//! wins.

use std::fmt;
use std::str::FromStr;

use regex::{Regex, RegexBuilder};

/// Brand assigned to accounts that match no rule.
pub const UNKNOWN_BRAND: &str = "Unknown";

/// A single `pattern=Label` mapping.
#[derive(Debug, Clone)]
pub struct BrandRule {
    pattern: String,
    label: String,
    matcher: Regex,
}

impl BrandRule {
    pub fn new(pattern: &str, label: &str) -> Result<Self, String> {
        let pattern = pattern.trim();
        let label = label.trim();
        if pattern.is_empty() {
            return Err("brand rule pattern must not be empty".to_string());
        }
        if label.is_empty() {
            return Err(format!("brand rule for \"{pattern}\" has an empty label"));
        }
        let matcher = RegexBuilder::new(&regex::escape(pattern))
            .case_insensitive(true)
            .build()
            .map_err(|e| e.to_string())?;
        Ok(Self {
            pattern: pattern.to_string(),
            label: label.to_string(),
            matcher,
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn matches(&self, account: &str) -> bool {
        self.matcher.is_match(account)
    }
}

impl FromStr for BrandRule {
    type Err = String;

    /// Parse `"pattern=Label"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (pattern, label) = s
            .split_once('=')
            .ok_or_else(|| format!("expected PATTERN=LABEL, got \"{s}\""))?;
        BrandRule::new(pattern, label)
    }
}

impl fmt::Display for BrandRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.pattern, self.label)
    }
}

/// Ordered rule list applied to every row without a brand column.
#[derive(Debug, Clone, Default)]
pub struct BrandResolver {
    rules: Vec<BrandRule>,
}

impl BrandResolver {
    pub fn new(rules: Vec<BrandRule>) -> Self {
        Self { rules }
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Resolve an account name to a brand.
    ///
    /// Without rules the trimmed account name is the brand; with rules an
    /// unmatched account resolves to [`UNKNOWN_BRAND`].
    pub fn resolve(&self, account: &str) -> String {
        let account = account.trim();
        if self.rules.is_empty() {
            return if account.is_empty() {
                UNKNOWN_BRAND.to_string()
            } else {
                account.to_string()
            };
        }
        self.rules
            .iter()
            .find(|rule| rule.matches(account))
            .map(|rule| rule.label.clone())
            .unwrap_or_else(|| UNKNOWN_BRAND.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver(rules: &[&str]) -> BrandResolver {
        BrandResolver::new(rules.iter().map(|r| r.parse().unwrap()).collect())
    }

    #[test]
    fn test_rule_parse() {
        let rule: BrandRule = "acme = Acme Corp".parse().unwrap();
        assert_eq!(rule.pattern(), "acme");
        assert_eq!(rule.label(), "Acme Corp");
        assert_eq!(rule.to_string(), "acme=Acme Corp");
    }

    #[test]
    fn test_rule_parse_errors() {
        assert!("no-separator".parse::<BrandRule>().is_err());
        assert!("=Label".parse::<BrandRule>().is_err());
        assert!("pattern=".parse::<BrandRule>().is_err());
    }

    #[test]
    fn test_rule_pattern_is_literal() {
        let rule: BrandRule = "a.b=Dots".parse().unwrap();
        assert!(rule.matches("xa.by"));
        assert!(!rule.matches("axb"));
    }

    #[test]
    fn test_resolve_case_insensitive_first_match() {
        let r = resolver(&["acme=Acme", "acme kids=Acme Kids", "globex=Globex"]);
        assert_eq!(r.resolve("ACME Kids Official"), "Acme");
        assert_eq!(r.resolve("globex.br"), "Globex");
    }

    #[test]
    fn test_resolve_unmatched_is_unknown() {
        let r = resolver(&["acme=Acme"]);
        assert_eq!(r.resolve("initech"), UNKNOWN_BRAND);
    }

    #[test]
    fn test_resolve_without_rules_uses_account() {
        let r = BrandResolver::default();
        assert!(r.is_empty());
        assert_eq!(r.resolve("  acme.store "), "acme.store");
        assert_eq!(r.resolve(""), UNKNOWN_BRAND);
    }
}
