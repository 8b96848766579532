//! Allow rules: the URL shapes the relay is willing to fetch.
//!
//! Rules are data. Adding a trusted shape means adding a `RuleSpec` to the
//! configuration, never a new branch in the request path.

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::error::RuleError;

/// Branch source archives: `https://github.com/<org>/<project>/archive/refs/heads/<branch>.zip`.
pub const GITHUB_ARCHIVE_PATTERN: &str = r"https://github\.com/.+/.+/archive/refs/heads/.+\.zip";

/// Release assets: `https://github.com/<org>/<project>/releases/download/<tag>/<file>`.
pub const GITHUB_RELEASE_PATTERN: &str = r"https://github\.com/.+/.+/releases/download/.+/.+";

/// Configuration form of an allow rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSpec {
    pub name: String,
    pub pattern: String,
}

impl RuleSpec {
    pub fn new(name: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pattern: pattern.into(),
        }
    }
}

/// The built-in allowlist: GitHub branch archives and release assets.
pub fn default_rules() -> Vec<RuleSpec> {
    vec![
        RuleSpec::new("github-archive", GITHUB_ARCHIVE_PATTERN),
        RuleSpec::new("github-release", GITHUB_RELEASE_PATTERN),
    ]
}

/// A compiled, case-insensitive rule that must match the whole URI.
#[derive(Debug, Clone)]
pub struct AllowRule {
    name: String,
    regex: Regex,
}

impl AllowRule {
    /// Compile a rule. The pattern is wrapped in `^(?:...)$` so a rule
    /// configured without anchors still cannot match a substring.
    pub fn compile(spec: &RuleSpec) -> Result<Self, RuleError> {
        let regex = RegexBuilder::new(&format!("^(?:{})$", spec.pattern))
            .case_insensitive(true)
            .build()
            .map_err(|source| RuleError::InvalidPattern {
                name: spec.name.clone(),
                source,
            })?;
        Ok(Self {
            name: spec.name.clone(),
            regex,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_match(&self, uri: &str) -> bool {
        self.regex.is_match(uri)
    }
}

/// Ordered, immutable set of allow rules shared by every request.
#[derive(Debug, Clone)]
pub struct Allowlist {
    rules: Vec<AllowRule>,
}

impl Allowlist {
    pub fn compile(specs: &[RuleSpec]) -> Result<Self, RuleError> {
        if specs.is_empty() {
            return Err(RuleError::Empty);
        }
        let rules = specs
            .iter()
            .map(AllowRule::compile)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rules })
    }

    pub fn rules(&self) -> &[AllowRule] {
        &self.rules
    }

    /// Names of every rule matching `uri`, in rule order. All rules are
    /// evaluated; no rule shadows another.
    pub fn matching_rules(&self, uri: &str) -> Vec<&str> {
        self.rules
            .iter()
            .filter(|rule| rule.is_match(uri))
            .map(AllowRule::name)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn github() -> Allowlist {
        Allowlist::compile(&default_rules()).unwrap()
    }

    #[test]
    fn default_rules_compile_in_order() {
        let list = github();
        let names: Vec<&str> = list.rules().iter().map(AllowRule::name).collect();
        assert_eq!(names, vec!["github-archive", "github-release"]);
    }

    #[test]
    fn archive_rule_matches_branch_zip() {
        let list = github();
        assert_eq!(
            list.matching_rules("https://github.com/acme/widget/archive/refs/heads/main.zip"),
            vec!["github-archive"]
        );
    }

    #[test]
    fn release_rule_matches_asset() {
        let list = github();
        assert_eq!(
            list.matching_rules("https://github.com/acme/widget/releases/download/v1.2.0/widget-linux.tar.gz"),
            vec!["github-release"]
        );
    }

    #[test]
    fn both_rules_can_match_the_same_uri() {
        let list = github();
        let uri = "https://github.com/acme/widget/releases/download/v1/archive/refs/heads/x.zip";
        assert_eq!(list.matching_rules(uri), vec!["github-archive", "github-release"]);
    }

    #[test]
    fn matching_is_case_insensitive() {
        let list = github();
        let uri = "HTTPS://GitHub.COM/Acme/Widget/ARCHIVE/refs/heads/Main.ZIP";
        assert_eq!(list.matching_rules(uri), vec!["github-archive"]);
    }

    #[test]
    fn rules_are_anchored_at_both_ends() {
        let list = github();
        assert!(list
            .matching_rules("http://evil.example.com/?https://github.com/a/b/archive/refs/heads/m.zip")
            .is_empty());
        assert!(list
            .matching_rules("https://github.com/a/b/archive/refs/heads/m.zip.exe")
            .is_empty());
    }

    #[test]
    fn host_dot_is_literal() {
        let list = github();
        assert!(list
            .matching_rules("https://githubxcom/a/b/archive/refs/heads/m.zip")
            .is_empty());
    }

    #[test]
    fn http_scheme_is_not_allowed() {
        let list = github();
        assert!(list
            .matching_rules("http://github.com/a/b/archive/refs/heads/m.zip")
            .is_empty());
    }

    #[test]
    fn placeholders_must_be_non_empty() {
        let list = github();
        assert!(list
            .matching_rules("https://github.com/a/b/archive/refs/heads/.zip")
            .is_empty());
        assert!(list
            .matching_rules("https://github.com/a/b/releases/download//file")
            .is_empty());
    }

    #[test]
    fn unanchored_config_pattern_is_anchored() {
        let list = Allowlist::compile(&[RuleSpec::new("mirror", r"https://mirror\.example\.org/.+")]).unwrap();
        assert_eq!(list.matching_rules("https://mirror.example.org/pkg.tar"), vec!["mirror"]);
        assert!(list.matching_rules("x https://mirror.example.org/pkg.tar").is_empty());
    }

    #[test]
    fn alternation_is_anchored_as_a_group() {
        let list = Allowlist::compile(&[RuleSpec::new("alt", "a|b")]).unwrap();
        assert_eq!(list.matching_rules("a"), vec!["alt"]);
        assert!(list.matching_rules("ab").is_empty());
        assert!(list.matching_rules("xa").is_empty());
    }

    #[test]
    fn invalid_pattern_names_the_rule() {
        let err = Allowlist::compile(&[RuleSpec::new("broken", "(unclosed")]).unwrap_err();
        assert!(matches!(err, RuleError::InvalidPattern { ref name, .. } if name == "broken"));
        assert!(err.to_string().contains("broken"));
    }

    #[test]
    fn empty_allowlist_is_rejected() {
        assert!(matches!(Allowlist::compile(&[]), Err(RuleError::Empty)));
    }
}
