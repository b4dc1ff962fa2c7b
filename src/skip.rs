//! @ai:module:intent Decide whether an execution key is excluded by skip rules
//! @ai:module:layer domain
//! @ai:module:public_api SkipMatcher, matches
//! @ai:module:stateless true

use crate::error::Result;
use crate::key::{Key, SkipRule};

/// @ai:intent Check a single rule against a key, position by position
/// @ai:post true iff every non-wildcard position equals the key's component
/// @ai:example ("*:CPython:*", "nbody:CPython:default-python") -> true
/// @ai:example ("nbody:*:default-c", "nbody:C:default-python") -> false
/// @ai:effects pure
pub fn matches(rule: &SkipRule, key: &Key) -> bool {
    rule.parts()
        .iter()
        .zip(key.components())
        .all(|(part, value)| part.accepts(value))
}

/// @ai:intent Configured set of skip rules for a session
#[derive(Debug, Clone, Default)]
pub struct SkipMatcher {
    rules: Vec<SkipRule>,
}

impl SkipMatcher {
    /// @ai:intent Create a matcher over already-parsed rules
    /// @ai:effects pure
    pub fn new(rules: Vec<SkipRule>) -> Self {
        Self { rules }
    }

    /// @ai:intent Parse rule strings and build a matcher
    /// @ai:post fails with MalformedKey on the first rule without 3 components
    /// @ai:effects pure
    pub fn from_strs<S: AsRef<str>>(rules: &[S]) -> Result<Self> {
        let rules = rules
            .iter()
            .map(|r| SkipRule::parse(r.as_ref()))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self::new(rules))
    }

    pub fn rules(&self) -> &[SkipRule] {
        &self.rules
    }

    /// @ai:intent Whether any configured rule matches the key
    /// @ai:effects pure
    pub fn should_skip(&self, key: &Key) -> bool {
        self.matching_rule(key).is_some()
    }

    /// @ai:intent First rule that matches the key, if any
    /// @ai:effects pure
    pub fn matching_rule(&self, key: &Key) -> Option<&SkipRule> {
        self.rules.iter().find(|rule| matches(rule, key))
    }

    /// @ai:intent Parse a key string, then check it against the rules
    /// @ai:effects pure
    pub fn should_skip_str(&self, key: &str) -> Result<bool> {
        let key = Key::parse(key)?;
        Ok(self.should_skip(&key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HarnessError;

    fn rule(s: &str) -> SkipRule {
        SkipRule::parse(s).unwrap()
    }

    fn key(s: &str) -> Key {
        Key::parse(s).unwrap()
    }

    #[test]
    fn test_exact_rule_matches_only_identical_key() {
        let r = rule("fasta:JRubyTruffle:default-ruby");
        assert!(matches(&r, &key("fasta:JRubyTruffle:default-ruby")));
        assert!(!matches(&r, &key("fasta:JRubyTruffle:other-ruby")));
        assert!(!matches(&r, &key("nbody:JRubyTruffle:default-ruby")));
    }

    #[test]
    fn test_wildcard_is_positional() {
        let r = rule("bench:*:variant");
        assert!(matches(&r, &key("bench:anything:variant")));
        assert!(!matches(&r, &key("anything:bench:variant")));
        assert!(!matches(&r, &key("bench:variant:anything")));
    }

    #[test]
    fn test_all_wildcards_match_everything() {
        let r = rule("*:*:*");
        assert!(matches(&r, &key("a:b:c")));
        assert!(matches(&r, &key("::")));
    }

    #[test]
    fn test_rule_match_agrees_with_positional_definition() {
        let keys = ["a:x:1", "a:y:1", "b:x:2", "b:y:1"];
        let rules = ["a:*:*", "*:x:*", "*:*:1", "b:*:2", "a:y:1", "*:*:*", "c:*:*"];

        for r in rules {
            let parsed_rule = rule(r);
            let rule_parts: Vec<&str> = r.split(':').collect();

            for k in keys {
                let key_parts: Vec<&str> = k.split(':').collect();
                let expected = rule_parts
                    .iter()
                    .zip(&key_parts)
                    .all(|(rp, kp)| *rp == "*" || rp == kp);
                assert_eq!(matches(&parsed_rule, &key(k)), expected, "rule {r} key {k}");
            }
        }
    }

    #[test]
    fn test_matcher_skips_when_any_rule_matches() {
        let matcher = SkipMatcher::from_strs(&[
            "richards:HHVM:default-php",
            "*:CPython:*",
        ])
        .unwrap();

        assert_eq!(matcher.rules().len(), 2);
        assert_eq!(matcher.rules()[1], rule("*:CPython:*"));
        assert!(matcher.should_skip(&key("nbody:CPython:default-python")));
        assert!(matcher.should_skip(&key("richards:HHVM:default-php")));
        assert!(!matcher.should_skip(&key("nbody:HHVM:default-php")));
        assert_eq!(
            matcher
                .matching_rule(&key("fasta:CPython:default-python"))
                .map(|r| r.to_string()),
            Some("*:CPython:*".to_string())
        );
    }

    #[test]
    fn test_empty_matcher_skips_nothing() {
        let matcher = SkipMatcher::default();
        assert!(!matcher.should_skip(&key("a:b:c")));
    }

    #[test]
    fn test_malformed_rule_or_key_is_rejected() {
        assert!(matches!(
            SkipMatcher::from_strs(&["nbody:CPython"]),
            Err(HarnessError::MalformedKey { .. })
        ));

        let matcher = SkipMatcher::from_strs(&["*:*:*"]).unwrap();
        assert!(matches!(
            matcher.should_skip_str("a:b:c:d"),
            Err(HarnessError::MalformedKey { components: 4, .. })
        ));
        assert!(matcher.should_skip_str("a:b:c").unwrap());
    }
}
