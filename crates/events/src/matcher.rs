//! Subscription routing: exact names and structural patterns.
//!
//! Views name their events `<scope>:<action>` and form fields
//! `<form>.<field>:change`, so one prefix/suffix pair is enough to say
//! "any field of this form changed" without a text-pattern engine.

/// Decides which event names a subscription receives.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventMatcher {
    /// Exactly this name.
    Exact(String),
    /// Every name starting with the prefix.
    Prefix(String),
    /// Every name ending with the suffix.
    Suffix(String),
    /// Every name with both the prefix and the suffix, not overlapping.
    Affix { prefix: String, suffix: String },
    /// Every event.
    All,
}

impl EventMatcher {
    pub fn exact(name: impl Into<String>) -> Self {
        Self::Exact(name.into())
    }

    pub fn prefix(prefix: impl Into<String>) -> Self {
        Self::Prefix(prefix.into())
    }

    pub fn suffix(suffix: impl Into<String>) -> Self {
        Self::Suffix(suffix.into())
    }

    pub fn affix(prefix: impl Into<String>, suffix: impl Into<String>) -> Self {
        Self::Affix {
            prefix: prefix.into(),
            suffix: suffix.into(),
        }
    }

    pub fn matches(&self, name: &str) -> bool {
        match self {
            EventMatcher::Exact(exact) => name == exact,
            EventMatcher::Prefix(prefix) => name.starts_with(prefix.as_str()),
            EventMatcher::Suffix(suffix) => name.ends_with(suffix.as_str()),
            EventMatcher::Affix { .. } => self.captured(name).is_some(),
            EventMatcher::All => true,
        }
    }

    /// The part of `name` not covered by the pattern, if it matches.
    ///
    /// For `Affix { "order.", ":change" }` and `"order.address:change"` this is
    /// `"address"`. Exact matches capture the empty string; `All` captures the
    /// whole name.
    pub fn captured<'a>(&self, name: &'a str) -> Option<&'a str> {
        match self {
            EventMatcher::Exact(exact) => (name == exact).then_some(""),
            EventMatcher::Prefix(prefix) => name.strip_prefix(prefix.as_str()),
            EventMatcher::Suffix(suffix) => name.strip_suffix(suffix.as_str()),
            EventMatcher::Affix { prefix, suffix } => name
                .strip_prefix(prefix.as_str())
                .and_then(|rest| rest.strip_suffix(suffix.as_str())),
            EventMatcher::All => Some(name),
        }
    }
}

impl From<&str> for EventMatcher {
    fn from(name: &str) -> Self {
        Self::exact(name)
    }
}

impl From<String> for EventMatcher {
    fn from(name: String) -> Self {
        Self::Exact(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_matches_only_the_same_name() {
        let m = EventMatcher::from("basket:open");
        assert!(m.matches("basket:open"));
        assert!(!m.matches("basket:opened"));
        assert!(!m.matches("basket"));
    }

    #[test]
    fn affix_groups_all_fields_of_a_form() {
        let m = EventMatcher::affix("order.", ":change");
        assert!(m.matches("order.address:change"));
        assert!(m.matches("order.payment:change"));
        assert!(!m.matches("contacts.email:change"));
        assert!(!m.matches("order:submit"));
        assert_eq!(m.captured("order.address:change"), Some("address"));
    }

    #[test]
    fn affix_does_not_let_prefix_and_suffix_overlap() {
        let m = EventMatcher::affix("a:", ":b");
        assert!(!m.matches("a:b"));
        assert!(m.matches("a::b"));
        assert_eq!(m.captured("a::b"), Some(""));
    }

    #[test]
    fn prefix_and_suffix() {
        assert!(EventMatcher::prefix("modal:").matches("modal:close"));
        assert!(!EventMatcher::prefix("modal:").matches("basket:open"));
        assert!(EventMatcher::suffix(":changed").matches("basket:changed"));
        assert_eq!(EventMatcher::suffix(":changed").captured("basket:changed"), Some("basket"));
    }

    #[test]
    fn all_matches_everything() {
        assert!(EventMatcher::All.matches(""));
        assert!(EventMatcher::All.matches("anything:at-all"));
    }
}
