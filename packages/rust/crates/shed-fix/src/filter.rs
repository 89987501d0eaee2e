//! Rule allow-list matching.

/// Decide whether fixes for `rule_code` may be considered at all.
///
/// An entry admits a code when it equals the code or is a prefix of it, so a
/// category entry such as `F` admits every `F` rule. A missing code (syntax
/// errors) is never admitted, and an empty allow-list admits nothing. Empty
/// entries are skipped; they would otherwise admit every rule.
#[must_use]
pub fn is_allowed<S: AsRef<str>>(rule_code: Option<&str>, allow_list: &[S]) -> bool {
    let Some(code) = rule_code else {
        return false;
    };
    allow_list
        .iter()
        .map(AsRef::<str>::as_ref)
        .filter(|entry| !entry.is_empty())
        .any(|entry| code.starts_with(entry))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_prefix() {
        assert!(is_allowed(Some("F401"), &["F"]));
        assert!(is_allowed(Some("UP035"), &["F", "I", "UP"]));
    }

    #[test]
    fn test_exact_match() {
        assert!(is_allowed(Some("F841"), &["F841"]));
        assert!(!is_allowed(Some("F401"), &["F841"]));
    }

    #[test]
    fn test_unlisted_rule() {
        assert!(!is_allowed(Some("E731"), &["F", "I", "UP"]));
    }

    #[test]
    fn test_missing_code() {
        assert!(!is_allowed(None, &["F", "E"]));
    }

    #[test]
    fn test_empty_allow_list() {
        let empty: [&str; 0] = [];
        assert!(!is_allowed(Some("F401"), &empty));
        assert!(!is_allowed(Some("F401"), &[""]));
    }

    #[test]
    fn test_owned_entries() {
        let allow = vec!["SIM2".to_string(), "C4".to_string()];
        assert!(is_allowed(Some("SIM201"), &allow));
        assert!(is_allowed(Some("C416"), &allow));
        assert!(!is_allowed(Some("SIM117"), &allow));
    }
}
