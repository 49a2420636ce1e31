// OpenAI credential handling
//
// The key is read once at startup and never written to logs. Debug output
// is redacted so it can sit inside config structs that get logged.

use std::fmt;

/// Keys at or under this length never show their tail
const MASK_MIN_CHARS: usize = 8;

/// An OpenAI API key that is known to be non-empty
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Build a key from a raw environment/CLI value.
    ///
    /// Empty and whitespace-only values count as "not configured".
    pub fn from_raw(raw: Option<&str>) -> Option<Self> {
        raw.map(str::trim)
            .filter(|value| !value.is_empty())
            .map(|value| ApiKey(value.to_string()))
    }

    /// The raw secret, for the Authorization header only
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Short fingerprint safe to print in the startup banner.
    ///
    /// Keys too short to hide behind a 4-char tail are fully masked.
    pub fn masked(&self) -> String {
        let chars: Vec<char> = self.0.chars().collect();
        if chars.len() <= MASK_MIN_CHARS {
            return "****".to_string();
        }
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("****{}", tail)
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_raw_rejects_blank() {
        assert!(ApiKey::from_raw(None).is_none());
        assert!(ApiKey::from_raw(Some("")).is_none());
        assert!(ApiKey::from_raw(Some("   \n")).is_none());
    }

    #[test]
    fn test_from_raw_trims() {
        let key = ApiKey::from_raw(Some("  sk-test-1234 ")).unwrap();
        assert_eq!(key.expose(), "sk-test-1234");
    }

    #[test]
    fn test_debug_is_redacted() {
        let key = ApiKey::from_raw(Some("sk-very-secret")).unwrap();
        let printed = format!("{:?}", key);
        assert!(!printed.contains("secret"));
        assert!(printed.contains("redacted"));
    }

    #[test]
    fn test_masked_shows_only_tail() {
        let key = ApiKey::from_raw(Some("sk-abcdef9876")).unwrap();
        assert_eq!(key.masked(), "****9876");

        let medium = ApiKey::from_raw(Some("sk-123456")).unwrap();
        assert_eq!(medium.masked(), "****3456");
    }

    #[test]
    fn test_masked_hides_short_keys_entirely() {
        for raw in ["ab", "abcd", "sk-12345"] {
            let key = ApiKey::from_raw(Some(raw)).unwrap();
            assert_eq!(key.masked(), "****", "key {:?} leaked", raw);
        }
    }
}
