use std::fmt;

/// Business correlation key linking inbound events to one workflow instance.
/// For this service the key is always the incident id. The key is guaranteed
/// non-empty; use the constructors to enforce this at the boundary.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CorrelationKey(String);

impl CorrelationKey {
    /// Returns `None` for an empty value; signals are never dispatched with
    /// an empty key.
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        if value.is_empty() {
            None
        } else {
            Some(Self(value))
        }
    }

    /// Builds a key from an optional source such as an envelope header.
    pub fn from_optional(value: Option<&str>) -> Option<Self> {
        value.and_then(Self::new)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CorrelationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_empty_key() {
        assert!(CorrelationKey::new("").is_none());
        assert!(CorrelationKey::from_optional(None).is_none());
        assert!(CorrelationKey::from_optional(Some("")).is_none());
    }

    #[test]
    fn test_accepts_non_empty_key() {
        let key = CorrelationKey::new("incident-123").unwrap();
        assert_eq!(key.as_str(), "incident-123");
        assert_eq!(key.to_string(), "incident-123");
    }
}
