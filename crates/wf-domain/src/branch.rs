use serde::{Deserialize, Serialize};
use std::fmt;

/// The string label selecting which outgoing edge to follow from a node.
/// Always lowercase; `"default"` unless an edge names a handle explicitly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BranchKey(String);

impl BranchKey {
    pub const DEFAULT: &'static str = "default";

    pub fn default_key() -> Self {
        Self(Self::DEFAULT.to_string())
    }

    /// Normalizes a raw `sourceHandle` value per the loader's rules:
    /// missing/empty -> "default", everything else lowercased.
    pub fn normalize(raw: Option<&str>) -> Self {
        match raw {
            None => Self::default_key(),
            Some(s) if s.trim().is_empty() => Self::default_key(),
            Some(s) => Self(s.to_lowercase()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_default(&self) -> bool {
        self.0 == Self::DEFAULT
    }
}

impl fmt::Display for BranchKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BranchKey {
    fn from(s: &str) -> Self {
        Self::normalize(Some(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_null_and_case() {
        assert_eq!(BranchKey::normalize(None).as_str(), "default");
        assert_eq!(BranchKey::normalize(Some("")).as_str(), "default");
        assert_eq!(BranchKey::normalize(Some("Yes")).as_str(), "yes");
        assert_eq!(BranchKey::normalize(Some("No")).as_str(), "no");
    }
}
