//! CountEngine

use std::fmt;

use super::keyspace::Keyspace;
use crate::error::{Result, ViewerError};

/// Counting stops once this many matches are exceeded
pub const MAX_SCAN_COUNT: usize = 9999;

/// Number of keys matching a pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCount {
    Exact(usize),
    /// More than the cap were found; holds the cap
    Capped(usize),
}

impl KeyCount {
    /// Classify a raw tally against `cap`.
    pub fn from_tally(tally: usize, cap: usize) -> Self {
        if tally > cap {
            KeyCount::Capped(cap)
        } else {
            KeyCount::Exact(tally)
        }
    }

    /// Never larger than the cap
    pub fn value(&self) -> usize {
        match self {
            KeyCount::Exact(n) | KeyCount::Capped(n) => *n,
        }
    }

    pub fn is_capped(&self) -> bool {
        matches!(self, KeyCount::Capped(_))
    }
}

impl fmt::Display for KeyCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyCount::Exact(n) => write!(f, "{} keys found", n),
            KeyCount::Capped(cap) => write!(f, "{}+ keys found", cap),
        }
    }
}

/// Count keys matching `pattern`, capped at [`MAX_SCAN_COUNT`].
pub async fn count(keyspace: &dyn Keyspace, pattern: &str) -> Result<KeyCount> {
    count_with_cap(keyspace, pattern, MAX_SCAN_COUNT).await
}

pub async fn count_with_cap(keyspace: &dyn Keyspace, pattern: &str, cap: usize) -> Result<KeyCount> {
    let tally = keyspace
        .count_matches(pattern, cap)
        .await
        .map_err(|e| ViewerError::Count {
            reason: e.to_string(),
        })?;
    let count = KeyCount::from_tally(tally, cap);
    tracing::debug!(pattern, %count, "count complete");
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(KeyCount::Exact(2).to_string(), "2 keys found");
        assert_eq!(KeyCount::Capped(MAX_SCAN_COUNT).to_string(), "9999+ keys found");
    }

    #[test]
    fn test_from_tally() {
        assert_eq!(KeyCount::from_tally(9999, 9999), KeyCount::Exact(9999));
        assert_eq!(KeyCount::from_tally(10000, 9999), KeyCount::Capped(9999));
        assert!(KeyCount::from_tally(12, 5).is_capped());
        assert_eq!(KeyCount::from_tally(12, 5).value(), 5);
    }
}
