//! TUI Widgets
//!
//! Small stateless renderers shared by the panes.

mod spinner;

pub use spinner::{Spinner, DOT_SPINNER};

/// Common widget utilities
pub mod utils {
    /// Truncate to `max_chars` characters with an ellipsis
    pub fn truncate(s: &str, max_chars: usize) -> String {
        if s.chars().count() <= max_chars {
            return s.to_string();
        }
        if max_chars <= 1 {
            return s.chars().take(max_chars).collect();
        }
        let mut out: String = s.chars().take(max_chars - 1).collect();
        out.push('…');
        out
    }

    /// `width` characters of `s` starting at char `skip`, for scrolled inputs
    pub fn window(s: &str, skip: usize, width: usize) -> String {
        s.chars().skip(skip).take(width).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::utils::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world", 8), "hello w…");
        assert_eq!(truncate("héllo", 2), "h…");
        assert_eq!(truncate("hi", 1), "h");
    }

    #[test]
    fn test_window() {
        assert_eq!(window("abcdef", 2, 3), "cde");
        assert_eq!(window("ab", 0, 10), "ab");
    }
}
