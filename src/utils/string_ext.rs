//! String helpers
//!
//! Trimming and preview helpers shared by the orchestrator, the client and the presenter.

/// String cleanup extension trait
pub trait StringExt {
    /// Trim the string and return None when nothing is left
    fn clean(&self) -> Option<String>;

    /// Single-line preview of at most `max_chars` characters, for log lines
    fn preview(&self, max_chars: usize) -> String;
}

impl StringExt for str {
    #[inline]
    fn clean(&self) -> Option<String> {
        let trimmed = self.trim();
        if trimmed.is_empty() { None } else { Some(trimmed.to_string()) }
    }

    fn preview(&self, max_chars: usize) -> String {
        let flat = self.split_whitespace().collect::<Vec<_>>().join(" ");
        if flat.chars().count() <= max_chars {
            return flat;
        }
        let head: String = flat.chars().take(max_chars).collect();
        format!("{}...", head)
    }
}

impl StringExt for String {
    #[inline]
    fn clean(&self) -> Option<String> {
        self.as_str().clean()
    }

    #[inline]
    fn preview(&self, max_chars: usize) -> String {
        self.as_str().preview(max_chars)
    }
}

impl<T: AsRef<str>> StringExt for Option<T> {
    #[inline]
    fn clean(&self) -> Option<String> {
        self.as_ref().and_then(|s| s.as_ref().clean())
    }

    fn preview(&self, max_chars: usize) -> String {
        self.as_ref()
            .map(|s| s.as_ref().preview(max_chars))
            .unwrap_or_default()
    }
}

/// Format an integer with thousands separators (1234567 -> "1,234,567")
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean() {
        assert_eq!("  SELECT 1 \n".clean(), Some("SELECT 1".to_string()));
        assert_eq!(" \t\n ".clean(), None);
        assert_eq!("".to_string().clean(), None);
        assert_eq!(Some("  x ").clean(), Some("x".to_string()));
        assert_eq!(None::<String>.clean(), None);
    }

    #[test]
    fn test_preview_flattens_and_truncates() {
        assert_eq!("SELECT *\n  FROM t".preview(40), "SELECT * FROM t");
        assert_eq!("abcdefgh".preview(3), "abc...");
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(50000), "50,000");
        assert_eq!(group_thousands(1234567), "1,234,567");
    }
}
