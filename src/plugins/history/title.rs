const MAX_TITLE_CHARS: usize = 32;

/// First line of `source`, trimmed and cut to a sidebar-friendly length.
pub(crate) fn title_from_message(source: &str) -> String {
    let first_line = source.lines().next().unwrap_or(source).trim();
    if first_line.chars().count() <= MAX_TITLE_CHARS {
        return first_line.to_string();
    }
    first_line.chars().take(MAX_TITLE_CHARS).collect::<String>() + "…"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_title() {
        assert_eq!(title_from_message("  hello  "), "hello");
    }

    #[test]
    fn test_first_line_only() {
        assert_eq!(title_from_message("line one\nline two"), "line one");
    }

    #[test]
    fn test_long_title_truncated_on_chars() {
        let source = "မ".repeat(40);
        let title = title_from_message(&source);
        assert_eq!(title.chars().count(), MAX_TITLE_CHARS + 1);
        assert!(title.ends_with('…'));
    }
}
