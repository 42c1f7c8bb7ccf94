// src/util/text.rs

/// Extract the first line of plain text from markdown content.
///
/// Leading heading, quote and list markers are dropped and whitespace is trimmed.
///
/// # Examples
///
/// ```
/// use studynotes::util::text::extract_first_line;
///
/// let md = "\n# Limits\n\nA limit describes...";
/// assert_eq!(extract_first_line(md), "Limits");
/// ```
pub fn extract_first_line(markdown: &str) -> String {
    markdown
        .lines()
        .map(|line| {
            line.trim()
                .trim_start_matches(['#', '>', '-', '*', '+'])
                .trim()
        })
        .find(|line| !line.is_empty())
        .unwrap_or("")
        .to_string()
}

/// Shorten `text` to at most `max_chars` characters, marking the cut with `...`.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{}...", kept.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_heading_when_extracting_first_line_then_strips_marker() {
        assert_eq!(extract_first_line("## Derivatives"), "Derivatives");
    }

    #[test]
    fn given_multiline_text_when_extracting_first_line_then_returns_only_first_line() {
        assert_eq!(extract_first_line("First line\nSecond line"), "First line");
    }

    #[test]
    fn given_leading_blank_lines_when_extracting_first_line_then_skips_them() {
        assert_eq!(extract_first_line("\n  \n- item one\n- item two"), "item one");
    }

    #[test]
    fn given_empty_text_when_extracting_first_line_then_returns_empty_string() {
        assert_eq!(extract_first_line(""), "");
    }

    #[test]
    fn given_only_markers_when_extracting_first_line_then_returns_empty_string() {
        assert_eq!(extract_first_line("#\n>\n"), "");
    }

    #[test]
    fn given_long_text_when_truncating_then_marks_cut() {
        assert_eq!(truncate_chars("Introduction to limits", 10), "Introdu...");
    }

    #[test]
    fn given_short_text_when_truncating_then_unchanged() {
        assert_eq!(truncate_chars("Limits", 10), "Limits");
    }

    #[test]
    fn given_multibyte_text_when_truncating_then_cuts_on_char_boundary() {
        assert_eq!(truncate_chars("Übungsblatt", 8), "Übung...");
    }
}
