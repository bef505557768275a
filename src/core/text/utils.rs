//! Truncation and padding helpers.

use unicode_segmentation::UnicodeSegmentation;

use super::width::{grapheme_width, visible_width};

/// Fit plain `text` into `max_width` columns.
///
/// Text wider than `max_width` is cut at a grapheme boundary and suffixed with `ellipsis`.
/// With `pad`, the result is right-padded with spaces to exactly `max_width` columns.
pub fn truncate_to_width(text: &str, max_width: usize, ellipsis: &str, pad: bool) -> String {
    if max_width == 0 {
        return String::new();
    }

    let text_width = visible_width(text);
    if text_width <= max_width {
        if pad {
            return format!("{text}{}", " ".repeat(max_width - text_width));
        }
        return text.to_string();
    }

    let ellipsis_width = visible_width(ellipsis);
    let target_width = max_width.saturating_sub(ellipsis_width);
    if target_width == 0 {
        return ellipsis.chars().take(max_width).collect();
    }

    let mut truncated = String::new();
    let mut current_width = 0;
    for grapheme in text.graphemes(true) {
        let width = grapheme_width(grapheme);
        if current_width + width > target_width {
            break;
        }
        truncated.push_str(grapheme);
        current_width += width;
    }
    truncated.push_str(ellipsis);

    if pad {
        let result_width = current_width + ellipsis_width;
        if result_width < max_width {
            truncated.push_str(&" ".repeat(max_width - result_width));
        }
    }

    truncated
}

#[cfg(test)]
mod tests {
    use super::truncate_to_width;
    use crate::core::text::width::visible_width;

    #[test]
    fn truncate_returns_original_when_shorter() {
        assert_eq!(truncate_to_width("hello", 6, "...", false), "hello");
    }

    #[test]
    fn truncate_adds_ellipsis() {
        let truncated = truncate_to_width("install-package", 8, "...", false);
        assert_eq!(truncated, "insta...");
        assert_eq!(visible_width(&truncated), 8);
    }

    #[test]
    fn truncate_pads_when_requested() {
        let padded = truncate_to_width("hi", 4, "...", true);
        assert_eq!(padded, "hi  ");
    }

    #[test]
    fn truncate_does_not_split_wide_glyphs() {
        let truncated = truncate_to_width("包包包包", 6, "...", true);
        assert_eq!(truncated, "包... ");
        assert_eq!(visible_width(&truncated), 6);
    }

    #[test]
    fn truncate_handles_small_max_width() {
        assert_eq!(truncate_to_width("hello", 2, "...", false), "..");
        assert_eq!(truncate_to_width("hello", 0, "...", true), "");
    }
}
