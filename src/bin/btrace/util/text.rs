/// Greedy word wrap. Words longer than `width` (typically paths in error
/// messages) are split across lines so the panel border stays aligned.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for word in text.split_whitespace() {
        for piece in split_long(word, width) {
            let len = piece.chars().count();
            if current.is_empty() {
                current = piece;
                current_len = len;
            } else if current_len + 1 + len <= width {
                current.push(' ');
                current.push_str(&piece);
                current_len += 1 + len;
            } else {
                lines.push(std::mem::take(&mut current));
                current = piece;
                current_len = len;
            }
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }

    if lines.is_empty() {
        lines.push(String::new());
    }

    lines
}

fn split_long(word: &str, width: usize) -> Vec<String> {
    let chars: Vec<char> = word.chars().collect();
    chars
        .chunks(width)
        .map(|chunk| chunk.iter().collect())
        .collect()
}

/// Shortens `s` to at most `max_len` characters, marking the cut with `…`.
pub fn truncate(s: &str, max_len: usize) -> String {
    match max_len {
        0 => return String::new(),
        1 => return "…".to_string(),
        _ => {}
    }

    if s.chars().count() <= max_len {
        return s.to_string();
    }

    let mut out: String = s.chars().take(max_len - 1).collect();
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_keeps_short_text_on_one_line() {
        assert_eq!(wrap("interface not found", 30), vec!["interface not found"]);
    }

    #[test]
    fn wrap_breaks_between_words() {
        assert_eq!(
            wrap("no frames available for profile", 16),
            vec!["no frames", "available for", "profile"]
        );
    }

    #[test]
    fn wrap_splits_words_longer_than_width() {
        assert_eq!(
            wrap("open runs/Umin_-0.1/rad_2", 10),
            vec!["open", "runs/Umin_", "-0.1/rad_2"]
        );
    }

    #[test]
    fn wrap_of_blank_text_is_one_empty_line() {
        assert_eq!(wrap("   ", 10), vec![String::new()]);
    }

    #[test]
    fn truncate_leaves_fitting_text() {
        assert_eq!(truncate("NP_128", 6), "NP_128");
        assert_eq!(truncate("NP_128", 10), "NP_128");
    }

    #[test]
    fn truncate_marks_cut() {
        assert_eq!(truncate("Umin -0.175 · rad 2", 8), "Umin -0…");
        assert_eq!(truncate("φ brush fraction", 3), "φ …");
        assert_eq!(truncate("abc", 1), "…");
        assert_eq!(truncate("abc", 0), "");
    }
}
