//! Whitespace normalization and sentence segmentation.

/// Collapse newlines and carriage returns into spaces. Paragraph structure
/// carries no meaning downstream; only sentence boundaries do.
pub(crate) fn normalize(text: &str) -> String {
    text.replace(['\n', '\r'], " ")
}

/// Split after `.`, `!` or `?` followed by whitespace. The whitespace run is
/// the split point and is consumed; the punctuation stays attached to the
/// preceding fragment. Fragments are trimmed and empty ones dropped. Text
/// without any matching delimiter comes back as a single sentence.
pub(crate) fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut start = 0usize;
    let mut prev: Option<char> = None;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if c.is_whitespace() && matches!(prev, Some('.' | '!' | '?')) {
            let fragment = text[start..i].trim();
            if !fragment.is_empty() {
                sentences.push(fragment.to_string());
            }
            // Consume the rest of the whitespace run.
            let mut end = i + c.len_utf8();
            while let Some(&(j, next)) = chars.peek() {
                if !next.is_whitespace() {
                    break;
                }
                end = j + next.len_utf8();
                chars.next();
            }
            start = end;
            prev = None;
        } else {
            prev = Some(c);
        }
    }

    let tail = text[start..].trim();
    if !tail.is_empty() {
        sentences.push(tail.to_string());
    }
    sentences
}
