//! Transcript chunking for the extraction service limit.

/// Splits `text` into chunks of at most `max_chars` characters on word
/// boundaries. Length accounting charges one joining space per word, so a
/// rejoined chunk never exceeds the limit. A single word longer than the
/// limit is clipped to it.
pub fn chunk_text(text: &str, max_chars: usize) -> Vec<String> {
    if max_chars == 0 {
        return Vec::new();
    }
    let mut chunks = Vec::new();
    let mut current = String::new();
    for raw in text.split_whitespace() {
        let word = clip_word(raw, max_chars);
        if !current.is_empty() && current.len() + 1 + word.len() > max_chars {
            chunks.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

/// Truncates `word` to at most `max_chars` bytes without splitting a
/// character.
fn clip_word(word: &str, max_chars: usize) -> &str {
    if word.len() <= max_chars {
        return word;
    }
    let mut end = max_chars;
    while end > 0 && !word.is_char_boundary(end) {
        end -= 1;
    }
    &word[..end]
}
