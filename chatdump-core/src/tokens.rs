/// Rough token count at four characters per token.
///
/// This is a size hint for display, not a tokenizer: real model
/// tokenizers will disagree, sometimes by a wide margin.
pub fn estimate_tokens(text: &str) -> usize {
    (text.chars().count() / 4).max(1)
}

#[allow(clippy::cast_precision_loss)]
pub fn token_count_label(count: usize) -> String {
    if count < 1_000 {
        format!("{count} tokens")
    } else if count < 1_000_000 {
        format!("{:.1}K tokens", count as f64 / 1_000.0)
    } else {
        format!("{:.1}M tokens", count as f64 / 1_000_000.0)
    }
}
