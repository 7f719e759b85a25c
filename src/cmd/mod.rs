pub mod catalog;
pub mod rankings;
pub mod resolve;

use anilink::TranslationType;

pub fn translation(dub: bool) -> TranslationType {
    if dub {
        TranslationType::Dub
    } else {
        TranslationType::Sub
    }
}

/// Shorten `text` to `max` chars, marking the cut with `...`.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{kept}...")
}
