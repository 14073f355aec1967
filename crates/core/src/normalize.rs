use once_cell::sync::Lazy;
use regex::Regex;
use unicode_segmentation::UnicodeSegmentation;

static LINKS_AND_ADDRESSES: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"http\S+|www\S+|\S+@\S+").expect("link pattern is valid")
});

const KEPT_PUNCTUATION: [char; 4] = ['.', ',', '?', '!'];

/// Cleans an inbound message before any filtering or model call.
///
/// Links and email addresses are removed, symbols outside word characters and
/// basic punctuation are dropped, emoji become `:shortcode:` tags and the
/// result is lowercased.
pub fn normalize_email(raw: &str) -> String {
    let without_links = LINKS_AND_ADDRESSES.replace_all(raw, "");

    let mut out = String::with_capacity(without_links.len());
    for grapheme in without_links.graphemes(true) {
        if let Some(shortcode) = emoji_shortcode(grapheme) {
            out.push(':');
            out.push_str(shortcode);
            out.push(':');
            continue;
        }

        for ch in grapheme.chars().filter(|ch| is_kept_char(*ch)) {
            out.push(ch);
        }
    }

    out.to_lowercase().trim().to_string()
}

pub fn token_count(text: &str) -> usize {
    text.split_whitespace().count()
}

fn is_kept_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_' || ch.is_whitespace() || KEPT_PUNCTUATION.contains(&ch)
}

fn emoji_shortcode(grapheme: &str) -> Option<&'static str> {
    // Plain ASCII never maps to an emoji on its own ('#', '*', digits).
    if grapheme.is_ascii() {
        return None;
    }

    emojis::get(grapheme)
        .or_else(|| emojis::get(&grapheme.replace('\u{FE0F}', "")))
        .and_then(|emoji| emoji.shortcode())
}
