//! Tag name transliteration.
//!
//! Keyword tags arrive as display names, usually Chinese. Markup attributes
//! and URLs on the publishing side need an ASCII key, so each Han character
//! is romanized and the syllables are joined without separators
//! (`"示例"` → `"shili"`). Characters outside the Han blocks are dropped,
//! which matches how tag keys were generated historically: `"5G手机"` keys
//! as `"shouji"`.

use deunicode::deunicode_char;

/// Convert a display name into an ASCII key.
///
/// Deterministic and stateless. Falls back to `name` itself when no Han
/// character could be romanized (for example `"5G"` or `"iPhone"`).
pub fn transliterate(name: &str) -> String {
    let key: String = name
        .chars()
        .filter(|c| is_han(*c))
        .filter_map(deunicode_char)
        .flat_map(str::chars)
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect();

    if key.is_empty() {
        name.to_string()
    } else {
        key
    }
}

fn is_han(c: char) -> bool {
    matches!(
        c as u32,
        0x3400..=0x4DBF       // Extension A
            | 0x4E00..=0x9FFF // Unified Ideographs
            | 0xF900..=0xFAFF // Compatibility Ideographs
            | 0x20000..=0x2FA1F
    )
}
