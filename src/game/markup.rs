//! Decorative markup handling for template text.
//!
//! Game-side text carries legacy colour and style codes (`&6`, `§l`,
//! `&#ff8800`). Templates either keep them for the game to render or have
//! them removed before the text goes anywhere that would show them raw.

use std::borrow::Cow;
use std::sync::LazyLock;

use fancy_regex::Regex;

/// Whether a template keeps or strips decorative markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkupPolicy {
    Retain,
    Strip,
}

/// `&` codes not preceded by another `&` (that is an escape).
static AMPERSAND_CODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?<!&)&(?:#[0-9a-fA-F]{6}|[0-9a-fk-orA-FK-OR])").expect("valid markup pattern")
});

/// Section-sign codes, including the `§x` hex prefix.
static SECTION_CODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"§[0-9a-fk-orxA-FK-ORX]").expect("valid markup pattern")
});

impl MarkupPolicy {
    /// Apply this policy to raw template text.
    pub fn apply<'a>(&self, text: &'a str) -> Cow<'a, str> {
        match self {
            Self::Retain => Cow::Borrowed(text),
            Self::Strip => Cow::Owned(strip_markup(text)),
        }
    }
}

/// Remove colour and style codes. `&&` is an escaped ampersand and is
/// unescaped to `&` after stripping, so `&&c` survives as `&c`.
pub fn strip_markup(text: &str) -> String {
    if !text.contains('&') && !text.contains('§') {
        return text.to_string();
    }
    let pass1 = AMPERSAND_CODE.replace_all(text, "");
    let pass2 = SECTION_CODE.replace_all(&pass1, "");
    pass2.replace("&&", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_ampersand_codes() {
        assert_eq!(strip_markup("&6[#general] &3Bob&7: &fhi"), "[#general] Bob: hi");
        assert_eq!(strip_markup("&lBold &R&oreset"), "Bold reset");
    }

    #[test]
    fn test_strip_section_and_hex_codes() {
        assert_eq!(strip_markup("§aGreen §x§f§f§8§8§0§0text"), "Green text");
        assert_eq!(strip_markup("&#ff8800orange"), "orange");
    }

    #[test]
    fn test_escaped_ampersand_kept() {
        assert_eq!(strip_markup("Tom &&c Jerry"), "Tom &c Jerry");
        assert_eq!(strip_markup("rock & roll"), "rock & roll");
    }

    #[test]
    fn test_non_codes_untouched() {
        assert_eq!(strip_markup("&z is not a code"), "&z is not a code");
        assert_eq!(strip_markup("{displayname} has joined!"), "{displayname} has joined!");
    }

    #[test]
    fn test_retain_passes_through() {
        let text = "&6[#{channel}] &3{fullname}";
        assert_eq!(MarkupPolicy::Retain.apply(text), text);
        assert_eq!(MarkupPolicy::Strip.apply(text), "[#{channel}] {fullname}");
    }
}
