//! Text normalization from raw game strings to wikitext

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::Result;

/// Turns raw localized text into wiki-safe text
pub trait TextNormalizer: Send + Sync {
    fn normalize_text(&self, raw: &str, locale: &str) -> Result<String>;
}

lazy_static! {
    static ref WANDERER_NAME: Regex =
        Regex::new(r"\{REALNAME\[ID\(1\)(\|HOSTONLY\(true\))?\]\}").expect("valid regex");
    static ref BOLD_COLOR: Regex =
        Regex::new(r"<color=#(?:FFFFFFFF|\{0\})>(.*?)</color>").expect("valid regex");
    static ref HEX_COLOR: Regex =
        Regex::new(r"<color=(#[0-9a-fA-F]{6})FF>(.*?)</color>").expect("valid regex");
}

/// Placeholder used for the player's chosen name
#[must_use]
pub fn traveler_placeholder(locale: &str) -> &'static str {
    match locale.to_ascii_uppercase().as_str() {
        "CH" | "CHS" | "CHT" => "(旅行者)",
        "DE" => "(Reisender/Reisende)",
        "ES" => "(Viajero/Viajera)",
        "FR" => "(Voyageur/Voyageuse)",
        "ID" => "(Pengembara)",
        "IT" => "(Viaggiatore/Viaggiatrice)",
        "JP" => "(旅人)",
        "KR" => "(여행자)",
        "PT" => "(Viajante)",
        "RU" => "(Путешественник/Путешественница)",
        "TH" => "(นักเดินทาง)",
        "TR" => "(Gezgin)",
        "VI" => "(Nhà Lữ Hành)",
        _ => "(Traveler)",
    }
}

/// Default normalizer for wiki transcripts
///
/// Handles the markup that shows up in dialogue text: player name tokens,
/// colour tags, escaped line breaks and the leading `#` format marker.
#[derive(Debug, Clone, Copy, Default)]
pub struct WikiTextNormalizer;

impl TextNormalizer for WikiTextNormalizer {
    fn normalize_text(&self, raw: &str, locale: &str) -> Result<String> {
        let text = raw.strip_prefix('#').unwrap_or(raw);

        let text = text
            .replace("\\n", "<br />")
            .replace("\r\n", "<br />")
            .replace('\n', "<br />")
            .replace("{NICKNAME}", traveler_placeholder(locale));

        let text = WANDERER_NAME.replace_all(&text, "(Wanderer)");
        let text = BOLD_COLOR.replace_all(&text, "'''$1'''");
        let text = HEX_COLOR.replace_all(&text, "{{color|$1|$2}}");

        Ok(text.into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn norm(s: &str) -> String {
        WikiTextNormalizer.normalize_text(s, "EN").unwrap()
    }

    #[test]
    fn test_nickname_by_locale() {
        assert_eq!(norm("Hey, {NICKNAME}!"), "Hey, (Traveler)!");
        assert_eq!(
            WikiTextNormalizer.normalize_text("{NICKNAME}", "de").unwrap(),
            "(Reisender/Reisende)"
        );
        assert_eq!(
            WikiTextNormalizer.normalize_text("{NICKNAME}", "XX").unwrap(),
            "(Traveler)"
        );
    }

    #[test]
    fn test_line_breaks_and_format_marker() {
        assert_eq!(norm("#First\\nSecond\nThird"), "First<br />Second<br />Third");
    }

    #[test]
    fn test_color_tags() {
        assert_eq!(norm("<color=#FFFFFFFF>Bold</color> text"), "'''Bold''' text");
        assert_eq!(
            norm("a <color=#FFD780FF>gold</color> word"),
            "a {{color|#FFD780|gold}} word"
        );
    }

    #[test]
    fn test_wanderer_name() {
        assert_eq!(norm("{REALNAME[ID(1)|HOSTONLY(true)]} waits."), "(Wanderer) waits.");
        assert_eq!(norm("{REALNAME[ID(1)]}"), "(Wanderer)");
    }
}
