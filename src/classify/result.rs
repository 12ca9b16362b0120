/// Reply text that marks a clip as unimportant background noise
pub const UNIMPORTANT_SENTINEL: &str = "none";

/// Normalized classification outcome for one clip.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationResult {
    /// The service's reply text, untouched
    pub raw_text: String,
    /// False iff the normalized reply equals the "none" sentinel (and the
    /// service's own importance flag, when present, agrees)
    pub is_important: bool,
    /// Bracketed `[...]` substrings, in order of appearance
    pub labels: Vec<String>,
    /// Everything outside the brackets, whitespace-collapsed
    pub speech: String,
}

/// Parse the service's free-text reply.
///
/// `important_hint` is the service's optional structured importance flag;
/// when present it is combined with the sentinel rule.
pub fn parse_reply_text(raw: &str, important_hint: Option<bool>) -> ClassificationResult {
    let mut is_important = !raw.trim().eq_ignore_ascii_case(UNIMPORTANT_SENTINEL);
    if let Some(hint) = important_hint {
        is_important = is_important && hint;
    }

    let (labels, speech) = split_labels(raw);

    ClassificationResult {
        raw_text: raw.to_string(),
        is_important,
        labels,
        speech,
    }
}

/// Split `[label]` markers out of the reply; the rest is transcribed speech.
fn split_labels(text: &str) -> (Vec<String>, String) {
    let mut labels = Vec::new();
    let mut speech = String::new();
    let mut rest = text;

    while let Some(open) = rest.find('[') {
        speech.push_str(&rest[..open]);
        match rest[open + 1..].find(']') {
            Some(close) => {
                let label = rest[open + 1..open + 1 + close].trim();
                if !label.is_empty() {
                    labels.push(label.to_string());
                }
                rest = &rest[open + 1 + close + 1..];
            }
            None => {
                // Unmatched bracket: keep the remainder as speech
                speech.push_str(&rest[open..]);
                rest = "";
                break;
            }
        }
    }
    speech.push_str(rest);

    let speech = speech.split_whitespace().collect::<Vec<_>>().join(" ");
    (labels, speech)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_none_sentinel_case_insensitive() {
        let result = parse_reply_text("NONE", None);
        assert!(!result.is_important);
        assert!(result.labels.is_empty());

        let result = parse_reply_text("  none \n", None);
        assert!(!result.is_important);
    }

    #[test]
    fn test_label_and_speech_split() {
        let result = parse_reply_text("[Door knocks] Hello?", None);
        assert!(result.is_important);
        assert_eq!(result.labels, vec!["Door knocks"]);
        assert_eq!(result.speech, "Hello?");
    }

    #[test]
    fn test_multiple_labels_keep_order() {
        let result = parse_reply_text("[Siren] passing by [Dog barking]", None);
        assert_eq!(result.labels, vec!["Siren", "Dog barking"]);
        assert_eq!(result.speech, "passing by");
    }

    #[test]
    fn test_unmatched_bracket_is_speech() {
        let result = parse_reply_text("left [unclosed", None);
        assert!(result.labels.is_empty());
        assert_eq!(result.speech, "left [unclosed");
    }

    #[test]
    fn test_importance_hint_combines_with_sentinel() {
        let result = parse_reply_text("[Siren]", Some(false));
        assert!(!result.is_important);

        let result = parse_reply_text("[Siren]", Some(true));
        assert!(result.is_important);

        // The sentinel wins even when the hint claims importance
        let result = parse_reply_text("none", Some(true));
        assert!(!result.is_important);
    }

    #[test]
    fn test_empty_label_dropped() {
        let result = parse_reply_text("[] quiet room", None);
        assert!(result.labels.is_empty());
        assert_eq!(result.speech, "quiet room");
    }
}
