use crate::sentiment::Sentiment;

/// Raw labels of the supported three-class sentiment models.
///
/// `cardiffnlp/twitter-roberta-base-sentiment` reports `LABEL_0..2`; its
/// `-latest` revision and most fine-tunes report the names directly.
const LABELS: &[(&str, Sentiment)] = &[
    ("label_0", Sentiment::Negative),
    ("label_1", Sentiment::Neutral),
    ("label_2", Sentiment::Positive),
    ("negative", Sentiment::Negative),
    ("neutral", Sentiment::Neutral),
    ("positive", Sentiment::Positive),
];

/// Map a raw model label onto the taxonomy. Case-insensitive.
pub fn map_label(raw: &str) -> Option<Sentiment> {
    let raw = raw.trim();
    LABELS
        .iter()
        .find(|(label, _)| label.eq_ignore_ascii_case(raw))
        .map(|(_, sentiment)| *sentiment)
}
