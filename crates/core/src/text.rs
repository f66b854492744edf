use serde::{Deserialize, Serialize};

/// Ordered lines of recognized text, produced from exactly one image.
/// Cleared whenever a new image replaces the one it was read from.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecognizedText {
    lines: Vec<String>,
}

impl RecognizedText {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_lines(lines: Vec<String>) -> Self {
        Self { lines }
    }

    /// Normalize raw engine output: one line per detected region, in the
    /// engine's own detection order. Surrounding whitespace is trimmed and
    /// blank lines are dropped; no reordering happens here.
    pub fn from_engine_output(raw: &str) -> Self {
        let lines = raw
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect();
        Self { lines }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Newline-joined form, the shape classifiers consume.
    pub fn joined(&self) -> String {
        self.lines.join("\n")
    }
}

impl std::fmt::Display for RecognizedText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.joined())
    }
}

/// Fixed explanation reported when the classification capability is missing
/// or fails. Failures never cross the stage boundary as errors; they become
/// this value.
pub const INCONCLUSIVE_VERDICT: &str = "could not analyze";

/// The classification outcome shown to the user: a short natural-language
/// explanation of whether the text looks like spam.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Verdict {
    explanation: String,
}

impl Verdict {
    pub fn new(explanation: impl Into<String>) -> Self {
        Self {
            explanation: explanation.into(),
        }
    }

    pub fn could_not_analyze() -> Self {
        Self::new(INCONCLUSIVE_VERDICT)
    }

    pub fn explanation(&self) -> &str {
        &self.explanation
    }

    pub fn is_inconclusive(&self) -> bool {
        self.explanation == INCONCLUSIVE_VERDICT
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.explanation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_output_preserves_detection_order() {
        let text = RecognizedText::from_engine_output("CONGRATULATIONS\nYou won\nClick here");
        assert_eq!(text.lines(), &["CONGRATULATIONS", "You won", "Click here"]);
        assert_eq!(text.line_count(), 3);
    }

    #[test]
    fn engine_output_drops_blank_lines() {
        let text = RecognizedText::from_engine_output("  BUY NOW  \n\n   \nlimited offer\n");
        assert_eq!(text.lines(), &["BUY NOW", "limited offer"]);
    }

    #[test]
    fn blank_output_is_empty() {
        assert!(RecognizedText::from_engine_output("").is_empty());
        assert!(RecognizedText::from_engine_output("  \n \n").is_empty());
    }

    #[test]
    fn joined_roundtrips_lines() {
        let text = RecognizedText::from_lines(vec!["a".into(), "b".into()]);
        assert_eq!(text.joined(), "a\nb");
        assert_eq!(text.to_string(), "a\nb");
    }

    #[test]
    fn inconclusive_verdict_sentinel() {
        let v = Verdict::could_not_analyze();
        assert!(v.is_inconclusive());
        assert_eq!(v.explanation(), "could not analyze");

        let real = Verdict::new("Likely spam: urgency plus a payment link.");
        assert!(!real.is_inconclusive());
    }
}
