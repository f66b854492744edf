use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::image::AcquiredImage;
use crate::text::{RecognizedText, Verdict};

/// Forward progress of one scan session. `ImageReady` is re-entrant: a new
/// acquisition from any phase returns here and wipes downstream state.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ScanPhase {
    #[default]
    Idle,
    ImageReady,
    TextReady,
    Classified,
}

impl std::fmt::Display for ScanPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScanPhase::Idle => write!(f, "idle"),
            ScanPhase::ImageReady => write!(f, "image_ready"),
            ScanPhase::TextReady => write!(f, "text_ready"),
            ScanPhase::Classified => write!(f, "classified"),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("no image has been acquired")]
    NoImage,
    #[error("no recognized text to classify")]
    NoText,
    #[error("extraction is already in flight")]
    ExtractionInFlight,
    #[error("classification is already in flight")]
    ClassificationInFlight,
}

/// Everything that can happen to a session. Stage completions carry the
/// fingerprint of the image they were computed from.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    ImageAcquired(AcquiredImage),
    AcquisitionCancelled,
    ExtractionStarted,
    ExtractionCompleted {
        fingerprint: String,
        text: RecognizedText,
    },
    ClassificationStarted,
    ClassificationCompleted {
        fingerprint: String,
        verdict: Verdict,
    },
}

/// Whether `apply` accepted an event or dropped a superseded stage result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Applied,
    DiscardedStale,
}

/// All transient state of one scan session. Fields are private so every
/// mutation goes through [`SessionState::apply`]; that one function owns the
/// transition table, the per-stage single-flight guards, and the
/// stale-result check.
#[derive(Debug, Default)]
pub struct SessionState {
    phase: ScanPhase,
    image: Option<AcquiredImage>,
    text: RecognizedText,
    verdict: Option<Verdict>,
    extracting: bool,
    classifying: bool,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, event: SessionEvent) -> Result<Transition, SessionError> {
        match event {
            SessionEvent::ImageAcquired(image) => {
                // Replacing the image invalidates everything derived from
                // the old one. In-flight stage work for it becomes stale and
                // is dropped on arrival, so the busy flags reset here.
                self.image = Some(image);
                self.text = RecognizedText::empty();
                self.verdict = None;
                self.extracting = false;
                self.classifying = false;
                self.phase = ScanPhase::ImageReady;
                Ok(Transition::Applied)
            }
            SessionEvent::AcquisitionCancelled => Ok(Transition::Applied),
            SessionEvent::ExtractionStarted => {
                if self.image.is_none() {
                    return Err(SessionError::NoImage);
                }
                if self.extracting {
                    return Err(SessionError::ExtractionInFlight);
                }
                if self.classifying {
                    return Err(SessionError::ClassificationInFlight);
                }
                self.extracting = true;
                Ok(Transition::Applied)
            }
            SessionEvent::ExtractionCompleted { fingerprint, text } => {
                if !self.is_current(&fingerprint) {
                    return Ok(Transition::DiscardedStale);
                }
                self.extracting = false;
                // A fresh extraction fully supersedes the previous text, and
                // any verdict derived from the old text with it.
                self.verdict = None;
                if text.is_empty() {
                    // Soft failure: nothing recognized. The image stays
                    // current and extraction can be retried.
                    self.text = RecognizedText::empty();
                    self.phase = ScanPhase::ImageReady;
                } else {
                    self.text = text;
                    self.phase = ScanPhase::TextReady;
                }
                Ok(Transition::Applied)
            }
            SessionEvent::ClassificationStarted => {
                if self.text.is_empty() {
                    return Err(SessionError::NoText);
                }
                if self.classifying {
                    return Err(SessionError::ClassificationInFlight);
                }
                if self.extracting {
                    return Err(SessionError::ExtractionInFlight);
                }
                self.classifying = true;
                Ok(Transition::Applied)
            }
            SessionEvent::ClassificationCompleted {
                fingerprint,
                verdict,
            } => {
                if !self.is_current(&fingerprint) {
                    return Ok(Transition::DiscardedStale);
                }
                self.classifying = false;
                self.verdict = Some(verdict);
                self.phase = ScanPhase::Classified;
                Ok(Transition::Applied)
            }
        }
    }

    fn is_current(&self, fingerprint: &str) -> bool {
        self.image
            .as_ref()
            .is_some_and(|img| img.fingerprint == fingerprint)
    }

    pub fn phase(&self) -> ScanPhase {
        self.phase
    }

    pub fn image(&self) -> Option<&AcquiredImage> {
        self.image.as_ref()
    }

    pub fn text(&self) -> &RecognizedText {
        &self.text
    }

    pub fn verdict(&self) -> Option<&Verdict> {
        self.verdict.as_ref()
    }

    pub fn is_extracting(&self) -> bool {
        self.extracting
    }

    pub fn is_classifying(&self) -> bool {
        self.classifying
    }

    /// Whether the extract affordance should be offered.
    pub fn can_extract(&self) -> bool {
        self.image.is_some() && !self.extracting && !self.classifying
    }

    /// Whether the classify affordance should be offered. Requires text, so
    /// an empty extraction never leads to a classification.
    pub fn can_classify(&self) -> bool {
        !self.text.is_empty() && !self.extracting && !self.classifying
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::ImageSource;

    fn library_image(bytes: &[u8]) -> AcquiredImage {
        AcquiredImage::new(bytes.to_vec(), ImageSource::Library)
    }

    fn text(lines: &[&str]) -> RecognizedText {
        RecognizedText::from_lines(lines.iter().map(|l| l.to_string()).collect())
    }

    /// Drive a session to TextReady with the given recognized lines.
    fn session_with_text(lines: &[&str]) -> (SessionState, String) {
        let mut s = SessionState::new();
        let img = library_image(b"picture");
        let fp = img.fingerprint.clone();
        s.apply(SessionEvent::ImageAcquired(img)).unwrap();
        s.apply(SessionEvent::ExtractionStarted).unwrap();
        s.apply(SessionEvent::ExtractionCompleted {
            fingerprint: fp.clone(),
            text: text(lines),
        })
        .unwrap();
        (s, fp)
    }

    #[test]
    fn starts_idle() {
        let s = SessionState::new();
        assert_eq!(s.phase(), ScanPhase::Idle);
        assert!(s.image().is_none());
        assert!(s.text().is_empty());
        assert!(s.verdict().is_none());
        assert!(!s.can_extract());
        assert!(!s.can_classify());
    }

    #[test]
    fn acquisition_moves_to_image_ready_and_clears_downstream() {
        let (mut s, _) = session_with_text(&["BUY NOW"]);
        s.apply(SessionEvent::ClassificationStarted).unwrap();
        let fp = s.image().unwrap().fingerprint.clone();
        s.apply(SessionEvent::ClassificationCompleted {
            fingerprint: fp,
            verdict: Verdict::new("spam"),
        })
        .unwrap();
        assert_eq!(s.phase(), ScanPhase::Classified);

        // Re-acquiring from Classified resets all forward state.
        s.apply(SessionEvent::ImageAcquired(library_image(b"next")))
            .unwrap();
        assert_eq!(s.phase(), ScanPhase::ImageReady);
        assert!(s.text().is_empty());
        assert!(s.verdict().is_none());
    }

    #[test]
    fn cancellation_changes_nothing() {
        let (mut s, _) = session_with_text(&["BUY NOW"]);
        let fp_before = s.image().unwrap().fingerprint.clone();

        let t = s.apply(SessionEvent::AcquisitionCancelled).unwrap();

        assert_eq!(t, Transition::Applied);
        assert_eq!(s.phase(), ScanPhase::TextReady);
        assert_eq!(s.image().unwrap().fingerprint, fp_before);
        assert_eq!(s.text().lines(), &["BUY NOW"]);
    }

    #[test]
    fn extraction_requires_an_image() {
        let mut s = SessionState::new();
        assert_eq!(
            s.apply(SessionEvent::ExtractionStarted),
            Err(SessionError::NoImage)
        );
    }

    #[test]
    fn extraction_is_single_flight() {
        let mut s = SessionState::new();
        s.apply(SessionEvent::ImageAcquired(library_image(b"x")))
            .unwrap();
        s.apply(SessionEvent::ExtractionStarted).unwrap();
        assert_eq!(
            s.apply(SessionEvent::ExtractionStarted),
            Err(SessionError::ExtractionInFlight)
        );
        assert!(!s.can_extract());
    }

    #[test]
    fn successful_extraction_reaches_text_ready() {
        let (s, _) = session_with_text(&["BUY NOW"]);
        assert_eq!(s.phase(), ScanPhase::TextReady);
        assert_eq!(s.text().lines(), &["BUY NOW"]);
        assert!(!s.is_extracting());
        assert!(s.can_classify());
    }

    #[test]
    fn empty_extraction_stays_image_ready() {
        let (s, _) = session_with_text(&[]);
        assert_eq!(s.phase(), ScanPhase::ImageReady);
        assert!(s.text().is_empty());
        assert!(!s.is_extracting());
        // Retry is allowed, classification is not.
        assert!(s.can_extract());
        assert!(!s.can_classify());
    }

    #[test]
    fn re_extraction_supersedes_text_and_verdict() {
        let (mut s, fp) = session_with_text(&["OLD LINE"]);
        s.apply(SessionEvent::ClassificationStarted).unwrap();
        s.apply(SessionEvent::ClassificationCompleted {
            fingerprint: fp.clone(),
            verdict: Verdict::new("spam"),
        })
        .unwrap();

        s.apply(SessionEvent::ExtractionStarted).unwrap();
        s.apply(SessionEvent::ExtractionCompleted {
            fingerprint: fp,
            text: text(&["NEW LINE"]),
        })
        .unwrap();

        assert_eq!(s.phase(), ScanPhase::TextReady);
        assert_eq!(s.text().lines(), &["NEW LINE"]);
        assert!(s.verdict().is_none());
    }

    #[test]
    fn stale_extraction_result_is_discarded() {
        let mut s = SessionState::new();
        let first = library_image(b"first");
        let first_fp = first.fingerprint.clone();
        s.apply(SessionEvent::ImageAcquired(first)).unwrap();
        s.apply(SessionEvent::ExtractionStarted).unwrap();

        // A second acquisition lands while the first extraction is in
        // flight.
        let second = library_image(b"second");
        let second_fp = second.fingerprint.clone();
        s.apply(SessionEvent::ImageAcquired(second)).unwrap();

        let t = s
            .apply(SessionEvent::ExtractionCompleted {
                fingerprint: first_fp,
                text: text(&["text from the replaced image"]),
            })
            .unwrap();

        assert_eq!(t, Transition::DiscardedStale);
        assert_eq!(s.phase(), ScanPhase::ImageReady);
        assert!(s.text().is_empty());
        assert_eq!(s.image().unwrap().fingerprint, second_fp);
    }

    #[test]
    fn stale_classification_result_is_discarded() {
        let (mut s, fp) = session_with_text(&["BUY NOW"]);
        s.apply(SessionEvent::ClassificationStarted).unwrap();

        s.apply(SessionEvent::ImageAcquired(library_image(b"newer")))
            .unwrap();

        let t = s
            .apply(SessionEvent::ClassificationCompleted {
                fingerprint: fp,
                verdict: Verdict::new("spam"),
            })
            .unwrap();

        assert_eq!(t, Transition::DiscardedStale);
        assert!(s.verdict().is_none());
        assert_eq!(s.phase(), ScanPhase::ImageReady);
    }

    #[test]
    fn new_acquisition_resets_busy_flags() {
        let mut s = SessionState::new();
        s.apply(SessionEvent::ImageAcquired(library_image(b"a")))
            .unwrap();
        s.apply(SessionEvent::ExtractionStarted).unwrap();
        assert!(s.is_extracting());

        // The replaced image's flight no longer blocks the new one.
        s.apply(SessionEvent::ImageAcquired(library_image(b"b")))
            .unwrap();
        assert!(!s.is_extracting());
        assert!(s.can_extract());
    }

    #[test]
    fn classification_requires_text() {
        let mut s = SessionState::new();
        s.apply(SessionEvent::ImageAcquired(library_image(b"a")))
            .unwrap();
        assert_eq!(
            s.apply(SessionEvent::ClassificationStarted),
            Err(SessionError::NoText)
        );
    }

    #[test]
    fn classification_is_single_flight() {
        let (mut s, _) = session_with_text(&["BUY NOW"]);
        s.apply(SessionEvent::ClassificationStarted).unwrap();
        assert_eq!(
            s.apply(SessionEvent::ClassificationStarted),
            Err(SessionError::ClassificationInFlight)
        );
        assert!(!s.can_classify());
    }

    #[test]
    fn extraction_blocked_while_classifying() {
        let (mut s, _) = session_with_text(&["BUY NOW"]);
        s.apply(SessionEvent::ClassificationStarted).unwrap();
        assert_eq!(
            s.apply(SessionEvent::ExtractionStarted),
            Err(SessionError::ClassificationInFlight)
        );
    }

    #[test]
    fn inconclusive_verdict_still_classifies() {
        // The capability being unavailable is absorbed upstream into the
        // fixed verdict; the session treats it as a normal completion.
        let (mut s, fp) = session_with_text(&["BUY NOW"]);
        s.apply(SessionEvent::ClassificationStarted).unwrap();
        s.apply(SessionEvent::ClassificationCompleted {
            fingerprint: fp,
            verdict: Verdict::could_not_analyze(),
        })
        .unwrap();

        assert_eq!(s.phase(), ScanPhase::Classified);
        assert_eq!(s.verdict().unwrap().explanation(), "could not analyze");
    }
}
