use std::sync::Arc;

use spamscan_core::{RecognizedText, Verdict};

use crate::classifier::{ClassifyError, SpamClassifier};

/// Result of one classification flight, tagged like extraction outcomes so
/// the session can drop completions for a replaced image.
#[derive(Debug, Clone)]
pub struct ClassificationOutcome {
    pub fingerprint: String,
    pub verdict: Verdict,
}

/// Asynchronous classification stage. Runs the capability on a blocking
/// worker and absorbs every failure into the fixed inconclusive verdict;
/// callers always get a verdict back, never an error.
pub struct TextClassifier {
    classifier: Arc<dyn SpamClassifier>,
}

impl TextClassifier {
    pub fn new(classifier: Arc<dyn SpamClassifier>) -> Self {
        Self { classifier }
    }

    /// `fingerprint` identifies the image the text was recognized from.
    pub async fn classify(
        &self,
        fingerprint: &str,
        text: &RecognizedText,
    ) -> ClassificationOutcome {
        let joined = text.joined();
        let classifier = Arc::clone(&self.classifier);

        let verdict = tokio::task::spawn_blocking(move || classifier.classify(&joined))
            .await
            .unwrap_or_else(|e| {
                tracing::warn!("classification worker died: {e}");
                Err(ClassifyError::Inference(e.to_string()))
            })
            .unwrap_or_else(|e| {
                tracing::warn!("classification absorbed a failure: {e}");
                Verdict::could_not_analyze()
            });

        tracing::info!(fingerprint = %fingerprint, "classification finished");
        ClassificationOutcome {
            fingerprint: fingerprint.to_string(),
            verdict,
        }
    }
}
