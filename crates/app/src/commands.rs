use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;

use spamscan_classify::TextClassifier;
use spamscan_core::{
    Acquisition, ScanPhase, SessionError, SessionEvent, SessionState, Transition,
};
use spamscan_ocr::TextExtractor;

/// Shared handle the driver clones into every command invocation. All
/// session mutation happens under the one lock; the stages only compute
/// values and hand them back.
#[derive(Clone)]
pub struct App {
    pub session: Arc<Mutex<SessionState>>,
    pub extractor: Arc<TextExtractor>,
    pub classifier: Arc<TextClassifier>,
}

impl App {
    pub fn new(extractor: TextExtractor, classifier: TextClassifier) -> Self {
        Self {
            session: Arc::new(Mutex::new(SessionState::new())),
            extractor: Arc::new(extractor),
            classifier: Arc::new(classifier),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CommandError {
    pub message: String,
}

impl From<SessionError> for CommandError {
    fn from(e: SessionError) -> Self {
        CommandError {
            message: e.to_string(),
        }
    }
}

impl std::fmt::Display for CommandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Snapshot of the session rendered to the driver after every command.
#[derive(Debug, Serialize)]
pub struct StatusOutput {
    pub phase: ScanPhase,
    pub source: Option<String>,
    pub fingerprint: Option<String>,
    pub acquired_at: Option<String>,
    pub lines: Vec<String>,
    pub verdict: Option<String>,
    pub extracting: bool,
    pub classifying: bool,
    pub can_extract: bool,
    pub can_classify: bool,
}

impl StatusOutput {
    fn from_state(s: &SessionState) -> Self {
        StatusOutput {
            phase: s.phase(),
            source: s.image().map(|i| i.source.to_string()),
            fingerprint: s.image().map(|i| i.fingerprint.clone()),
            acquired_at: s.image().map(|i| i.acquired_at.to_rfc3339()),
            lines: s.text().lines().to_vec(),
            verdict: s.verdict().map(|v| v.explanation().to_string()),
            extracting: s.is_extracting(),
            classifying: s.is_classifying(),
            can_extract: s.can_extract(),
            can_classify: s.can_classify(),
        }
    }
}

/// Apply one picker round trip to the session. Cancellation is a no-op by
/// contract; a new image resets all downstream state.
pub async fn acquire(app: &App, acquisition: Acquisition) -> Result<StatusOutput, CommandError> {
    let mut session = app.session.lock().await;
    match acquisition {
        Acquisition::Image(image) => {
            tracing::info!(
                fingerprint = %image.fingerprint,
                source = %image.source,
                "image acquired"
            );
            session.apply(SessionEvent::ImageAcquired(image))?;
        }
        Acquisition::Cancelled => {
            tracing::info!("acquisition cancelled, state unchanged");
            session.apply(SessionEvent::AcquisitionCancelled)?;
        }
    }
    Ok(StatusOutput::from_state(&session))
}

/// Run the extraction stage for the current image. The lock is held only to
/// start the flight and to apply its outcome; recognition runs off-lock so
/// acquisition stays responsive while it works.
pub async fn extract(app: &App) -> Result<StatusOutput, CommandError> {
    let image = {
        let mut session = app.session.lock().await;
        session.apply(SessionEvent::ExtractionStarted)?;
        match session.image() {
            Some(image) => image.clone(),
            None => return Err(SessionError::NoImage.into()),
        }
    };

    let outcome = app.extractor.extract(&image).await;

    let mut session = app.session.lock().await;
    let transition = session.apply(SessionEvent::ExtractionCompleted {
        fingerprint: outcome.fingerprint,
        text: outcome.text,
    })?;
    if transition == Transition::DiscardedStale {
        tracing::info!("dropping extraction result for a replaced image");
    }
    Ok(StatusOutput::from_state(&session))
}

/// Run the classification stage for the current text. Same locking shape as
/// extraction; the stage itself never fails, it degrades to the fixed
/// inconclusive verdict.
pub async fn classify(app: &App) -> Result<StatusOutput, CommandError> {
    let (fingerprint, text) = {
        let mut session = app.session.lock().await;
        session.apply(SessionEvent::ClassificationStarted)?;
        let fingerprint = match session.image() {
            Some(image) => image.fingerprint.clone(),
            None => return Err(SessionError::NoImage.into()),
        };
        (fingerprint, session.text().clone())
    };

    let outcome = app.classifier.classify(&fingerprint, &text).await;

    let mut session = app.session.lock().await;
    let transition = session.apply(SessionEvent::ClassificationCompleted {
        fingerprint: outcome.fingerprint,
        verdict: outcome.verdict,
    })?;
    if transition == Transition::DiscardedStale {
        tracing::info!("dropping classification result for a replaced image");
    }
    Ok(StatusOutput::from_state(&session))
}

pub async fn status(app: &App) -> StatusOutput {
    StatusOutput::from_state(&*app.session.lock().await)
}
