//! Voice capture bridge.
//!
//! # Responsibility
//! - Define the start/stop speech-to-text engine contract.
//! - Track whether dictation is active for the creation sheet.
//!
//! # Invariants
//! - A failed start or stop always leaves the session inactive.
//! - Transcripts are returned verbatim; merging is the caller's concern.

use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::{Arc, Mutex};

/// Speech capture failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DictationError {
    AlreadyActive,
    NotActive,
    Engine(String),
}

impl Display for DictationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AlreadyActive => write!(f, "dictation already active"),
            Self::NotActive => write!(f, "dictation is not active"),
            Self::Engine(message) => write!(f, "speech engine failed: {message}"),
        }
    }
}

impl Error for DictationError {}

/// Platform speech-to-text engine.
pub trait DictationEngine: Send {
    fn start(&mut self, locale: &str) -> Result<(), DictationError>;
    /// Stops capture and returns the final transcript, if any was recognized.
    fn stop(&mut self) -> Result<Option<String>, DictationError>;
}

/// One dictation lifecycle at a time over an engine.
pub struct DictationSession {
    engine: Box<dyn DictationEngine>,
    locale: String,
    active: bool,
}

impl DictationSession {
    pub fn new(engine: Box<dyn DictationEngine>, locale: impl Into<String>) -> Self {
        Self {
            engine,
            locale: locale.into(),
            active: false,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub fn begin(&mut self) -> Result<(), DictationError> {
        if self.active {
            return Err(DictationError::AlreadyActive);
        }
        match self.engine.start(&self.locale) {
            Ok(()) => {
                self.active = true;
                info!(
                    "event=dictation_begin module=dictation status=ok locale={}",
                    self.locale
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=dictation_begin module=dictation status=error error={}",
                    err
                );
                Err(err)
            }
        }
    }

    pub fn end(&mut self) -> Result<Option<String>, DictationError> {
        if !self.active {
            return Err(DictationError::NotActive);
        }
        self.active = false;
        match self.engine.stop() {
            Ok(transcript) => {
                info!(
                    "event=dictation_end module=dictation status=ok transcript_len={}",
                    transcript.as_ref().map_or(0, |text| text.chars().count())
                );
                Ok(transcript)
            }
            Err(err) => {
                error!("event=dictation_end module=dictation status=error error={}", err);
                Err(err)
            }
        }
    }
}

#[derive(Debug, Default)]
struct HostTranscriptState {
    capturing: bool,
    locale: Option<String>,
    result: Option<Result<Option<String>, DictationError>>,
}

/// Engine whose recognition runs in the host shell.
///
/// The host publishes the transcript (or a failure) before core stops the
/// session; clones share state.
#[derive(Debug, Clone, Default)]
pub struct HostTranscriptEngine {
    state: Arc<Mutex<HostTranscriptState>>,
}

impl HostTranscriptEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish_transcript(&self, transcript: Option<String>) {
        if let Ok(mut state) = self.state.lock() {
            state.result = Some(Ok(transcript));
        }
    }

    pub fn publish_failure(&self, message: impl Into<String>) {
        if let Ok(mut state) = self.state.lock() {
            state.result = Some(Err(DictationError::Engine(message.into())));
        }
    }

    pub fn is_capturing(&self) -> bool {
        self.state.lock().map(|state| state.capturing).unwrap_or(false)
    }

    /// Locale of the capture currently requested from the host.
    pub fn requested_locale(&self) -> Option<String> {
        self.state.lock().ok().and_then(|state| state.locale.clone())
    }
}

impl DictationEngine for HostTranscriptEngine {
    fn start(&mut self, locale: &str) -> Result<(), DictationError> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| DictationError::Engine("host engine state poisoned".to_string()))?;
        state.capturing = true;
        state.locale = Some(locale.to_string());
        state.result = None;
        Ok(())
    }

    fn stop(&mut self) -> Result<Option<String>, DictationError> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| DictationError::Engine("host engine state poisoned".to_string()))?;
        state.capturing = false;
        state.result.take().unwrap_or(Ok(None))
    }
}

#[cfg(test)]
mod tests {
    use super::{DictationError, DictationSession, HostTranscriptEngine};

    #[test]
    fn host_transcript_flows_through_session() {
        let host = HostTranscriptEngine::new();
        let mut session = DictationSession::new(Box::new(host.clone()), "en-US");

        session.begin().expect("begin");
        assert!(host.is_capturing());
        assert_eq!(host.requested_locale().as_deref(), Some("en-US"));

        host.publish_transcript(Some("pick up keys".to_string()));
        assert_eq!(session.end().expect("end").as_deref(), Some("pick up keys"));
        assert!(!session.is_active());
        assert!(!host.is_capturing());
    }

    #[test]
    fn engine_failure_exits_dictation() {
        let host = HostTranscriptEngine::new();
        let mut session = DictationSession::new(Box::new(host.clone()), "en-US");
        session.begin().expect("begin");

        host.publish_failure("microphone busy");
        let err = session.end().expect_err("failure must surface");
        assert!(matches!(err, DictationError::Engine(_)));
        assert!(!session.is_active());
    }

    #[test]
    fn double_begin_is_rejected() {
        let mut session = DictationSession::new(Box::new(HostTranscriptEngine::new()), "en-US");
        session.begin().expect("begin");
        assert_eq!(session.begin(), Err(DictationError::AlreadyActive));
        assert_eq!(session.end(), Ok(None));
        assert_eq!(session.end(), Err(DictationError::NotActive));
    }
}
