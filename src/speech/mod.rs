// Speech bridge
//
// Recognition and synthesis are host capabilities. Hosts that have them
// hand boxed implementations to `SpeechCapabilities`; hosts that don't
// leave the slots empty and the chat falls back to text only.

mod narrator;

pub use narrator::Narrator;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Locale narration defaults to
pub const DEFAULT_LOCALE: &str = "en-IN";

/// Reason shown on the disabled listen control
pub const RECOGNITION_UNSUPPORTED: &str = "Speech recognition not supported";

/// BCP 47 language tag, e.g. `en-IN`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Locale(String);

impl Locale {
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Locale {
    fn default() -> Self {
        Self::new(DEFAULT_LOCALE)
    }
}

impl From<&str> for Locale {
    fn from(tag: &str) -> Self {
        Self::new(tag)
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Synthesis voice offered by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Voice {
    pub name: String,
    pub lang: String,
}

/// One request to speak.
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub text: String,
    pub lang: Locale,
    /// `None` lets the host pick its default voice
    pub voice: Option<Voice>,
    pub rate: f32,
    pub pitch: f32,
}

/// Speech recognition errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeechError {
    /// A recognition session is already running
    MicBusy,
    /// The engine reported a failure (e.g. `no-speech`, `not-allowed`)
    Recognition(String),
}

impl fmt::Display for SpeechError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpeechError::MicBusy => write!(f, "Mic already in use. Please wait."),
            SpeechError::Recognition(reason) => write!(f, "{}", reason),
        }
    }
}

impl std::error::Error for SpeechError {}

/// Speech-to-text, one utterance per activation.
///
/// The recognized text arrives later through the host's event loop and is
/// fed to `ChatSession::on_recognized`.
pub trait SpeechRecognizer {
    fn start(&mut self, locale: &Locale) -> Result<(), SpeechError>;
}

/// Text-to-speech.
pub trait SpeechSynthesizer {
    /// Voices currently known to the host; may be empty until loaded
    fn voices(&self) -> Vec<Voice>;

    /// Stop whatever is being spoken
    fn cancel(&mut self);

    fn speak(&mut self, utterance: Utterance);
}

/// What the host can do. Absence is a normal state.
#[derive(Default)]
pub struct SpeechCapabilities {
    pub recognizer: Option<Box<dyn SpeechRecognizer>>,
    pub synthesizer: Option<Box<dyn SpeechSynthesizer>>,
}

impl SpeechCapabilities {
    /// Text-only host
    pub fn none() -> Self {
        Self::default()
    }

    pub fn listen_control(&self) -> ListenControl {
        ListenControl::for_recognizer(self.recognizer.is_some())
    }
}

/// State of the "start listening" control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListenControl {
    Enabled,
    /// Shown but inert
    Disabled { reason: &'static str },
}

impl ListenControl {
    pub fn for_recognizer(available: bool) -> Self {
        if available {
            ListenControl::Enabled
        } else {
            ListenControl::Disabled {
                reason: RECOGNITION_UNSUPPORTED,
            }
        }
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self, ListenControl::Enabled)
    }
}

/// Blocking message the user must acknowledge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
}

impl Notice {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<SpeechError> for Notice {
    fn from(error: SpeechError) -> Self {
        match error {
            SpeechError::MicBusy => Notice::new(format!("🎤 {}", error)),
            SpeechError::Recognition(reason) => Notice::new(format!("🎤 Voice error: {}", reason)),
        }
    }
}
