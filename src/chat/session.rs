use super::{Sender, Transcript};
use crate::config::ChatConfig;
use crate::dialogue::{default_rules, DialogueEngine, Reply};
use crate::speech::{
    ListenControl, Locale, Narrator, Notice, SpeechCapabilities, SpeechError, SpeechRecognizer,
};
use tracing::{debug, warn};

/// Chat panel: dialogue engine, transcript, voice input and narration.
pub struct ChatSession {
    engine: DialogueEngine,
    transcript: Transcript,
    recognizer: Option<Box<dyn SpeechRecognizer>>,
    narrator: Narrator,
    selected: Locale,
}

impl ChatSession {
    pub fn new(config: &ChatConfig, capabilities: SpeechCapabilities) -> Self {
        let SpeechCapabilities {
            recognizer,
            synthesizer,
        } = capabilities;
        Self {
            engine: DialogueEngine::new(default_rules(), config.max_input_chars),
            transcript: Transcript::new(),
            recognizer,
            narrator: Narrator::new(synthesizer, config.narration_locale.clone()),
            selected: config.recognition_locale.clone(),
        }
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Locale picked in the language selector
    pub fn selected_locale(&self) -> &Locale {
        &self.selected
    }

    pub fn select_locale(&mut self, locale: Locale) {
        debug!(locale = %locale, "Chat locale selected");
        self.selected = locale;
    }

    pub fn listen_control(&self) -> ListenControl {
        ListenControl::for_recognizer(self.recognizer.is_some())
    }

    /// Typed input. Blank input is ignored and returns `None`.
    pub fn send_text(&mut self, input: &str) -> Option<Reply> {
        let text = input.trim();
        if text.is_empty() {
            return None;
        }
        self.transcript.append(Sender::You, text);
        Some(self.reply_to(text))
    }

    /// Start one recognition in the selected locale.
    pub fn start_listening(&mut self) -> Result<(), Notice> {
        let Some(recognizer) = self.recognizer.as_mut() else {
            return Err(Notice::new(crate::speech::RECOGNITION_UNSUPPORTED));
        };
        recognizer.start(&self.selected).map_err(|e| {
            warn!(error = %e, "Could not start speech recognition");
            Notice::from(e)
        })
    }

    /// Recognized utterance from the host.
    pub fn on_recognized(&mut self, utterance: &str) -> Reply {
        self.transcript.append(Sender::YouVoice, utterance);
        self.reply_to(utterance)
    }

    /// Recognition failure reported by the host.
    pub fn on_recognition_error(&self, reason: &str) -> Notice {
        warn!(reason, "Speech recognition failed");
        Notice::from(SpeechError::Recognition(reason.to_string()))
    }

    fn reply_to(&mut self, text: &str) -> Reply {
        let reply = self.engine.respond(text);
        self.transcript.append(Sender::Bot, reply.text);
        let spoken = self.narrator.narrate(&self.selected, reply.text);
        debug!(rule = reply.rule.unwrap_or("fallback"), spoken, "Bot replied");
        reply
    }
}
