use super::{Locale, SpeechSynthesizer, Utterance};
use tracing::debug;

/// Speaks bot replies in the one supported narration locale.
pub struct Narrator {
    synthesizer: Option<Box<dyn SpeechSynthesizer>>,
    locale: Locale,
}

impl Narrator {
    pub fn new(synthesizer: Option<Box<dyn SpeechSynthesizer>>, locale: Locale) -> Self {
        Self {
            synthesizer,
            locale,
        }
    }

    pub fn can_speak(&self) -> bool {
        self.synthesizer.is_some()
    }

    /// Speak `text` if `selected` is the narration locale. Any utterance in
    /// progress is cancelled first. Returns whether speech was requested.
    pub fn narrate(&mut self, selected: &Locale, text: &str) -> bool {
        if text.is_empty() || *selected != self.locale {
            debug!(selected = %selected, narration = %self.locale, "Reply not narrated");
            return false;
        }
        let Some(synth) = self.synthesizer.as_mut() else {
            return false;
        };

        let voice = synth
            .voices()
            .into_iter()
            .find(|v| v.lang == self.locale.as_str());

        synth.cancel();
        synth.speak(Utterance {
            text: text.to_string(),
            lang: self.locale.clone(),
            voice,
            rate: 1.0,
            pitch: 1.0,
        });
        true
    }
}
