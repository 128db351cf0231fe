// Browser speech capabilities
//
// Synthesis goes through web_sys' SpeechSynthesis. Recognition is not in
// web_sys' stable API, so the (webkit)SpeechRecognition object is driven
// through js_sys::Reflect. Results land in an inbox the draw loop drains.

use std::{cell::RefCell, collections::VecDeque, rc::Rc};

use js_sys::{Array, Function, Reflect};
use smartmall::speech::{
    Locale, SpeechCapabilities, SpeechError, SpeechRecognizer, SpeechSynthesizer, Utterance,
    Voice,
};
use wasm_bindgen::prelude::*;
use web_sys::{SpeechSynthesis, SpeechSynthesisUtterance};

/// Recognition outcome delivered by the browser.
#[derive(Debug, Clone)]
pub enum SpeechEvent {
    Recognized(String),
    Failed(String),
}

pub type SpeechInbox = Rc<RefCell<VecDeque<SpeechEvent>>>;

/// Detect what this browser offers.
pub fn detect(inbox: SpeechInbox) -> SpeechCapabilities {
    let recognizer = WebRecognizer::new(inbox)
        .map(|r| Box::new(r) as Box<dyn SpeechRecognizer>);
    let synthesizer = WebSynthesizer::new().map(|s| Box::new(s) as Box<dyn SpeechSynthesizer>);
    SpeechCapabilities {
        recognizer,
        synthesizer,
    }
}

// ─── Synthesis ──────────────────────────────────────────────────────────────

pub struct WebSynthesizer {
    synth: SpeechSynthesis,
}

impl WebSynthesizer {
    fn new() -> Option<Self> {
        let synth = web_sys::window()?.speech_synthesis().ok()?;
        Some(Self { synth })
    }
}

impl SpeechSynthesizer for WebSynthesizer {
    fn voices(&self) -> Vec<Voice> {
        self.synth
            .get_voices()
            .iter()
            .filter_map(|v| v.dyn_into::<web_sys::SpeechSynthesisVoice>().ok())
            .map(|v| Voice {
                name: v.name(),
                lang: v.lang(),
            })
            .collect()
    }

    fn cancel(&mut self) {
        self.synth.cancel();
    }

    fn speak(&mut self, utterance: Utterance) {
        let Ok(utter) = SpeechSynthesisUtterance::new_with_text(&utterance.text) else {
            web_sys::console::log_1(&"Failed to create utterance".into());
            return;
        };
        utter.set_lang(utterance.lang.as_str());
        utter.set_rate(utterance.rate);
        utter.set_pitch(utterance.pitch);
        if let Some(wanted) = utterance.voice {
            let voice = self
                .synth
                .get_voices()
                .iter()
                .filter_map(|v| v.dyn_into::<web_sys::SpeechSynthesisVoice>().ok())
                .find(|v| v.name() == wanted.name && v.lang() == wanted.lang);
            utter.set_voice(voice.as_ref());
        }
        self.synth.speak(&utter);
    }
}

// ─── Recognition ────────────────────────────────────────────────────────────

pub struct WebRecognizer {
    recognition: JsValue,
    // Keep the handlers alive as long as the recognizer
    _onresult: Closure<dyn FnMut(JsValue)>,
    _onerror: Closure<dyn FnMut(JsValue)>,
}

impl WebRecognizer {
    fn new(inbox: SpeechInbox) -> Option<Self> {
        let window: JsValue = web_sys::window()?.into();
        let ctor = ["SpeechRecognition", "webkitSpeechRecognition"]
            .iter()
            .filter_map(|name| Reflect::get(&window, &JsValue::from_str(name)).ok())
            .find_map(|v| v.dyn_into::<Function>().ok())?;
        let recognition = Reflect::construct(&ctor, &Array::new()).ok()?;

        Reflect::set(&recognition, &"continuous".into(), &JsValue::FALSE).ok()?;
        Reflect::set(&recognition, &"interimResults".into(), &JsValue::FALSE).ok()?;

        let results_inbox = inbox.clone();
        let onresult = Closure::wrap(Box::new(move |event: JsValue| {
            // event.results[0][0].transcript
            let transcript = Reflect::get(&event, &"results".into())
                .and_then(|r| Reflect::get_u32(&r, 0))
                .and_then(|r| Reflect::get_u32(&r, 0))
                .and_then(|alt| Reflect::get(&alt, &"transcript".into()))
                .ok()
                .and_then(|t| t.as_string());
            if let Some(text) = transcript {
                results_inbox
                    .borrow_mut()
                    .push_back(SpeechEvent::Recognized(text));
            }
        }) as Box<dyn FnMut(JsValue)>);

        let onerror = Closure::wrap(Box::new(move |event: JsValue| {
            let reason = Reflect::get(&event, &"error".into())
                .ok()
                .and_then(|e| e.as_string())
                .unwrap_or_else(|| "unknown".to_string());
            inbox.borrow_mut().push_back(SpeechEvent::Failed(reason));
        }) as Box<dyn FnMut(JsValue)>);

        Reflect::set(&recognition, &"onresult".into(), onresult.as_ref()).ok()?;
        Reflect::set(&recognition, &"onerror".into(), onerror.as_ref()).ok()?;

        Some(Self {
            recognition,
            _onresult: onresult,
            _onerror: onerror,
        })
    }
}

impl SpeechRecognizer for WebRecognizer {
    fn start(&mut self, locale: &Locale) -> Result<(), SpeechError> {
        Reflect::set(
            &self.recognition,
            &"lang".into(),
            &JsValue::from_str(locale.as_str()),
        )
        .map_err(|e| SpeechError::Recognition(format!("{:?}", e)))?;

        let start = Reflect::get(&self.recognition, &"start".into())
            .ok()
            .and_then(|f| f.dyn_into::<Function>().ok())
            .ok_or_else(|| SpeechError::Recognition("start unavailable".to_string()))?;

        // start() throws InvalidStateError while a session is running
        start
            .call0(&self.recognition)
            .map(|_| ())
            .map_err(|_| SpeechError::MicBusy)
    }
}
