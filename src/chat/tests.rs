use super::*;
use crate::config::ChatConfig;
use crate::speech::{
    ListenControl, Locale, SpeechCapabilities, SpeechError, SpeechRecognizer, SpeechSynthesizer,
    Utterance, Voice,
};
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Default)]
struct Spoken {
    utterances: Vec<String>,
    cancels: usize,
}

struct FakeSynth(Rc<RefCell<Spoken>>);

impl SpeechSynthesizer for FakeSynth {
    fn voices(&self) -> Vec<Voice> {
        vec![Voice {
            name: "Heera".to_string(),
            lang: "en-IN".to_string(),
        }]
    }

    fn cancel(&mut self) {
        self.0.borrow_mut().cancels += 1;
    }

    fn speak(&mut self, utterance: Utterance) {
        self.0.borrow_mut().utterances.push(utterance.text);
    }
}

struct FakeRecognizer {
    started: Rc<RefCell<Vec<Locale>>>,
    busy: bool,
}

impl SpeechRecognizer for FakeRecognizer {
    fn start(&mut self, locale: &Locale) -> Result<(), SpeechError> {
        if self.busy {
            return Err(SpeechError::MicBusy);
        }
        self.started.borrow_mut().push(locale.clone());
        self.busy = true;
        Ok(())
    }
}

struct Harness {
    session: ChatSession,
    spoken: Rc<RefCell<Spoken>>,
    started: Rc<RefCell<Vec<Locale>>>,
}

fn harness(config: ChatConfig) -> Harness {
    let spoken = Rc::new(RefCell::new(Spoken::default()));
    let started = Rc::new(RefCell::new(Vec::new()));
    let capabilities = SpeechCapabilities {
        recognizer: Some(Box::new(FakeRecognizer {
            started: started.clone(),
            busy: false,
        })),
        synthesizer: Some(Box::new(FakeSynth(spoken.clone()))),
    };
    Harness {
        session: ChatSession::new(&config, capabilities),
        spoken,
        started,
    }
}

#[test]
fn test_send_text_appends_and_narrates() {
    let mut h = harness(ChatConfig::default());

    let reply = h.session.send_text("  where is parking  ").unwrap();

    let messages = h.session.transcript().messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].sender, Sender::You);
    assert_eq!(messages[0].text, "where is parking");
    assert_eq!(messages[1].sender, Sender::Bot);
    assert_eq!(messages[1].text, reply.text);
    assert_eq!(h.spoken.borrow().utterances, vec![reply.text.to_string()]);
    assert_eq!(h.spoken.borrow().cancels, 1);
}

#[test]
fn test_blank_text_is_ignored() {
    let mut h = harness(ChatConfig::default());
    assert!(h.session.send_text("   ").is_none());
    assert!(h.session.transcript().is_empty());
    assert!(h.spoken.borrow().utterances.is_empty());
}

#[test]
fn test_kannada_selection_is_not_narrated() {
    let mut h = harness(ChatConfig::default());
    h.session.select_locale(Locale::from("kn-IN"));

    h.session.on_recognized("ನಮಸ್ಕಾರ");

    let transcript = h.session.transcript();
    assert_eq!(transcript.len(), 2);
    assert_eq!(transcript.messages()[0].sender, Sender::YouVoice);
    assert!(transcript.messages()[1].text.starts_with("🙏"));
    assert!(h.spoken.borrow().utterances.is_empty());
}

#[test]
fn test_english_selection_is_narrated() {
    let mut h = harness(ChatConfig::default());
    h.session.select_locale(Locale::from("en-IN"));

    let reply = h.session.on_recognized("hello");

    assert_eq!(h.spoken.borrow().utterances, vec![reply.text.to_string()]);
}

#[test]
fn test_configured_narration_locale() {
    let config = ChatConfig {
        narration_locale: Locale::from("kn-IN"),
        ..ChatConfig::default()
    };
    let mut h = harness(config);

    // Selected stays en-IN, which is no longer the narration locale
    h.session.send_text("hello");
    assert!(h.spoken.borrow().utterances.is_empty());

    h.session.select_locale(Locale::from("kn-IN"));
    h.session.send_text("ಧನ್ಯವಾದ");
    assert_eq!(h.spoken.borrow().utterances.len(), 1);
}

#[test]
fn test_start_listening_uses_selected_locale_and_reports_busy_mic() {
    let mut h = harness(ChatConfig::default());
    h.session.select_locale(Locale::from("kn-IN"));

    assert!(h.session.start_listening().is_ok());
    assert_eq!(h.started.borrow().as_slice(), &[Locale::from("kn-IN")]);

    let notice = h.session.start_listening().unwrap_err();
    assert_eq!(notice.message, "🎤 Mic already in use. Please wait.");
}

#[test]
fn test_recognition_error_notice() {
    let h = harness(ChatConfig::default());
    assert_eq!(
        h.session.on_recognition_error("not-allowed").message,
        "🎤 Voice error: not-allowed"
    );
}

#[test]
fn test_text_only_host() {
    let mut session = ChatSession::new(&ChatConfig::default(), SpeechCapabilities::none());

    assert!(matches!(
        session.listen_control(),
        ListenControl::Disabled { .. }
    ));
    assert!(session.start_listening().is_err());

    session.send_text("thanks");
    assert_eq!(session.transcript().len(), 2);
    assert_eq!(
        session.transcript().last().map(|m| m.text.as_str()),
        Some("😊 You’re welcome! Enjoy your visit.")
    );
}

#[test]
fn test_transcript_is_append_only_in_order() {
    let mut h = harness(ChatConfig::default());
    h.session.send_text("hi");
    h.session.on_recognized("parking");
    h.session.send_text("zzz");

    let senders: Vec<Sender> = h
        .session
        .transcript()
        .messages()
        .iter()
        .map(|m| m.sender)
        .collect();
    assert_eq!(
        senders,
        vec![
            Sender::You,
            Sender::Bot,
            Sender::YouVoice,
            Sender::Bot,
            Sender::You,
            Sender::Bot
        ]
    );
    assert_eq!(Sender::YouVoice.to_string(), "You (voice)");
}
