// Rule-based dialogue engine
//
// Stateless: every call normalizes the input, walks the ordered rule list
// and returns the first match, or the fallback. No scoring, no memory of
// earlier turns.

mod rules;

pub use rules::{default_rules, FALLBACK_RESPONSE};

use regex::Regex;
use std::sync::LazyLock;

/// Default cap on the characters considered per input
pub const DEFAULT_MAX_INPUT_CHARS: usize = 4096;

/// Language domain of a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    English,
    Kannada,
}

/// Rule predicate over normalized text.
#[derive(Debug, Clone)]
pub enum Pattern {
    /// Any of the substrings occurs
    Contains(&'static [&'static str]),
    /// Regex search (linear time)
    Regex(Regex),
}

impl Pattern {
    pub fn matches(&self, text: &str) -> bool {
        match self {
            Pattern::Contains(needles) => needles.iter().any(|n| text.contains(n)),
            Pattern::Regex(re) => re.is_match(text),
        }
    }
}

/// One (predicate, response) pair.
#[derive(Debug, Clone)]
pub struct Rule {
    pub name: &'static str,
    pub language: Language,
    pub pattern: Pattern,
    pub response: &'static str,
}

impl Rule {
    pub fn contains(
        name: &'static str,
        language: Language,
        needles: &'static [&'static str],
        response: &'static str,
    ) -> Self {
        Self {
            name,
            language,
            pattern: Pattern::Contains(needles),
            response,
        }
    }
}

/// Engine output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reply {
    pub text: &'static str,
    /// Name of the matching rule; `None` for the fallback
    pub rule: Option<&'static str>,
    pub language: Language,
}

/// Ordered rule interpreter.
#[derive(Debug, Clone)]
pub struct DialogueEngine {
    rules: Vec<Rule>,
    max_input_chars: usize,
}

impl DialogueEngine {
    pub fn new(rules: Vec<Rule>, max_input_chars: usize) -> Self {
        Self {
            rules,
            max_input_chars,
        }
    }

    /// Built-in mall rules with the default input cap.
    pub fn with_default_rules() -> Self {
        Self::new(default_rules(), DEFAULT_MAX_INPUT_CHARS)
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Classify `input`. Total: always returns a non-empty reply.
    pub fn respond(&self, input: &str) -> Reply {
        let text = normalize(input, self.max_input_chars);
        self.rules
            .iter()
            .find(|rule| rule.pattern.matches(&text))
            .map(|rule| Reply {
                text: rule.response,
                rule: Some(rule.name),
                language: rule.language,
            })
            .unwrap_or(Reply {
                text: FALLBACK_RESPONSE,
                rule: None,
                language: Language::English,
            })
    }
}

impl Default for DialogueEngine {
    fn default() -> Self {
        Self::with_default_rules()
    }
}

/// Lowercase and trim, keeping at most `max_chars` characters after any
/// leading whitespace.
pub fn normalize(input: &str, max_chars: usize) -> String {
    let input = input.trim_start();
    let bounded = match input.char_indices().nth(max_chars) {
        Some((idx, _)) => &input[..idx],
        None => input,
    };
    bounded.to_lowercase().trim().to_string()
}

static DEFAULT_ENGINE: LazyLock<DialogueEngine> = LazyLock::new(DialogueEngine::with_default_rules);

/// Reply text for `input` using the built-in rules.
pub fn chatbot_response(input: &str) -> String {
    DEFAULT_ENGINE.respond(input).text.to_string()
}
