//! Bilingual, one-question-at-a-time contact flow.
//!
//! The page renders the current [`Question`]; answers are validated here and
//! collected into a [`ContactSubmission`]. Sending it anywhere is up to the
//! page.

use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

use crate::error::FxError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Language {
    #[default]
    En,
    He,
}

impl Language {
    pub fn is_rtl(self) -> bool {
        matches!(self, Language::He)
    }

    /// Value for the HTML `dir` attribute.
    pub fn dir(self) -> &'static str {
        if self.is_rtl() {
            "rtl"
        } else {
            "ltr"
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::He => "he",
        }
    }
}

impl FromStr for Language {
    type Err = FxError;

    /// Accepts bare tags and regional variants (`he-IL`, `en_US`).
    fn from_str(s: &str) -> Result<Self, FxError> {
        let primary = s.split(['-', '_']).next().unwrap_or_default().to_ascii_lowercase();
        match primary.as_str() {
            "en" => Ok(Language::En),
            "he" | "iw" => Ok(Language::He),
            _ => Err(FxError::config(format!("unsupported language: {s}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Email,
    Message,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Email,
    TextArea,
}

impl Field {
    pub fn key(self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Email => "email",
            Field::Message => "message",
        }
    }
}

impl FieldKind {
    /// The `type` of the `<input>`, or `textarea` for the long answer.
    pub fn input_type(self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Email => "email",
            FieldKind::TextArea => "textarea",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Question {
    pub field: Field,
    pub kind: FieldKind,
    pub title: &'static str,
    pub placeholder: &'static str,
}

const EN: [Question; 3] = [
    Question {
        field: Field::Name,
        kind: FieldKind::Text,
        title: "Let's start with introductions",
        placeholder: "What's your name?",
    },
    Question {
        field: Field::Email,
        kind: FieldKind::Email,
        title: "How can I reach you?",
        placeholder: "What's your email?",
    },
    Question {
        field: Field::Message,
        kind: FieldKind::TextArea,
        title: "I'd love to hear more",
        placeholder: "What would you like to share?",
    },
];

const HE: [Question; 3] = [
    Question {
        field: Field::Name,
        kind: FieldKind::Text,
        title: "בוא נתחיל עם היכרות",
        placeholder: "איך קוראים לך?",
    },
    Question {
        field: Field::Email,
        kind: FieldKind::Email,
        title: "איך אוכל להשיג אותך?",
        placeholder: "מה האימייל שלך?",
    },
    Question {
        field: Field::Message,
        kind: FieldKind::TextArea,
        title: "אשמח לשמוע עוד",
        placeholder: "מה תרצה לשתף?",
    },
];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnswerError {
    #[error("answer is empty")]
    Empty,
    #[error("not an email address")]
    InvalidEmail,
    #[error("every question is already answered")]
    Finished,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ContactSubmission {
    pub name: String,
    pub email: String,
    pub message: String,
}

/// Loose shape check: one `@`, something before it, a dotted domain after.
pub fn looks_like_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !value.chars().any(char::is_whitespace)
        && domain.split('.').count() >= 2
        && domain.split('.').all(|part| !part.is_empty())
}

#[derive(Debug, Clone)]
pub struct ConversationFlow {
    language: Language,
    step: usize,
    answers: ContactSubmission,
}

impl ConversationFlow {
    pub fn new(language: Language) -> Self {
        Self { language, step: 0, answers: ContactSubmission::default() }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// Switching language keeps answers and position.
    pub fn set_language(&mut self, language: Language) {
        self.language = language;
    }

    pub fn questions(&self) -> &'static [Question] {
        match self.language {
            Language::En => &EN,
            Language::He => &HE,
        }
    }

    pub fn step(&self) -> usize {
        self.step
    }

    pub fn current(&self) -> Option<&'static Question> {
        self.questions().get(self.step)
    }

    pub fn is_complete(&self) -> bool {
        self.step >= self.questions().len()
    }

    pub fn answer(&mut self, value: &str) -> Result<(), AnswerError> {
        let question = self.current().ok_or(AnswerError::Finished)?;
        let value = value.trim();
        if value.is_empty() {
            return Err(AnswerError::Empty);
        }
        if question.kind == FieldKind::Email && !looks_like_email(value) {
            return Err(AnswerError::InvalidEmail);
        }
        let slot = match question.field {
            Field::Name => &mut self.answers.name,
            Field::Email => &mut self.answers.email,
            Field::Message => &mut self.answers.message,
        };
        *slot = value.to_owned();
        self.step += 1;
        Ok(())
    }

    pub fn back(&mut self) -> bool {
        if self.step == 0 {
            return false;
        }
        self.step -= 1;
        true
    }

    /// Answers once every question is done.
    pub fn submission(&self) -> Option<&ContactSubmission> {
        self.is_complete().then_some(&self.answers)
    }

    /// Start over, e.g. after the page sent the submission.
    pub fn reset(&mut self) {
        self.step = 0;
        self.answers = ContactSubmission::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hebrew_is_rtl() {
        assert!(Language::He.is_rtl());
        assert_eq!(Language::He.dir(), "rtl");
        assert_eq!(Language::En.dir(), "ltr");
        assert_eq!("he-IL".parse::<Language>().unwrap(), Language::He);
        assert_eq!("EN_us".parse::<Language>().unwrap(), Language::En);
        assert!("fr".parse::<Language>().is_err());
    }

    #[test]
    fn full_conversation() {
        let mut flow = ConversationFlow::new(Language::En);
        assert_eq!(flow.current().unwrap().field, Field::Name);
        assert_eq!(flow.answer("   "), Err(AnswerError::Empty));
        flow.answer(" Dana ").unwrap();
        assert_eq!(flow.answer("dana@"), Err(AnswerError::InvalidEmail));
        flow.answer("dana@example.com").unwrap();
        assert!(flow.submission().is_none());
        flow.answer("Hello there").unwrap();

        assert!(flow.is_complete());
        assert_eq!(flow.answer("more"), Err(AnswerError::Finished));
        let sent = flow.submission().unwrap();
        assert_eq!(sent.name, "Dana");
        assert_eq!(sent.email, "dana@example.com");
        assert_eq!(sent.message, "Hello there");
    }

    #[test]
    fn back_stays_in_range() {
        let mut flow = ConversationFlow::new(Language::He);
        assert!(!flow.back());
        flow.answer("דנה").unwrap();
        assert!(flow.back());
        assert_eq!(flow.step(), 0);
        assert_eq!(flow.current().unwrap().placeholder, "איך קוראים לך?");
    }

    #[test]
    fn email_shapes() {
        assert!(looks_like_email("a@b.co"));
        assert!(!looks_like_email("a@b"));
        assert!(!looks_like_email("@b.co"));
        assert!(!looks_like_email("a b@c.co"));
        assert!(!looks_like_email("a@@b.co"));
        assert!(!looks_like_email("a@b..co"));
    }
}
