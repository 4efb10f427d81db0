//! Input validation run before any network call.
//!
//! Each check is a pure function over raw user input. Forms run all of their
//! checks through [`FormErrors`] so every offending field is reported at
//! once instead of stopping at the first failure.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::constants::{
    BIO_MAX_LEN, CHAT_NAME_MAX_LEN, CODE_LEN, CODE_MAX, CODE_MIN, NAME_MAX_LEN,
    PASSWORD_MAX_LEN, PASSWORD_MIN_LEN, USERNAME_MAX_LEN, USERNAME_MIN_LEN,
};
use crate::models::ChatKind;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9\-]+(\.[A-Za-z0-9\-]+)*\.[A-Za-z]{2,}$")
        .expect("static email pattern")
});

static USERNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_.]+$").expect("static username pattern"));

/// What is wrong with a single field.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldError {
    #[error("field is empty")]
    Empty,

    #[error("must be at least {min} characters")]
    TooShort { min: usize },

    #[error("must be at most {max} characters")]
    TooLong { max: usize },

    #[error("has an invalid format")]
    Malformed,

    #[error("does not match")]
    Mismatch,

    #[error("is out of range")]
    OutOfRange,
}

/// Input fields a form can report errors against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    Email,
    Password,
    ConfirmPassword,
    Code,
    Name,
    Username,
    Bio,
    ChatName,
    MessageText,
}

pub type FieldResult = Result<(), FieldError>;

fn char_len(s: &str) -> usize {
    s.chars().count()
}

pub fn validate_email(email: &str) -> FieldResult {
    let email = email.trim();
    if email.is_empty() {
        return Err(FieldError::Empty);
    }
    if !EMAIL_RE.is_match(email) {
        return Err(FieldError::Malformed);
    }
    Ok(())
}

pub fn validate_password(password: &str) -> FieldResult {
    if password.is_empty() {
        return Err(FieldError::Empty);
    }
    let len = char_len(password);
    if len < PASSWORD_MIN_LEN {
        return Err(FieldError::TooShort {
            min: PASSWORD_MIN_LEN,
        });
    }
    if len > PASSWORD_MAX_LEN {
        return Err(FieldError::TooLong {
            max: PASSWORD_MAX_LEN,
        });
    }
    Ok(())
}

/// Confirmation must be non-empty and identical to the password.
pub fn validate_password_confirmation(password: &str, confirmation: &str) -> FieldResult {
    if confirmation.is_empty() {
        return Err(FieldError::Empty);
    }
    if password != confirmation {
        return Err(FieldError::Mismatch);
    }
    Ok(())
}

/// Verification and reset codes: six decimal digits.
pub fn validate_code(code: &str) -> FieldResult {
    let code = code.trim();
    if code.is_empty() {
        return Err(FieldError::Empty);
    }
    if !code.chars().all(|c| c.is_ascii_digit()) {
        return Err(FieldError::Malformed);
    }
    if code.len() != CODE_LEN {
        return Err(FieldError::OutOfRange);
    }
    match code.parse::<u32>() {
        Ok(n) if (CODE_MIN..=CODE_MAX).contains(&n) => Ok(()),
        _ => Err(FieldError::OutOfRange),
    }
}

pub fn validate_name(name: &str) -> FieldResult {
    let name = name.trim();
    if name.is_empty() {
        return Err(FieldError::Empty);
    }
    if char_len(name) > NAME_MAX_LEN {
        return Err(FieldError::TooLong { max: NAME_MAX_LEN });
    }
    Ok(())
}

pub fn validate_username(username: &str) -> FieldResult {
    let username = username.trim();
    if username.is_empty() {
        return Err(FieldError::Empty);
    }
    let len = char_len(username);
    if len < USERNAME_MIN_LEN {
        return Err(FieldError::TooShort {
            min: USERNAME_MIN_LEN,
        });
    }
    if len > USERNAME_MAX_LEN {
        return Err(FieldError::TooLong {
            max: USERNAME_MAX_LEN,
        });
    }
    if !USERNAME_RE.is_match(username) {
        return Err(FieldError::Malformed);
    }
    Ok(())
}

/// Bio is optional; only its length is bounded.
pub fn validate_bio(bio: &str) -> FieldResult {
    if char_len(bio.trim()) > BIO_MAX_LEN {
        return Err(FieldError::TooLong { max: BIO_MAX_LEN });
    }
    Ok(())
}

/// Group chats need a name; direct chats derive theirs from participants.
pub fn validate_chat_name(name: Option<&str>, kind: ChatKind) -> FieldResult {
    let name = name.map(str::trim).unwrap_or("");
    if name.is_empty() {
        return match kind {
            ChatKind::Group => Err(FieldError::Empty),
            ChatKind::Direct => Ok(()),
        };
    }
    if char_len(name) > CHAT_NAME_MAX_LEN {
        return Err(FieldError::TooLong {
            max: CHAT_NAME_MAX_LEN,
        });
    }
    Ok(())
}

/// A user message carries either non-blank text or pictures, not both.
pub fn validate_message_content(text: Option<&str>, picture_count: usize) -> FieldResult {
    let has_text = text.is_some_and(|t| !t.trim().is_empty());
    match (has_text, picture_count > 0) {
        (false, false) => Err(FieldError::Empty),
        (true, true) => Err(FieldError::Malformed),
        _ => Ok(()),
    }
}

/// Field errors collected from one form submission.
#[derive(Error, Debug, Clone, Default, PartialEq, Eq)]
#[error("{} invalid field(s)", .errors.len())]
pub struct FormErrors {
    errors: Vec<(Field, FieldError)>,
}

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome of one check. Never short-circuits.
    pub fn check(mut self, field: Field, result: FieldResult) -> Self {
        if let Err(e) = result {
            self.errors.push((field, e));
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn get(&self, field: Field) -> Option<FieldError> {
        self.errors
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, e)| *e)
    }

    pub fn fields(&self) -> impl Iterator<Item = &(Field, FieldError)> {
        self.errors.iter()
    }

    pub fn into_result(self) -> Result<(), FormErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}
