//! Waitlist form and the record sent to the backend

use serde::{Deserialize, Serialize};

use crate::{SubmitError, SubmitResult};

/// Fields behind the "more info" toggle
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionalFields {
    pub year: String,
    pub reason: String,
    pub phone: String,
    pub source: String,
    pub role: String,
}

/// What the visitor typed into the waitlist form
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitlistForm {
    pub name: String,
    pub email: String,
    pub university: String,
    pub optional: OptionalFields,
}

impl WaitlistForm {
    /// Form with the three required fields filled in
    pub fn new(name: impl Into<String>, email: impl Into<String>, university: impl Into<String>) -> Self {
        WaitlistForm {
            name: name.into(),
            email: email.into(),
            university: university.into(),
            optional: OptionalFields::default(),
        }
    }

    pub fn with_optional(mut self, optional: OptionalFields) -> Self {
        self.optional = optional;
        self
    }

    /// Validate and build the outgoing record. Blank checks ignore
    /// surrounding whitespace, but values are sent exactly as typed.
    /// Optional fields are only captured when the "more info" panel is
    /// expanded; otherwise they are sent as `null`.
    pub fn to_record(&self, include_optional: bool) -> SubmitResult<WaitlistRecord> {
        let name = required("name", &self.name)?;
        let email = required("email", &self.email)?;
        let university = required("university", &self.university)?;
        if !looks_like_email(email.trim()) {
            return Err(SubmitError::InvalidEmail);
        }

        let pick = |value: &String| include_optional.then(|| value.clone());
        Ok(WaitlistRecord {
            name,
            email,
            university,
            year: pick(&self.optional.year),
            reason: pick(&self.optional.reason),
            phone: pick(&self.optional.phone),
            source: pick(&self.optional.source),
            role: pick(&self.optional.role),
        })
    }
}

/// The fixed-shape record posted to the waitlist endpoint
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitlistRecord {
    pub name: String,
    pub email: String,
    pub university: String,
    pub year: Option<String>,
    pub reason: Option<String>,
    pub phone: Option<String>,
    pub source: Option<String>,
    pub role: Option<String>,
}

fn required(field: &'static str, value: &str) -> SubmitResult<String> {
    if value.trim().is_empty() {
        Err(SubmitError::MissingField(field))
    } else {
        Ok(value.to_string())
    }
}

/// The shape check an `<input type="email">` applies: one `@`, something on
/// both sides, no whitespace
fn looks_like_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    }
}
