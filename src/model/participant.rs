use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A participant's email address, normalised to lower case.
///
/// Parsing is deliberately light: the address is trimmed, lower-cased and
/// checked for a `local@domain` shape. Deliverability is the mail
/// provider's problem, not ours.
#[derive(Debug, Clone, Hash, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Error)]
pub enum AddressError {
    #[error("email required")]
    Missing,
    #[error("invalid email address: {0:?}")]
    Invalid(String),
}

impl FromStr for Email {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalised = s.trim().to_lowercase();
        if normalised.is_empty() {
            return Err(AddressError::Missing);
        }
        match normalised.split_once('@') {
            Some((local, domain)) if !local.is_empty() && !domain.is_empty() => {
                Ok(Email(normalised))
            }
            _ => Err(AddressError::Invalid(normalised)),
        }
    }
}

impl TryFrom<String> for Email {
    type Error = AddressError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Email> for String {
    fn from(email: Email) -> Self {
        email.0
    }
}

/// A registered survey participant, keyed by email.
///
/// `has_voted` is monotonic: it starts false and is flipped to true exactly
/// once, by the cast-vote operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub email: Email,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub field1: String,
    #[serde(default)]
    pub field2: String,
    #[serde(default)]
    pub field3: String,
    pub has_voted: bool,
}

/// Whether a participant may currently cast a vote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Eligibility {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Eligibility {
    pub fn eligible() -> Self {
        Self {
            ok: true,
            message: None,
        }
    }

    pub fn ineligible(reason: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: Some(reason.into()),
        }
    }
}
