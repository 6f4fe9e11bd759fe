use log::{error, warn};
use rocket::http::{Status, StatusClass};
use rocket::response::Responder;
use thiserror::Error;

use crate::store::StoreError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Db(#[from] mongodb::error::Error),
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Not eligible: {0}")]
    NotEligible(String),
}

impl Error {
    pub fn bad_request(msg: impl std::fmt::Display) -> Self {
        Self::BadRequest(msg.to_string())
    }
}

impl From<StoreError> for Error {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateEmail(email) => {
                Self::Conflict(format!("email already registered: {email}"))
            }
            StoreError::NotRegistered(email) => {
                Self::NotEligible(format!("email not registered: {email}"))
            }
            StoreError::AlreadyVoted(email) => {
                Self::NotEligible(format!("already voted: {email}"))
            }
            StoreError::Db(err) => Self::Db(err),
        }
    }
}

impl<'r, 'o: 'r> Responder<'r, 'o> for Error {
    fn respond_to(self, _: &'r rocket::Request<'_>) -> rocket::response::Result<'o> {
        let status = match &self {
            Self::Db(_) => Status::InternalServerError,
            Self::BadRequest(_) => Status::BadRequest,
            Self::Conflict(_) => Status::Conflict,
            Self::NotEligible(_) => Status::Forbidden,
        };
        if status.class() == StatusClass::ServerError {
            error!("{self}");
        } else {
            warn!("{self}");
        }
        Err(status)
    }
}
