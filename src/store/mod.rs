//! The storage seam: one trait, two backends.
//!
//! The backend is selected once at launch (see [`crate::config`]) and used
//! unchanged for the lifetime of the process.

mod memory;
mod mongo;

pub use memory::MemoryStore;
pub use mongo::MongoStore;

use thiserror::Error;

use crate::model::{
    candidate::Candidate,
    participant::{Email, Participant},
    position::Position,
    vote::Vote,
};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("email already registered: {0}")]
    DuplicateEmail(Email),
    #[error("email not registered: {0}")]
    NotRegistered(Email),
    #[error("already voted: {0}")]
    AlreadyVoted(Email),
    #[error(transparent)]
    Db(#[from] mongodb::error::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Persistence operations over the four entity collections.
#[rocket::async_trait]
pub trait Store: Send + Sync {
    async fn participants(&self) -> Result<Vec<Participant>>;
    async fn participant(&self, email: &Email) -> Result<Option<Participant>>;
    /// Insert a new participant. Fails with [`StoreError::DuplicateEmail`]
    /// if the email is already registered.
    async fn insert_participant(&self, participant: &Participant) -> Result<()>;
    /// Remove a participant. Idempotent.
    async fn remove_participant(&self, email: &Email) -> Result<()>;

    async fn positions(&self) -> Result<Vec<Position>>;
    async fn insert_position(&self, position: &Position) -> Result<()>;
    /// Remove a position and every candidate referencing it. Idempotent.
    async fn remove_position(&self, id: &str) -> Result<()>;

    async fn candidates(&self) -> Result<Vec<Candidate>>;
    async fn insert_candidate(&self, candidate: &Candidate) -> Result<()>;
    async fn remove_candidate(&self, id: &str) -> Result<()>;

    async fn votes(&self) -> Result<Vec<Vote>>;
    /// Atomically flip the participant's `hasVoted` flag and append the
    /// vote. Of any number of concurrent casts for the same participant,
    /// exactly one succeeds; the rest fail with
    /// [`StoreError::AlreadyVoted`] (or [`StoreError::NotRegistered`] if
    /// the email is unknown), leaving no vote behind.
    async fn cast_vote(&self, vote: &Vote) -> Result<()>;
}
