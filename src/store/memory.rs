use std::sync::{Mutex, MutexGuard};

use crate::model::{
    candidate::Candidate,
    participant::{Email, Participant},
    position::Position,
    vote::Vote,
};

use super::{Result, Store, StoreError};

/// The transient backend: all four collections live in process memory and
/// are lost on restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Collections>,
}

#[derive(Debug, Default)]
struct Collections {
    participants: Vec<Participant>,
    positions: Vec<Position>,
    candidates: Vec<Candidate>,
    votes: Vec<Vote>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Panics only if another thread panicked while holding the lock.
    fn lock(&self) -> MutexGuard<'_, Collections> {
        self.inner.lock().unwrap()
    }
}

#[rocket::async_trait]
impl Store for MemoryStore {
    async fn participants(&self) -> Result<Vec<Participant>> {
        Ok(self.lock().participants.clone())
    }

    async fn participant(&self, email: &Email) -> Result<Option<Participant>> {
        Ok(self
            .lock()
            .participants
            .iter()
            .find(|p| &p.email == email)
            .cloned())
    }

    async fn insert_participant(&self, participant: &Participant) -> Result<()> {
        let mut inner = self.lock();
        if inner
            .participants
            .iter()
            .any(|p| p.email == participant.email)
        {
            return Err(StoreError::DuplicateEmail(participant.email.clone()));
        }
        inner.participants.push(participant.clone());
        Ok(())
    }

    async fn remove_participant(&self, email: &Email) -> Result<()> {
        self.lock().participants.retain(|p| &p.email != email);
        Ok(())
    }

    async fn positions(&self) -> Result<Vec<Position>> {
        Ok(self.lock().positions.clone())
    }

    async fn insert_position(&self, position: &Position) -> Result<()> {
        self.lock().positions.push(position.clone());
        Ok(())
    }

    async fn remove_position(&self, id: &str) -> Result<()> {
        let mut inner = self.lock();
        inner.positions.retain(|p| p.id != id);
        inner.candidates.retain(|c| c.position_id != id);
        Ok(())
    }

    async fn candidates(&self) -> Result<Vec<Candidate>> {
        Ok(self.lock().candidates.clone())
    }

    async fn insert_candidate(&self, candidate: &Candidate) -> Result<()> {
        self.lock().candidates.push(candidate.clone());
        Ok(())
    }

    async fn remove_candidate(&self, id: &str) -> Result<()> {
        self.lock().candidates.retain(|c| c.id != id);
        Ok(())
    }

    async fn votes(&self) -> Result<Vec<Vote>> {
        Ok(self.lock().votes.clone())
    }

    async fn cast_vote(&self, vote: &Vote) -> Result<()> {
        // One critical section covers the flag flip and the append, so two
        // concurrent casts cannot both pass the `has_voted` check.
        let mut inner = self.lock();
        let participant = inner
            .participants
            .iter_mut()
            .find(|p| p.email == vote.email)
            .ok_or_else(|| StoreError::NotRegistered(vote.email.clone()))?;
        if participant.has_voted {
            return Err(StoreError::AlreadyVoted(vote.email.clone()));
        }
        participant.has_voted = true;
        inner.votes.push(vote.clone());
        Ok(())
    }
}
