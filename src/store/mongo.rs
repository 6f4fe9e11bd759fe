use std::time::Duration;

use log::debug;
use mongodb::{
    bson::doc,
    error::{Error as DbError, ErrorKind, WriteFailure},
    options::{ClientOptions, IndexOptions},
    Client, Collection, Database, IndexModel,
};
use rocket::futures::TryStreamExt;

use crate::model::{
    candidate::Candidate,
    participant::{Email, Participant},
    position::Position,
    vote::Vote,
};

use super::{Result, Store, StoreError};

/// Name of the database holding the four collections.
const DATABASE: &str = "survey";

/// A type that can be directly inserted/read to/from the database.
trait MongoCollection {
    /// The name of the collection.
    const NAME: &'static str;
}

impl MongoCollection for Participant {
    const NAME: &'static str = "participants";
}
impl MongoCollection for Position {
    const NAME: &'static str = "positions";
}
impl MongoCollection for Candidate {
    const NAME: &'static str = "candidates";
}
impl MongoCollection for Vote {
    const NAME: &'static str = "votes";
}

/// The persistent backend.
///
/// Multi-document operations (cascade delete, vote casting) run in session
/// transactions, which requires the deployment to be a replica set.
pub struct MongoStore {
    client: Client,
    db: Database,
}

impl MongoStore {
    /// Connect and run the startup checks. Fails if the database cannot be
    /// reached within `timeout`.
    pub async fn connect(uri: &str, timeout: Duration) -> std::result::Result<Self, DbError> {
        let mut options = ClientOptions::parse(uri).await?;
        options.connect_timeout = Some(timeout);
        options.server_selection_timeout = Some(timeout);
        let client = Client::with_options(options)?;
        let db = client.database(DATABASE);
        ensure_indexes_exist(&db).await?;
        Ok(Self { client, db })
    }

    /// Get a handle on the collection belonging to `T`.
    fn coll<T: MongoCollection>(&self) -> Collection<T> {
        self.db.collection(T::NAME)
    }
}

/// Ensure that all the required indexes exist on the given database.
///
/// This operation is idempotent, and doubles as the startup reachability
/// check.
async fn ensure_indexes_exist(db: &Database) -> std::result::Result<(), DbError> {
    debug!("Ensuring collection indexes exist");

    let unique = IndexOptions::builder().unique(true).build();

    // Email uniqueness is enforced here rather than by a pre-insert scan.
    let email_index = IndexModel::builder()
        .keys(doc! {"email": 1})
        .options(unique.clone())
        .build();
    db.collection::<Participant>(Participant::NAME)
        .create_index(email_index, None)
        .await?;

    let position_index = IndexModel::builder()
        .keys(doc! {"id": 1})
        .options(unique.clone())
        .build();
    db.collection::<Position>(Position::NAME)
        .create_index(position_index, None)
        .await?;

    let candidate_index = IndexModel::builder()
        .keys(doc! {"id": 1})
        .options(unique)
        .build();
    db.collection::<Candidate>(Candidate::NAME)
        .create_index(candidate_index, None)
        .await?;

    // Cascade deletes filter candidates by position.
    let by_position = IndexModel::builder().keys(doc! {"positionId": 1}).build();
    db.collection::<Candidate>(Candidate::NAME)
        .create_index(by_position, None)
        .await?;

    Ok(())
}

/// True iff the error is a unique-index violation.
fn is_duplicate_key(err: &DbError) -> bool {
    matches!(&*err.kind, ErrorKind::Write(WriteFailure::WriteError(e)) if e.code == 11000)
}

#[rocket::async_trait]
impl Store for MongoStore {
    async fn participants(&self) -> Result<Vec<Participant>> {
        let participants = self
            .coll::<Participant>()
            .find(None, None)
            .await?
            .try_collect()
            .await?;
        Ok(participants)
    }

    async fn participant(&self, email: &Email) -> Result<Option<Participant>> {
        let participant = self
            .coll::<Participant>()
            .find_one(doc! {"email": email.as_str()}, None)
            .await?;
        Ok(participant)
    }

    async fn insert_participant(&self, participant: &Participant) -> Result<()> {
        match self.coll::<Participant>().insert_one(participant, None).await {
            Ok(_) => Ok(()),
            Err(err) if is_duplicate_key(&err) => {
                Err(StoreError::DuplicateEmail(participant.email.clone()))
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn remove_participant(&self, email: &Email) -> Result<()> {
        self.coll::<Participant>()
            .delete_many(doc! {"email": email.as_str()}, None)
            .await?;
        Ok(())
    }

    async fn positions(&self) -> Result<Vec<Position>> {
        let positions = self
            .coll::<Position>()
            .find(None, None)
            .await?
            .try_collect()
            .await?;
        Ok(positions)
    }

    async fn insert_position(&self, position: &Position) -> Result<()> {
        self.coll::<Position>().insert_one(position, None).await?;
        Ok(())
    }

    async fn remove_position(&self, id: &str) -> Result<()> {
        // Delete the position and its candidates in one transaction so a
        // partial failure cannot leave orphans behind.
        let mut session = self.client.start_session(None).await?;
        session.start_transaction(None).await?;
        self.coll::<Position>()
            .delete_many_with_session(doc! {"id": id}, None, &mut session)
            .await?;
        self.coll::<Candidate>()
            .delete_many_with_session(doc! {"positionId": id}, None, &mut session)
            .await?;
        session.commit_transaction().await?;
        Ok(())
    }

    async fn candidates(&self) -> Result<Vec<Candidate>> {
        let candidates = self
            .coll::<Candidate>()
            .find(None, None)
            .await?
            .try_collect()
            .await?;
        Ok(candidates)
    }

    async fn insert_candidate(&self, candidate: &Candidate) -> Result<()> {
        self.coll::<Candidate>().insert_one(candidate, None).await?;
        Ok(())
    }

    async fn remove_candidate(&self, id: &str) -> Result<()> {
        self.coll::<Candidate>()
            .delete_many(doc! {"id": id}, None)
            .await?;
        Ok(())
    }

    async fn votes(&self) -> Result<Vec<Vote>> {
        let votes = self
            .coll::<Vote>()
            .find(None, None)
            .await?
            .try_collect()
            .await?;
        Ok(votes)
    }

    async fn cast_vote(&self, vote: &Vote) -> Result<()> {
        let mut session = self.client.start_session(None).await?;
        session.start_transaction(None).await?;

        // Claim the participant's single permitted vote: the conditional
        // update succeeds for exactly one caster, no matter how many race.
        let claimed = self
            .coll::<Participant>()
            .find_one_and_update_with_session(
                doc! {"email": vote.email.as_str(), "hasVoted": false},
                doc! {"$set": {"hasVoted": true}},
                None,
                &mut session,
            )
            .await?;

        if claimed.is_none() {
            session.abort_transaction().await?;
            return Err(match self.participant(&vote.email).await? {
                Some(_) => StoreError::AlreadyVoted(vote.email.clone()),
                None => StoreError::NotRegistered(vote.email.clone()),
            });
        }

        self.coll::<Vote>()
            .insert_one_with_session(vote, None, &mut session)
            .await?;
        session.commit_transaction().await?;
        Ok(())
    }
}
