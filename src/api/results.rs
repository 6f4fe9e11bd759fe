use rocket::{serde::json::Json, Route, State};

use crate::{
    error::Result,
    model::results::{self, PositionTally, Snapshot},
    store::Store,
};

pub fn routes() -> Vec<Route> {
    routes![get_results, get_tally]
}

/// The raw aggregate snapshot of all four collections.
#[get("/results")]
async fn get_results(store: &State<Box<dyn Store>>) -> Result<Json<Snapshot>> {
    Ok(Json(Snapshot {
        participants: store.participants().await?,
        positions: store.positions().await?,
        candidates: store.candidates().await?,
        votes: store.votes().await?,
    }))
}

/// Per-position tallies derived from the snapshot.
#[get("/results/tally")]
async fn get_tally(store: &State<Box<dyn Store>>) -> Result<Json<Vec<PositionTally>>> {
    let positions = store.positions().await?;
    let candidates = store.candidates().await?;
    let votes = store.votes().await?;
    Ok(Json(results::tally(&positions, &candidates, &votes)))
}
