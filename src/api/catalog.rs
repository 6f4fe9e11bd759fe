use log::warn;
use rocket::{serde::json::Json, Route, State};
use serde::Deserialize;

use crate::{
    error::{Error, Result},
    model::{candidate::Candidate, position::Position},
    store::Store,
};

pub fn routes() -> Vec<Route> {
    routes![
        list_positions,
        create_position,
        delete_position,
        list_candidates,
        create_candidate,
        delete_candidate,
    ]
}

#[get("/positions")]
async fn list_positions(store: &State<Box<dyn Store>>) -> Result<Json<Vec<Position>>> {
    Ok(Json(store.positions().await?))
}

#[derive(Debug, Deserialize)]
struct PositionRequest {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

#[post("/positions", data = "<request>", format = "json")]
async fn create_position(
    request: Json<PositionRequest>,
    store: &State<Box<dyn Store>>,
) -> Result<Json<Position>> {
    let request = request.into_inner();
    let name = request
        .name
        .filter(|name| !name.trim().is_empty())
        .ok_or_else(|| Error::BadRequest("name required".to_string()))?;

    let position = Position::new(name, request.description.unwrap_or_default());
    store.insert_position(&position).await?;
    Ok(Json(position))
}

#[delete("/positions/<id>")]
async fn delete_position(id: &str, store: &State<Box<dyn Store>>) -> Result<()> {
    store.remove_position(id).await?;
    Ok(())
}

#[get("/candidates")]
async fn list_candidates(store: &State<Box<dyn Store>>) -> Result<Json<Vec<Candidate>>> {
    Ok(Json(store.candidates().await?))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CandidateRequest {
    #[serde(default)]
    position_id: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

#[post("/candidates", data = "<request>", format = "json")]
async fn create_candidate(
    request: Json<CandidateRequest>,
    store: &State<Box<dyn Store>>,
) -> Result<Json<Candidate>> {
    let request = request.into_inner();
    let position_id = request
        .position_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| Error::BadRequest("positionId required".to_string()))?;
    let name = request
        .name
        .filter(|name| !name.trim().is_empty())
        .ok_or_else(|| Error::BadRequest("name required".to_string()))?;

    // Candidates referencing an unknown position are tolerated, but worth
    // flagging for the operator.
    if !store.positions().await?.iter().any(|p| p.id == position_id) {
        warn!("Creating candidate for unknown position '{position_id}'");
    }

    let candidate = Candidate::new(position_id, name);
    store.insert_candidate(&candidate).await?;
    Ok(Json(candidate))
}

#[delete("/candidates/<id>")]
async fn delete_candidate(id: &str, store: &State<Box<dyn Store>>) -> Result<()> {
    store.remove_candidate(id).await?;
    Ok(())
}
