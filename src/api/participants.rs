use rocket::{serde::json::Json, Route, State};
use serde::Deserialize;

use crate::{
    error::{Error, Result},
    mail::Mailer,
    model::participant::{Eligibility, Email, Participant},
    store::Store,
};

pub fn routes() -> Vec<Route> {
    routes![
        list_participants,
        register_participant,
        remove_participant,
        check_eligibility,
    ]
}

#[get("/participants")]
async fn list_participants(store: &State<Box<dyn Store>>) -> Result<Json<Vec<Participant>>> {
    Ok(Json(store.participants().await?))
}

/// A registration request. Everything but the email is optional free text.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegisterRequest {
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    first_name: Option<String>,
    #[serde(default)]
    last_name: Option<String>,
    #[serde(default)]
    field1: Option<String>,
    #[serde(default)]
    field2: Option<String>,
    #[serde(default)]
    field3: Option<String>,
}

#[post("/participants", data = "<request>", format = "json")]
async fn register_participant(
    request: Json<RegisterRequest>,
    store: &State<Box<dyn Store>>,
    mailer: &State<Mailer>,
) -> Result<Json<Participant>> {
    let request = request.into_inner();
    let email: Email = request
        .email
        .as_deref()
        .ok_or_else(|| Error::BadRequest("email required".to_string()))?
        .parse()
        .map_err(Error::bad_request)?;

    let participant = Participant {
        email: email.clone(),
        first_name: request.first_name.unwrap_or_default(),
        last_name: request.last_name.unwrap_or_default(),
        field1: request.field1.unwrap_or_default(),
        field2: request.field2.unwrap_or_default(),
        field3: request.field3.unwrap_or_default(),
        has_voted: false,
    };
    store.insert_participant(&participant).await?;

    // Best effort: delivery failures must not fail registration.
    mailer.send_invitation(&email);

    Ok(Json(participant))
}

#[delete("/participants/<email>")]
async fn remove_participant(email: &str, store: &State<Box<dyn Store>>) -> Result<()> {
    let email: Email = email.parse().map_err(Error::bad_request)?;
    store.remove_participant(&email).await?;
    Ok(())
}

#[get("/participants/<email>/eligibility")]
async fn check_eligibility(
    email: &str,
    store: &State<Box<dyn Store>>,
) -> Result<Json<Eligibility>> {
    let email: Email = email.parse().map_err(Error::bad_request)?;
    let eligibility = match store.participant(&email).await? {
        None => Eligibility::ineligible("not registered"),
        Some(participant) if participant.has_voted => Eligibility::ineligible("already voted"),
        Some(_) => Eligibility::eligible(),
    };
    Ok(Json(eligibility))
}
