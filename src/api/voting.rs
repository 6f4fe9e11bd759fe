use rocket::{serde::json::Json, Route, State};
use serde::Deserialize;

use crate::{
    error::{Error, Result},
    model::{
        participant::Email,
        vote::{validate_selections, Selection, Vote},
    },
    store::Store,
};

pub fn routes() -> Vec<Route> {
    routes![cast_vote]
}

/// A cast-vote request: one selection per configured position.
#[derive(Debug, Deserialize)]
struct VoteRequest {
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    selections: Vec<Selection>,
}

#[post("/vote", data = "<request>", format = "json")]
async fn cast_vote(request: Json<VoteRequest>, store: &State<Box<dyn Store>>) -> Result<()> {
    let request = request.into_inner();
    let email: Email = request
        .email
        .as_deref()
        .ok_or_else(|| Error::BadRequest("email required".to_string()))?
        .parse()
        .map_err(Error::bad_request)?;

    // Validate before any state changes.
    let positions = store.positions().await?;
    let candidates = store.candidates().await?;
    validate_selections(&request.selections, &positions, &candidates)
        .map_err(Error::bad_request)?;

    // The store flips `hasVoted` and appends the vote atomically.
    let vote = Vote::new(email, request.selections);
    store.cast_vote(&vote).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use rocket::http::{ContentType, Status};
    use rocket::local::asynchronous::Client;
    use rocket::serde::json::{json, Value};

    use crate::test_client;

    /// Register `a@x.com` and set up "Favorite color" with Red and Blue.
    /// Returns (positionId, redId, blueId).
    async fn set_up_ballot(client: &Client) -> (Value, Value, Value) {
        client
            .post("/api/participants")
            .header(ContentType::JSON)
            .body(json!({"email": "a@x.com"}).to_string())
            .dispatch()
            .await;
        let position = client
            .post("/api/positions")
            .header(ContentType::JSON)
            .body(json!({"name": "Favorite color"}).to_string())
            .dispatch()
            .await
            .into_json::<Value>()
            .await
            .unwrap();
        let mut ids = Vec::new();
        for name in ["Red", "Blue"] {
            let candidate = client
                .post("/api/candidates")
                .header(ContentType::JSON)
                .body(json!({"positionId": position["id"], "name": name}).to_string())
                .dispatch()
                .await
                .into_json::<Value>()
                .await
                .unwrap();
            ids.push(candidate["id"].clone());
        }
        (position["id"].clone(), ids.remove(0), ids.remove(0))
    }

    #[rocket::async_test]
    async fn first_cast_succeeds_second_is_forbidden() {
        let client = test_client().await;
        let (position_id, red_id, _) = set_up_ballot(&client).await;
        let body = json!({
            "email": "a@x.com",
            "selections": [{"positionId": position_id, "candidateId": red_id}],
        })
        .to_string();

        let response = client
            .post("/api/vote")
            .header(ContentType::JSON)
            .body(&body)
            .dispatch()
            .await;
        assert_eq!(Status::Ok, response.status());

        let response = client
            .post("/api/vote")
            .header(ContentType::JSON)
            .body(&body)
            .dispatch()
            .await;
        assert_eq!(Status::Forbidden, response.status());

        // Exactly one vote recorded, and the tally reflects it.
        let results = client
            .get("/api/results")
            .dispatch()
            .await
            .into_json::<Value>()
            .await
            .unwrap();
        assert_eq!(1, results["votes"].as_array().unwrap().len());
        assert_eq!(true, results["participants"][0]["hasVoted"]);

        let tally = client
            .get("/api/results/tally")
            .dispatch()
            .await
            .into_json::<Vec<Value>>()
            .await
            .unwrap();
        assert_eq!(1, tally[0]["total"]);
        assert_eq!(red_id, tally[0]["candidates"][0]["candidateId"]);
        assert_eq!(1, tally[0]["candidates"][0]["count"]);
        assert_eq!(100.0, tally[0]["candidates"][0]["percent"]);
        assert_eq!(0, tally[0]["candidates"][1]["count"]);
        assert_eq!(0.0, tally[0]["candidates"][1]["percent"]);
    }

    #[rocket::async_test]
    async fn unregistered_email_is_forbidden_and_stores_nothing() {
        let client = test_client().await;
        let (position_id, red_id, _) = set_up_ballot(&client).await;

        let response = client
            .post("/api/vote")
            .header(ContentType::JSON)
            .body(
                json!({
                    "email": "ghost@x.com",
                    "selections": [{"positionId": position_id, "candidateId": red_id}],
                })
                .to_string(),
            )
            .dispatch()
            .await;
        assert_eq!(Status::Forbidden, response.status());

        let results = client
            .get("/api/results")
            .dispatch()
            .await
            .into_json::<Value>()
            .await
            .unwrap();
        assert!(results["votes"].as_array().unwrap().is_empty());
    }

    #[rocket::async_test]
    async fn incomplete_selections_are_a_bad_request() {
        let client = test_client().await;
        set_up_ballot(&client).await;

        let response = client
            .post("/api/vote")
            .header(ContentType::JSON)
            .body(json!({"email": "a@x.com", "selections": []}).to_string())
            .dispatch()
            .await;
        assert_eq!(Status::BadRequest, response.status());

        // Nothing was claimed: the participant can still vote.
        let eligibility = client
            .get("/api/participants/a@x.com/eligibility")
            .dispatch()
            .await
            .into_json::<Value>()
            .await
            .unwrap();
        assert_eq!(true, eligibility["ok"]);
    }

    #[rocket::async_test]
    async fn fabricated_candidate_is_a_bad_request() {
        let client = test_client().await;
        let (position_id, _, _) = set_up_ballot(&client).await;

        let response = client
            .post("/api/vote")
            .header(ContentType::JSON)
            .body(
                json!({
                    "email": "a@x.com",
                    "selections": [{"positionId": position_id, "candidateId": "cand-forged"}],
                })
                .to_string(),
            )
            .dispatch()
            .await;
        assert_eq!(Status::BadRequest, response.status());
    }

    #[rocket::async_test]
    async fn synthetic_abstain_option_is_accepted() {
        let client = test_client().await;
        let (position_id, _, _) = set_up_ballot(&client).await;
        let abstain = format!("none-{}", position_id.as_str().unwrap());

        let response = client
            .post("/api/vote")
            .header(ContentType::JSON)
            .body(
                json!({
                    "email": "a@x.com",
                    "selections": [{"positionId": position_id, "candidateId": abstain}],
                })
                .to_string(),
            )
            .dispatch()
            .await;
        assert_eq!(Status::Ok, response.status());
    }
}
