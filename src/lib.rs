#[macro_use]
extern crate rocket;

use rocket::{Build, Rocket};

pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod mail;
pub mod model;
pub mod store;

/// Assemble the server: request logging, storage backend, invitation
/// mailer, and the API routes under `/api`.
pub fn build() -> Rocket<Build> {
    rocket::build()
        .attach(logging::LoggerFairing)
        .attach(config::StorageFairing)
        .attach(config::MailerFairing)
        .mount("/api", api::routes())
}

/// A local client backed by the transient in-memory store, with the mailer
/// disabled. Every test gets a fresh, isolated store.
#[cfg(test)]
pub(crate) async fn test_client() -> rocket::local::asynchronous::Client {
    let figment = rocket::Config::figment()
        .merge(("storage", "memory"))
        .merge(("public_url", "http://localhost:8000"));
    let rocket = rocket::custom(figment)
        .attach(config::StorageFairing)
        .attach(config::MailerFairing)
        .mount("/api", api::routes());
    rocket::local::asynchronous::Client::tracked(rocket)
        .await
        .expect("valid rocket instance")
}
