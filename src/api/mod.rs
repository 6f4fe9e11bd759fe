use rocket::Route;

mod catalog;
mod participants;
mod results;
mod voting;

pub fn routes() -> Vec<Route> {
    let mut routes = Vec::new();
    routes.extend(participants::routes());
    routes.extend(catalog::routes());
    routes.extend(voting::routes());
    routes.extend(results::routes());
    routes
}
