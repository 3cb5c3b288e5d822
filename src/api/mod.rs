use rocket::Route;

pub mod auth;
mod ballot;
mod ledger;

pub fn routes() -> Vec<Route> {
    let mut routes = Vec::new();
    routes.extend(auth::routes());
    routes.extend(ballot::routes());
    routes.extend(ledger::routes());
    routes
}
