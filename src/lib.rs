#[macro_use]
extern crate rocket;

#[cfg(test)]
#[macro_use]
extern crate backend_test;

use rocket::{figment::Figment, Build, Rocket};

use crate::config::{ChainFairing, ConfigFairing};
use crate::logging::LoggerFairing;

pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;

/// Build the server from the default configuration sources.
pub fn build() -> Rocket<Build> {
    rocket_for_figment(rocket::Config::figment())
}

/// Build the server from the given configuration.
pub fn rocket_for_figment(figment: Figment) -> Rocket<Build> {
    rocket::custom(figment)
        .attach(ConfigFairing)
        .attach(ChainFairing)
        .attach(LoggerFairing)
        .mount("/", api::routes())
}

/// Secret of the chairperson account in tests.
#[cfg(test)]
pub(crate) const TEST_CHAIRPERSON_SECRET: &str = "example chairperson secret";

/// Candidates the test ballot is deployed with.
#[cfg(test)]
pub(crate) const TEST_CANDIDATES: &[&str] = &["Alice", "Bob", "Carol"];

/// Configuration for tests, independent of `Rocket.toml` and the environment.
#[cfg(test)]
pub(crate) fn test_figment() -> Figment {
    Figment::from(rocket::Config::debug_default())
        .merge(("candidates", TEST_CANDIDATES))
        .merge(("auth_ttl", 3600))
        .merge(("event_capacity", 16))
        .merge(("jwt_secret", "test jwt secret"))
        .merge(("chairperson_secret", TEST_CHAIRPERSON_SECRET))
}
