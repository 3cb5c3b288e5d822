use chrono::Duration;
use log::{error, info};
use rocket::{
    fairing::{Fairing, Info, Kind},
    Build, Rocket,
};
use serde::Deserialize;

use crate::model::{address::Address, chain::Chain};

/// Application configuration, derived from `Rocket.toml` and `ROCKET_*`
/// environment variables. This struct becomes managed state and can be
/// inspected by any endpoint.
#[derive(Deserialize)]
pub struct Config {
    // non-secrets
    candidates: Vec<String>,
    auth_ttl: u32,
    event_capacity: usize,
    // secrets
    pub(crate) jwt_secret: String,
    chairperson_secret: String,
}

impl Config {
    /// Names of the candidates the ballot is deployed with, in ballot order.
    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    /// Valid lifetime of auth token cookies in seconds.
    pub fn auth_ttl(&self) -> Duration {
        Duration::seconds(self.auth_ttl.into())
    }

    /// How many vote notifications a slow subscriber may lag behind by.
    pub fn event_capacity(&self) -> usize {
        self.event_capacity
    }

    /// Secret key used to encrypt JWTs.
    pub fn jwt_secret(&self) -> &[u8] {
        self.jwt_secret.as_bytes()
    }

    /// Address of the chairperson, derived from their secret.
    pub fn chairperson(&self) -> Address {
        Address::from_secret(&self.chairperson_secret)
    }
}

/// A fairing that loads the application config and puts it in managed state.
pub struct ConfigFairing;

#[rocket::async_trait]
impl Fairing for ConfigFairing {
    fn info(&self) -> Info {
        Info {
            name: "Config",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, mut rocket: Rocket<Build>) -> rocket::fairing::Result {
        // Load the config.
        let config = match rocket.figment().extract::<Config>() {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load application config");
                rocket::config::pretty_print_error(e);
                return Err(rocket);
            }
        };

        // Manage the state.
        rocket = rocket.manage(config);
        Ok(rocket)
    }
}

/// A fairing that deploys the ballot described by the config and places the
/// resulting [`Chain`] into managed state. Must be attached after
/// [`ConfigFairing`].
pub struct ChainFairing;

#[rocket::async_trait]
impl Fairing for ChainFairing {
    fn info(&self) -> Info {
        Info {
            name: "Ballot chain",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, mut rocket: Rocket<Build>) -> rocket::fairing::Result {
        let Some(config) = rocket.state::<Config>() else {
            error!("Cannot deploy the ballot without a config");
            return Err(rocket);
        };

        let chairperson = config.chairperson();
        let chain = match Chain::deploy(
            chairperson,
            config.candidates().to_vec(),
            config.event_capacity(),
        ) {
            Ok(chain) => chain,
            Err(e) => {
                error!("Failed to deploy the ballot: {e}");
                return Err(rocket);
            }
        };
        info!(
            "Deployed ballot with {} candidates, chairperson {chairperson}",
            config.candidates().len()
        );

        // Manage the state.
        rocket = rocket.manage(chain);
        Ok(rocket)
    }
}
