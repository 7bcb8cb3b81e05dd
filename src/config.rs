use mongodb::Client as MongoClient;
use rocket::{
    fairing::{Fairing, Info, Kind},
    Build, Rocket,
};
use serde::Deserialize;

use crate::engine::cutoff::EndorsementCutoff;
use crate::model::mongodb::ensure_indexes_exist;

/// Application configuration, derived from `Rocket.toml` and `ROCKET_*`
/// environment variables. This struct becomes managed state and can be
/// inspected by any endpoint.
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Feed page size when the request doesn't say.
    #[serde(default = "default_feed_limit")]
    feed_default_limit: u32,
    /// Upper bound on requested feed page sizes.
    #[serde(default = "default_feed_max_limit")]
    feed_max_limit: u32,
    /// Rolling window for the trending recompute, in days.
    #[serde(default = "default_trending_window_days")]
    trending_window_days: u32,
    /// Hour of day (UTC) the daily trending recompute fires.
    #[serde(default = "default_trending_hour_utc")]
    trending_hour_utc: u32,
    /// Per-stage elimination thresholds; stage 1 first.
    #[serde(default)]
    endorsement_cutoffs: Vec<EndorsementCutoff>,
}

fn default_feed_limit() -> u32 {
    20
}

fn default_feed_max_limit() -> u32 {
    100
}

fn default_trending_window_days() -> u32 {
    7
}

fn default_trending_hour_utc() -> u32 {
    4
}

impl Config {
    pub fn feed_default_limit(&self) -> u32 {
        self.feed_default_limit
    }

    pub fn feed_max_limit(&self) -> u32 {
        self.feed_max_limit
    }

    pub fn trending_window_days(&self) -> u32 {
        self.trending_window_days
    }

    pub fn trending_hour_utc(&self) -> u32 {
        self.trending_hour_utc
    }

    pub fn endorsement_cutoffs(&self) -> &[EndorsementCutoff] {
        &self.endorsement_cutoffs
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
        let config = match rocket.figment().extract::<Config>() {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load application config");
                rocket::config::pretty_print_error(e);
                return Err(rocket);
            }
        };
        if config.trending_hour_utc >= 24 {
            error!(
                "trending_hour_utc must be 0-23, got {}",
                config.trending_hour_utc
            );
            return Err(rocket);
        }

        rocket = rocket.manage(config);
        Ok(rocket)
    }
}

/// Configuration for the database.
#[derive(Deserialize)]
struct DbConfig {
    // secret
    db_uri: String,
}

/// A fairing that loads the MongoDB config, connects to the database,
/// performs any setup necessary, and places both a `Client` and a
/// `Database` into managed state.
pub struct DatabaseFairing;

#[rocket::async_trait]
impl Fairing for DatabaseFairing {
    fn info(&self) -> Info {
        Info {
            name: "MongoDB",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, mut rocket: Rocket<Build>) -> rocket::fairing::Result {
        let config = match rocket.figment().extract::<DbConfig>() {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load database config");
                rocket::config::pretty_print_error(e);
                return Err(rocket);
            }
        };
        info!("Loaded database config, connecting...");
        let client = match MongoClient::with_uri_str(config.db_uri).await {
            Ok(client) => client,
            Err(e) => {
                error!("Failed to connect to database: {e}");
                return Err(rocket);
            }
        };
        let db = client.database(DATABASE_NAME);

        // The unique partial endorsement index is load-bearing for
        // correctness, so index creation failures are launch failures.
        if let Err(e) = ensure_indexes_exist(&db).await {
            error!("Failed to create database indexes: {e}");
            return Err(rocket);
        }
        info!("...database connection online!");

        rocket = rocket.manage(client).manage(db);
        Ok(rocket)
    }
}

const DATABASE_NAME: &str = "ballotmatch";
