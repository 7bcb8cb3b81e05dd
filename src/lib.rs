#[macro_use]
extern crate rocket;
#[macro_use]
extern crate log;

use rocket::{Build, Rocket};

pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod logging;
pub mod model;
pub mod scheduled_task;

pub use config::Config;
use config::{ConfigFairing, DatabaseFairing};
use engine::trending::TrendingSchedulerFairing;
use events::EventBus;
use logging::LoggerFairing;

/// Build the rocket instance.
/// Fairing order matters: the scheduler fairing reads the config and
/// database out of managed state, so it must attach after both.
pub fn build() -> Rocket<Build> {
    rocket::build()
        .mount("/", api::routes())
        .attach(LoggerFairing)
        .attach(ConfigFairing)
        .attach(DatabaseFairing)
        .attach(TrendingSchedulerFairing)
        .manage(EventBus::new())
}
