use mongodb::options::ReplaceOptions;
use rocket::{serde::json::Json, Route};

use crate::error::{Error, Result};
use crate::model::{
    api::preferences::{PreferencesRequest, PreferencesResponse},
    db::preferences::VoterPreferences,
    mongodb::{Coll, Id},
};

pub fn routes() -> Vec<Route> {
    routes![get_preferences, put_preferences]
}

#[get("/voters/<voter_id>/preferences")]
async fn get_preferences(
    voter_id: Id,
    preferences: Coll<VoterPreferences>,
) -> Result<Json<PreferencesResponse>> {
    let prefs = preferences
        .find_one(voter_id.as_doc(), None)
        .await?
        .ok_or_else(|| Error::not_found(format!("Preferences for voter '{voter_id}'")))?;
    Ok(Json(prefs.into()))
}

/// Save a voter's issue preferences.
///
/// Cardinality is validated before anything touches the store, so
/// out-of-range preference sets are never persisted.
#[put("/voters/<voter_id>/preferences", data = "<request>", format = "json")]
async fn put_preferences(
    voter_id: Id,
    request: Json<PreferencesRequest>,
    preferences: Coll<VoterPreferences>,
) -> Result<Json<PreferencesResponse>> {
    let prefs = request.0.into_preferences(voter_id);
    prefs.validate()?;

    let options = ReplaceOptions::builder().upsert(true).build();
    preferences
        .replace_one(voter_id.as_doc(), &prefs, options)
        .await?;

    Ok(Json(prefs.into()))
}
