use mongodb::{bson::doc, options::FindOptions};
use rocket::{futures::TryStreamExt, serde::json::Json, Route};

use crate::error::Result;
use crate::model::{db::issue::Issue, mongodb::Coll};

pub fn routes() -> Vec<Route> {
    routes![get_issues]
}

/// The issue catalogue, in display order. Immutable reference data,
/// seeded outside this service; clients use it for preference pickers.
#[get("/issues")]
async fn get_issues(issues: Coll<Issue>) -> Result<Json<Vec<Issue>>> {
    let options = FindOptions::builder()
        .sort(doc! { "display_order": 1 })
        .build();
    let all: Vec<Issue> = issues.find(None, options).await?.try_collect().await?;
    Ok(Json(all))
}
