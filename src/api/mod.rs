use rocket::Route;

mod endorsements;
mod feed;
mod issues;
mod jobs;
mod leaderboard;
mod preferences;

pub fn routes() -> Vec<Route> {
    let mut routes = Vec::new();
    routes.extend(feed::routes());
    routes.extend(endorsements::routes());
    routes.extend(preferences::routes());
    routes.extend(leaderboard::routes());
    routes.extend(issues::routes());
    routes.extend(jobs::routes());
    routes
}
