use axum::extract::Request;

use crate::state::AppState;
use crate::web::App;

use super::controller::{admin, whoami};

pub fn routes(app: App, state: &AppState) -> App {
    let whoami_state = state.clone();
    let admin_state = state.clone();

    app.get("/auth/whoami", move |req: Request| {
        whoami(whoami_state.clone(), req)
    })
    .get("/auth/admin", move |req: Request| {
        admin(admin_state.clone(), req)
    })
}
