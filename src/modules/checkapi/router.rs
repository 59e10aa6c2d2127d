use crate::web::App;

use super::controller::{liveness, readiness, test_error, test_panic};

pub fn routes(app: App) -> App {
    app.get("/liveness", liveness)
        .get("/readiness", readiness)
        .get("/testerror", test_error)
        .get("/testpanic", test_panic)
}
