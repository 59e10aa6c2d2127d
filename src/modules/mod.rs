//! Route modules. Each exposes a `routes(app, state)` function that
//! registers its handlers on an [`App`](crate::web::App).

pub mod auth;
pub mod checkapi;
