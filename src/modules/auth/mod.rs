//! Endpoints that exercise token authentication and role authorization.

pub mod controller;
pub mod router;
