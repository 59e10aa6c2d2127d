//! Health and diagnostic endpoints.

pub mod controller;
pub mod router;
