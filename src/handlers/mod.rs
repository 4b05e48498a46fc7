use axum::{Json, extract::rejection::JsonRejection};

use crate::error::{Error, Result};

mod health;
mod lists;
mod metrics;
mod reset;
mod try_auth;

pub use health::health_handler;
pub use lists::{
    add_to_blacklist_handler, add_to_whitelist_handler, remove_from_blacklist_handler,
    remove_from_whitelist_handler,
};
pub use metrics::metrics_handler;
pub use reset::reset_handler;
pub use try_auth::try_auth_handler;

// Malformed or missing JSON is always a plain 400
fn body<T>(payload: std::result::Result<Json<T>, JsonRejection>) -> Result<T> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| Error::BadRequest(rejection.body_text()))
}
