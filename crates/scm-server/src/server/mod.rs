//! Server configuration and startup, split into focused modules.

pub use app_state::AppState;
pub use run::run;

mod app_state;
mod routes;
mod run;
