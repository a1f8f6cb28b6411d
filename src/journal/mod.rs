use crate::state::AppState;
use axum::Router;

pub mod dto;
pub mod handlers;
pub mod vitals;

pub fn router() -> Router<AppState> {
    handlers::journal_routes()
}
