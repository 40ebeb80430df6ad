use crate::state::AppState;
use axum::Router;

pub mod dao;
pub mod domain;
mod dto;
pub mod handlers;
pub mod memory;
mod password;
pub mod repo;
pub mod services;
mod validation;

pub fn router() -> Router<AppState> {
    handlers::user_routes()
}
