pub mod account;
pub mod admin;
pub mod auth;
pub mod chat;
pub mod middleware;
pub mod news;
pub mod polls;
pub mod textproc;
pub mod upload;
pub mod views;

pub use auth::{AppState, AppStateInner};
