pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod images;
pub mod validation;
