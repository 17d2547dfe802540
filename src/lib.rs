// Library exports for fitlog
// This allows testing of internal modules

pub mod app;
pub mod backend;
pub mod commands;
pub mod config;
pub mod data;
pub mod error;
pub mod models;
pub mod routes;
pub mod session;
pub mod storage;
pub mod supabase;
pub mod views;

pub use app::{App, Screen};
pub use error::AppError;
