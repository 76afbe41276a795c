// src/lib.rs

pub mod config;
pub mod error;
pub mod forms;
pub mod grading;
pub mod handlers;
pub mod lang;
pub mod models;
pub mod routes;
pub mod rules;
pub mod state;
pub mod utils;

pub use routes::create_router;
