// src/handlers/mod.rs

pub mod attempts;
pub mod quizzes;
pub mod settings;
