// src/models/mod.rs

pub mod attempt;
pub mod grade;
pub mod quiz;
