// src/handlers/mod.rs

pub mod admin;
pub mod aptitude;
pub mod attempts;
