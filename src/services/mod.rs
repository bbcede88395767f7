// src/services/mod.rs

pub mod archiver;
pub mod assembler;
pub mod evaluator;
