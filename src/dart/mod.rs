// src/dart/mod.rs
pub mod client;
pub mod models;
