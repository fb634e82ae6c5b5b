// src/models/mod.rs
pub mod record;
pub mod roster;
