// src/extractors/mod.rs
pub mod numeric;
pub mod text;
pub mod page;
