// src/naver/mod.rs
pub mod client;
