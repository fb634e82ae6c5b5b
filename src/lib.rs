// src/lib.rs
//! Financial summaries of listed Korean companies, scraped from Naver Finance
//! item pages. Company rosters come from the DART registry.

pub mod utils;
pub mod models;
pub mod extractors;
pub mod naver;
pub mod dart;
pub mod storage;
pub mod collector;
