// src/models/roster.rs
use crate::models::record::CorpIdentity;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Korea Exchange market a company is listed on, as DART classifies it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum Market {
    Kospi,
    Kosdaq,
    Konex,
    Other,
}

impl Market {
    /// DART `corp_cls` code.
    pub fn corp_cls(&self) -> &'static str {
        match self {
            Market::Kospi => "Y",
            Market::Kosdaq => "K",
            Market::Konex => "N",
            Market::Other => "E",
        }
    }

    pub fn from_corp_cls(code: &str) -> Option<Self> {
        match code.trim() {
            "Y" => Some(Market::Kospi),
            "K" => Some(Market::Kosdaq),
            "N" => Some(Market::Konex),
            "E" => Some(Market::Other),
            _ => None,
        }
    }

    /// Roster files of this market are named `<prefix>_list.<date>.csv`.
    pub fn file_prefix(&self) -> &'static str {
        match self {
            Market::Kospi => "kospi",
            Market::Kosdaq => "kosdaq",
            Market::Konex => "konex",
            Market::Other => "etc",
        }
    }
}

impl fmt::Display for Market {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.file_prefix().to_uppercase())
    }
}

/// One line of a company roster.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RosterEntry {
    pub corp_code: String,
    pub corp_name: String,
    pub stock_code: String,
    pub modify_date: String, // as-of date published by DART (YYYYMMDD)
}

impl RosterEntry {
    pub fn identity(&self) -> CorpIdentity {
        CorpIdentity::new(&self.corp_name, &self.corp_code, &self.stock_code)
    }
}
