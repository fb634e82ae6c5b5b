// src/collector.rs
use std::path::PathBuf;
use serde::Serialize;
use crate::extractors::page::Extractor;
use crate::extractors::text::HtmlDocument;
use crate::models::record::{CorpIdentity, FinancialRecord};
use crate::models::roster::RosterEntry;
use crate::naver::client::{fetch_item_page, DocumentFetcher};
use crate::utils::html_debug;

/// Result of collecting one company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Collection {
    /// The page was fetched; the record may still be identity-only.
    Parsed { record: FinancialRecord },
    /// The page could not be fetched at all.
    Unreachable {
        #[serde(flatten)]
        identity: CorpIdentity,
        reason: String,
    },
}

impl Collection {
    pub fn identity(&self) -> &CorpIdentity {
        match self {
            Collection::Parsed { record } => record.identity(),
            Collection::Unreachable { identity, .. } => identity,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub complete: usize,
    pub identity_only: usize,
    pub unreachable: usize,
}

impl Summary {
    pub fn of(collections: &[Collection]) -> Self {
        let mut summary = Summary::default();
        for collection in collections {
            match collection {
                Collection::Parsed { record } if record.is_identity_only() => summary.identity_only += 1,
                Collection::Parsed { .. } => summary.complete += 1,
                Collection::Unreachable { .. } => summary.unreachable += 1,
            }
        }
        summary
    }
}

/// Walks the roster one company at a time.
pub struct Collector<'a, F, E> {
    fetcher: &'a F,
    extractor: &'a E,
    debug_dir: Option<PathBuf>,
}

impl<'a, F: DocumentFetcher, E: Extractor> Collector<'a, F, E> {
    pub fn new(fetcher: &'a F, extractor: &'a E) -> Self {
        Self { fetcher, extractor, debug_dir: None }
    }

    /// Also dump every fetched page (raw and annotated) under `dir`.
    pub fn with_debug_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.debug_dir = Some(dir.into());
        self
    }

    pub async fn collect_one(&self, entry: &RosterEntry) -> Collection {
        let identity = entry.identity();

        let response = match fetch_item_page(self.fetcher, &entry.stock_code).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!("Failed to download page of {}: {}", entry.corp_name, e);
                return Collection::Unreachable { identity, reason: e.to_string() };
            }
        };

        if !response.is_success() {
            return Collection::Unreachable {
                identity,
                reason: format!("HTTP status {}", response.status),
            };
        }
        let body = response.body.unwrap_or_default();

        if let Some(dir) = &self.debug_dir {
            if let Err(e) = html_debug::save_debug_page(dir, &entry.stock_code, &body) {
                tracing::warn!("Failed to create debug HTML: {}", e);
            }
        }

        let document = HtmlDocument::parse(&body);
        Collection::Parsed { record: self.extractor.extract(&document, &identity) }
    }

    /// Collects every entry in order. Never stops early on a bad company.
    pub async fn collect_all(&self, entries: &[RosterEntry]) -> Vec<Collection> {
        let mut collections = Vec::with_capacity(entries.len());
        for (curr, entry) in entries.iter().enumerate() {
            tracing::info!("Process {}th corp: {}...", curr + 1, entry.corp_name);
            collections.push(self.collect_one(entry).await);
        }
        collections
    }
}
