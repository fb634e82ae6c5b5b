// src/extractors/page.rs

// --- Imports ---
use crate::extractors::numeric::{coerce_localized, parse_market_cap, Numeric};
use crate::extractors::text::{extract_text, Document, Position, TableRegion};
use crate::models::record::{CorpIdentity, FinancialRecord, Metric, TimeSeries};

// --- Constants ---
const MARKET_SUM_ID: &str = "_market_sum";
const STOCKS_LISTED_ROW: usize = 3;
const FISCAL_YEAR_HEADER_ROW: usize = 2;
/// Annual columns of the analysis table; quarterly columns follow and are not read.
const FISCAL_YEAR_COLUMNS: usize = 3;

/// Turns a parsed company page into a [`FinancialRecord`].
pub trait Extractor {
    fn extract(&self, document: &dyn Document, identity: &CorpIdentity) -> FinancialRecord;
}

/// Extractor for the Naver Finance item main page (KOSPI/KOSDAQ layout).
#[derive(Debug, Default, Clone, Copy)]
pub struct NaverPageExtractor;

impl NaverPageExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Entry point per company.
    pub fn extract_company(
        &self,
        document: &dyn Document,
        corp_code: &str,
        corp_name: &str,
        stock_code: &str,
    ) -> FinancialRecord {
        self.extract(document, &CorpIdentity::new(corp_name, corp_code, stock_code))
    }

    /// Gate phase: both market cap and listed shares must be on the page.
    fn read_gate(&self, document: &dyn Document) -> Option<(Numeric, u64)> {
        let market_cap = extract_text(document, &Position::Element(MARKET_SUM_ID))
            .and_then(|text| parse_market_cap(&text));
        let stocks_listed = extract_text(
            document,
            &Position::cell(TableRegion::ShareSummary, STOCKS_LISTED_ROW, 1),
        )
        .and_then(|text| coerce_localized(&text))
        .and_then(|n| n.as_i64())
        .and_then(|v| u64::try_from(v).ok());

        match (market_cap, stocks_listed) {
            (Some(cap), Some(shares)) => Some((cap, shares)),
            (cap, shares) => {
                tracing::debug!(
                    "Gate not passed (market cap present: {}, listed shares present: {})",
                    cap.is_some(),
                    shares.is_some()
                );
                None
            }
        }
    }

    /// Fiscal-year labels in column order. A missing header becomes "".
    fn read_fiscal_years(&self, document: &dyn Document) -> Vec<String> {
        (1..=FISCAL_YEAR_COLUMNS)
            .map(|column| {
                extract_text(
                    document,
                    &Position::cell(TableRegion::AnalysisHeader, FISCAL_YEAR_HEADER_ROW, column),
                )
                .unwrap_or_default()
            })
            .collect()
    }

    /// Reads one metric row, aligning cells with `years` by position only.
    fn read_metric(&self, document: &dyn Document, metric: Metric, years: &[String]) -> TimeSeries {
        let row = metric.row();
        years
            .iter()
            .enumerate()
            .map(|(idx, year)| {
                let position = Position::cell(TableRegion::AnalysisBody, row, idx + 1);
                let value = extract_text(document, &position).and_then(|text| coerce_localized(&text));
                if value.is_none() {
                    tracing::trace!("{} {} is empty (row {}, column {})", metric.key(), year, row, idx + 1);
                }
                (year.clone(), value)
            })
            .collect()
    }
}

impl Extractor for NaverPageExtractor {
    fn extract(&self, document: &dyn Document, identity: &CorpIdentity) -> FinancialRecord {
        let mut record = FinancialRecord::new(identity.clone());

        let Some((market_cap, stocks_listed)) = self.read_gate(document) else {
            tracing::info!(
                "No financial summary for {} ({}), keeping identity only",
                identity.corp_name,
                identity.stock_code
            );
            return record;
        };

        let years = self.read_fiscal_years(document);
        tracing::debug!("Fiscal years for {}: {:?}", identity.stock_code, years);

        record.set_market_cap(market_cap);
        record.set_stocks_listed(stocks_listed);
        for metric in Metric::ALL {
            let series = self.read_metric(document, metric, &years);
            record.set_series(metric, series);
        }

        record
    }
}
