// src/models/record.rs
use crate::extractors::numeric::Numeric;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::fmt;

/// Who a record belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct CorpIdentity {
    pub corp_name: String,
    pub corp_code: String,  // DART registry code
    pub stock_code: String, // KRX ticker
}

impl CorpIdentity {
    pub fn new(
        corp_name: impl Into<String>,
        corp_code: impl Into<String>,
        stock_code: impl Into<String>,
    ) -> Self {
        Self {
            corp_name: corp_name.into(),
            corp_code: corp_code.into(),
            stock_code: stock_code.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    HundredMillionWon, // 억원
    Percent,
    Multiple, // 배
}

impl Unit {
    pub fn suffix(&self) -> &'static str {
        match self {
            Unit::HundredMillionWon => "억원",
            Unit::Percent => "%",
            Unit::Multiple => "배",
        }
    }
}

/// The ten metrics of the corporate-analysis table, in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    Revenue,
    OperatingIncome,
    NetProfit,
    OperatingIncomeRate,
    NetProfitRate,
    Roe,
    LiabilityRate,
    QuickRate,
    Per,
    Pbr,
}

impl Metric {
    pub const ALL: [Metric; 10] = [
        Metric::Revenue,
        Metric::OperatingIncome,
        Metric::NetProfit,
        Metric::OperatingIncomeRate,
        Metric::NetProfitRate,
        Metric::Roe,
        Metric::LiabilityRate,
        Metric::QuickRate,
        Metric::Per,
        Metric::Pbr,
    ];

    /// 1-based row in the table body. PER and PBR sit below unrelated rows
    /// (EPS, BPS, ...), so they are not contiguous with the rest.
    pub fn row(&self) -> usize {
        match self {
            Metric::Per => 11,
            Metric::Pbr => 13,
            other => Self::ALL
                .iter()
                .position(|m| m == other)
                .map(|idx| idx + 1)
                .unwrap_or_default(),
        }
    }

    pub fn unit(&self) -> Unit {
        match self {
            Metric::Revenue | Metric::OperatingIncome | Metric::NetProfit => Unit::HundredMillionWon,
            Metric::Per | Metric::Pbr => Unit::Multiple,
            _ => Unit::Percent,
        }
    }

    /// Field name used in serialized output.
    pub fn key(&self) -> &'static str {
        match self {
            Metric::Revenue => "revenue",
            Metric::OperatingIncome => "operating_income",
            Metric::NetProfit => "net_profit",
            Metric::OperatingIncomeRate => "operating_income_rate",
            Metric::NetProfitRate => "net_profit_rate",
            Metric::Roe => "roe",
            Metric::LiabilityRate => "liability_rate",
            Metric::QuickRate => "quick_rate",
            Metric::Per => "per",
            Metric::Pbr => "pbr",
        }
    }

    /// Row title as printed on the portal.
    pub fn label(&self) -> &'static str {
        match self {
            Metric::Revenue => "매출액",
            Metric::OperatingIncome => "영업이익",
            Metric::NetProfit => "당기순이익",
            Metric::OperatingIncomeRate => "영업이익률",
            Metric::NetProfitRate => "순이익률",
            Metric::Roe => "ROE",
            Metric::LiabilityRate => "부채비율",
            Metric::QuickRate => "당좌비율",
            Metric::Per => "PER",
            Metric::Pbr => "PBR",
        }
    }
}

/// Values keyed by fiscal-year label, in the column order of the page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimeSeries {
    entries: Vec<(String, Option<Numeric>)>,
}

impl TimeSeries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or overwrites. An existing label keeps its position.
    pub fn insert(&mut self, label: impl Into<String>, value: Option<Numeric>) {
        let label = label.into();
        match self.entries.iter_mut().find(|(l, _)| *l == label) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((label, value)),
        }
    }

    /// `None` if the label is unknown, `Some(None)` if its cell was absent.
    pub fn get(&self, label: &str) -> Option<Option<Numeric>> {
        self.entries.iter().find(|(l, _)| l == label).map(|(_, v)| *v)
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(l, _)| l.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<Numeric>)> {
        self.entries.iter().map(|(l, v)| (l.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, Option<Numeric>)> for TimeSeries {
    fn from_iter<I: IntoIterator<Item = (String, Option<Numeric>)>>(iter: I) -> Self {
        let mut series = TimeSeries::new();
        for (label, value) in iter {
            series.insert(label, value);
        }
        series
    }
}

impl Serialize for TimeSeries {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (label, value) in &self.entries {
            map.serialize_entry(label, value)?;
        }
        map.end()
    }
}

impl fmt::Display for TimeSeries {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (idx, (label, value)) in self.entries.iter().enumerate() {
            if idx > 0 {
                write!(f, ", ")?;
            }
            match value {
                Some(v) => write!(f, "{}: {}", label, v)?,
                None => write!(f, "{}: -", label)?,
            }
        }
        write!(f, "}}")
    }
}

/// Financial snapshot of one company.
///
/// Either identity-only (nothing could be read from the page) or fully
/// populated, in which case all ten series share the same fiscal-year labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FinancialRecord {
    #[serde(flatten)]
    identity: CorpIdentity,
    market_capital: Option<Numeric>, // 억원
    stocks_listed: Option<u64>,
    revenue: Option<TimeSeries>,
    operating_income: Option<TimeSeries>,
    net_profit: Option<TimeSeries>,
    operating_income_rate: Option<TimeSeries>,
    net_profit_rate: Option<TimeSeries>,
    roe: Option<TimeSeries>,
    liability_rate: Option<TimeSeries>,
    quick_rate: Option<TimeSeries>,
    per: Option<TimeSeries>,
    pbr: Option<TimeSeries>,
}

impl FinancialRecord {
    /// An identity-only record.
    pub fn new(identity: CorpIdentity) -> Self {
        Self {
            identity,
            market_capital: None,
            stocks_listed: None,
            revenue: None,
            operating_income: None,
            net_profit: None,
            operating_income_rate: None,
            net_profit_rate: None,
            roe: None,
            liability_rate: None,
            quick_rate: None,
            per: None,
            pbr: None,
        }
    }

    pub fn identity(&self) -> &CorpIdentity {
        &self.identity
    }

    pub fn market_capital(&self) -> Option<Numeric> {
        self.market_capital
    }

    pub fn stocks_listed(&self) -> Option<u64> {
        self.stocks_listed
    }

    pub fn series(&self, metric: Metric) -> Option<&TimeSeries> {
        self.slot(metric).as_ref()
    }

    pub fn is_identity_only(&self) -> bool {
        self.market_capital.is_none()
            && self.stocks_listed.is_none()
            && Metric::ALL.iter().all(|m| self.series(*m).is_none())
    }

    pub(crate) fn set_market_cap(&mut self, value: Numeric) {
        self.market_capital = Some(value);
    }

    pub(crate) fn set_stocks_listed(&mut self, value: u64) {
        self.stocks_listed = Some(value);
    }

    pub(crate) fn set_series(&mut self, metric: Metric, series: TimeSeries) {
        *self.slot_mut(metric) = Some(series);
    }

    fn slot(&self, metric: Metric) -> &Option<TimeSeries> {
        match metric {
            Metric::Revenue => &self.revenue,
            Metric::OperatingIncome => &self.operating_income,
            Metric::NetProfit => &self.net_profit,
            Metric::OperatingIncomeRate => &self.operating_income_rate,
            Metric::NetProfitRate => &self.net_profit_rate,
            Metric::Roe => &self.roe,
            Metric::LiabilityRate => &self.liability_rate,
            Metric::QuickRate => &self.quick_rate,
            Metric::Per => &self.per,
            Metric::Pbr => &self.pbr,
        }
    }

    fn slot_mut(&mut self, metric: Metric) -> &mut Option<TimeSeries> {
        match metric {
            Metric::Revenue => &mut self.revenue,
            Metric::OperatingIncome => &mut self.operating_income,
            Metric::NetProfit => &mut self.net_profit,
            Metric::OperatingIncomeRate => &mut self.operating_income_rate,
            Metric::NetProfitRate => &mut self.net_profit_rate,
            Metric::Roe => &mut self.roe,
            Metric::LiabilityRate => &mut self.liability_rate,
            Metric::QuickRate => &mut self.quick_rate,
            Metric::Per => &mut self.per,
            Metric::Pbr => &mut self.pbr,
        }
    }
}

impl fmt::Display for FinancialRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn or_dash<T: fmt::Display>(value: Option<T>) -> String {
            value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
        }

        writeln!(f, "회사명: {}", self.identity.corp_name)?;
        writeln!(f, "회사코드: {}", self.identity.corp_code)?;
        writeln!(f, "상장코드: {}", self.identity.stock_code)?;
        writeln!(f, "시가총액(억원): {}", or_dash(self.market_capital))?;
        writeln!(f, "상장주식수: {}", or_dash(self.stocks_listed))?;
        for metric in Metric::ALL {
            writeln!(
                f,
                "{}({}): {}",
                metric.label(),
                metric.unit().suffix(),
                or_dash(self.series(metric))
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;

    fn identity() -> CorpIdentity {
        CorpIdentity::new("삼성전자", "00126380", "005930")
    }

    #[test]
    fn test_metric_rows() {
        let rows: Vec<usize> = Metric::ALL.iter().map(|m| m.row()).collect();
        assert_eq!(rows, vec![1, 2, 3, 4, 5, 6, 7, 8, 11, 13]);
    }

    #[test]
    fn test_metric_units() {
        assert_eq!(Metric::Revenue.unit(), Unit::HundredMillionWon);
        assert_eq!(Metric::Roe.unit(), Unit::Percent);
        assert_eq!(Metric::QuickRate.unit(), Unit::Percent);
        assert_eq!(Metric::Pbr.unit(), Unit::Multiple);
    }

    #[test]
    fn test_series_keeps_column_order_and_overwrites() {
        let mut series = TimeSeries::new();
        series.insert("2021.12", Some(Numeric::Integer(3)));
        series.insert("2019.12", Some(Numeric::Integer(1)));
        series.insert("2020.12", None);
        series.insert("2021.12", Some(Numeric::Integer(30)));

        assert_eq!(series.labels().collect::<Vec<_>>(), vec!["2021.12", "2019.12", "2020.12"]);
        assert_eq!(series.get("2021.12"), Some(Some(Numeric::Integer(30))));
        assert_eq!(series.get("2020.12"), Some(None));
        assert_eq!(series.get("2018.12"), None);
        assert_eq!(series.len(), 3);
    }

    #[test]
    fn test_new_record_is_identity_only() {
        let record = FinancialRecord::new(identity());
        assert!(record.is_identity_only());
        assert_eq!(record.identity().stock_code, "005930");
        assert!(Metric::ALL.iter().all(|m| record.series(*m).is_none()));
    }

    #[test]
    fn test_record_serializes_series_in_order() {
        let mut record = FinancialRecord::new(identity());
        record.set_market_cap(Numeric::Integer(4_128_394));
        record.set_stocks_listed(5_969_782_550);
        let series: TimeSeries = vec![
            ("2019".to_string(), Some(Numeric::Integer(1234))),
            ("2020".to_string(), Some(Numeric::Decimal(Decimal::new(125, 1)))),
            ("2021".to_string(), None),
        ]
        .into_iter()
        .collect();
        record.set_series(Metric::Revenue, series);

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["corp_name"], "삼성전자");
        assert_eq!(json["market_capital"], 4_128_394);
        assert_eq!(json["revenue"]["2019"], 1234);
        assert_eq!(json["revenue"]["2020"], 12.5);
        assert!(json["revenue"]["2021"].is_null());
        assert!(json["pbr"].is_null());
        assert!(!record.is_identity_only());

        let text = serde_json::to_string(&record).unwrap();
        let pos_2019 = text.find("\"2019\"").unwrap();
        let pos_2021 = text.find("\"2021\"").unwrap();
        assert!(pos_2019 < pos_2021);
    }

    #[test]
    fn test_display_lists_every_metric() {
        let text = FinancialRecord::new(identity()).to_string();
        assert!(text.contains("회사명: 삼성전자"));
        assert!(text.contains("시가총액(억원): -"));
        for metric in Metric::ALL {
            assert!(text.contains(metric.label()), "missing {}", metric.label());
        }
    }
}
