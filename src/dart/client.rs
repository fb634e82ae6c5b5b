// src/dart/client.rs
use crate::dart::models::{
    parse_corp_code_xml, parse_status_xml, CompanyInfo, CorpCodeEntry, STATUS_NO_DATA,
};
use crate::models::roster::{Market, RosterEntry};
use crate::utils::error::DartError;
use std::io::{Cursor, Read};
use std::time::Duration;

const DART_API_BASE: &str = "https://opendart.fss.or.kr/api";
const CORP_CODE_FILE: &str = "CORPCODE.xml";
// The corp-code archive is tens of megabytes.
const DART_TIMEOUT_SECS: u64 = 120;
const PROGRESS_EVERY: usize = 100;

/// Client for the DART OpenAPI (corporate registry of the FSS).
pub struct DartClient {
    client: reqwest::Client,
    api_key: String,
}

impl DartClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self, DartError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DART_TIMEOUT_SECS))
            .build()?;
        Ok(Self { client, api_key: api_key.into() })
    }

    /// Downloads and unpacks the registry of every company DART knows.
    pub async fn corp_codes(&self) -> Result<Vec<CorpCodeEntry>, DartError> {
        let url = format!("{}/corpCode.xml", DART_API_BASE);
        tracing::info!("Downloading corp-code archive from: {}", url);

        let response = self
            .client
            .get(&url)
            .query(&[("crtfc_key", self.api_key.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!("HTTP error status: {} for URL: {}", status, url);
            return Err(DartError::Http(status));
        }

        let bytes = response.bytes().await?;
        tracing::debug!("Downloaded {} bytes of corp-code archive", bytes.len());

        let xml = unpack_corp_codes(&bytes)?;
        let entries = parse_corp_code_xml(&xml)?;
        tracing::info!("Corp-code registry holds {} companies", entries.len());
        Ok(entries)
    }

    /// Lists the companies of `market`. One overview request per listed company,
    /// so this is slow and counts against the daily DART quota.
    pub async fn listed_in(&self, market: Market) -> Result<Vec<RosterEntry>, DartError> {
        let entries = self.corp_codes().await?;
        classify_listed(self, entries, market).await
    }
}

/// Source of company overviews.
#[allow(async_fn_in_trait)]
pub trait CompanyLookup {
    async fn company(&self, corp_code: &str) -> Result<CompanyInfo, DartError>;
}

impl CompanyLookup for DartClient {
    /// Fetches the company overview of `corp_code`.
    async fn company(&self, corp_code: &str) -> Result<CompanyInfo, DartError> {
        let url = format!("{}/company.json", DART_API_BASE);

        let response = self
            .client
            .get(&url)
            .query(&[("crtfc_key", self.api_key.as_str()), ("corp_code", corp_code)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(DartError::Http(response.status()));
        }

        let info: CompanyInfo = response
            .json()
            .await
            .map_err(|e| DartError::Parse(format!("company.json for {}: {}", corp_code, e)))?;
        info.into_result()
    }
}

/// Keeps the listed entries whose `corp_cls` is `market`.
///
/// A company DART has no overview for (status 013) is skipped. Any other
/// status (quota exceeded, maintenance, bad key) aborts the whole listing,
/// since every remaining lookup would fail the same way.
pub async fn classify_listed<L: CompanyLookup>(
    lookup: &L,
    entries: Vec<CorpCodeEntry>,
    market: Market,
) -> Result<Vec<RosterEntry>, DartError> {
    let listed: Vec<CorpCodeEntry> = entries.into_iter().filter(CorpCodeEntry::is_listed).collect();
    tracing::info!("{} listed companies to classify for {}", listed.len(), market);

    let mut roster = Vec::new();
    for (curr, entry) in listed.into_iter().enumerate() {
        if (curr + 1) % PROGRESS_EVERY == 0 {
            tracing::info!("Process {} corps...", curr + 1);
        }

        let info = match lookup.company(&entry.corp_code).await {
            Ok(info) => info,
            Err(DartError::Api { status, message }) if status == STATUS_NO_DATA => {
                tracing::warn!("Skipping {} ({}): DART status {} {}", entry.corp_name, entry.corp_code, status, message);
                continue;
            }
            Err(e) => {
                tracing::error!("Aborting {} listing at {} ({}): {}", market, entry.corp_name, entry.corp_code, e);
                return Err(e);
            }
        };

        let cls = info.corp_cls.as_deref().and_then(Market::from_corp_cls);
        if cls == Some(market) {
            tracing::debug!("Find {} corp: {}", market, entry.corp_name);
            roster.push(entry.into_roster_entry());
        }
    }

    tracing::info!("Found {} {} companies", roster.len(), market);
    Ok(roster)
}

/// Extracts CORPCODE.xml from the downloaded archive.
fn unpack_corp_codes(bytes: &[u8]) -> Result<String, DartError> {
    // Error replies come back as plain XML rather than a zip.
    if !bytes.starts_with(b"PK") {
        return Err(parse_status_xml(&String::from_utf8_lossy(bytes)));
    }

    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| DartError::Archive(format!("zip open error: {}", e)))?;
    let mut file = archive
        .by_name(CORP_CODE_FILE)
        .map_err(|e| DartError::Archive(format!("{}: {}", CORP_CODE_FILE, e)))?;

    let mut xml = String::new();
    file.read_to_string(&mut xml)
        .map_err(|e| DartError::Archive(format!("{} is not UTF-8 text: {}", CORP_CODE_FILE, e)))?;
    Ok(xml)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    /// Answers overview lookups from a table of (status, corp_cls) and records
    /// which corp codes were asked for.
    struct CannedLookup {
        replies: HashMap<&'static str, (&'static str, Option<&'static str>)>,
        asked: RefCell<Vec<String>>,
    }

    impl CannedLookup {
        fn new(replies: &[(&'static str, &'static str, Option<&'static str>)]) -> Self {
            Self {
                replies: replies.iter().map(|(code, status, cls)| (*code, (*status, *cls))).collect(),
                asked: RefCell::new(Vec::new()),
            }
        }
    }

    impl CompanyLookup for CannedLookup {
        async fn company(&self, corp_code: &str) -> Result<CompanyInfo, DartError> {
            self.asked.borrow_mut().push(corp_code.to_string());
            let (status, corp_cls) = self.replies.get(corp_code).copied().unwrap_or(("013", None));
            CompanyInfo {
                status: status.to_string(),
                message: format!("status {}", status),
                corp_code: Some(corp_code.to_string()),
                corp_name: None,
                stock_name: None,
                stock_code: None,
                corp_cls: corp_cls.map(str::to_string),
                induty_code: None,
                est_dt: None,
                acc_mt: None,
            }
            .into_result()
        }
    }

    fn corp(code: &str, name: &str, stock: &str) -> CorpCodeEntry {
        CorpCodeEntry {
            corp_code: code.to_string(),
            corp_name: name.to_string(),
            stock_code: stock.to_string(),
            modify_date: "20211119".to_string(),
        }
    }

    fn registry() -> Vec<CorpCodeEntry> {
        vec![
            corp("00126380", "삼성전자", "005930"),
            corp("00434003", "다코", " "),
            corp("00177816", "대주전자재료", "078600"),
            corp("00164779", "SK하이닉스", "000660"),
            corp("00999999", "폐지회사", "999999"),
        ]
    }

    fn archive_with(name: &str, content: &str) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        writer.start_file(name, SimpleFileOptions::default()).unwrap();
        writer.write_all(content.as_bytes()).unwrap();
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_unpack_corp_codes() {
        let xml = "<result><list><corp_code>00126380</corp_code></list></result>";
        let bytes = archive_with(CORP_CODE_FILE, xml);
        assert_eq!(unpack_corp_codes(&bytes).unwrap(), xml);
    }

    #[test]
    fn test_unpack_missing_entry() {
        let bytes = archive_with("OTHER.xml", "<result/>");
        assert!(matches!(unpack_corp_codes(&bytes), Err(DartError::Archive(_))));
    }

    #[test]
    fn test_unpack_error_reply() {
        let reply = "<result><status>020</status><message>요청 제한을 초과하였습니다.</message></result>";
        match unpack_corp_codes(reply.as_bytes()) {
            Err(DartError::Api { status, .. }) => assert_eq!(status, "020"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_classify_filters_market_and_skips_missing_overviews() {
        let lookup = CannedLookup::new(&[
            ("00126380", "000", Some("Y")),
            ("00177816", "000", Some("K")),
            ("00164779", "000", Some("Y")),
            ("00999999", "013", None),
        ]);

        let roster = classify_listed(&lookup, registry(), Market::Kospi).await.unwrap();

        let names: Vec<&str> = roster.iter().map(|e| e.corp_name.as_str()).collect();
        assert_eq!(names, vec!["삼성전자", "SK하이닉스"]);
        assert_eq!(roster[0].stock_code, "005930");
        // Unlisted companies are never looked up.
        assert!(!lookup.asked.borrow().contains(&"00434003".to_string()));
        assert_eq!(lookup.asked.borrow().len(), 4);
    }

    #[tokio::test]
    async fn test_classify_aborts_on_quota_exceeded() {
        let lookup = CannedLookup::new(&[
            ("00126380", "000", Some("Y")),
            ("00177816", "020", None),
            ("00164779", "000", Some("Y")),
        ]);

        match classify_listed(&lookup, registry(), Market::Kospi).await {
            Err(DartError::Api { status, .. }) => assert_eq!(status, "020"),
            other => panic!("expected quota error, got {:?}", other),
        }
        assert_eq!(*lookup.asked.borrow(), vec!["00126380".to_string(), "00177816".to_string()]);
    }

    #[tokio::test]
    #[ignore] // Needs DART_API_KEY and network access
    async fn test_company_samsung() {
        let key = std::env::var("DART_API_KEY").expect("DART_API_KEY not set");
        let client = DartClient::new(key).unwrap();
        let info = client.company("00126380").await.unwrap();
        assert_eq!(info.corp_cls.as_deref(), Some("Y"));
    }
}
