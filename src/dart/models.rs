// src/dart/models.rs
use crate::models::roster::RosterEntry;
use crate::utils::error::DartError;
use serde::Deserialize;

/// Status DART returns for a successful call.
pub const STATUS_OK: &str = "000";
/// Status for a lookup that found nothing (e.g. a delisted company).
pub const STATUS_NO_DATA: &str = "013";

/// Entry of CORPCODE.xml (every company DART knows, listed or not).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpCodeEntry {
    pub corp_code: String,
    pub corp_name: String,
    pub stock_code: String, // blank for unlisted companies
    pub modify_date: String,
}

impl CorpCodeEntry {
    pub fn is_listed(&self) -> bool {
        !self.stock_code.trim().is_empty()
    }

    pub fn into_roster_entry(self) -> RosterEntry {
        RosterEntry {
            corp_code: self.corp_code,
            corp_name: self.corp_name,
            stock_code: self.stock_code.trim().to_string(),
            modify_date: self.modify_date,
        }
    }
}

/// Company overview (`company.json`), trimmed to the identifying fields.
/// Example: https://opendart.fss.or.kr/api/company.json?crtfc_key=...&corp_code=00126380
#[derive(Debug, Clone, Deserialize)]
pub struct CompanyInfo {
    pub status: String,
    pub message: String,
    pub corp_code: Option<String>,
    pub corp_name: Option<String>,
    pub stock_name: Option<String>,
    pub stock_code: Option<String>,
    pub corp_cls: Option<String>,
    pub induty_code: Option<String>,
    pub est_dt: Option<String>,
    pub acc_mt: Option<String>,
}

impl CompanyInfo {
    pub fn into_result(self) -> Result<Self, DartError> {
        if self.status == STATUS_OK {
            Ok(self)
        } else {
            Err(DartError::Api { status: self.status, message: self.message })
        }
    }
}

fn child_text(node: roxmltree::Node, tag: &str) -> String {
    node.children()
        .find(|child| child.has_tag_name(tag))
        .and_then(|child| child.text())
        .map(|text| text.trim().to_string())
        .unwrap_or_default()
}

/// Parses the `<result><list>...</list></result>` document of the corp-code archive.
pub fn parse_corp_code_xml(xml: &str) -> Result<Vec<CorpCodeEntry>, DartError> {
    let document = roxmltree::Document::parse(xml).map_err(|e| DartError::Parse(e.to_string()))?;

    let entries = document
        .descendants()
        .filter(|node| node.has_tag_name("list"))
        .map(|node| CorpCodeEntry {
            corp_code: child_text(node, "corp_code"),
            corp_name: child_text(node, "corp_name"),
            stock_code: child_text(node, "stock_code"),
            modify_date: child_text(node, "modify_date"),
        })
        .filter(|entry| !entry.corp_code.is_empty())
        .collect();

    Ok(entries)
}

/// DART answers an invalid corp-code request with a bare XML status document
/// instead of an archive.
pub fn parse_status_xml(xml: &str) -> DartError {
    match roxmltree::Document::parse(xml) {
        Ok(document) => {
            let root = document.root_element();
            DartError::Api {
                status: child_text(root, "status"),
                message: child_text(root, "message"),
            }
        }
        Err(e) => DartError::Parse(format!("Unexpected corp-code response: {}", e)),
    }
}
