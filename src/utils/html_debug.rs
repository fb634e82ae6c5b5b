// src/utils/html_debug.rs
use std::fs;
use std::path::{Path, PathBuf};
use once_cell::sync::Lazy;
use regex::Regex;
use crate::utils::error::AppError;

/// Markup the pipeline reads from, tagged with the highlight class to use.
static SCRAPED_REGIONS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        (r#"(?i)<em[^>]*id=['"]?_market_sum['"]?[^>]*>"#, "gate"),
        (r"상장주식수", "gate"),
        (r#"(?i)<div[^>]*class=['"]?section cop_analysis['"]?[^>]*>"#, "analysis"),
        (r"(?i)<thead>", "analysis"),
        (r"(?:매출액|영업이익|당기순이익|ROE|부채비율|당좌비율|PER|PBR)", "metric"),
    ]
    .iter()
    .filter_map(|(pat, class)| Regex::new(pat).ok().map(|re| (re, *class)))
    .collect()
});

/// Wraps every match of `patterns` in a highlighted span. Overlapping matches
/// after the first are dropped.
pub fn annotate_html(html: &str, patterns: &[(Regex, &str)]) -> String {
    let mut highlights: Vec<(usize, usize, &str)> = patterns
        .iter()
        .flat_map(|(re, class)| re.find_iter(html).map(move |m| (m.start(), m.end(), *class)))
        .collect();
    highlights.sort_by_key(|h| (h.0, h.1));

    let mut out = String::from("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<style>\n");
    out.push_str(".highlight-gate { background-color: #FFFF00; }\n");
    out.push_str(".highlight-analysis { background-color: #90EE90; }\n");
    out.push_str(".highlight-metric { background-color: #ADD8E6; }\n");
    out.push_str("</style>\n</head>\n<body>\n");

    let mut last_pos = 0;
    for (start, end, class) in highlights {
        if start < last_pos {
            continue;
        }
        out.push_str(&html[last_pos..start]);
        out.push_str(&format!(
            "<span class=\"highlight-{}\" title=\"Position: {}-{}\">",
            class, start, end
        ));
        out.push_str(&html[start..end]);
        out.push_str("</span>");
        last_pos = end;
    }
    out.push_str(&html[last_pos..]);
    out.push_str("\n</body>\n</html>");
    out
}

/// Saves the fetched page and an annotated copy under `<dir>/<stock_code>/`.
pub fn save_debug_page(dir: &Path, stock_code: &str, html: &str) -> Result<PathBuf, AppError> {
    let target = dir.join(stock_code);
    fs::create_dir_all(&target)?;

    fs::write(target.join("raw_page.html"), html)?;
    let annotated = target.join("page_annotated.html");
    fs::write(&annotated, annotate_html(html, &SCRAPED_REGIONS))?;

    tracing::info!("Saved debug HTML to {}", annotated.display());
    Ok(annotated)
}
