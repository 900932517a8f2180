// File: src/client/discovery.rs
//! Finds the published sheets linked from the planning page.
use crate::client::http::{FetchError, Fetcher};
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};

pub const SUPPORTED_MONTHS: [&str; 11] = [
    "septembre",
    "octobre",
    "novembre",
    "decembre",
    "janvier",
    "fevrier",
    "mars",
    "avril",
    "mai",
    "juin",
    "juillet",
];

static IFRAME: Lazy<Selector> = Lazy::new(|| Selector::parse("iframe[src]").unwrap());
static LABEL: Lazy<Selector> = Lazy::new(|| Selector::parse("label").unwrap());

/// One month of the planning and the CSV export of its sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthSource {
    pub month: String,
    pub csv_url: String,
}

impl MonthSource {
    /// HTML pages carrying the sheet styles, best first.
    pub fn markup_variants(&self) -> Vec<String> {
        let base = markup_base_url(&self.csv_url);
        vec![format!("{}&widget=false", base), base]
    }
}

/// Lowercases a label and strips the French accents used in month names.
pub fn normalize_month(label: &str) -> String {
    label
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'é' | 'è' => 'e',
            'ç' => 'c',
            'à' => 'a',
            'ù' => 'u',
            'ô' => 'o',
            other => other,
        })
        .collect()
}

pub fn csv_url_from_html(html_url: &str) -> String {
    format!("{}&output=csv", html_url.replace("/pubhtml?", "/pub?"))
}

pub fn markup_base_url(csv_url: &str) -> String {
    csv_url
        .replace("/pub?", "/pubhtml?")
        .replace("&output=csv", "")
}

/// Pairs month labels with the published iframes, in page order.
///
/// Returns `None` when the counts disagree, since pairing would then be a guess.
pub fn parse_month_sources(html: &str) -> Option<Vec<MonthSource>> {
    let document = Html::parse_document(html);

    let links: Vec<&str> = document
        .select(&IFRAME)
        .filter_map(|el| el.value().attr("src"))
        .filter(|src| src.contains("pubhtml"))
        .collect();

    let months: Vec<String> = document
        .select(&LABEL)
        .map(|el| normalize_month(&el.text().collect::<String>()))
        .filter(|m| SUPPORTED_MONTHS.contains(&m.as_str()))
        .collect();

    if months.len() != links.len() {
        log::warn!(
            "Month count ({}) does not match link count ({})",
            months.len(),
            links.len()
        );
        return None;
    }

    let sources: Vec<MonthSource> = months
        .into_iter()
        .zip(links)
        .map(|(month, link)| MonthSource {
            month,
            csv_url: csv_url_from_html(link),
        })
        .collect();

    for s in &sources {
        log::info!("Found: {} -> {}", s.month, s.csv_url);
    }
    Some(sources)
}

/// Fetches the planning page and extracts its month sources.
pub async fn discover<F: Fetcher>(
    fetcher: &F,
    planning_url: &str,
) -> Result<Option<Vec<MonthSource>>, FetchError> {
    log::info!("Extracting months from {}", planning_url);
    let html = fetcher.get_text(planning_url).await?;
    Ok(parse_month_sources(&html))
}
