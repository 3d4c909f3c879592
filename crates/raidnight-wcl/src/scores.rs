//! Ranked performance scores from pre-rendered fight ranking pages.
//!
//! The ranking page is rendered client-side, so this module never talks to
//! the site directly. Pages come either from a render endpoint
//! (`WclConfig::score_page_url`) or from a directory of saved
//! `{code}-{fight}.html` files.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use raidnight_core::{FetchError, FetchResult, PerformanceScore, ScoreSheet, ScoreSource};
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, instrument, warn};

use crate::client::{redacted, USER_AGENT};
use crate::config::{RetryPolicy, WclConfig};
use crate::error::WclError;
use crate::retry::with_retry;

/// Spec icons whose rows are support performances, not output.
pub const HEALER_SPECS: [&str; 6] = [
    "Monk-Mistweaver",
    "Paladin-Holy",
    "Druid-Restoration",
    "Priest-Discipline",
    "Priest-Holy",
    "Shaman-Restoration",
];

struct PageSelectors {
    row: Selector,
    overall: Selector,
    name: Selector,
    gear: Selector,
    anchor: Selector,
    icon: Selector,
}

impl PageSelectors {
    fn new() -> Result<Self, WclError> {
        Ok(Self {
            row: selector(r#"[id*="main-table-row"]"#)?,
            overall: selector(".main-table-performance")?,
            name: selector(".main-table-link")?,
            gear: selector(".main-table-ilvl-performance")?,
            anchor: selector("a")?,
            icon: selector("img")?,
        })
    }
}

fn selector(css: &str) -> Result<Selector, WclError> {
    Selector::parse(css).map_err(|e| WclError::ScorePage(format!("bad selector {css}: {e}")))
}

/// Parse one ranking page into a score sheet.
///
/// Rows missing any of the three score cells are skipped, as are support
/// specs. A score that does not parse as an integer is recorded as 0.
pub fn parse_score_page(html: &str) -> Result<ScoreSheet, WclError> {
    let sel = PageSelectors::new()?;
    let document = Html::parse_document(html);
    let mut sheet = ScoreSheet::new();

    for row in document.select(&sel.row) {
        let (Some(overall), Some(name), Some(gear)) = (
            row.select(&sel.overall).next(),
            row.select(&sel.name).next(),
            row.select(&sel.gear).next(),
        ) else {
            continue;
        };

        let spec = row
            .select(&sel.icon)
            .next()
            .and_then(|img| img.value().attr("src"))
            .and_then(spec_from_icon);
        if spec.is_some_and(|s| HEALER_SPECS.contains(&s)) {
            continue;
        }

        let participant = anchor_text(name, &sel.anchor);
        if participant.is_empty() {
            continue;
        }
        let score = PerformanceScore::new(
            parse_score(&anchor_text(overall, &sel.anchor)),
            parse_score(&anchor_text(gear, &sel.anchor)),
        );
        sheet.insert(participant, score);
    }
    Ok(sheet)
}

fn anchor_text(cell: ElementRef<'_>, anchor: &Selector) -> String {
    cell.select(anchor)
        .next()
        .map(|a| a.text().collect::<String>().trim().to_string())
        .unwrap_or_default()
}

fn parse_score(text: &str) -> i64 {
    text.replace('*', "").trim().parse().unwrap_or(0)
}

/// `/img/specs/Priest-Holy.jpg` -> `Priest-Holy`
fn spec_from_icon(src: &str) -> Option<&str> {
    let file = src.rsplit('/').next()?;
    file.rsplit_once('.').map(|(stem, _)| stem)
}

/// Where ranking pages come from.
#[derive(Debug, Clone, PartialEq)]
pub enum PageSource {
    /// Render endpoint with `{code}` and `{fight}` placeholders
    Http { url_template: String },
    /// Directory of `{code}-{fight}.html` files
    Directory(PathBuf),
}

impl PageSource {
    /// The configured render endpoint, otherwise `fallback_dir`.
    pub fn from_config(config: &WclConfig, fallback_dir: PathBuf) -> Self {
        match &config.score_page_url {
            Some(template) => PageSource::Http {
                url_template: template.clone(),
            },
            None => PageSource::Directory(fallback_dir),
        }
    }
}

pub fn page_url(template: &str, report_code: &str, fight_id: u64) -> String {
    template
        .replace("{code}", report_code)
        .replace("{fight}", &fight_id.to_string())
}

pub fn page_file_name(report_code: &str, fight_id: u64) -> String {
    format!("{report_code}-{fight_id}.html")
}

/// `ScoreSource` over pre-rendered ranking pages.
#[derive(Debug, Clone)]
pub struct ScorePageScraper {
    source: PageSource,
    retry: RetryPolicy,
    http: reqwest::Client,
}

impl ScorePageScraper {
    pub fn new(source: PageSource, config: &WclConfig) -> Result<Self, WclError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            source,
            retry: config.retry.clone(),
            http,
        })
    }

    pub fn source(&self) -> &PageSource {
        &self.source
    }

    async fn get_page(&self, url: &str) -> Result<String, WclError> {
        let resp = self.http.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let shown = reqwest::Url::parse(url)
                .map(|u| redacted(&u))
                .unwrap_or_else(|_| url.to_string());
            return Err(WclError::Status {
                status: status.as_u16(),
                url: shown,
            });
        }
        Ok(resp.text().await?)
    }
}

#[async_trait]
impl ScoreSource for ScorePageScraper {
    #[instrument(skip(self), fields(report = %report_code, fight = fight_id))]
    async fn fetch_scores(&self, report_code: &str, fight_id: u64) -> FetchResult<ScoreSheet> {
        let resource = format!("scores/{report_code}/{fight_id}");
        let html = match &self.source {
            PageSource::Http { url_template } => {
                let url = page_url(url_template, report_code, fight_id);
                with_retry(&self.retry, &resource, || self.get_page(&url)).await?
            }
            PageSource::Directory(dir) => {
                let path = dir.join(page_file_name(report_code, fight_id));
                match tokio::fs::read_to_string(&path).await {
                    Ok(html) => html,
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                        warn!(path = %path.display(), "no saved score page, using empty sheet");
                        return Ok(ScoreSheet::new());
                    }
                    Err(e) => return Err(FetchError::permanent(resource, e.to_string())),
                }
            }
        };

        let sheet =
            parse_score_page(&html).map_err(|e| FetchError::permanent(&resource, e.to_string()))?;
        debug!(participants = sheet.len(), "parsed score page");
        Ok(sheet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: &str, icon: &str, name: &str, overall: &str, gear: &str) -> String {
        format!(
            r#"<tr id="{id}">
                 <td class="main-table-performance"><a>{overall}</a></td>
                 <td class="main-table-link"><img src="/img/specs/{icon}.jpg"><a href="/character/1"> {name} </a></td>
                 <td class="main-table-ilvl-performance"><a>{gear}</a></td>
               </tr>"#
        )
    }

    fn page(rows: &[String]) -> String {
        format!(
            "<html><body><table><tbody>{}</tbody></table></body></html>",
            rows.concat()
        )
    }

    #[test]
    fn spec_is_icon_file_stem() {
        assert_eq!(spec_from_icon("/img/specs/Priest-Holy.jpg"), Some("Priest-Holy"));
        assert_eq!(spec_from_icon("Mage-Fire.v2.png"), Some("Mage-Fire.v2"));
        assert_eq!(spec_from_icon("no-extension"), None);
    }

    #[test]
    fn starred_and_garbage_scores() {
        assert_eq!(parse_score("95*"), 95);
        assert_eq!(parse_score(" 7 "), 7);
        assert_eq!(parse_score("-"), 0);
        assert_eq!(parse_score(""), 0);
    }

    #[test]
    fn parses_output_rows_and_skips_support() {
        let html = page(&[
            row("main-table-row-1", "Mage-Fire", "Alpha", "80", "90*"),
            row("main-table-row-2", "Priest-Holy", "Healer", "99", "99"),
            row("main-table-row-3", "Rogue-Outlaw", "Beta", "n/a", "55"),
        ]);
        let sheet = parse_score_page(&html).unwrap();

        assert_eq!(sheet.len(), 2);
        assert_eq!(sheet["Alpha"], PerformanceScore::new(80, 90));
        assert_eq!(sheet["Beta"], PerformanceScore::new(0, 55));
        assert!(!sheet.contains_key("Healer"));
    }

    #[test]
    fn rows_missing_a_cell_are_skipped() {
        let html = page(&[
            r#"<tr id="main-table-row-9"><td class="main-table-link"><a>Gamma</a></td></tr>"#
                .to_string(),
            r#"<tr id="other-row"><td class="main-table-performance"><a>1</a></td></tr>"#
                .to_string(),
        ]);
        assert!(parse_score_page(&html).unwrap().is_empty());
    }

    #[test]
    fn page_url_fills_placeholders() {
        assert_eq!(
            page_url("http://render.test/r/{code}?fight={fight}", "aBcD", 12),
            "http://render.test/r/aBcD?fight=12"
        );
        assert_eq!(page_file_name("aBcD", 12), "aBcD-12.html");
    }

    #[test]
    fn page_source_prefers_configured_endpoint() {
        let dir = PathBuf::from("/tmp/pages");
        assert_eq!(
            PageSource::from_config(&WclConfig::default(), dir.clone()),
            PageSource::Directory(dir.clone())
        );
        let cfg = WclConfig::default().with_score_page_url("http://render.test/{code}/{fight}");
        assert_eq!(
            PageSource::from_config(&cfg, dir),
            PageSource::Http {
                url_template: "http://render.test/{code}/{fight}".to_string()
            }
        );
    }

    #[tokio::test]
    async fn directory_source_reads_saved_pages() {
        let dir = tempfile::tempdir().unwrap();
        let html = page(&[row("main-table-row-1", "Mage-Fire", "Alpha", "80", "90")]);
        std::fs::write(dir.path().join("aBcD-3.html"), html).unwrap();

        let scraper = ScorePageScraper::new(
            PageSource::Directory(dir.path().to_path_buf()),
            &WclConfig::default(),
        )
        .unwrap();

        let sheet = scraper.fetch_scores("aBcD", 3).await.unwrap();
        assert_eq!(sheet["Alpha"], PerformanceScore::new(80, 90));

        let missing = scraper.fetch_scores("aBcD", 4).await.unwrap();
        assert!(missing.is_empty());
    }
}
