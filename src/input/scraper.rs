//! Job description scraping from URLs

use crate::config::ScrapeConfig;
use crate::error::{Result, ResumeMatcherError};
use crate::input::text_extractor::html_to_text;
use chrono::{DateTime, Local};
use log::{debug, info};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::Duration;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// Pages with less text than this are assumed to be rendered client-side.
const MIN_CONTENT_CHARS: usize = 200;
const JS_PROBE_CHARS: usize = 500;

static URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^https?://(?:(?:[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?\.)+[a-z]{2,63}\.?|localhost|\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3})(?::\d+)?(?:/?|[/?]\S+)$",
    )
    .expect("valid url regex")
});

static NOISE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?is)<script\b.*?</script>|<style\b.*?</style>|<nav\b.*?</nav>|<header\b.*?</header>|<footer\b.*?</footer>|<!--.*?-->",
    )
    .expect("valid noise regex")
});

static MAIN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<main\b[^>]*>(.*?)</main>").expect("valid main regex"));
static ARTICLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<article\b[^>]*>(.*?)</article>").expect("valid article regex")
});
static BODY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<body\b[^>]*>(.*?)</body>").expect("valid body regex"));

/// Job board description containers, most specific first.
static CONTAINER_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        ("class", "job[-_]description"),
        ("class", "description"),
        ("class", "job[-_]detail"),
        ("class", "posting"),
        ("id", "job[-_]description"),
        ("id", "description"),
    ]
    .iter()
    .map(|(attr, pattern)| {
        Regex::new(&format!(
            r#"(?is)<div\b[^>]*\b{}\s*=\s*["'][^"']*{}[^"']*["'][^>]*>"#,
            attr, pattern
        ))
        .expect("valid container regex")
    })
    .collect()
});
static DIV_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<div\b[^>]*>|</div\s*>").expect("valid div regex"));

pub fn is_url(text: &str) -> bool {
    URL_RE.is_match(text.trim())
}

/// Fetches job postings and reduces them to plain text.
pub struct JobScraper {
    client: reqwest::Client,
    save_dir: Option<PathBuf>,
}

impl JobScraper {
    pub fn new(config: &ScrapeConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| {
                ResumeMatcherError::Configuration(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            save_dir: config.save_scraped.then(|| config.save_dir.clone()),
        })
    }

    /// Fetch a posting and return its cleaned text, saving a copy when enabled.
    pub async fn scrape(&self, url: &str) -> Result<String> {
        let html = self.fetch(url).await?;
        let content = extract_job_text(&html)?;

        if let Some(dir) = &self.save_dir {
            let path = save_job_description(dir, url, &content, Local::now())?;
            info!("Saved scraped job description to {}", path.display());
        }

        Ok(content)
    }

    async fn fetch(&self, url: &str) -> Result<String> {
        info!("Fetching job description from {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ResumeMatcherError::Scrape(format!("Failed to fetch URL: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ResumeMatcherError::Scrape(format!(
                "Failed to fetch URL: {} returned {}",
                url, status
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ResumeMatcherError::Scrape(format!("Failed to read page body: {}", e)))?;
        debug!("Fetched {} bytes of HTML", body.len());
        Ok(body)
    }
}

/// Reduce a posting page to its readable text.
pub fn extract_job_text(html: &str) -> Result<String> {
    let cleaned = NOISE_RE.replace_all(html, "");

    let region = CONTAINER_RES
        .iter()
        .find_map(|re| div_contents(&cleaned, re))
        .or_else(|| {
            [&*MAIN_RE, &*ARTICLE_RE, &*BODY_RE]
                .iter()
                .find_map(|re| re.captures(&cleaned))
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str())
        })
        .unwrap_or(&cleaned);

    let text = html_to_text(region);

    let probe: String = text.chars().take(JS_PROBE_CHARS).collect::<String>().to_lowercase();
    if text.chars().count() < MIN_CONTENT_CHARS || probe.contains("javascript") {
        return Err(ResumeMatcherError::Scrape(
            "Unable to scrape - site requires JavaScript to load content. Save the posting to a text file instead."
                .to_string(),
        ));
    }

    Ok(text)
}

/// Inner HTML of the first div opened by `open`, up to its balancing `</div>`.
/// An unclosed div runs to the end of the page.
fn div_contents<'a>(html: &'a str, open: &Regex) -> Option<&'a str> {
    let start = open.find(html)?.end();
    let mut depth = 1usize;
    for tag in DIV_TAG_RE.find_iter(&html[start..]) {
        if tag.as_str().starts_with("</") {
            depth -= 1;
            if depth == 0 {
                return Some(&html[start..start + tag.start()]);
            }
        } else {
            depth += 1;
        }
    }
    Some(&html[start..])
}

/// `<domain>_<YYYYMMDD_HHMMSS>.txt`, with `www.` and the TLD dropped from the domain.
pub fn scraped_file_name(url: &str, at: DateTime<Local>) -> String {
    let host = url
        .split("://")
        .nth(1)
        .unwrap_or(url)
        .split(['/', '?', '#', ':'])
        .next()
        .unwrap_or("");
    let host = host.strip_prefix("www.").unwrap_or(host);
    let domain = host.split('.').next().filter(|d| !d.is_empty()).unwrap_or("job");

    format!("{}_{}.txt", domain, at.format("%Y%m%d_%H%M%S"))
}

pub fn save_job_description(
    dir: &Path,
    url: &str,
    content: &str,
    at: DateTime<Local>,
) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(scraped_file_name(url, at));

    let document = format!(
        "Source URL: {}\nScraped on: {}\n{}\n\n{}",
        url,
        at.format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(80),
        content
    );
    std::fs::write(&path, document)?;
    Ok(path)
}
