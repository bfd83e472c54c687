//! Wiki section extractor.
//!
//! Discovers the pages a wiki's root page links to, then cuts every page
//! into header-delimited sections. Discovery is shallow: the page set is
//! fixed by the root page's outgoing links, never by recursion.
//!
//! Any fetch or parse failure aborts the whole run.

use std::collections::HashSet;
use std::time::Duration;

use scraper::{ElementRef, Html, Selector};
use tracing::debug;
use url::Url;

use wikisage_core::error::{Result, WikisageError};
use wikisage_core::types::Section;

use crate::splitter::{heading_level, split_fragment};

const USER_AGENT: &str = concat!("Wikisage/", env!("CARGO_PKG_VERSION"));

/// Extracts sections from a single wiki site.
pub struct WikiExtractor {
    client: reqwest::Client,
    root_url: Url,
}

impl WikiExtractor {
    /// Create an extractor rooted at `root_url`.
    pub fn new(root_url: &str) -> Result<Self> {
        let root_url = Url::parse(root_url)
            .map_err(|e| WikisageError::Parse(format!("invalid wiki URL {root_url}: {e}")))?;
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| WikisageError::Fetch(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, root_url })
    }

    /// Run the full extraction: discover pages, cut them into sections,
    /// filter, dedupe, and stamp provenance.
    pub async fn extract(&self) -> Result<Vec<Section>> {
        let page_urls = self.discover_pages().await?;
        debug!(pages = page_urls.len(), "discovered wiki pages");

        let mut sections = Vec::new();
        for (i, url) in page_urls.iter().enumerate() {
            debug!(n = i + 1, %url, "fetching page");
            let html = self.fetch(url).await?;
            let page_sections = extract_page_sections(&html, url);
            debug!(sections = page_sections.len(), %url, "extracted sections");
            sections.extend(page_sections);
        }

        let total = sections.len();
        let sections = finalize(sections);
        debug!(
            raw = total,
            kept = sections.len(),
            "filtered and deduplicated sections"
        );
        Ok(sections)
    }

    /// Discover the set of same-site pages linked from the root page.
    ///
    /// Keeps links whose `href` is relative (starts with `/`) and which still
    /// resolve inside the root URL, with fragments stripped, deduplicated by
    /// exact URL string, in discovery order.
    pub async fn discover_pages(&self) -> Result<Vec<Url>> {
        let html = self.fetch(&self.root_url).await?;
        let doc = Html::parse_document(&html);
        let anchors = Selector::parse("a[href]").expect("static selector");

        let mut seen = HashSet::new();
        let mut pages = Vec::new();
        for el in doc.select(&anchors) {
            let Some(href) = el.value().attr("href") else {
                continue;
            };
            if !href.starts_with('/') {
                continue;
            }
            let Ok(mut full) = self.root_url.join(href) else {
                continue;
            };
            full.set_fragment(None);
            if !full.as_str().starts_with(self.root_url.as_str()) {
                continue;
            }
            if seen.insert(full.to_string()) {
                pages.push(full);
            }
        }
        Ok(pages)
    }

    async fn fetch(&self, url: &Url) -> Result<String> {
        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| WikisageError::Fetch(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(WikisageError::Fetch(format!("{url}: HTTP {status}")));
        }

        response
            .text()
            .await
            .map_err(|e| WikisageError::Fetch(format!("{url}: body read failed: {e}")))
    }
}

/// Cut one page into sections.
///
/// Every heading (h1-h6) outside `nav`/`aside` that carries a hyperlink
/// anchors a section. The section's fragment is the heading plus following
/// siblings up to the next sibling heading; the structural splitter then
/// produces one chunk per (possibly nested) header scope.
fn extract_page_sections(html: &str, page_url: &Url) -> Vec<Section> {
    let doc = Html::parse_document(html);
    let headings = Selector::parse("h1, h2, h3, h4, h5, h6").expect("static selector");
    let anchor = Selector::parse("a[href]").expect("static selector");

    let mut sections = Vec::new();
    for heading in doc.select(&headings) {
        if in_suppressed_region(heading) {
            continue;
        }
        let Some(subroute) = heading
            .select(&anchor)
            .next()
            .and_then(|a| a.value().attr("href"))
        else {
            continue;
        };

        let heading_text = heading.text().collect::<String>().trim().to_string();
        let source_url = format!("{}{}", page_url, subroute);

        let mut fragment = vec![heading];
        for sibling in heading.next_siblings() {
            let Some(el) = ElementRef::wrap(sibling) else {
                continue;
            };
            if heading_level(el.value().name()).is_some() {
                break;
            }
            fragment.push(el);
        }

        for chunk in split_fragment(&fragment) {
            sections.push(Section {
                content: format!("{}\n\n{}", heading_text, chunk.text),
                source_url: source_url.clone(),
            });
        }
    }
    sections
}

/// True if the element sits inside a `nav` or `aside` subtree.
fn in_suppressed_region(el: ElementRef) -> bool {
    el.ancestors()
        .filter_map(ElementRef::wrap)
        .any(|a| matches!(a.value().name(), "nav" | "aside"))
}

/// Post-processing: drop empty sections, dedupe exact content duplicates
/// (first occurrence wins, order preserved), then stamp every survivor with
/// a provenance line naming its source URL.
fn finalize(sections: Vec<Section>) -> Vec<Section> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for section in sections {
        if section.content.trim().is_empty() {
            continue;
        }
        if !seen.insert(section.content.clone()) {
            continue;
        }
        out.push(section);
    }
    for section in &mut out {
        section.content = format!(
            "Wiki excerpt from URL: {}\n\n{}",
            section.source_url, section.content
        );
    }
    out
}
