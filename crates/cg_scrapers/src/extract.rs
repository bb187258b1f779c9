//! Turning feed entries into articles.

use cg_core::config::{ContentMode, IdStrategy, ScrapeConfig};
use cg_core::{Article, SkipReason};
use chrono::{DateTime, FixedOffset, Weekday};
use lazy_static::lazy_static;
use regex::Regex;
use scraper::{ElementRef, Html, Node};
use url::Url;
use crate::feed::FeedEntry;

/// The part of `Tue, 04 Jun 2024 14:30:00 -0400` after the weekday.
const DATE_TIME_FORMAT: &str = "%d %b %Y %H:%M:%S %z";

/// Elements whose edges separate words in the extracted text.
const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "dd", "div", "dl", "dt", "figcaption",
    "figure", "footer", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li", "ol", "p",
    "pre", "section", "table", "td", "th", "tr", "ul",
];

lazy_static! {
    static ref UUID: Regex =
        Regex::new(r"(?i)[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}").unwrap();
}

/// Parses `%a, %d %b %Y %H:%M:%S %z`. The weekday has to be a day name but
/// is not checked against the date.
pub fn parse_pub_date(raw: &str) -> Option<DateTime<FixedOffset>> {
    let (weekday, rest) = raw.trim().split_once(',')?;
    weekday.trim().parse::<Weekday>().ok()?;
    DateTime::parse_from_str(rest.trim(), DATE_TIME_FORMAT).ok()
}

/// The token at the end of a link's file name: `.../article_<token>.html`
/// yields `<token>`. Links without an underscore yield the whole file stem.
pub fn identifier_from_link(link: &str) -> Option<String> {
    let path = match Url::parse(link.trim()) {
        Ok(url) => url.path().to_string(),
        Err(_) => link
            .trim()
            .split(|c: char| c == '?' || c == '#')
            .next()
            .unwrap_or_default()
            .to_string(),
    };
    let segment = path.trim_end_matches('/').rsplit('/').next()?;
    let stem = segment.strip_suffix(".html").unwrap_or(segment);
    let token = stem.rsplit('_').next().unwrap_or(stem).trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

/// The first UUID-shaped substring, lower-cased.
pub fn identifier_from_guid(guid: &str) -> Option<String> {
    UUID.find(guid).map(|m| m.as_str().to_ascii_lowercase())
}

pub fn normalize_content(description: &str, mode: ContentMode) -> String {
    match mode {
        ContentMode::Raw => description.trim().to_string(),
        ContentMode::Plain => {
            let fragment = Html::parse_fragment(description);
            let mut text = String::new();
            collect_text(fragment.root_element(), &mut text);
            text.split_whitespace()
                .collect::<Vec<_>>()
                .join(" ")
                .to_lowercase()
        }
    }
}

fn collect_text(element: ElementRef, out: &mut String) {
    for child in element.children() {
        if let Some(child_element) = ElementRef::wrap(child) {
            let block = BLOCK_ELEMENTS.contains(&child_element.value().name());
            if block {
                out.push(' ');
            }
            collect_text(child_element, out);
            if block {
                out.push(' ');
            }
        } else if let Node::Text(text) = child.value() {
            out.push_str(text);
        }
    }
}

/// Applies the configured extraction rules to feed entries.
#[derive(Debug, Clone)]
pub struct EntryExtractor {
    id_strategy: IdStrategy,
    content_mode: ContentMode,
    default_author: String,
}

impl EntryExtractor {
    pub fn new(config: &ScrapeConfig) -> Self {
        Self {
            id_strategy: config.id_strategy,
            content_mode: config.content_mode,
            default_author: config.default_author.clone(),
        }
    }

    pub fn publish_time(&self, entry: &FeedEntry) -> Result<DateTime<FixedOffset>, SkipReason> {
        entry
            .pub_date
            .as_deref()
            .and_then(parse_pub_date)
            .ok_or(SkipReason::BadDate)
    }

    pub fn identifier(&self, entry: &FeedEntry) -> Result<String, SkipReason> {
        let link = entry.link.as_deref();
        let found = match self.id_strategy {
            IdStrategy::LinkFilename => link.and_then(identifier_from_link),
            IdStrategy::GuidUuid => entry
                .guid
                .as_deref()
                .and_then(identifier_from_guid)
                .or_else(|| link.and_then(identifier_from_guid)),
        };
        found.ok_or(SkipReason::NoIdentifier)
    }

    pub fn build(
        &self,
        entry: &FeedEntry,
        identifier: String,
        publish_time: DateTime<FixedOffset>,
    ) -> Result<Article, SkipReason> {
        let title = required(&entry.title, "title")?;
        let url = required(&entry.link, "link")?;
        let description = entry
            .description
            .as_deref()
            .ok_or(SkipReason::MissingField("description"))?;

        Ok(Article {
            identifier,
            title,
            author: entry
                .author()
                .map(str::to_string)
                .unwrap_or_else(|| self.default_author.clone()),
            content: normalize_content(description, self.content_mode),
            publish_time,
            url,
        })
    }
}

fn required(value: &Option<String>, field: &'static str) -> Result<String, SkipReason> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or(SkipReason::MissingField(field))
}
