//! RSS markup parsing.
//!
//! Only the handful of `<item>` children the sync needs are read. Anything
//! whose root element is not an RSS root is rejected as [`Error::NotAFeed`],
//! which is what bot walls and access-denied pages served with a 200 look
//! like from here.

use cg_core::{Error, Result};
use lazy_static::lazy_static;
use quick_xml::events::Event;
use quick_xml::name::QName;
use quick_xml::Reader;
use regex::Regex;

lazy_static! {
    static ref CONTROL_CHARS: Regex = Regex::new(r"[\x00-\x08\x0B\x0C\x0E-\x1F\x7F]").unwrap();
}

/// The raw text of one `<item>`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedEntry {
    pub title: Option<String>,
    pub link: Option<String>,
    pub guid: Option<String>,
    pub pub_date: Option<String>,
    pub description: Option<String>,
    /// `dc:creator` or any other prefixed creator
    pub creator: Option<String>,
    /// an unprefixed `creator`
    pub bare_creator: Option<String>,
}

impl FeedEntry {
    /// Prefixed creator first, then the unprefixed one. Blank values count
    /// as missing.
    pub fn author(&self) -> Option<&str> {
        [&self.creator, &self.bare_creator]
            .into_iter()
            .filter_map(|c| c.as_deref())
            .map(str::trim)
            .find(|c| !c.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Title,
    Link,
    Guid,
    PubDate,
    Description,
    Creator,
    BareCreator,
}

impl Field {
    fn from_name(local: &[u8], prefixed: bool) -> Option<Self> {
        match (local, prefixed) {
            (b"title", false) => Some(Field::Title),
            (b"link", false) => Some(Field::Link),
            (b"guid", false) => Some(Field::Guid),
            (b"pubDate", false) => Some(Field::PubDate),
            (b"description", false) => Some(Field::Description),
            (b"creator", true) => Some(Field::Creator),
            (b"creator", false) => Some(Field::BareCreator),
            _ => None,
        }
    }

    fn slot<'a>(&self, entry: &'a mut FeedEntry) -> &'a mut Option<String> {
        match self {
            Field::Title => &mut entry.title,
            Field::Link => &mut entry.link,
            Field::Guid => &mut entry.guid,
            Field::PubDate => &mut entry.pub_date,
            Field::Description => &mut entry.description,
            Field::Creator => &mut entry.creator,
            Field::BareCreator => &mut entry.bare_creator,
        }
    }
}

/// Decode bytes as UTF-8 and drop control characters XML parsers choke on.
pub fn clean_markup(raw: &[u8]) -> String {
    let text = String::from_utf8_lossy(raw);
    CONTROL_CHARS.replace_all(&text, "").into_owned()
}

/// Parse a feed page into its entries, in document order.
pub fn parse_feed(raw: &[u8]) -> Result<Vec<FeedEntry>> {
    let text = clean_markup(raw);
    // Whitespace is kept so split text segments join the way the source had them.
    let mut reader = Reader::from_str(&text);

    let mut root_seen = false;
    let mut entries = Vec::new();
    let mut current: Option<FeedEntry> = None;
    let mut field: Option<Field> = None;
    let mut nested = 0usize;
    let mut value = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                if !root_seen {
                    check_root(e.local_name().as_ref())?;
                    root_seen = true;
                    continue;
                }
                if field.is_some() {
                    nested += 1;
                } else if current.is_some() {
                    let prefixed = e.name().prefix().is_some();
                    match Field::from_name(e.local_name().as_ref(), prefixed) {
                        Some(f) => {
                            field = Some(f);
                            value.clear();
                        }
                        None => skip_element(&mut reader, e.name())?,
                    }
                } else if e.local_name().as_ref() == b"item" {
                    current = Some(FeedEntry::default());
                }
            }
            Ok(Event::Empty(e)) => {
                if !root_seen {
                    check_root(e.local_name().as_ref())?;
                    root_seen = true;
                }
            }
            Ok(Event::Text(e)) => {
                if field.is_some() {
                    let text = e
                        .unescape()
                        .map(|t| t.into_owned())
                        .unwrap_or_else(|_| String::from_utf8_lossy(&e).into_owned());
                    value.push_str(&text);
                }
            }
            Ok(Event::CData(e)) => {
                if field.is_some() {
                    value.push_str(&String::from_utf8_lossy(&e.into_inner()));
                }
            }
            Ok(Event::End(e)) => {
                if nested > 0 {
                    nested -= 1;
                } else if let Some(f) = field.take() {
                    if let Some(entry) = current.as_mut() {
                        let slot = f.slot(entry);
                        if slot.is_none() {
                            *slot = Some(value.trim().to_string());
                        }
                    }
                    value.clear();
                } else if e.local_name().as_ref() == b"item" {
                    if let Some(entry) = current.take() {
                        entries.push(entry);
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                if !root_seen {
                    return Err(Error::NotAFeed(format!("unreadable markup: {}", e)));
                }
                return Err(Error::Feed(format!(
                    "malformed markup at byte {}: {}",
                    reader.buffer_position(),
                    e
                )));
            }
            _ => {}
        }
    }

    if !root_seen {
        return Err(Error::NotAFeed("no root element".to_string()));
    }
    Ok(entries)
}

fn check_root(local: &[u8]) -> Result<()> {
    match local {
        b"rss" | b"RDF" => Ok(()),
        other => Err(Error::NotAFeed(format!(
            "root element is <{}>",
            String::from_utf8_lossy(other)
        ))),
    }
}

fn skip_element(reader: &mut Reader<&[u8]>, name: QName) -> Result<()> {
    reader
        .read_to_end(name)
        .map(|_| ())
        .map_err(|e| Error::Feed(format!("malformed markup: {}", e)))
}
