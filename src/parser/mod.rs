//! RSS parsing.
//!
//! The document is read with quick-xml. A document that is not well-formed
//! XML is rejected as a whole; past that point every field is optional and
//! defaults to the empty string, so a sparse item never aborts the parse.

use quick_xml::events::Event;
use quick_xml::reader::Reader;

use crate::app::{Result, TributaryError};
use crate::domain::{Feed, Post};

/// One parse of one feed document.
///
/// Every record carries a freshly generated id, so two parses of the same
/// document never share ids.
#[derive(Debug, Clone)]
pub struct ParsedFeed {
    pub feed: Feed,
    pub posts: Vec<Post>,
}

#[derive(Clone)]
pub struct FeedParser;

impl Default for FeedParser {
    fn default() -> Self {
        Self::new()
    }
}

impl FeedParser {
    pub fn new() -> Self {
        Self
    }

    pub fn parse(&self, feed_url: &str, content: &str) -> Result<ParsedFeed> {
        let document = read_document(content).map_err(TributaryError::InvalidFeedFormat)?;

        let feed = Feed::new(
            feed_url,
            document.title.unwrap_or_default(),
            document.description.unwrap_or_default(),
        );

        let posts = document
            .items
            .into_iter()
            .map(|item| {
                Post::new(
                    feed_url,
                    item.title.unwrap_or_default(),
                    item.description.unwrap_or_default(),
                    item.link.unwrap_or_default(),
                )
            })
            .collect();

        Ok(ParsedFeed { feed, posts })
    }
}

#[derive(Debug, Default)]
struct RawDocument {
    title: Option<String>,
    description: Option<String>,
    items: Vec<RawItem>,
}

#[derive(Debug, Default)]
struct RawItem {
    title: Option<String>,
    description: Option<String>,
    link: Option<String>,
}

#[derive(Debug, Clone, Copy)]
enum ChannelField {
    Title,
    Description,
}

#[derive(Debug, Clone, Copy)]
enum ItemField {
    Title,
    Description,
    Link,
}

impl RawItem {
    fn has(&self, field: ItemField) -> bool {
        match field {
            ItemField::Title => self.title.is_some(),
            ItemField::Description => self.description.is_some(),
            ItemField::Link => self.link.is_some(),
        }
    }

    fn field(&mut self, field: ItemField) -> &mut Option<String> {
        match field {
            ItemField::Title => &mut self.title,
            ItemField::Description => &mut self.description,
            ItemField::Link => &mut self.link,
        }
    }
}

/// Text content being collected for one element, closed at `depth`.
///
/// One element can fill the channel and every enclosing item that still
/// lacks that field.
struct Capture {
    depth: usize,
    text: String,
    channel: Option<ChannelField>,
    items: Vec<(usize, ItemField)>,
}

/// An item element opened at `depth`, stored at `index` in document order.
struct OpenItem {
    depth: usize,
    index: usize,
}

fn read_document(content: &str) -> std::result::Result<RawDocument, String> {
    let mut reader = Reader::from_str(content);

    let mut document = RawDocument::default();
    let mut stack: Vec<String> = Vec::new();
    let mut roots = 0usize;
    let mut open_items: Vec<OpenItem> = Vec::new();
    let mut capture: Option<Capture> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = qualified_name(e.name().as_ref());
                if stack.is_empty() {
                    roots += 1;
                    check_single_root(roots)?;
                }

                if capture.is_none() {
                    capture =
                        start_capture(&name, stack.last(), &document, &open_items, stack.len());
                }

                if name == "item" {
                    document.items.push(RawItem::default());
                    open_items.push(OpenItem {
                        depth: stack.len(),
                        index: document.items.len() - 1,
                    });
                }

                stack.push(name);
            }
            Ok(Event::Empty(e)) => {
                let name = qualified_name(e.name().as_ref());
                if stack.is_empty() {
                    roots += 1;
                    check_single_root(roots)?;
                }

                if capture.is_none() {
                    if let Some(empty) =
                        start_capture(&name, stack.last(), &document, &open_items, stack.len())
                    {
                        store(&mut document, empty);
                    }
                }

                if name == "item" {
                    document.items.push(RawItem::default());
                }
            }
            Ok(Event::End(e)) => {
                let name = qualified_name(e.name().as_ref());
                match stack.pop() {
                    Some(open) if open == name => {}
                    Some(open) => {
                        return Err(format!(
                            "mismatched end tag: expected </{}>, found </{}>",
                            open, name
                        ))
                    }
                    None => return Err(format!("unexpected end tag </{}>", name)),
                }

                if capture.as_ref().is_some_and(|c| c.depth == stack.len()) {
                    if let Some(done) = capture.take() {
                        store(&mut document, done);
                    }
                }

                if open_items.last().is_some_and(|open| open.depth == stack.len()) {
                    open_items.pop();
                }
            }
            Ok(Event::Text(e)) => {
                let text = e.unescape().map_err(|err| err.to_string())?;
                if stack.is_empty() {
                    if !text.trim().is_empty() {
                        return Err("text outside of the root element".to_string());
                    }
                    continue;
                }
                if let Some(capture) = capture.as_mut() {
                    capture.text.push_str(&text);
                }
            }
            Ok(Event::CData(e)) => {
                if stack.is_empty() {
                    return Err("CDATA outside of the root element".to_string());
                }
                if let Some(capture) = capture.as_mut() {
                    capture.text.push_str(&String::from_utf8_lossy(&e));
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(format!(
                    "XML error at position {}: {}",
                    reader.buffer_position(),
                    e
                ))
            }
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(format!("unclosed element <{}>", open));
    }
    if roots == 0 {
        return Err("document has no root element".to_string());
    }

    Ok(document)
}

fn qualified_name(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).into_owned()
}

fn check_single_root(roots: usize) -> std::result::Result<(), String> {
    if roots > 1 {
        Err("more than one root element".to_string())
    } else {
        Ok(())
    }
}

/// Which fields, if any, the element `name` fills. Only the first match of
/// each field counts, for the channel and for each enclosing item.
fn start_capture(
    name: &str,
    parent: Option<&String>,
    document: &RawDocument,
    open_items: &[OpenItem],
    depth: usize,
) -> Option<Capture> {
    let channel = match (parent.map(String::as_str), name) {
        (Some("channel"), "title") if document.title.is_none() => Some(ChannelField::Title),
        (Some("channel"), "description") if document.description.is_none() => {
            Some(ChannelField::Description)
        }
        _ => None,
    };

    let field = match name {
        "title" => Some(ItemField::Title),
        "description" => Some(ItemField::Description),
        "link" => Some(ItemField::Link),
        _ => None,
    };
    let items: Vec<(usize, ItemField)> = match field {
        Some(field) => open_items
            .iter()
            .filter(|open| {
                document
                    .items
                    .get(open.index)
                    .is_some_and(|item| !item.has(field))
            })
            .map(|open| (open.index, field))
            .collect(),
        None => Vec::new(),
    };

    if channel.is_none() && items.is_empty() {
        return None;
    }
    Some(Capture {
        depth,
        text: String::new(),
        channel,
        items,
    })
}

fn store(document: &mut RawDocument, capture: Capture) {
    match capture.channel {
        Some(ChannelField::Title) => document.title = Some(capture.text.clone()),
        Some(ChannelField::Description) => document.description = Some(capture.text.clone()),
        None => {}
    }
    for (index, field) in capture.items {
        if let Some(item) = document.items.get_mut(index) {
            *item.field(field) = Some(capture.text.clone());
        }
    }
}
