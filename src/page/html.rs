//! Scanner for already-rendered HTML documents.
//!
//! Only the structure the navigation engine needs is kept: elements carrying
//! an `id` or `class`, in document order, with the text of the first heading
//! nested inside each of them. Parsing is lenient: void elements without a
//! closing slash, unmatched end tags, HTML entities and stray ampersands are
//! all tolerated. `<script>` and `<style>` bodies are skipped unparsed.

use std::borrow::Cow;
use std::fmt::Write as _;

use quick_xml::escape::{escape, resolve_html5_entity};
use quick_xml::events::{BytesStart, BytesText, Event};
use quick_xml::reader::Reader;
use tracing::trace;

use crate::error::DocumentError;
use crate::nav::SectionNode;
use crate::page::model::NavItem;

const VOID_ELEMENTS: [&str; 14] = [
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

const RAW_TEXT_ELEMENTS: [&str; 2] = ["script", "style"];

/// An element that carries an id or a class list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedElement {
    /// Lower-cased tag name.
    pub tag: String,
    /// Value of the `id` attribute.
    pub id: Option<String>,
    /// Whitespace-separated entries of the `class` attribute.
    pub classes: Vec<String>,
    /// Untrimmed text of the first `h1`..`h6` descendant.
    pub first_heading: Option<String>,
}

impl ScannedElement {
    /// Returns `true` if the class list contains `class`.
    #[must_use]
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    /// Engine view of this element.
    #[must_use]
    pub fn to_section(&self) -> SectionNode {
        SectionNode {
            id: self.id.clone(),
            first_heading: self.first_heading.clone(),
        }
    }
}

/// A parsed rendered document.
#[derive(Debug, Clone, Default)]
pub struct HtmlDocument {
    elements: Vec<ScannedElement>,
}

struct OpenElement {
    tag: String,
    element: Option<usize>,
}

struct HeadingCapture {
    depth: usize,
    text: String,
    owners: Vec<usize>,
}

impl HtmlDocument {
    /// Parses `html`.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::Malformed`] if the markup cannot be tokenised
    /// at all (for example an unterminated tag or comment).
    pub fn parse(html: &str) -> Result<Self, DocumentError> {
        let stripped = strip_raw_text(html);
        let source = escape_stray_lt(&stripped);
        let mut reader = Reader::from_str(&source);
        {
            let config = reader.config_mut();
            config.check_end_names = false;
            config.allow_unmatched_ends = true;
        }

        let mut doc = Self::default();
        let mut stack: Vec<OpenElement> = Vec::new();
        let mut captures: Vec<HeadingCapture> = Vec::new();

        loop {
            let event = reader.read_event().map_err(|e| DocumentError::Malformed {
                position: reader.error_position(),
                message: e.to_string(),
            })?;
            match event {
                Event::Start(start) => {
                    let tag = tag_name(&start);
                    let void = VOID_ELEMENTS.contains(&tag.as_str());
                    if is_heading(&tag) {
                        let owners = doc.unclaimed_open(&stack, &captures);
                        if !owners.is_empty() {
                            captures.push(HeadingCapture {
                                depth: stack.len(),
                                text: String::new(),
                                owners,
                            });
                        }
                    }
                    let element = doc.record(&start, &tag);
                    if !void {
                        stack.push(OpenElement { tag, element });
                    }
                }
                Event::Empty(start) => {
                    let tag = tag_name(&start);
                    doc.record(&start, &tag);
                }
                Event::End(end) => {
                    let tag = String::from_utf8_lossy(end.local_name().as_ref()).to_ascii_lowercase();
                    let Some(pos) = stack.iter().rposition(|open| open.tag == tag) else {
                        trace!(%tag, "ignoring unmatched end tag");
                        continue;
                    };
                    stack.truncate(pos);
                    while captures.last().is_some_and(|c| stack.len() <= c.depth) {
                        if let Some(done) = captures.pop() {
                            doc.finish(done);
                        }
                    }
                }
                Event::Text(text) if !captures.is_empty() => {
                    let text = decode_text(&text);
                    for capture in &mut captures {
                        capture.text.push_str(&text);
                    }
                }
                Event::CData(data) if !captures.is_empty() => {
                    let text = String::from_utf8_lossy(&data);
                    for capture in &mut captures {
                        capture.text.push_str(&text);
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        // Headings left open at end of input still label their sections.
        while let Some(done) = captures.pop() {
            doc.finish(done);
        }
        Ok(doc)
    }

    fn record(&mut self, start: &BytesStart<'_>, tag: &str) -> Option<usize> {
        let mut id = None;
        let mut classes = Vec::new();
        for attr in start.html_attributes().flatten() {
            let key = attr.key.local_name();
            let key = key.as_ref();
            if key.eq_ignore_ascii_case(b"id") {
                id = Some(attr_value(&attr));
            } else if key.eq_ignore_ascii_case(b"class") {
                classes = attr_value(&attr)
                    .split_ascii_whitespace()
                    .map(str::to_string)
                    .collect();
            }
        }
        if id.is_none() && classes.is_empty() {
            return None;
        }
        self.elements.push(ScannedElement {
            tag: tag.to_string(),
            id,
            classes,
            first_heading: None,
        });
        Some(self.elements.len() - 1)
    }

    /// Open elements that no finished or in-progress heading labels yet.
    fn unclaimed_open(&self, stack: &[OpenElement], captures: &[HeadingCapture]) -> Vec<usize> {
        stack
            .iter()
            .filter_map(|open| open.element)
            .filter(|&i| self.elements[i].first_heading.is_none())
            .filter(|i| !captures.iter().any(|c| c.owners.contains(i)))
            .collect()
    }

    fn finish(&mut self, capture: HeadingCapture) {
        for owner in capture.owners {
            self.elements[owner].first_heading = Some(capture.text.clone());
        }
    }

    /// Every element with an id or class, in document order.
    #[must_use]
    pub fn elements(&self) -> &[ScannedElement] {
        &self.elements
    }

    /// Elements whose class list contains `marker_class`, in document order.
    pub fn marked(&self, marker_class: &str) -> impl Iterator<Item = &ScannedElement> {
        let marker = marker_class.to_string();
        self.elements.iter().filter(move |e| e.has_class(&marker))
    }

    /// Engine view of the marker-class elements.
    #[must_use]
    pub fn sections(&self, marker_class: &str) -> Vec<SectionNode> {
        self.marked(marker_class).map(ScannedElement::to_section).collect()
    }

    /// Returns `true` if any element carries `id`.
    #[must_use]
    pub fn has_element(&self, id: &str) -> bool {
        self.elements.iter().any(|e| e.id.as_deref() == Some(id))
    }
}

/// Renders navigation items as the `<li>` markup the container receives.
///
/// The active item's link carries `active_class` and its decorated label.
#[must_use]
pub fn render_nav_items(items: &[NavItem], active_class: &str) -> String {
    let mut out = String::new();
    for item in items {
        let class = if item.active {
            format!("nav-link {active_class}")
        } else {
            "nav-link".to_string()
        };
        let _ = writeln!(
            out,
            r#"<li class="nav-item"><a class="{}" href="javascript:void(0)" data-scroll-target="{}">{}</a></li>"#,
            escape(class.as_str()),
            escape(item.target_id.as_str()),
            escape(item.display_label().as_str()),
        );
    }
    out
}

fn tag_name(start: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(start.local_name().as_ref()).to_ascii_lowercase()
}

fn is_heading(tag: &str) -> bool {
    matches!(tag, "h1" | "h2" | "h3" | "h4" | "h5" | "h6")
}

fn decode_text(text: &BytesText<'_>) -> String {
    text.unescape_with(resolve_html5_entity).map_or_else(
        |_| String::from_utf8_lossy(text.as_ref()).into_owned(),
        Cow::into_owned,
    )
}

fn attr_value(attr: &quick_xml::events::attributes::Attribute<'_>) -> String {
    attr.unescape_value().map_or_else(
        |_| String::from_utf8_lossy(&attr.value).into_owned(),
        Cow::into_owned,
    )
}

/// Escapes every `<` that cannot open a tag, comment or declaration.
///
/// Browsers keep such a `<` as text; the tokenizer would otherwise treat it
/// as the start of a malformed tag and drop what follows.
fn escape_stray_lt(html: &str) -> Cow<'_, str> {
    let bytes = html.as_bytes();
    let opens_markup =
        |i: usize| matches!(bytes.get(i + 1), Some(b) if b.is_ascii_alphabetic() || matches!(b, b'/' | b'!' | b'?'));
    if !bytes.iter().enumerate().any(|(i, &b)| b == b'<' && !opens_markup(i)) {
        return Cow::Borrowed(html);
    }

    let mut out = String::with_capacity(html.len() + 8);
    let mut cursor = 0;
    for (i, _) in html.match_indices('<') {
        if !opens_markup(i) {
            out.push_str(&html[cursor..i]);
            out.push_str("&lt;");
            cursor = i + 1;
        }
    }
    out.push_str(&html[cursor..]);
    Cow::Owned(out)
}

/// Removes the bodies of `<script>` and `<style>` elements, keeping the tags.
fn strip_raw_text(html: &str) -> Cow<'_, str> {
    let lower = html.to_ascii_lowercase();
    if !RAW_TEXT_ELEMENTS
        .iter()
        .any(|tag| lower.contains(&format!("<{tag}")))
    {
        return Cow::Borrowed(html);
    }

    let mut out = String::with_capacity(html.len());
    let mut cursor = 0;
    while cursor < html.len() {
        let next = RAW_TEXT_ELEMENTS
            .iter()
            .filter_map(|tag| find_open_tag(&lower, cursor, tag).map(|at| (at, *tag)))
            .min_by_key(|(at, _)| *at);
        let Some((open_at, tag)) = next else {
            break;
        };
        let Some(open_end) = lower[open_at..].find('>').map(|i| open_at + i + 1) else {
            break;
        };
        let close = format!("</{tag}");
        out.push_str(&html[cursor..open_end]);
        match lower[open_end..].find(&close) {
            Some(i) => cursor = open_end + i,
            None => {
                cursor = html.len();
                out.push_str(&close);
                out.push('>');
            }
        }
    }
    if cursor < html.len() {
        out.push_str(&html[cursor..]);
    }
    Cow::Owned(out)
}

fn find_open_tag(lower: &str, from: usize, tag: &str) -> Option<usize> {
    let needle = format!("<{tag}");
    let mut search = from;
    while let Some(i) = lower[search..].find(&needle) {
        let at = search + i;
        let after = lower.as_bytes().get(at + needle.len()).copied();
        if matches!(after, Some(b'>' | b'/') | Some(b' ' | b'\t' | b'\n' | b'\r')) {
            return Some(at);
        }
        search = at + needle.len();
    }
    None
}
