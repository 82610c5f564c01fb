//! Embedded XMP packet extraction.
//!
//! The packet is located by scanning the raw file bytes for the `<x:xmpmeta` /
//! `</x:xmpmeta>` markers, so no container parser is involved. The packet is then
//! flattened: namespace declarations and known prefixes are removed and the
//! `rdf:Description` fields are mapped onto canonical tag names.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use std::sync::LazyLock;

use log::debug;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use regex::Regex;

use super::TagMap;
use crate::error::LoaderError;

pub const DEFAULT_CHUNK_SIZE: usize = 2048;

const START_MARKER: &[u8] = b"<x:xmpmeta";
const END_MARKER: &[u8] = b"</x:xmpmeta>";

/// Stripped from element and attribute names, in this order.
const PREFIXES: &[&str] = &[
    "x:",
    "rdf:",
    "dc:",
    "xmp:",
    "photoshop:",
    "xmpMM:",
    "xmpRights:",
    "crs:",
    "xml:",
    "stEvt:",
    "stRef:",
    "Iptc4xmpCore:",
];

static WRAPPER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"</?x:xmpmeta[^>]*>").expect("static regex"));
static XMLNS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"xmlns:[a-zA-Z0-9]+="[^"]+""#).expect("static regex"));

/// Simple `Description` fields: (name after prefix stripping, tag name).
const SIMPLE_FIELDS: &[(&str, &str)] = &[
    ("format", "Format"),
    ("auLensInfo", "Lens Info"),
    ("ModifyDate", "Modify Date"),
    ("CreateDate", "Create Date"),
    ("Label", "Label"),
    ("DateCreated", "Date Created"),
    ("Headline", "Headline"),
    ("AuthorsPosition", "Authors Position"),
    ("CaptionWriter", "Caption Writer"),
    ("Category", "Category"),
    ("City", "City"),
    ("State", "State"),
    ("Country", "Country"),
    ("TransmissionReference", "Transmission Reference"),
    ("Instructions", "Instructions"),
    ("Credit", "Credit"),
    ("Source", "Source"),
    ("IntellectualGenre", "Intellectual Genre"),
    ("Location", "Location"),
    ("CountryCode", "Country Code"),
    ("WebStatement", "URL"),
    ("Marked", "Copyright Flag"),
];

/// Language alternatives and sequences of which only the first item is kept.
const FIRST_ITEM_FIELDS: &[(&str, &str, &str)] = &[
    ("title", "Alt", "Title"),
    ("creator", "Seq", "Creator"),
    ("rights", "Alt", "Rights"),
    ("description", "Alt", "Description"),
    ("UsageTerms", "Alt", "Usage Terms"),
];

/// Bags joined with `", "`.
const BAG_FIELDS: &[(&str, &str)] = &[
    ("subject", "Subject"),
    ("SupplementalCategories", "Supplemental Categories"),
];

const CONTACT_FIELDS: &[(&str, &str)] = &[
    ("CiAdrExtadr", "Creator Address"),
    ("CiAdrCity", "Creator City"),
    ("CiAdrRegion", "Creator Region"),
    ("CiAdrPcode", "Creator Postal Code"),
    ("CiAdrCtry", "Creator Country"),
    ("CiTelWork", "Creator Work Telephone"),
    ("CiEmailWork", "Creator Work Email"),
    ("CiUrlWork", "Creator Work URL"),
];

/// Extract the XMP tags embedded in the file at `path`.
///
/// `Ok(None)` when the file carries no complete packet. Only a failure to open or read the
/// file is an error; a malformed packet yields an empty map.
pub fn extract_file(path: &Path, chunk_size: usize) -> Result<Option<TagMap>, LoaderError> {
    let file = File::open(path).map_err(|e| LoaderError::io(path, e))?;
    extract(file, chunk_size).map_err(|e| LoaderError::io(path, e))
}

/// Extract XMP tags from any byte stream. See [`extract_file`].
pub fn extract<R: Read>(reader: R, chunk_size: usize) -> io::Result<Option<TagMap>> {
    Ok(read_packet(reader, chunk_size)?.map(|packet| parse_packet(&packet)))
}

/// Scan `reader` chunk by chunk for the XMP packet and return it, markers included.
///
/// Reading stops as soon as the closing marker has been seen. A start marker without a
/// matching end marker yields `None`.
pub fn read_packet<R: Read>(mut reader: R, chunk_size: usize) -> io::Result<Option<String>> {
    let mut chunk = vec![0u8; chunk_size.max(START_MARKER.len())];
    // Bytes not yet known to be outside a start marker, or the packet once started.
    let mut buffer: Vec<u8> = Vec::new();
    let mut started = false;
    let mut search_from = 0;

    loop {
        let n = match reader.read(&mut chunk) {
            Ok(0) => return Ok(None),
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        buffer.extend_from_slice(&chunk[..n]);

        if !started {
            match find(&buffer, START_MARKER) {
                Some(pos) => {
                    buffer.drain(..pos);
                    started = true;
                    search_from = 0;
                }
                None => {
                    // Keep a tail that may hold the first half of a split marker.
                    let keep = (START_MARKER.len() - 1).min(buffer.len());
                    buffer.drain(..buffer.len() - keep);
                    continue;
                }
            }
        }

        if let Some(pos) = find(&buffer[search_from..], END_MARKER) {
            buffer.truncate(search_from + pos + END_MARKER.len());
            return Ok(Some(String::from_utf8_lossy(&buffer).into_owned()));
        }
        search_from = buffer.len().saturating_sub(END_MARKER.len() - 1);
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Flatten a raw packet (as returned by [`read_packet`]) into a tag map.
pub fn parse_packet(packet: &str) -> TagMap {
    let packet = packet.replace("\r\n", "\n").replace('\r', "\n");
    let packet = WRAPPER_RE.replace_all(&packet, "");
    let packet = XMLNS_RE.replace_all(packet.trim(), "");

    match parse_tree(&packet) {
        Ok(root) => map_descriptions(&root),
        Err(e) => {
            debug!("Malformed XMP packet: {e}");
            TagMap::new()
        }
    }
}

// ── element tree ──

#[derive(Debug, Default)]
struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Element>,
    text: String,
}

impl Element {
    fn from_start(start: &BytesStart<'_>) -> Result<Self, quick_xml::Error> {
        let mut attributes = Vec::new();
        for attr in start.attributes().with_checks(false) {
            let attr = attr?;
            let key = String::from_utf8_lossy(attr.key.as_ref());
            attributes.push((strip_prefixes(&key), attr.unescape_value()?.into_owned()));
        }
        Ok(Self {
            name: strip_prefixes(&String::from_utf8_lossy(start.name().as_ref())),
            attributes,
            ..Default::default()
        })
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    /// An attribute, or the text of a child element without children of its own.
    fn field(&self, name: &str) -> Option<String> {
        self.attribute(name)
            .map(str::to_string)
            .or_else(|| {
                self.child(name)
                    .filter(|c| c.children.is_empty())
                    .map(|c| c.text.clone())
            })
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    /// Texts of `<name><container><li>..</li>..</container></name>`.
    fn list_items(&self, name: &str, container: &str) -> Vec<String> {
        self.child(name)
            .and_then(|c| c.child(container))
            .map(|list| {
                list.children
                    .iter()
                    .filter(|li| li.name == "li")
                    .map(|li| li.text.trim().to_string())
                    .filter(|t| !t.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }

    fn collect<'a>(&'a self, name: &str, out: &mut Vec<&'a Element>) {
        if self.name == name {
            out.push(self);
        }
        for child in &self.children {
            child.collect(name, out);
        }
    }
}

fn strip_prefixes(name: &str) -> String {
    PREFIXES
        .iter()
        .fold(name.to_string(), |acc, prefix| acc.replace(prefix, ""))
}

fn parse_tree(xml: &str) -> Result<Element, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack = vec![Element::default()];
    loop {
        match reader.read_event()? {
            Event::Start(start) => stack.push(Element::from_start(&start)?),
            Event::Empty(start) => {
                let element = Element::from_start(&start)?;
                if let Some(parent) = stack.last_mut() {
                    parent.children.push(element);
                }
            }
            Event::End(_) => fold_last(&mut stack),
            Event::Text(text) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&text.unescape()?);
                }
            }
            Event::CData(data) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&String::from_utf8_lossy(&data));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    // Unclosed elements are folded into their parents.
    while stack.len() > 1 {
        fold_last(&mut stack);
    }
    Ok(stack.pop().unwrap_or_default())
}

/// Pop the innermost open element into its parent. The root is never popped.
fn fold_last(stack: &mut Vec<Element>) {
    if stack.len() < 2 {
        return;
    }
    if let Some(element) = stack.pop() {
        if let Some(parent) = stack.last_mut() {
            parent.children.push(element);
        }
    }
}

// ── field mapping ──

fn map_descriptions(root: &Element) -> TagMap {
    let mut descriptions = Vec::new();
    root.collect("Description", &mut descriptions);

    let mut result = TagMap::new();
    let mut put = |key: &str, value: Option<String>| {
        if let Some(value) = value {
            result.insert_if_absent(key, value);
        }
    };

    for description in &descriptions {
        put(
            "Lens ID",
            description
                .field("auLens")
                .or_else(|| description.field("auLensID")),
        );
        for (name, key) in SIMPLE_FIELDS {
            put(key, description.field(name));
        }
        for (name, container, key) in FIRST_ITEM_FIELDS {
            put(key, description.list_items(name, container).into_iter().next());
        }
        for (name, key) in BAG_FIELDS {
            let items = description.list_items(name, "Bag");
            put(key, (!items.is_empty()).then(|| items.join(", ")));
        }
        if let Some(contact) = description.child("CreatorContactInfo") {
            for (name, key) in CONTACT_FIELDS {
                put(key, contact.field(name));
            }
        }
    }
    result
}
