//! DataCite kernel-4 XML metadata
//!
//! The resource tree is an owned [`Element`] hierarchy built by the
//! functions in [`builder`] and serialized with quick-xml.

pub mod builder;

pub use builder::*;

use std::io::Write;
use std::path::Path;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use crate::error::{DataciteError, Result};

pub const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";
pub const KERNEL4_NAMESPACE: &str = "http://datacite.org/schema/kernel-4";
pub const KERNEL4_SCHEMA_LOCATION: &str =
    "http://datacite.org/schema/kernel-4 http://schema.datacite.org/meta/kernel-4/metadata.xsd";

/// A node of the in-memory XML document
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    /// In document order
    pub attributes: Vec<(String, String)>,
    pub text: Option<String>,
    pub children: Vec<Element>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Set an attribute, replacing an existing value of the same name
    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) -> &mut Self {
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| k == name) {
            Some((_, v)) => *v = value,
            None => self.attributes.push((name.to_string(), value)),
        }
        self
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn set_text(&mut self, text: impl Into<String>) -> &mut Self {
        self.text = Some(text.into());
        self
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Append an empty child and return it
    pub fn append(&mut self, name: &str) -> &mut Element {
        let idx = self.children.len();
        self.children.push(Element::new(name));
        &mut self.children[idx]
    }

    /// First child with the given name
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Text of every child named `name`, in order
    pub fn child_texts(&self, name: &str) -> Vec<String> {
        self.children_named(name)
            .map(|c| c.text.clone().unwrap_or_default())
            .collect()
    }

    fn write_into<W: Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        let mut start = BytesStart::new(self.name.as_str());
        for (key, value) in &self.attributes {
            start.push_attribute((key.as_str(), value.as_str()));
        }

        if self.children.is_empty() {
            match self.text.as_deref() {
                Some(text) => {
                    writer.write_event(Event::Start(start))?;
                    writer.write_event(Event::Text(BytesText::new(text)))?;
                    writer.write_event(Event::End(BytesEnd::new(self.name.as_str())))?;
                }
                None => writer.write_event(Event::Empty(start))?,
            }
            return Ok(());
        }

        // Mixed content is not part of the DataCite schema; text on a
        // non-leaf element is dropped in favour of indentation.
        writer.write_event(Event::Start(start))?;
        for child in &self.children {
            child.write_into(writer)?;
        }
        writer.write_event(Event::End(BytesEnd::new(self.name.as_str())))?;
        Ok(())
    }
}

/// The DataCite `resource` document
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DataCiteXmlMetadata {
    resource: Element,
}

impl Default for DataCiteXmlMetadata {
    fn default() -> Self {
        Self::new()
    }
}

impl DataCiteXmlMetadata {
    /// Empty `resource` root with the kernel-4 namespace declarations
    pub fn new() -> Self {
        Self {
            resource: create_resource_tree(),
        }
    }

    pub fn resource(&self) -> &Element {
        &self.resource
    }

    pub fn resource_mut(&mut self) -> &mut Element {
        &mut self.resource
    }

    pub fn into_resource(self) -> Element {
        self.resource
    }

    /// Serialize with an XML declaration and two-space indentation
    pub fn write_to<W: Write>(&self, sink: W) -> Result<()> {
        let mut writer = Writer::new_with_indent(sink, b' ', 2);
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
        self.resource.write_into(&mut writer)?;
        writer
            .get_mut()
            .write_all(b"\n")
            .map_err(|e| DataciteError::Xml(e.to_string()))?;
        Ok(())
    }

    pub fn to_xml_string(&self) -> Result<String> {
        let mut buf = Vec::new();
        self.write_to(&mut buf)?;
        String::from_utf8(buf).map_err(|e| DataciteError::Xml(e.to_string()))
    }

    /// Write the document to `path`, replacing any existing file
    pub fn write_resource_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let io_error = |source| DataciteError::Io {
            path: path.to_path_buf(),
            source,
        };
        let file = std::fs::File::create(path).map_err(io_error)?;
        let mut sink = std::io::BufWriter::new(file);
        self.write_to(&mut sink)?;
        sink.flush().map_err(io_error)
    }
}

/// Root `resource` element with the kernel-4 namespace declarations
pub fn create_resource_tree() -> Element {
    let mut resource = Element::new("resource");
    resource
        .set_attr("xmlns:xsi", XSI_NAMESPACE)
        .set_attr("xmlns", KERNEL4_NAMESPACE)
        .set_attr("xsi:schemaLocation", KERNEL4_SCHEMA_LOCATION);
    resource
}

/// Parse an XML document into an element tree.
///
/// Leaf text is kept verbatim. Whitespace-only text of an element with
/// children is indentation and is dropped. Comments and processing
/// instructions are skipped.
pub fn parse_resource(xml: &str) -> Result<Element> {
    let mut reader = Reader::from_str(xml);

    let mut buf = Vec::new();
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => stack.push(element_from_start(&e)?),
            Event::Empty(e) => {
                let element = element_from_start(&e)?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::Text(t) => {
                let text = t.unescape()?;
                if let Some(current) = stack.last_mut() {
                    current.text.get_or_insert_with(String::new).push_str(&text);
                }
            }
            Event::CData(t) => {
                let text = String::from_utf8_lossy(&t.into_inner()).into_owned();
                if let Some(current) = stack.last_mut() {
                    current.text.get_or_insert_with(String::new).push_str(&text);
                }
            }
            Event::End(_) => {
                let mut element = stack
                    .pop()
                    .ok_or_else(|| DataciteError::Xml("unbalanced end tag".to_string()))?;
                if !element.children.is_empty() && is_blank(element.text.as_deref()) {
                    element.text = None;
                }
                attach(&mut stack, &mut root, element)?;
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if !stack.is_empty() {
        return Err(DataciteError::Xml(format!(
            "unclosed element <{}>",
            stack.last().map(|e| e.name.as_str()).unwrap_or_default()
        )));
    }
    root.ok_or_else(|| DataciteError::Xml("document has no root element".to_string()))
}

fn is_blank(text: Option<&str>) -> bool {
    text.map_or(true, |t| t.trim().is_empty())
}

fn element_from_start(start: &BytesStart<'_>) -> Result<Element> {
    let mut element = Element::new(String::from_utf8_lossy(start.name().as_ref()).into_owned());
    for attr in start.attributes() {
        let attr = attr.map_err(|e| DataciteError::Xml(e.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value()?.into_owned();
        element.attributes.push((key, value));
    }
    Ok(element)
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_none() => *root = Some(element),
        None => {
            return Err(DataciteError::Xml(
                "document has more than one root element".to_string(),
            ))
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Dataset;

    #[test]
    fn test_root_namespaces() {
        let doc = DataCiteXmlMetadata::new();
        let root = doc.resource();
        assert_eq!(root.name, "resource");
        assert_eq!(root.attr("xmlns"), Some(KERNEL4_NAMESPACE));
        assert_eq!(root.attr("xmlns:xsi"), Some(XSI_NAMESPACE));
        assert_eq!(root.attr("xsi:schemaLocation"), Some(KERNEL4_SCHEMA_LOCATION));
    }

    #[test]
    fn test_serialization_layout() {
        let mut doc = DataCiteXmlMetadata::new();
        let root = doc.resource_mut();
        root.append("identifier")
            .set_attr("identifierType", "DOI")
            .set_text("10.25548/R-1");
        let titles = root.append("titles");
        titles.append("title").set_attr("xml:lang", "en").set_text("T");

        let xml = doc.to_xml_string().unwrap();
        let lines: Vec<&str> = xml.lines().collect();

        assert_eq!(lines[0], r#"<?xml version="1.0" encoding="utf-8"?>"#);
        assert!(lines[1].starts_with("<resource xmlns:xsi="));
        assert_eq!(
            lines[2],
            r#"  <identifier identifierType="DOI">10.25548/R-1</identifier>"#
        );
        assert_eq!(lines[3], "  <titles>");
        assert_eq!(lines[4], r#"    <title xml:lang="en">T</title>"#);
        assert_eq!(lines[5], "  </titles>");
        assert_eq!(lines[6], "</resource>");
        assert!(xml.ends_with("</resource>\n"));
    }

    #[test]
    fn test_text_is_escaped() {
        let mut doc = DataCiteXmlMetadata::new();
        doc.resource_mut()
            .append("publisher")
            .set_text("Smith & Jones <Lab>");
        let xml = doc.to_xml_string().unwrap();
        assert!(xml.contains("Smith &amp; Jones &lt;Lab&gt;"));

        let parsed = parse_resource(&xml).unwrap();
        assert_eq!(
            parsed.child("publisher").and_then(Element::text),
            Some("Smith & Jones <Lab>")
        );
    }

    #[test]
    fn test_empty_leaf_serializes_self_closing() {
        let mut doc = DataCiteXmlMetadata::new();
        doc.resource_mut().append("subjects");
        let xml = doc.to_xml_string().unwrap();
        assert!(xml.contains("<subjects/>"));
    }

    #[test]
    fn test_parse_rejects_truncated_document() {
        assert!(parse_resource("<resource><titles>").is_err());
        assert!(parse_resource("").is_err());
    }

    #[test]
    fn test_write_resource_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metadata.xml");
        let doc = DataCiteXmlMetadata::new();
        doc.write_resource_file(&path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("<?xml"));
        assert_eq!(parse_resource(&written).unwrap(), *doc.resource());
    }

    fn populated_dataset() -> Dataset {
        Dataset::from_json(
            r#"{
                "creators": [
                    {"creatorName": "Smith, Ann", "givenName": "Ann", "familyName": "Smith",
                     "orcid": "0000-0001-2345-6789"},
                    {"creatorName": "GUDMAP Consortium"}
                ],
                "titles": ["  Padded title  ", "Second title", "Trailing space "],
                "descriptions": ["  Indented abstract\n  over two lines", "Plain"],
                "publisher": "Smith & Jones <Lab>",
                "publicationYear": "2019",
                "subjects": [" Kidney", "Biology", "Dataset"],
                "resourceType": "Image",
                "version": "2.1",
                "fundingReferences": [
                    {"funderName": "NIDDK", "funderIdentifier": "100000062",
                     "funderIdentifierType": "Crossref Funder ID",
                     "awardNumber": "5U24DK110814",
                     "awardUri": "https://reporter.nih.gov/5U24DK110814",
                     "awardTitle": "GUDMAP Hub"},
                    {"funderName": "NIH", "awardNumber": "U01-0001"}
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_populated_resource_round_trips() {
        let doc = build_resource("10.25548/16-WM9A", &populated_dataset()).unwrap();
        let xml = doc.to_xml_string().unwrap();

        let parsed = parse_resource(&xml).unwrap();
        assert_eq!(parsed, *doc.resource());

        let titles = parsed.child("titles").unwrap().child_texts("title");
        assert_eq!(titles[0], "  Padded title  ");
        assert_eq!(titles[2], "Trailing space ");
        assert_eq!(
            parsed.child("subjects").unwrap().child_texts("subject")[0],
            " Kidney"
        );
    }

    #[test]
    fn test_parse_keeps_whitespace_only_leaf() {
        let parsed = parse_resource("<resource>\n  <title>   </title>\n</resource>").unwrap();
        assert_eq!(parsed.text, None);
        assert_eq!(parsed.child("title").and_then(Element::text), Some("   "));
    }
}
