//! Generic XML tree parsing
//!
//! Clipboard XML arrives as a string of unknown provenance, so the parser
//! builds a plain owned tree (element name, attributes, text, children)
//! that the clipboard walk can probe without committing to a schema up
//! front.

use indexmap::IndexMap;
use quick_xml::events::Event;
use quick_xml::Reader;

/// A parsed XML element with its attributes, text content, and children.
#[derive(Debug, Clone)]
pub struct XmlNode {
    /// The name/tag of this element
    pub name: String,
    /// Map of attribute names to values, in document order
    pub attributes: IndexMap<String, String>,
    /// Text content of this node
    pub text_content: String,
    /// Child nodes
    pub children: Vec<XmlNode>,
}

/// Parse an XML document from a string and return the root element.
///
/// Fails when the input is not well-formed XML or contains no element at
/// all, which is what lets non-XML pastes fall through to later
/// interpretations.
pub fn parse_xml_str(source: &str) -> anyhow::Result<XmlNode> {
    let mut reader = Reader::from_reader(source.as_bytes());
    let mut buf = Vec::new();

    loop {
        buf.clear();
        let event = reader.read_event_into(&mut buf)?;
        let maybe_root = match event {
            Event::Start(start) => Some((start.into_owned(), false)),
            Event::Empty(start) => Some((start.into_owned(), true)),
            Event::Eof => {
                anyhow::bail!("XML document is empty");
            }
            _ => None,
        };

        if let Some((start, self_closing)) = maybe_root {
            let mut node_buf = Vec::new();
            return parse_node(&mut reader, &mut node_buf, start, self_closing);
        }
    }
}

fn parse_node(
    reader: &mut Reader<&[u8]>,
    buf: &mut Vec<u8>,
    start: quick_xml::events::BytesStart<'static>,
    self_closing: bool,
) -> anyhow::Result<XmlNode> {
    let element_name_bytes = start.name().as_ref().to_vec();
    let element_name = String::from_utf8_lossy(&element_name_bytes).to_string();
    let attributes = collect_attributes(start.attributes())?;

    let mut node = XmlNode {
        name: element_name,
        attributes,
        text_content: String::new(),
        children: Vec::new(),
    };

    if self_closing {
        return Ok(node);
    }

    loop {
        buf.clear();
        let event = reader.read_event_into(buf)?;
        match event {
            Event::Start(child_start) => {
                let mut child_buf = Vec::new();
                let child = parse_node(reader, &mut child_buf, child_start.into_owned(), false)?;
                node.children.push(child);
            }
            Event::Empty(child_start) => {
                let mut child_buf = Vec::new();
                let child = parse_node(reader, &mut child_buf, child_start.into_owned(), true)?;
                node.children.push(child);
            }
            Event::Text(text) => {
                let value = String::from_utf8_lossy(text.as_ref()).to_string();
                if !value.trim().is_empty() {
                    node.text_content.push_str(value.trim());
                }
            }
            Event::CData(text) => {
                let value = String::from_utf8_lossy(text.as_ref()).to_string();
                if !value.trim().is_empty() {
                    node.text_content.push_str(value.trim());
                }
            }
            Event::End(end) => {
                anyhow::ensure!(
                    end.name().as_ref() == element_name_bytes.as_slice(),
                    "unexpected closing tag '</{}>' while parsing '<{}>'",
                    String::from_utf8_lossy(end.name().as_ref()),
                    node.name
                );
                return Ok(node);
            }
            Event::Eof => {
                anyhow::bail!("unexpected end of file while parsing element '{}'", node.name);
            }
            _ => {}
        }
    }
}

fn collect_attributes(
    attributes: quick_xml::events::attributes::Attributes<'_>,
) -> anyhow::Result<IndexMap<String, String>> {
    let mut map = IndexMap::new();
    for attr in attributes {
        let attr = attr?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
        let value = String::from_utf8_lossy(attr.value.as_ref()).to_string();
        map.insert(key, value);
    }
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nested_elements_with_attributes() {
        let root = parse_xml_str(
            r#"<?xml version="1.0"?>
            <Outer kind="test">
                <Inner>hello</Inner>
                <Empty flag="1"/>
            </Outer>"#,
        )
        .expect("well-formed document must parse");

        assert_eq!(root.name, "Outer");
        assert_eq!(root.attributes.get("kind").map(String::as_str), Some("test"));
        assert_eq!(root.children.len(), 2);
        assert_eq!(root.children[0].text_content, "hello");
        assert_eq!(root.children[1].name, "Empty");
    }

    #[test]
    fn rejects_plain_text() {
        assert!(parse_xml_str("not json {{{").is_err());
        assert!(parse_xml_str("25,65").is_err());
    }

    #[test]
    fn rejects_mismatched_tags() {
        assert!(parse_xml_str("<a><b></a></b>").is_err());
    }
}
