//! XML reading shared by the resource builders (menus, alerts).

use std::collections::HashMap;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::error::ResourceError;

/// An opening tag with its attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct XmlElement {
    pub name: String,
    attributes: HashMap<String, String>,
}

impl XmlElement {
    fn from_start(start: &BytesStart<'_>) -> Result<Self, ResourceError> {
        let name = String::from_utf8_lossy(start.name().as_ref()).to_string();
        let mut attributes = HashMap::new();
        for attr in start.attributes() {
            let attr = attr?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
            let value = attr.unescape_value().map_err(quick_xml::Error::from)?.to_string();
            attributes.insert(key, value);
        }
        Ok(Self { name, attributes })
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn required(&self, name: &'static str) -> Result<&str, ResourceError> {
        self.attr(name).ok_or_else(|| ResourceError::MissingAttribute {
            element: self.name.clone(),
            attribute: name,
        })
    }

    pub fn unexpected(&self) -> ResourceError {
        ResourceError::UnexpectedElement(self.name.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ResourceEvent {
    Start(XmlElement),
    End(String),
    Text(String),
}

/// Pull reader over a resource string.
///
/// Self-closing elements are reported as a start followed by an end, so
/// builders handle both spellings the same way.
pub(crate) struct ResourceReader<'a> {
    reader: Reader<&'a [u8]>,
    pending_end: Option<String>,
    depth: usize,
}

impl<'a> ResourceReader<'a> {
    pub fn new(xml: &'a str) -> Self {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);
        Self {
            reader,
            pending_end: None,
            depth: 0,
        }
    }

    pub fn next(&mut self) -> Result<Option<ResourceEvent>, ResourceError> {
        if let Some(name) = self.pending_end.take() {
            return Ok(Some(ResourceEvent::End(name)));
        }
        loop {
            match self.reader.read_event()? {
                Event::Start(start) => {
                    self.depth += 1;
                    return Ok(Some(ResourceEvent::Start(XmlElement::from_start(&start)?)));
                }
                Event::Empty(start) => {
                    let element = XmlElement::from_start(&start)?;
                    self.pending_end = Some(element.name.clone());
                    return Ok(Some(ResourceEvent::Start(element)));
                }
                Event::End(end) => {
                    self.depth = self.depth.saturating_sub(1);
                    let name = String::from_utf8_lossy(end.name().as_ref()).to_string();
                    return Ok(Some(ResourceEvent::End(name)));
                }
                Event::Text(text) => {
                    let text = text.unescape().map_err(quick_xml::Error::from)?;
                    return Ok(Some(ResourceEvent::Text(text.to_string())));
                }
                Event::CData(data) => {
                    return Ok(Some(ResourceEvent::Text(String::from_utf8_lossy(&data).to_string())));
                }
                Event::Eof if self.depth > 0 => return Err(ResourceError::UnexpectedEof),
                Event::Eof => return Ok(None),
                // Declarations, comments, processing instructions
                _ => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_element_reports_end() {
        let mut reader = ResourceReader::new(r#"<a x="1 &amp; 2"><b/>hi</a>"#);
        let Some(ResourceEvent::Start(a)) = reader.next().unwrap() else {
            panic!("expected <a>");
        };
        assert_eq!(a.attr("x"), Some("1 & 2"));
        assert!(matches!(reader.next().unwrap(), Some(ResourceEvent::Start(b)) if b.name == "b"));
        assert_eq!(reader.next().unwrap(), Some(ResourceEvent::End("b".into())));
        assert_eq!(reader.next().unwrap(), Some(ResourceEvent::Text("hi".into())));
        assert_eq!(reader.next().unwrap(), Some(ResourceEvent::End("a".into())));
        assert_eq!(reader.next().unwrap(), None);
    }

    #[test]
    fn test_missing_attribute() {
        let mut reader = ResourceReader::new("<item/>");
        let Some(ResourceEvent::Start(item)) = reader.next().unwrap() else {
            panic!("expected <item>");
        };
        let err = item.required("label").unwrap_err();
        assert_eq!(err.to_string(), "<item> is missing the `label` attribute");
    }

    #[test]
    fn test_unclosed_element() {
        let mut reader = ResourceReader::new("<menu>");
        assert!(reader.next().unwrap().is_some());
        assert!(reader.next().is_err());
    }
}
