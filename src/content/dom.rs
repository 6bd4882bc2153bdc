use wasm_bindgen::JsValue;
use web_sys::{Document, Element};

use super::render::{BlockHeader, Container, ContentBlock};

/// An element to create: tag, class, attributes, text content and children.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Markup {
    pub tag: &'static str,
    pub class: Option<&'static str>,
    pub attributes: Vec<(&'static str, String)>,
    pub text: Option<String>,
    pub children: Vec<Markup>,
}

impl Markup {
    fn new(tag: &'static str) -> Self {
        Self {
            tag,
            ..Default::default()
        }
    }

    fn class(mut self, class: &'static str) -> Self {
        self.class = Some(class);
        self
    }

    fn attr(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.attributes.push((name, value.into()));
        self
    }

    fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    fn child(mut self, child: Markup) -> Self {
        self.children.push(child);
        self
    }
}

/// `div.content-general > div.content-general-header > (a > img) + h3`, then
/// one `p` per line.
pub fn block_markup(block: &ContentBlock) -> Markup {
    let mut parent = Markup::new("div").class("content-general");
    if let Some(header) = &block.header {
        parent = parent.child(header_markup(header));
    }
    for line in &block.lines {
        parent = parent.child(Markup::new("p").text(line.as_str()));
    }
    parent
}

fn header_markup(header: &BlockHeader) -> Markup {
    let image = Markup::new("img")
        .attr("loading", "lazy")
        .attr("src", header.image.as_str());
    let anchor = Markup::new("a")
        .attr("href", header.link.as_str())
        .attr("target", "_blank")
        .attr("rel", "noopener noreferrer")
        .child(image);

    Markup::new("div")
        .class("content-general-header")
        .child(anchor)
        .child(Markup::new("h3").text(header.title.as_str()))
}

/// A mount point on the live page. Text always goes in as text content.
pub struct DomContainer {
    document: Document,
    target: Element,
}

impl DomContainer {
    pub fn new(target: Element) -> Option<Self> {
        let document = target.owner_document()?;
        Some(Self { document, target })
    }

    fn create(&self, markup: &Markup) -> Result<Element, JsValue> {
        let element = self.document.create_element(markup.tag)?;
        if let Some(class) = markup.class {
            element.set_class_name(class);
        }
        for (name, value) in &markup.attributes {
            element.set_attribute(name, value)?;
        }
        if let Some(text) = &markup.text {
            element.set_text_content(Some(text));
        }
        for child in &markup.children {
            let node = self.create(child)?;
            element.append_child(&node)?;
        }
        Ok(element)
    }
}

impl Container for DomContainer {
    fn append(&mut self, block: ContentBlock) {
        let appended = self
            .create(&block_markup(&block))
            .and_then(|element| self.target.append_child(&element));
        if let Err(e) = appended {
            console_error!("failed to append block to #{}: {e:?}", self.target.id());
        }
    }
}
