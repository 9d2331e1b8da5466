//! Render descriptions: a plain element tree the host turns into UI.

use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Element {
    pub tag: String,

    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub attrs: BTreeMap<String, String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Element>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: BTreeMap::new(),
            text: None,
            children: Vec::new(),
        }
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    /// Boolean attribute (`disabled`, `required`); rendered as `name="name"`.
    pub fn flag(self, name: &str, on: bool) -> Self {
        if on { self.attr(name, name) } else { self }
    }

    pub fn class(self, class: impl Into<String>) -> Self {
        self.attr("class", class)
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = Element>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn attr_value(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attr_value("class")
            .is_some_and(|c| c.split_whitespace().any(|c| c == class))
    }

    /// Depth-first search for the first element carrying `class`.
    pub fn find_class(&self, class: &str) -> Option<&Element> {
        if self.has_class(class) {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find_class(class))
    }

    /// All elements with the given tag, depth-first.
    pub fn find_all<'a>(&'a self, tag: &str, out: &mut Vec<&'a Element>) {
        if self.tag == tag {
            out.push(self);
        }
        for c in &self.children {
            c.find_all(tag, out);
        }
    }

    /// Concatenated text of this element and its descendants.
    pub fn text_content(&self) -> String {
        let mut out = self.text.clone().unwrap_or_default();
        for c in &self.children {
            out.push_str(&c.text_content());
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_and_queries() {
        let tree = Element::new("div").class("outer").child(
            Element::new("ul")
                .class("errors list")
                .child(Element::new("li").text("a"))
                .child(Element::new("li").text("b")),
        );

        let errors = tree.find_class("errors").unwrap();
        assert_eq!(errors.tag, "ul");
        assert_eq!(errors.text_content(), "ab");

        let mut items = Vec::new();
        tree.find_all("li", &mut items);
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn flag_only_sets_when_on() {
        let e = Element::new("input").flag("disabled", true).flag("required", false);
        assert_eq!(e.attr_value("disabled"), Some("disabled"));
        assert_eq!(e.attr_value("required"), None);
    }
}
