//! HTML处理模块
//!
//! 提供HTML解析、序列化，以及解析树（markup5ever_rcdom）上的遍历适配层

// 标准库导入
use std::cell::RefCell;
use std::rc::Rc;

// 第三方crate导入
use html5ever::tendril::{StrTendril, TendrilSink};
use html5ever::{parse_document, Attribute, LocalName, Namespace, QualName};
use markup5ever_rcdom::{Handle, Node, NodeData, RcDom};

// 本地模块导入
use crate::dom::{DomNode, HasAttributes, HasText};
use crate::error::Result;
use crate::i18n_error;

/// 解析HTML文档
pub fn parse_html(html_content: &str) -> Result<RcDom> {
    parse_document(RcDom::default(), Default::default())
        .from_utf8()
        .read_from(&mut html_content.as_bytes())
        .map_err(|e| i18n_error!(html_parse, e))
}

/// 序列化DOM为HTML字符串
pub fn serialize_dom_to_html(dom: &RcDom) -> Result<String> {
    use html5ever::serialize::{serialize, SerializeOpts};
    use markup5ever_rcdom::SerializableHandle;

    let mut buffer = Vec::new();

    serialize(
        &mut buffer,
        &SerializableHandle::from(dom.document.clone()),
        SerializeOpts::default(),
    )
    .map_err(|e| i18n_error!(html_parse, format!("HTML序列化失败: {:?}", e)))?;

    String::from_utf8(buffer).map_err(|e| i18n_error!(html_parse, format!("UTF-8转换失败: {}", e)))
}

impl HasText for Handle {
    fn text(&self) -> Option<String> {
        match self.data {
            NodeData::Text { ref contents } => Some(contents.borrow().to_string()),
            _ => None,
        }
    }

    fn set_text(&self, value: &str) {
        if let NodeData::Text { ref contents } = self.data {
            let mut content_ref = contents.borrow_mut();
            content_ref.clear();
            content_ref.push_slice(value);
        }
    }

    fn text_content(&self) -> String {
        let mut out = String::new();
        let mut stack = vec![self.clone()];
        while let Some(node) = stack.pop() {
            if let NodeData::Text { ref contents } = node.data {
                out.push_str(&contents.borrow());
            }
            stack.extend(node.children.borrow().iter().rev().cloned());
        }
        out
    }

    fn set_text_content(&self, value: &str) {
        let text_node = Node::new(NodeData::Text {
            contents: RefCell::new(StrTendril::from_slice(value)),
        });
        text_node.parent.set(Some(Rc::downgrade(self)));

        let mut children = self.children.borrow_mut();
        for child in children.iter() {
            child.parent.set(None);
        }
        *children = vec![text_node];
    }
}

impl HasAttributes for Handle {
    fn tag_name(&self) -> Option<String> {
        match self.data {
            NodeData::Element { ref name, .. } => Some(name.local.as_ref().to_ascii_lowercase()),
            _ => None,
        }
    }

    fn attribute(&self, name: &str) -> Option<String> {
        match self.data {
            NodeData::Element { ref attrs, .. } => attrs
                .borrow()
                .iter()
                .find(|attr| attr.name.local.as_ref() == name)
                .map(|attr| attr.value.to_string()),
            _ => None,
        }
    }

    fn set_attribute(&self, name: &str, value: &str) {
        if let NodeData::Element { ref attrs, .. } = self.data {
            let mut attrs = attrs.borrow_mut();
            match attrs.iter_mut().find(|attr| attr.name.local.as_ref() == name) {
                Some(attr) => attr.value = StrTendril::from_slice(value),
                None => attrs.push(Attribute {
                    name: QualName::new(None, Namespace::from(""), LocalName::from(name)),
                    value: StrTendril::from_slice(value),
                }),
            }
        }
    }
}

impl DomNode for Handle {
    fn children(&self) -> Vec<Self> {
        self.children.borrow().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::document_element;

    #[test]
    fn test_text_node_roundtrip() {
        let dom = parse_html("<p>Hola</p>").unwrap();
        let root = document_element(&dom.document).unwrap();
        let body = root.children().into_iter().nth(1).unwrap();
        let p = body.children().into_iter().next().unwrap();
        let text = p.children().into_iter().next().unwrap();

        assert_eq!(text.text().as_deref(), Some("Hola"));
        text.set_text("Hello");
        assert_eq!(p.text_content(), "Hello");
    }

    #[test]
    fn test_set_text_content_replaces_children() {
        let dom = parse_html("<html><head><title>Hotel <b>Villa</b></title></head></html>").unwrap();
        let root = document_element(&dom.document).unwrap();
        let head = root.children().into_iter().next().unwrap();
        let title = head.children().into_iter().next().unwrap();

        title.set_text_content("Villa Hotel");
        assert_eq!(title.children().len(), 1);
        assert_eq!(title.text_content(), "Villa Hotel");
    }

    #[test]
    fn test_set_attribute_updates_or_inserts() {
        let dom = parse_html(r#"<html lang="es"><body></body></html>"#).unwrap();
        let root = document_element(&dom.document).unwrap();

        root.set_attribute("lang", "en");
        root.set_attribute("data-i18n", "auto");

        assert_eq!(root.attribute("lang").as_deref(), Some("en"));
        assert_eq!(root.attribute("data-i18n").as_deref(), Some("auto"));

        let html = serialize_dom_to_html(&dom).unwrap();
        assert!(html.contains(r#"lang="en""#));
    }
}
