//! 可翻译文本提取
//!
//! 遍历文档，把文本节点、可翻译属性、标题和描述按哈希键登记到注册表中

use std::collections::btree_map::{BTreeMap, Entry};

use tracing::warn;

use crate::dom::{walk, DocumentVisitor, DomNode};
use crate::error::Result;
use crate::html_processor::parse_html;
use crate::keys::{hash_key, normalize};

/// 键 → 规范化原文
///
/// 对键而言是集合语义：重复登记同一文本不产生变化；
/// 不同文本落到同一个键时后写入者覆盖，并记录一次冲突。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registry {
    entries: BTreeMap<String, String>,
    collisions: usize,
}

/// 哈希冲突信息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collision {
    pub key: String,
    pub previous: String,
    pub current: String,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 登记一段文本，返回被覆盖的冲突文本（如果有）
    ///
    /// 规范化后为空的文本不会被登记。
    pub fn register(&mut self, text: &str) -> Option<Collision> {
        let source = normalize(text);
        if source.is_empty() {
            return None;
        }
        let key = hash_key(&source);
        self.insert_normalized(key, source)
    }

    fn insert_normalized(&mut self, key: String, source: String) -> Option<Collision> {
        match self.entries.entry(key) {
            Entry::Vacant(slot) => {
                slot.insert(source);
                None
            }
            Entry::Occupied(mut slot) => {
                if slot.get() == &source {
                    return None;
                }
                let collision = Collision {
                    key: slot.key().clone(),
                    previous: slot.get().clone(),
                    current: source.clone(),
                };
                warn!(
                    "⚠️  哈希冲突 {}: '{}' 被 '{}' 覆盖",
                    collision.key, collision.previous, collision.current
                );
                slot.insert(source);
                self.collisions += 1;
                Some(collision)
            }
        }
    }

    /// 合并另一个注册表（逐条登记，冲突规则相同）
    pub fn merge(&mut self, other: Registry) {
        self.collisions += other.collisions;
        for (key, source) in other.entries {
            self.insert_normalized(key, source);
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 累计检测到的冲突次数
    pub fn collisions(&self) -> usize {
        self.collisions
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

struct Extractor<'a> {
    registry: &'a mut Registry,
}

impl<N> DocumentVisitor<N> for Extractor<'_> {
    fn visit_text(&mut self, _node: &N, source: &str) {
        self.registry.register(source);
    }

    fn visit_attribute(&mut self, _element: &N, _name: &str, source: &str) {
        self.registry.register(source);
    }

    fn visit_title(&mut self, _title: &N, source: &str) {
        self.registry.register(source);
    }

    fn visit_meta_description(&mut self, _meta: &N, source: &str) {
        self.registry.register(source);
    }
}

/// 从任意文档树提取注册表
pub fn extract_registry<N: DomNode>(root: &N) -> Registry {
    let mut registry = Registry::new();
    extract_into(root, &mut registry);
    registry
}

/// 提取并登记到已有注册表
pub fn extract_into<N: DomNode>(root: &N, registry: &mut Registry) {
    let mut extractor = Extractor { registry };
    walk(root, &mut extractor);
}

/// 解析HTML字符串并提取注册表
pub fn extract_from_html(html: &str) -> Result<Registry> {
    let dom = parse_html(html)?;
    Ok(extract_registry(&dom.document))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_is_idempotent() {
        let mut registry = Registry::new();
        assert!(registry.register("Bienvenido al hotel").is_none());
        assert!(registry.register("  Bienvenido   al hotel ").is_none());
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("k74f4284d"), Some("Bienvenido al hotel"));
    }

    #[test]
    fn test_blank_text_is_not_registered() {
        let mut registry = Registry::new();
        registry.register(" \u{00A0}\n\t");
        assert!(registry.is_empty());
    }

    #[test]
    fn test_collision_last_writer_wins() {
        let mut registry = Registry::new();
        registry.insert_normalized("kdead".to_string(), "uno".to_string());
        let collision = registry
            .insert_normalized("kdead".to_string(), "dos".to_string())
            .unwrap();

        assert_eq!(collision.previous, "uno");
        assert_eq!(collision.current, "dos");
        assert_eq!(registry.get("kdead"), Some("dos"));
        assert_eq!(registry.collisions(), 1);
    }

    #[test]
    fn test_extract_end_to_end_example() {
        let registry = extract_from_html(
            r#"<html><body><p>Bienvenido al hotel</p><img src="pool.jpg" alt="Piscina  climatizada"></body></html>"#,
        )
        .unwrap();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get(&hash_key("Bienvenido al hotel")), Some("Bienvenido al hotel"));
        assert_eq!(registry.get("k51dad703"), Some("Piscina climatizada"));
    }

    #[test]
    fn test_extract_title_meta_and_attributes() {
        let registry = extract_from_html(
            r#"<!doctype html><html><head><title>Hotel Villa Grace</title>
            <meta name="description" content="Hotel boutique en la costa"></head>
            <body><input placeholder="Correo electrónico"><button aria-label="Cerrar menú">×</button>
            <a title="Reservar ahora" href="/reservas">Reservar</a></body></html>"#,
        )
        .unwrap();

        for source in [
            "Hotel Villa Grace",
            "Hotel boutique en la costa",
            "Correo electrónico",
            "Cerrar menú",
            "×",
            "Reservar ahora",
            "Reservar",
        ] {
            assert_eq!(registry.get(&hash_key(source)), Some(source), "missing {source}");
        }
        assert_eq!(registry.len(), 7);
    }

    #[test]
    fn test_disallowed_text_never_extracted() {
        let registry = extract_from_html(
            r#"<body><div><pre><div><span>Texto en pre</span></div></pre></div>
            <iframe>Texto en iframe</iframe><code><b>Texto en code</b></code>
            <script>document.title = "Texto en script";</script><p>Visible</p></body>"#,
        )
        .unwrap();

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get(&hash_key("Visible")), Some("Visible"));
    }

    #[test]
    fn test_merge_registries() {
        let mut first = extract_from_html("<p>Uno</p><p>Dos</p>").unwrap();
        let second = extract_from_html("<p>Dos</p><p>Tres</p>").unwrap();
        first.merge(second);

        assert_eq!(first.len(), 3);
        assert_eq!(first.collisions(), 0);
    }
}
