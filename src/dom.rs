//! 文档遍历抽象
//!
//! 提取与回填共用同一套遍历规则。遍历只依赖两种能力：
//! 节点有文本（`HasText`）与节点有属性（`HasAttributes`），
//! 构建期的解析树与浏览器中的实时DOM各自实现一个薄适配层。

use crate::api_constants::extraction_config::{DISALLOWED_ELEMENTS, TRANSLATABLE_ATTRIBUTES};
use crate::keys::normalize;

/// 文本能力
pub trait HasText {
    /// 文本节点的值；非文本节点返回 `None`
    fn text(&self) -> Option<String>;

    /// 覆盖文本节点的值；对非文本节点无效
    fn set_text(&self, value: &str);

    /// 元素全部后代文本节点的拼接
    fn text_content(&self) -> String;

    /// 用单个文本节点替换元素的全部子节点
    fn set_text_content(&self, value: &str);
}

/// 属性能力
pub trait HasAttributes {
    /// 小写标签名；非元素节点返回 `None`
    fn tag_name(&self) -> Option<String>;

    fn attribute(&self, name: &str) -> Option<String>;

    fn set_attribute(&self, name: &str, value: &str);
}

/// 可遍历的文档节点
///
/// 适配层通过内部可变性修改节点，因此所有操作都只需要 `&self`。
pub trait DomNode: HasText + HasAttributes + Clone {
    fn children(&self) -> Vec<Self>;
}

/// 遍历回调，收到的 `source` 均已规范化且非空
pub trait DocumentVisitor<N> {
    fn visit_text(&mut self, _node: &N, _source: &str) {}

    fn visit_attribute(&mut self, _element: &N, _name: &str, _source: &str) {}

    fn visit_title(&mut self, _title: &N, _source: &str) {}

    fn visit_meta_description(&mut self, _meta: &N, _source: &str) {}
}

/// 按文档顺序收集到的节点
struct Collected<N> {
    texts: Vec<N>,
    elements: Vec<N>,
    title: Option<N>,
    meta_description: Option<N>,
}

fn is_disallowed(tag: &str) -> bool {
    DISALLOWED_ELEMENTS.contains(&tag)
}

/// 深度优先收集文本节点与元素
///
/// 只要任一祖先属于禁止元素，其下所有文本节点都会被跳过，与嵌套深度无关。
fn collect<N: DomNode>(root: &N) -> Collected<N> {
    let mut collected = Collected {
        texts: Vec::new(),
        elements: Vec::new(),
        title: None,
        meta_description: None,
    };

    // (节点, 父元素标签, 是否位于禁止元素内)
    let mut stack: Vec<(N, Option<String>, bool)> = vec![(root.clone(), None, false)];

    while let Some((node, parent_tag, disallowed)) = stack.pop() {
        let tag = node.tag_name();

        match tag.as_deref() {
            Some(tag_name) => {
                if tag_name == "title"
                    && parent_tag.as_deref() == Some("head")
                    && collected.title.is_none()
                {
                    collected.title = Some(node.clone());
                }
                if tag_name == "meta"
                    && collected.meta_description.is_none()
                    && node.attribute("name").as_deref() == Some("description")
                {
                    collected.meta_description = Some(node.clone());
                }
                collected.elements.push(node.clone());
            }
            None => {
                if !disallowed && node.text().is_some() {
                    collected.texts.push(node.clone());
                }
            }
        }

        let child_disallowed = disallowed || tag.as_deref().is_some_and(is_disallowed);
        let children = node.children();
        for child in children.into_iter().rev() {
            stack.push((child, tag.clone(), child_disallowed));
        }
    }

    collected
}

/// 遍历文档：文本节点 → 可翻译属性 → `head > title` → meta description
pub fn walk<N, V>(root: &N, visitor: &mut V)
where
    N: DomNode,
    V: DocumentVisitor<N>,
{
    let collected = collect(root);

    for node in &collected.texts {
        let source = normalize(&node.text().unwrap_or_default());
        if !source.is_empty() {
            visitor.visit_text(node, &source);
        }
    }

    for element in &collected.elements {
        for attr in TRANSLATABLE_ATTRIBUTES {
            let source = normalize(&element.attribute(attr).unwrap_or_default());
            if !source.is_empty() {
                visitor.visit_attribute(element, attr, &source);
            }
        }
    }

    if let Some(title) = &collected.title {
        let source = normalize(&title.text_content());
        if !source.is_empty() {
            visitor.visit_title(title, &source);
        }
    }

    if let Some(meta) = &collected.meta_description {
        let source = normalize(&meta.attribute("content").unwrap_or_default());
        if !source.is_empty() {
            visitor.visit_meta_description(meta, &source);
        }
    }
}

/// 文档根元素（通常是 `<html>`）
pub fn document_element<N: DomNode>(root: &N) -> Option<N> {
    if root.tag_name().is_some() {
        return Some(root.clone());
    }
    root.children()
        .into_iter()
        .find(|child| child.tag_name().is_some())
}

/// 按文档顺序查找带有指定属性的元素，返回元素及其属性值
pub fn find_elements_with_attribute<N: DomNode>(root: &N, name: &str) -> Vec<(N, String)> {
    let mut found = Vec::new();
    let mut stack = vec![root.clone()];

    while let Some(node) = stack.pop() {
        if node.tag_name().is_some() {
            if let Some(value) = node.attribute(name) {
                found.push((node.clone(), value));
            }
        }
        let children = node.children();
        stack.extend(children.into_iter().rev());
    }

    found
}
