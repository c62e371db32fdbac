//! 浏览器运行期适配层（仅 wasm32）
//!
//! 页面加载时隐藏根元素，DOMContentLoaded 后选择语言、获取字典并回填，
//! 完成后再显示页面。语言切换控件保存选择后整页重新加载。

use async_trait::async_trait;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Document, Element, Event, HtmlElement, Node, Request, RequestCache, RequestInit, Response, Storage};

use crate::applier::{locale_switches, persist_locale, DictionarySource, LocaleStore, RuntimeApplier};
use crate::cache::Dictionary;
use crate::config::RuntimeConfig;
use crate::dom::{DomNode, HasAttributes, HasText};
use crate::error::Result;
use crate::i18n_error;

impl HasText for Node {
    fn text(&self) -> Option<String> {
        if self.node_type() == Node::TEXT_NODE {
            self.node_value()
        } else {
            None
        }
    }

    fn set_text(&self, value: &str) {
        if self.node_type() == Node::TEXT_NODE {
            self.set_node_value(Some(value));
        }
    }

    fn text_content(&self) -> String {
        Node::text_content(self).unwrap_or_default()
    }

    fn set_text_content(&self, value: &str) {
        Node::set_text_content(self, Some(value));
    }
}

impl HasAttributes for Node {
    fn tag_name(&self) -> Option<String> {
        self.dyn_ref::<Element>()
            .map(|element| element.tag_name().to_ascii_lowercase())
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.dyn_ref::<Element>()
            .and_then(|element| element.get_attribute(name))
    }

    fn set_attribute(&self, name: &str, value: &str) {
        if let Some(element) = self.dyn_ref::<Element>() {
            let _ = element.set_attribute(name, value);
        }
    }
}

impl DomNode for Node {
    fn children(&self) -> Vec<Self> {
        let list = self.child_nodes();
        (0..list.length()).filter_map(|i| list.item(i)).collect()
    }
}

/// `localStorage` 中的语言偏好
#[derive(Debug, Clone)]
pub struct LocalStorageStore {
    storage: Option<Storage>,
    key: String,
}

impl LocalStorageStore {
    pub fn new(key: &str) -> Self {
        let storage = web_sys::window().and_then(|w| w.local_storage().ok().flatten());
        Self {
            storage,
            key: key.to_string(),
        }
    }
}

impl LocaleStore for LocalStorageStore {
    fn load(&self) -> Option<String> {
        self.storage
            .as_ref()
            .and_then(|s| s.get_item(&self.key).ok().flatten())
    }

    fn save(&self, locale: &str) {
        if let Some(storage) = &self.storage {
            let _ = storage.set_item(&self.key, locale);
        }
    }
}

/// 使用 `fetch` 获取字典，`cache: "no-store"`
#[derive(Debug, Clone)]
pub struct FetchDictionarySource {
    config: RuntimeConfig,
}

impl FetchDictionarySource {
    pub fn new(config: RuntimeConfig) -> Self {
        Self { config }
    }
}

fn js_error(context: &str, value: JsValue) -> crate::error::I18nError {
    i18n_error!(network, format!("{}: {:?}", context, value))
}

#[async_trait(?Send)]
impl DictionarySource for FetchDictionarySource {
    async fn fetch(&self, locale: &str) -> Result<Dictionary> {
        let url = self.config.dictionary_url(locale);
        let window = web_sys::window().ok_or_else(|| i18n_error!(network, "window 不可用"))?;

        let init = RequestInit::new();
        init.set_method("GET");
        init.set_cache(RequestCache::NoStore);
        let request = Request::new_with_str_and_init(&url, &init)
            .map_err(|e| js_error("创建请求失败", e))?;

        let value = JsFuture::from(window.fetch_with_request(&request))
            .await
            .map_err(|e| js_error("字典请求失败", e))?;
        let response: Response = value
            .dyn_into()
            .map_err(|e| js_error("无效的响应", e))?;

        if !response.ok() {
            return Err(i18n_error!(network, format!("字典不存在: {}", url), response.status()));
        }

        let body = JsFuture::from(response.text().map_err(|e| js_error("读取响应失败", e))?)
            .await
            .map_err(|e| js_error("读取响应失败", e))?;
        let body = body.as_string().unwrap_or_default();
        Ok(serde_json::from_str(&body)?)
    }
}

fn root_style(document: &Document) -> Option<web_sys::CssStyleDeclaration> {
    document
        .document_element()
        .and_then(|e| e.dyn_into::<HtmlElement>().ok())
        .map(|e| e.style())
}

/// 等待 DOMContentLoaded；文档已解析完时立即返回
async fn dom_ready(document: &Document) -> std::result::Result<(), JsValue> {
    if document.ready_state() != "loading" {
        return Ok(());
    }

    let target = document.clone();
    let promise = js_sys::Promise::new(&mut |resolve, _reject| {
        let _ = target.add_event_listener_with_callback("DOMContentLoaded", &resolve);
    });
    JsFuture::from(promise).await.map(|_| ())
}

/// 为 `[data-set-locale]` 控件绑定点击事件：保存语言并整页重新加载
fn wire_locale_switches(root: &Node, store: &LocalStorageStore, config: &RuntimeConfig) {
    for (node, locale) in locale_switches(root) {
        let store = store.clone();
        let config = config.clone();
        let handler = Closure::wrap(Box::new(move |event: Event| {
            event.prevent_default();
            if persist_locale(&store, &config, &locale) {
                if let Some(window) = web_sys::window() {
                    let _ = window.location().reload();
                }
            }
        }) as Box<dyn FnMut(Event)>);

        let _ = node.add_event_listener_with_callback("click", handler.as_ref().unchecked_ref());
        handler.forget();
    }
}

async fn translate_page(document: Document, config: RuntimeConfig) -> std::result::Result<(), JsValue> {
    dom_ready(&document).await?;

    let root: Node = document.clone().into();
    let store = LocalStorageStore::new(&config.storage_key);
    let applier = RuntimeApplier::new(
        config.clone(),
        store.clone(),
        FetchDictionarySource::new(config),
    );
    wire_locale_switches(&root, &store, applier.config());

    let navigator_language = web_sys::window().and_then(|w| w.navigator().language());
    applier.run(&root, navigator_language.as_deref()).await;
    Ok(())
}

/// 将 `tracing` 事件输出到浏览器控制台，字典获取失败等警告由此可见
fn init_console_logging() {
    if tracing::dispatcher::has_been_set() {
        return;
    }

    let config = tracing_wasm::WASMLayerConfigBuilder::new()
        .set_max_level(tracing::Level::INFO)
        .set_report_logs_in_timings(false)
        .build();
    tracing_wasm::set_as_global_default_with_config(config);
}

/// 模块加载入口：先隐藏页面，回填完成后再显示
#[wasm_bindgen(start)]
pub fn start() {
    init_console_logging();

    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        return;
    };

    if let Some(style) = root_style(&document) {
        let _ = style.set_property("visibility", "hidden");
    }

    wasm_bindgen_futures::spawn_local(async move {
        let _ = translate_page(document.clone(), RuntimeConfig::default()).await;
        if let Some(style) = root_style(&document) {
            let _ = style.remove_property("visibility");
        }
    });
}
