//! 运行期字典回填
//!
//! 选择语言、获取对应字典，并按与提取完全相同的遍历规则回填文本与属性。
//! 字典中没有命中的内容保持原样。

use std::cell::RefCell;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::api_constants::runtime_config::SWITCH_ATTRIBUTE;
use crate::cache::Dictionary;
use crate::config::RuntimeConfig;
use crate::dom::{document_element, find_elements_with_attribute, walk, DocumentVisitor, DomNode};
use crate::error::Result;
use crate::keys::hash_key;

/// 用户语言偏好的持久化存储
pub trait LocaleStore {
    fn load(&self) -> Option<String>;

    fn save(&self, locale: &str);
}

/// 字典来源，每次页面加载只调用一次
#[async_trait(?Send)]
pub trait DictionarySource {
    async fn fetch(&self, locale: &str) -> Result<Dictionary>;
}

/// 内存中的语言偏好存储
#[derive(Debug, Default)]
pub struct MemoryLocaleStore {
    locale: RefCell<Option<String>>,
}

impl MemoryLocaleStore {
    pub fn with_locale(locale: &str) -> Self {
        Self {
            locale: RefCell::new(Some(locale.to_string())),
        }
    }
}

impl LocaleStore for MemoryLocaleStore {
    fn load(&self) -> Option<String> {
        self.locale.borrow().clone()
    }

    fn save(&self, locale: &str) {
        *self.locale.borrow_mut() = Some(locale.to_string());
    }
}

/// 选择当前语言
///
/// 优先使用已保存且受支持的偏好；其次取环境语言的前两个字符；否则回退到源语言。
pub fn pick_locale(
    stored: Option<&str>,
    navigator_language: Option<&str>,
    config: &RuntimeConfig,
) -> String {
    if let Some(stored) = stored.filter(|l| config.is_supported(l)) {
        return stored.to_string();
    }

    let navigator: String = navigator_language
        .unwrap_or(&config.source_locale)
        .chars()
        .take(2)
        .collect();
    if config.is_supported(&navigator) {
        navigator
    } else {
        config.source_locale.clone()
    }
}

/// 保存受支持的语言偏好，返回是否已保存
pub fn persist_locale<S: LocaleStore>(store: &S, config: &RuntimeConfig, locale: &str) -> bool {
    if !config.is_supported(locale) {
        return false;
    }
    store.save(locale);
    true
}

/// 回填结果统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplyReport {
    pub texts: usize,
    pub attributes: usize,
    /// 仅统计由标题遍历完成的替换
    ///
    /// 文本遍历覆盖整个文档（包括 `<head>`），标题的文本节点通常已在那一步
    /// 被替换，此时该字段为 `false`，但页面标题同样已翻译。
    pub title: bool,
    pub meta_description: bool,
}

impl ApplyReport {
    pub fn total(&self) -> usize {
        self.texts + self.attributes + usize::from(self.title) + usize::from(self.meta_description)
    }
}

struct Applier<'a> {
    dictionary: &'a Dictionary,
    report: ApplyReport,
}

impl Applier<'_> {
    fn lookup(&self, source: &str) -> Option<&str> {
        self.dictionary
            .get(&hash_key(source))
            .map(String::as_str)
            .filter(|t| !t.is_empty())
    }
}

impl<N: DomNode> DocumentVisitor<N> for Applier<'_> {
    fn visit_text(&mut self, node: &N, source: &str) {
        if let Some(translated) = self.lookup(source) {
            node.set_text(translated);
            self.report.texts += 1;
        }
    }

    fn visit_attribute(&mut self, element: &N, name: &str, source: &str) {
        if let Some(translated) = self.lookup(source) {
            element.set_attribute(name, translated);
            self.report.attributes += 1;
        }
    }

    fn visit_title(&mut self, title: &N, source: &str) {
        if let Some(translated) = self.lookup(source) {
            title.set_text_content(translated);
            self.report.title = true;
        }
    }

    fn visit_meta_description(&mut self, meta: &N, source: &str) {
        if let Some(translated) = self.lookup(source) {
            meta.set_attribute("content", translated);
            self.report.meta_description = true;
        }
    }
}

/// 将字典回填到文档
pub fn apply_dictionary<N: DomNode>(root: &N, dictionary: &Dictionary) -> ApplyReport {
    let mut applier = Applier {
        dictionary,
        report: ApplyReport::default(),
    };
    walk(root, &mut applier);
    applier.report
}

/// 页面上的语言切换控件及其目标语言
pub fn locale_switches<N: DomNode>(root: &N) -> Vec<(N, String)> {
    find_elements_with_attribute(root, SWITCH_ATTRIBUTE)
}

/// 单次运行结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    pub locale: String,
    /// 未获取到字典（源语言或获取失败）时为 `None`
    pub report: Option<ApplyReport>,
}

/// 运行期回填器
pub struct RuntimeApplier<S, F> {
    config: RuntimeConfig,
    store: S,
    source: F,
}

impl<S: LocaleStore, F: DictionarySource> RuntimeApplier<S, F> {
    pub fn new(config: RuntimeConfig, store: S, source: F) -> Self {
        Self {
            config,
            store,
            source,
        }
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// 当前生效的语言
    pub fn active_locale(&self, navigator_language: Option<&str>) -> String {
        pick_locale(
            self.store.load().as_deref(),
            navigator_language,
            &self.config,
        )
    }

    /// 获取字典；源语言直接返回 `None`，获取失败记录警告后返回 `None`
    pub async fn load_dictionary(&self, locale: &str) -> Option<Dictionary> {
        if locale == self.config.source_locale {
            debug!("[i18n] 源语言 {}，无需翻译", locale);
            return None;
        }

        match self.source.fetch(locale).await {
            Ok(dictionary) => Some(dictionary),
            Err(e) => {
                warn!("[i18n] 无可用字典 {}: {}", locale, e);
                None
            }
        }
    }

    /// 选择语言、设置根元素 `lang`、获取字典并回填
    pub async fn run<N: DomNode>(&self, root: &N, navigator_language: Option<&str>) -> RunOutcome {
        let locale = self.active_locale(navigator_language);

        if let Some(html) = document_element(root) {
            html.set_attribute("lang", &locale);
        }

        let report = match self.load_dictionary(&locale).await {
            Some(dictionary) => {
                let report = apply_dictionary(root, &dictionary);
                info!("[i18n] {}: 回填 {} 处", locale, report.total());
                Some(report)
            }
            None => None,
        };

        RunOutcome { locale, report }
    }

    /// 保存用户选择的语言；调用方随后应整页重新加载
    ///
    /// 不受支持的语言返回 `false` 且不做任何保存。
    pub fn switch_locale(&self, locale: &str) -> bool {
        persist_locale(&self.store, &self.config, locale)
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub use native::{FileDictionarySource, HttpDictionarySource};

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::path::PathBuf;

    use async_trait::async_trait;
    use reqwest::header::CACHE_CONTROL;
    use reqwest::Client;
    use url::Url;

    use super::DictionarySource;
    use crate::cache::{read_dictionary, Dictionary};
    use crate::error::Result;
    use crate::i18n_error;

    /// 通过HTTP获取 `<base>/<locale>.json`，绕过缓存
    #[derive(Debug, Clone)]
    pub struct HttpDictionarySource {
        client: Client,
        base: Url,
    }

    impl HttpDictionarySource {
        pub fn new(base: &str) -> Result<Self> {
            let mut base = Url::parse(base).map_err(|e| i18n_error!(config, "dicts_base", e))?;
            if !base.path().ends_with('/') {
                let path = format!("{}/", base.path());
                base.set_path(&path);
            }
            Ok(Self {
                client: Client::new(),
                base,
            })
        }

        pub fn dictionary_url(&self, locale: &str) -> Result<Url> {
            self.base
                .join(&format!("{}.json", locale))
                .map_err(|e| i18n_error!(config, "dicts_base", e))
        }
    }

    #[async_trait(?Send)]
    impl DictionarySource for HttpDictionarySource {
        async fn fetch(&self, locale: &str) -> Result<Dictionary> {
            let url = self.dictionary_url(locale)?;
            let response = self
                .client
                .get(url.clone())
                .header(CACHE_CONTROL, "no-store")
                .send()
                .await?;

            let status = response.status();
            if !status.is_success() {
                return Err(i18n_error!(network, format!("字典不存在: {}", url), status.as_u16()));
            }
            Ok(response.json::<Dictionary>().await?)
        }
    }

    /// 从本地目录（或单个文件）读取字典
    #[derive(Debug, Clone)]
    pub struct FileDictionarySource {
        dir: PathBuf,
        file: Option<PathBuf>,
    }

    impl FileDictionarySource {
        /// 读取 `<dir>/<locale>.json`
        pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
            Self {
                dir: dir.into(),
                file: None,
            }
        }

        /// 无论语言如何都读取同一个文件
        pub fn single(file: impl Into<PathBuf>) -> Self {
            Self {
                dir: PathBuf::new(),
                file: Some(file.into()),
            }
        }
    }

    #[async_trait(?Send)]
    impl DictionarySource for FileDictionarySource {
        async fn fetch(&self, locale: &str) -> Result<Dictionary> {
            let path = self
                .file
                .clone()
                .unwrap_or_else(|| self.dir.join(format!("{}.json", locale)));
            read_dictionary(&path)
        }
    }
}
