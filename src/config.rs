//! 配置管理模块
//!
//! 启动时构造一次配置结构，显式传入各组件；不使用全局状态

// 标准库导入
use std::path::{Path, PathBuf};

// 本地模块导入
use crate::api_constants::{
    api_config, env_vars, is_supported_locale, is_valid_api_url, locale_config, runtime_config,
    service_config,
};
use crate::error::Result;
use crate::i18n_error;

/// 构建期配置
///
/// 支持Builder模式进行链式配置。
///
/// # Examples
///
/// ```rust
/// use auto_i18n::config::BuildConfig;
///
/// let config = BuildConfig::new("secret-key")
///     .with_source_dir("site")
///     .with_batch_size(20)
///     .target_locales(&["en", "fr"]);
/// assert_eq!(config.out_dir(), std::path::Path::new("site/assets/i18n/auto"));
/// ```
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// 扫描HTML的根目录
    source_dir: PathBuf,
    /// 字典输出目录；未设置时为 `source_dir/assets/i18n/auto`
    out_dir: Option<PathBuf>,
    /// 源语言
    source_locale: String,
    /// 目标语言列表
    target_locales: Vec<String>,
    /// 翻译API密钥
    api_key: String,
    /// 翻译API地址
    api_url: String,
    /// 批处理大小
    batch_size: usize,
    /// 请求超时（秒）
    request_timeout_secs: u64,
}

impl BuildConfig {
    /// 创建具有默认值的配置实例：
    /// - 扫描目录: 当前目录
    /// - 源语言: es，目标语言: en、fr
    /// - API地址: DeepL免费版
    /// - 批处理大小: 40
    pub fn new(api_key: &str) -> Self {
        Self {
            source_dir: PathBuf::from(service_config::DEFAULT_SRC_DIR),
            out_dir: None,
            source_locale: locale_config::SOURCE_LOCALE.to_string(),
            target_locales: locale_config::TARGET_LOCALES
                .iter()
                .map(|l| l.to_string())
                .collect(),
            api_key: api_key.to_string(),
            api_url: api_config::DEFAULT_API_URL.to_string(),
            batch_size: service_config::DEFAULT_BATCH_SIZE,
            request_timeout_secs: api_config::REQUEST_TIMEOUT_SECONDS,
        }
    }

    /// 从环境变量构造配置
    ///
    /// `DEEPL_API_KEY` 必填；其余变量可选，用于覆盖默认值。
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// 使用自定义查找函数构造配置（便于测试）
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup(env_vars::API_KEY)
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| i18n_error!(config, env_vars::API_KEY, "未设置翻译API密钥"))?;

        let mut config = Self::new(api_key.trim());

        if let Some(url) = lookup(env_vars::API_URL).filter(|u| !u.is_empty()) {
            config = config.with_api_url(&url);
        }
        if let Some(dir) = lookup(env_vars::SRC_DIR).filter(|d| !d.is_empty()) {
            config = config.with_source_dir(dir);
        }
        if let Some(dir) = lookup(env_vars::OUT_DIR).filter(|d| !d.is_empty()) {
            config = config.with_out_dir(dir);
        }
        if let Some(size) = lookup(env_vars::BATCH_SIZE).filter(|s| !s.is_empty()) {
            let size: usize = size
                .trim()
                .parse()
                .map_err(|_| i18n_error!(config, env_vars::BATCH_SIZE, format!("无效的数字: {}", size)))?;
            config = config.with_batch_size(size);
        }

        config.validate()?;
        Ok(config)
    }

    /// 校验配置
    pub fn validate(&self) -> Result<()> {
        if !is_valid_api_url(&self.api_url) {
            return Err(i18n_error!(config, env_vars::API_URL, format!("无效的API地址: {}", self.api_url)));
        }
        if self.batch_size == 0 {
            return Err(i18n_error!(config, env_vars::BATCH_SIZE, "批处理大小必须大于0"));
        }
        if is_supported_locale(&self.target_locales, &self.source_locale) {
            return Err(i18n_error!(config, "target_locales", "目标语言不能包含源语言"));
        }
        Ok(())
    }

    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    pub fn out_dir(&self) -> PathBuf {
        self.out_dir
            .clone()
            .unwrap_or_else(|| self.source_dir.join(service_config::DEFAULT_OUT_DIR))
    }

    /// 持久化缓存路径
    pub fn cache_path(&self) -> PathBuf {
        self.out_dir().join(service_config::CACHE_FILE_NAME)
    }

    /// 指定语言的字典路径
    pub fn dictionary_path(&self, locale: &str) -> PathBuf {
        self.out_dir().join(format!("{}.json", locale))
    }

    pub fn source_locale(&self) -> &str {
        &self.source_locale
    }

    pub fn target_locales_list(&self) -> &[String] {
        &self.target_locales
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn request_timeout_secs(&self) -> u64 {
        self.request_timeout_secs
    }

    /// 设置扫描目录
    pub fn with_source_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.source_dir = dir.into();
        self
    }

    /// 设置输出目录
    pub fn with_out_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.out_dir = Some(dir.into());
        self
    }

    /// 设置源语言
    pub fn source_locale_code(mut self, locale: &str) -> Self {
        self.source_locale = locale.to_string();
        self
    }

    /// 设置目标语言列表
    pub fn target_locales(mut self, locales: &[&str]) -> Self {
        self.target_locales = locales.iter().map(|l| l.to_string()).collect();
        self
    }

    /// 设置API地址
    pub fn with_api_url(mut self, url: &str) -> Self {
        self.api_url = url.to_string();
        self
    }

    /// 设置批处理大小
    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size;
        self
    }
}

/// 字典所在目录：`AUTO_I18N_OUT_DIR`，否则为扫描目录下的默认输出目录
///
/// 离线渲染不需要API密钥，因此不经过 `BuildConfig`。
pub fn dictionary_dir_from_env() -> PathBuf {
    dictionary_dir_from_lookup(|name| std::env::var(name).ok())
}

fn dictionary_dir_from_lookup<F>(lookup: F) -> PathBuf
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(dir) = lookup(env_vars::OUT_DIR).filter(|d| !d.is_empty()) {
        return PathBuf::from(dir);
    }
    let source_dir = lookup(env_vars::SRC_DIR)
        .filter(|d| !d.is_empty())
        .unwrap_or_else(|| service_config::DEFAULT_SRC_DIR.to_string());
    PathBuf::from(source_dir).join(service_config::DEFAULT_OUT_DIR)
}

/// 运行期配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// 可切换的语言（含源语言）
    pub supported_locales: Vec<String>,
    /// 源语言，选中时不获取字典
    pub source_locale: String,
    /// 字典静态资源路径前缀
    pub dicts_base: String,
    /// 本地存储键
    pub storage_key: String,
}

impl RuntimeConfig {
    pub fn is_supported(&self, locale: &str) -> bool {
        is_supported_locale(&self.supported_locales, locale)
    }

    /// 指定语言字典的地址
    pub fn dictionary_url(&self, locale: &str) -> String {
        format!("{}/{}.json", self.dicts_base.trim_end_matches('/'), locale)
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            supported_locales: locale_config::SUPPORTED_LOCALES
                .iter()
                .map(|l| l.to_string())
                .collect(),
            source_locale: locale_config::SOURCE_LOCALE.to_string(),
            dicts_base: runtime_config::DICTS_BASE.to_string(),
            storage_key: runtime_config::STORAGE_KEY.to_string(),
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub use cli::{Cli, Command};

#[cfg(not(target_arch = "wasm32"))]
mod cli {
    use std::path::PathBuf;

    use clap::{Parser, Subcommand};

    /// CLI参数结构
    ///
    /// 不带子命令时执行构建；构建所需配置全部来自环境变量。
    #[derive(Parser, Debug)]
    #[command(author, version, about = "静态HTML站点自动翻译 - 构建多语言字典", long_about = None)]
    pub struct Cli {
        #[command(subcommand)]
        pub command: Option<Command>,
    }

    #[derive(Subcommand, Debug)]
    pub enum Command {
        /// 扫描HTML并生成各语言字典（默认）
        Build,

        /// 使用已生成的字典离线渲染单个页面
        Apply {
            /// 输入HTML文件
            #[arg(short, long, value_name = "FILE")]
            input: PathBuf,

            /// 目标语言代码
            #[arg(short, long)]
            locale: String,

            /// 字典文件 (可选，默认取输出目录下的 <locale>.json)
            #[arg(short, long, value_name = "FILE")]
            dictionary: Option<PathBuf>,

            /// 从已部署站点获取字典，如 https://hotel.example/assets/i18n/auto
            #[arg(long, value_name = "URL", conflicts_with = "dictionary")]
            base_url: Option<String>,

            /// 输出文件路径 (可选，默认为输入文件名+语言代码)
            #[arg(short, long, value_name = "FILE")]
            output: Option<PathBuf>,
        },

        /// 显示文本的规范化结果与字典键
        Key {
            /// 原文
            text: String,
        },
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;
    use crate::error::I18nError;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn test_missing_api_key_is_configuration_error() {
        let err = BuildConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, I18nError::Configuration { ref field, .. } if field == "DEEPL_API_KEY"));

        let err = BuildConfig::from_lookup(lookup(&[("DEEPL_API_KEY", "  ")])).unwrap_err();
        assert!(matches!(err, I18nError::Configuration { .. }));
    }

    #[test]
    fn test_defaults_from_env() {
        let config = BuildConfig::from_lookup(lookup(&[("DEEPL_API_KEY", "abc:fx")])).unwrap();
        assert_eq!(config.api_key(), "abc:fx");
        assert_eq!(config.api_url(), api_config::DEFAULT_API_URL);
        assert_eq!(config.batch_size(), 40);
        assert_eq!(config.source_locale(), "es");
        assert_eq!(config.target_locales_list(), &["en".to_string(), "fr".to_string()]);
        assert_eq!(config.cache_path(), PathBuf::from("./assets/i18n/auto/_cache.json"));
    }

    #[test]
    fn test_env_overrides() {
        let config = BuildConfig::from_lookup(lookup(&[
            ("DEEPL_API_KEY", "abc"),
            ("DEEPL_API_URL", "https://api.deepl.com/v2/translate"),
            ("AUTO_I18N_SRC_DIR", "public"),
            ("AUTO_I18N_OUT_DIR", "dist/i18n"),
            ("AUTO_I18N_BATCH_SIZE", "10"),
        ]))
        .unwrap();

        assert_eq!(config.api_url(), "https://api.deepl.com/v2/translate");
        assert_eq!(config.source_dir(), Path::new("public"));
        assert_eq!(config.dictionary_path("en"), PathBuf::from("dist/i18n/en.json"));
        assert_eq!(config.batch_size(), 10);
    }

    #[test]
    fn test_invalid_overrides_rejected() {
        assert!(BuildConfig::from_lookup(lookup(&[
            ("DEEPL_API_KEY", "abc"),
            ("AUTO_I18N_BATCH_SIZE", "zero"),
        ]))
        .is_err());
        assert!(BuildConfig::from_lookup(lookup(&[
            ("DEEPL_API_KEY", "abc"),
            ("AUTO_I18N_BATCH_SIZE", "0"),
        ]))
        .is_err());
        assert!(BuildConfig::from_lookup(lookup(&[
            ("DEEPL_API_KEY", "abc"),
            ("DEEPL_API_URL", "ftp://deepl"),
        ]))
        .is_err());
    }

    #[test]
    fn test_builder_locales() {
        let config = BuildConfig::new("abc")
            .source_locale_code("en")
            .target_locales(&["es", "fr"]);
        assert!(config.validate().is_ok());
        assert_eq!(config.source_locale(), "en");

        let config = BuildConfig::new("abc").target_locales(&["en", "es"]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_dictionary_dir_without_api_key() {
        assert_eq!(
            dictionary_dir_from_lookup(lookup(&[("AUTO_I18N_SRC_DIR", "public")])),
            PathBuf::from("public/assets/i18n/auto")
        );
        assert_eq!(
            dictionary_dir_from_lookup(lookup(&[("AUTO_I18N_OUT_DIR", "dist/i18n")])),
            PathBuf::from("dist/i18n")
        );
    }

    #[test]
    fn test_cli_without_arguments_builds() {
        use clap::Parser;

        let cli = Cli::try_parse_from(["auto-i18n"]).unwrap();
        assert!(cli.command.is_none());

        let cli = Cli::try_parse_from(["auto-i18n", "apply", "-i", "index.html", "-l", "en"]).unwrap();
        match cli.command {
            Some(Command::Apply { input, locale, .. }) => {
                assert_eq!(input, PathBuf::from("index.html"));
                assert_eq!(locale, "en");
            }
            other => panic!("unexpected command: {other:?}"),
        }

        assert!(Cli::try_parse_from([
            "auto-i18n", "apply", "-i", "a.html", "-l", "en", "-d", "en.json", "--base-url", "https://x"
        ])
        .is_err());
    }

    #[test]
    fn test_runtime_dictionary_url() {
        let config = RuntimeConfig::default();
        assert_eq!(config.dictionary_url("en"), "/assets/i18n/auto/en.json");
        assert!(config.is_supported("fr"));
        assert!(!config.is_supported("de"));
    }
}
