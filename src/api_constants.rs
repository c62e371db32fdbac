/// 翻译与字典相关常量
///
/// 该文件集中定义构建期与运行期共用的常量，两端必须保持一致

/// 默认翻译API配置
pub mod api_config {
    /// DeepL免费版接口地址（付费账号可通过 DEEPL_API_URL 覆盖）
    pub const DEFAULT_API_URL: &str = "https://api-free.deepl.com/v2/translate";

    /// DeepL认证头前缀
    pub const AUTH_SCHEME: &str = "DeepL-Auth-Key";

    /// 请求超时时间（秒）
    pub const REQUEST_TIMEOUT_SECONDS: u64 = 30;
}

/// 环境变量名称
pub mod env_vars {
    pub const API_KEY: &str = "DEEPL_API_KEY";
    pub const API_URL: &str = "DEEPL_API_URL";
    pub const SRC_DIR: &str = "AUTO_I18N_SRC_DIR";
    pub const OUT_DIR: &str = "AUTO_I18N_OUT_DIR";
    pub const BATCH_SIZE: &str = "AUTO_I18N_BATCH_SIZE";
    pub const LOG_LEVEL: &str = "AUTO_I18N_LOG";
}

/// 语言配置
pub mod locale_config {
    /// 源语言：页面原文所用语言，从不翻译
    pub const SOURCE_LOCALE: &str = "es";

    /// 构建期生成字典的目标语言
    pub const TARGET_LOCALES: &[&str] = &["en", "fr"];

    /// 运行期支持切换的全部语言（含源语言）
    pub const SUPPORTED_LOCALES: &[&str] = &["es", "en", "fr"];
}

/// 构建服务配置
pub mod service_config {
    /// 默认批处理大小
    pub const DEFAULT_BATCH_SIZE: usize = 40;

    /// 默认扫描目录
    pub const DEFAULT_SRC_DIR: &str = ".";

    /// 字典输出目录（相对扫描目录）
    pub const DEFAULT_OUT_DIR: &str = "assets/i18n/auto";

    /// 持久化缓存文件名
    pub const CACHE_FILE_NAME: &str = "_cache.json";

    /// HTML文件扩展名
    pub const HTML_EXTENSION: &str = "html";
}

/// 运行期配置
pub mod runtime_config {
    /// 字典静态资源路径
    pub const DICTS_BASE: &str = "/assets/i18n/auto";

    /// 本地存储中保存用户语言的键
    pub const STORAGE_KEY: &str = "locale";

    /// 语言切换控件上的属性
    pub const SWITCH_ATTRIBUTE: &str = "data-set-locale";
}

/// 文本提取规则
pub mod extraction_config {
    /// 需要翻译的属性
    pub const TRANSLATABLE_ATTRIBUTES: &[&str] = &["placeholder", "title", "alt", "aria-label"];

    /// 内容永不翻译的元素
    pub const DISALLOWED_ELEMENTS: &[&str] = &["script", "style", "noscript", "iframe", "code", "pre"];
}

/// 键哈希参数
pub mod key_config {
    pub const HASH_SEED: u32 = 5381;
    pub const KEY_PREFIX: char = 'k';
    pub const NBSP: char = '\u{00A0}';
}

/// 验证语言代码是否在给定列表中
pub fn is_supported_locale(supported: &[String], locale: &str) -> bool {
    supported.iter().any(|l| l == locale)
}

/// 验证API URL是否有效
pub fn is_valid_api_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locale_validation() {
        let supported: Vec<String> = locale_config::SUPPORTED_LOCALES
            .iter()
            .map(|l| l.to_string())
            .collect();
        assert!(is_supported_locale(&supported, "es"));
        assert!(is_supported_locale(&supported, "fr"));
        assert!(!is_supported_locale(&supported, "de"));
    }

    #[test]
    fn test_targets_are_supported_at_runtime() {
        for target in locale_config::TARGET_LOCALES {
            assert!(locale_config::SUPPORTED_LOCALES.contains(target));
        }
        assert!(!locale_config::TARGET_LOCALES.contains(&locale_config::SOURCE_LOCALE));
    }

    #[test]
    fn test_api_url_validation() {
        assert!(is_valid_api_url(api_config::DEFAULT_API_URL));
        assert!(is_valid_api_url("http://localhost:8080"));
        assert!(!is_valid_api_url("ftp://example.com"));
    }
}
