//! 持久化翻译缓存与字典文件
//!
//! 缓存结构为 原文 → (语言 → 译文)，跨构建保留且从不清理；
//! 字典结构为 键 → 译文，每次构建完整重写。

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::Result;
use crate::i18n_error;

/// 单个目标语言的字典：键 → 译文
pub type Dictionary = BTreeMap<String, String>;

/// 原文 → (语言 → 译文)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TranslationCache {
    entries: BTreeMap<String, BTreeMap<String, String>>,
}

impl TranslationCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// 读取缓存文件；文件不存在时返回空缓存
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!("💾 未找到缓存文件，使用空缓存: {}", path.display());
            return Ok(Self::new());
        }

        let content = fs::read_to_string(path)
            .map_err(|e| i18n_error!(file_op, path.display(), "读取", e))?;
        let cache: Self = serde_json::from_str(&content)?;
        info!("💾 已加载缓存: {} 条原文", cache.len());
        Ok(cache)
    }

    /// 完整重写缓存文件
    pub fn save(&self, path: &Path) -> Result<()> {
        write_json(path, &self.entries)?;
        debug!("缓存已写入: {}", path.display());
        Ok(())
    }

    /// 查询已缓存的译文；空字符串视为未缓存
    pub fn get(&self, source: &str, locale: &str) -> Option<&str> {
        self.entries
            .get(source)
            .and_then(|by_locale| by_locale.get(locale))
            .map(String::as_str)
            .filter(|t| !t.is_empty())
    }

    pub fn insert(&mut self, source: &str, locale: &str, translation: &str) {
        self.entries
            .entry(source.to_string())
            .or_default()
            .insert(locale.to_string(), translation.to_string());
    }

    /// 缓存中的原文数量
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// 写入单个语言的字典文件
pub fn write_dictionary(path: &Path, dictionary: &Dictionary) -> Result<()> {
    write_json(path, dictionary)?;
    info!("📄 字典已写入: {} ({} 条)", path.display(), dictionary.len());
    Ok(())
}

/// 读取字典文件
pub fn read_dictionary(path: &Path) -> Result<Dictionary> {
    let content = fs::read_to_string(path)
        .map_err(|e| i18n_error!(file_op, path.display(), "读取", e))?;
    Ok(serde_json::from_str(&content)?)
}

/// 以两空格缩进写出JSON，必要时创建父目录
fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .map_err(|e| i18n_error!(file_op, parent.display(), "创建目录", e))?;
        }
    }

    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json).map_err(|e| i18n_error!(file_op, path.display(), "写入", e))
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;

    #[test]
    fn test_missing_cache_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let cache = TranslationCache::load(&dir.path().join("_cache.json")).unwrap();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_cache_persists_across_runs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("_cache.json");

        let mut cache = TranslationCache::new();
        cache.insert("Piscina climatizada", "en", "Heated pool");
        cache.insert("Piscina climatizada", "fr", "Piscine chauffée");
        cache.save(&path).unwrap();

        let loaded = TranslationCache::load(&path).unwrap();
        assert_eq!(loaded, cache);
        assert_eq!(loaded.get("Piscina climatizada", "fr"), Some("Piscine chauffée"));

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["Piscina climatizada"]["en"], "Heated pool");
    }

    #[test]
    fn test_empty_translation_counts_as_missing() {
        let mut cache = TranslationCache::new();
        cache.insert("Hola", "en", "");
        assert_eq!(cache.get("Hola", "en"), None);
        assert_eq!(cache.get("Hola", "fr"), None);
    }

    #[test]
    fn test_malformed_cache_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("_cache.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(TranslationCache::load(&path).is_err());
    }

    #[test]
    fn test_dictionary_is_flat_and_sorted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("en.json");

        let mut dict = Dictionary::new();
        dict.insert("k74f4284d".to_string(), "Welcome to the hotel".to_string());
        dict.insert("k51dad703".to_string(), "Heated pool".to_string());
        write_dictionary(&path, &dict).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(
            written,
            "{\n  \"k51dad703\": \"Heated pool\",\n  \"k74f4284d\": \"Welcome to the hotel\"\n}"
        );
        assert_eq!(read_dictionary(&path).unwrap(), dict);
    }
}
