//! 构建期字典生成
//!
//! 扫描站点HTML得到注册表，按目标语言依次补齐缺失译文，
//! 写出每个语言的字典文件，最后重写持久化缓存。

use std::fs;
use std::path::Path;

use tracing::{debug, info};

use crate::cache::{write_dictionary, Dictionary, TranslationCache};
use crate::config::BuildConfig;
use crate::error::Result;
use crate::extractor::{extract_into, Registry};
use crate::html_processor::parse_html;
use crate::i18n_error;
use crate::stats::LocaleStats;
use crate::translator::TranslationProvider;
use crate::utils::list_html_files;

/// 扫描结果
#[derive(Debug, Default)]
pub struct ScanResult {
    pub registry: Registry,
    pub files_scanned: usize,
}

/// 递归扫描目录下的全部HTML文件并提取注册表
pub fn scan_site(source_dir: &Path) -> Result<ScanResult> {
    let files = list_html_files(source_dir)?;
    info!("📂 发现 {} 个HTML文件: {}", files.len(), source_dir.display());

    let mut registry = Registry::new();
    for file in &files {
        let html = fs::read_to_string(file)
            .map_err(|e| i18n_error!(file_op, file.display(), "读取", e))?;
        let dom = parse_html(&html)?;
        let before = registry.len();
        extract_into(&dom.document, &mut registry);
        debug!("{}: 新增 {} 条文本", file.display(), registry.len() - before);
    }

    info!("📝 共登记 {} 条可翻译文本", registry.len());
    Ok(ScanResult {
        registry,
        files_scanned: files.len(),
    })
}

/// 单个语言的构建结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocaleBuild {
    pub dictionary: Dictionary,
    pub stats: LocaleStats,
}

/// 字典与缓存构建器
pub struct CacheBuilder<'a, P> {
    config: &'a BuildConfig,
    provider: P,
}

impl<'a, P: TranslationProvider> CacheBuilder<'a, P> {
    pub fn new(config: &'a BuildConfig, provider: P) -> Self {
        Self { config, provider }
    }

    /// 为单个目标语言生成字典，缺失译文按批次顺序请求翻译服务
    ///
    /// 已缓存的文本不会出现在任何请求批次中。任一批次失败立即返回错误，
    /// 此前写入缓存的译文保留在内存中。
    pub async fn build_locale(
        &self,
        registry: &Registry,
        cache: &mut TranslationCache,
        locale: &str,
    ) -> Result<LocaleBuild> {
        let mut dictionary = Dictionary::new();
        let mut missing: Vec<(&str, String)> = Vec::new();
        let mut stats = LocaleStats {
            locale: locale.to_string(),
            ..Default::default()
        };

        for (key, source) in registry.iter() {
            match cache.get(source, locale) {
                Some(cached) => {
                    dictionary.insert(key.to_string(), cached.to_string());
                    stats.cache_hits += 1;
                }
                None => missing.push((key, source.to_string())),
            }
        }
        stats.cache_misses = missing.len();

        info!(
            "🌐 {}: 缓存命中 {} 条，需翻译 {} 条",
            locale,
            stats.cache_hits,
            missing.len()
        );

        let batch_size = self.config.batch_size().max(1);
        let mut done = 0;
        for chunk in missing.chunks(batch_size) {
            let texts: Vec<String> = chunk.iter().map(|(_, source)| source.clone()).collect();
            let translations = self
                .provider
                .translate_batch(&texts, self.config.source_locale(), locale)
                .await?;
            stats.batches_sent += 1;

            for ((key, source), translated) in chunk.iter().zip(translations) {
                cache.insert(source, locale, &translated);
                dictionary.insert(key.to_string(), translated);
            }

            done += chunk.len();
            info!("翻译进度 {}/{} -> {}", done, missing.len(), locale);
        }

        stats.dictionary_entries = dictionary.len();
        Ok(LocaleBuild { dictionary, stats })
    }

    /// 依次处理全部目标语言并写出字典，最后重写缓存文件
    pub async fn run(
        &self,
        registry: &Registry,
        cache: &mut TranslationCache,
    ) -> Result<Vec<LocaleStats>> {
        let out_dir = self.config.out_dir();
        fs::create_dir_all(&out_dir)
            .map_err(|e| i18n_error!(file_op, out_dir.display(), "创建目录", e))?;

        let mut all_stats = Vec::new();
        for locale in self.config.target_locales_list() {
            let build = self.build_locale(registry, cache, locale).await?;
            write_dictionary(&self.config.dictionary_path(locale), &build.dictionary)?;
            all_stats.push(build.stats);
        }

        cache.save(&self.config.cache_path())?;
        info!("✅ 字典已生成: {}", out_dir.display());
        Ok(all_stats)
    }
}
