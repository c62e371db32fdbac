use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info, warn};

use auto_i18n::applier::{
    DictionarySource, FileDictionarySource, HttpDictionarySource, MemoryLocaleStore, RunOutcome,
    RuntimeApplier,
};
use auto_i18n::builder::{scan_site, CacheBuilder};
use auto_i18n::cache::TranslationCache;
use auto_i18n::config::{dictionary_dir_from_env, BuildConfig, Cli, Command, RuntimeConfig};
use auto_i18n::html_processor::{parse_html, serialize_dom_to_html};
use auto_i18n::keys::{hash_key, normalize};
use auto_i18n::stats::{format_duration, print_build_stats, BuildStats};
use auto_i18n::translator::DeepLProvider;
use auto_i18n::utils::{generate_output_path, init_logging, validate_input_file};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 初始化日志系统
    init_logging();

    let result = match cli.command.unwrap_or(Command::Build) {
        Command::Build => run_build().await,
        Command::Apply {
            input,
            locale,
            dictionary,
            base_url,
            output,
        } => run_apply(input, &locale, dictionary, base_url, output).await,
        Command::Key { text } => {
            println!("{}\t{}", hash_key(&text), normalize(&text));
            Ok(())
        }
    };

    if let Err(e) = result {
        error!("❌ 执行失败: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// 扫描站点、补齐翻译、写出字典与缓存
async fn run_build() -> Result<()> {
    let total_start = Instant::now();

    // 配置缺失时在任何工作开始前失败
    let config = BuildConfig::from_env().context("加载配置失败")?;

    info!("🚀 开始生成多语言字典");
    info!("📂 扫描目录: {}", config.source_dir().display());
    info!("📄 输出目录: {}", config.out_dir().display());
    info!(
        "🌐 {} -> {}",
        config.source_locale(),
        config.target_locales_list().join(", ")
    );

    let scan_start = Instant::now();
    let scan = scan_site(config.source_dir())?;
    let mut stats = BuildStats {
        scan_time: scan_start.elapsed(),
        files_scanned: scan.files_scanned,
        strings_registered: scan.registry.len(),
        collisions: scan.registry.collisions(),
        ..Default::default()
    };

    let mut cache = TranslationCache::load(&config.cache_path())?;
    let provider = DeepLProvider::new(&config)?;
    let builder = CacheBuilder::new(&config, provider);

    let translate_start = Instant::now();
    stats.locales = builder.run(&scan.registry, &mut cache).await?;
    stats.translation_time = translate_start.elapsed();

    let total_duration = total_start.elapsed();
    info!("✅ 构建完成！总耗时: {}", format_duration(total_duration));
    print_build_stats(&stats, total_duration);

    Ok(())
}

/// 用已生成的字典离线渲染单个页面
async fn run_apply(
    input: PathBuf,
    locale: &str,
    dictionary: Option<PathBuf>,
    base_url: Option<String>,
    output: Option<PathBuf>,
) -> Result<()> {
    validate_input_file(&input)?;

    let runtime = RuntimeConfig::default();
    if !runtime.is_supported(locale) {
        anyhow::bail!(
            "不支持的语言: {} (可选: {})",
            locale,
            runtime.supported_locales.join(", ")
        );
    }

    let html = fs::read_to_string(&input)
        .with_context(|| format!("读取文件失败: {}", input.display()))?;
    let dom = parse_html(&html)?;

    let outcome = match (base_url, dictionary) {
        (Some(url), _) => {
            render(&dom.document, runtime, locale, HttpDictionarySource::new(&url)?).await
        }
        (None, Some(file)) => {
            render(&dom.document, runtime, locale, FileDictionarySource::single(file)).await
        }
        (None, None) => {
            let dir = dictionary_dir_from_env();
            render(&dom.document, runtime, locale, FileDictionarySource::in_dir(dir)).await
        }
    };

    match outcome.report {
        Some(report) => info!(
            "🎯 {}: 文本 {} 处，属性 {} 处",
            outcome.locale, report.texts, report.attributes
        ),
        None => warn!("⚠️  页面保持原文: {}", outcome.locale),
    }

    let output_path = generate_output_path(&input, &output, locale);
    let rendered = serialize_dom_to_html(&dom)?;
    fs::write(&output_path, rendered)
        .with_context(|| format!("写入文件失败: {}", output_path.display()))?;
    info!("📄 输出文件: {}", output_path.display());

    Ok(())
}

async fn render<F: DictionarySource>(
    root: &markup5ever_rcdom::Handle,
    runtime: RuntimeConfig,
    locale: &str,
    source: F,
) -> RunOutcome {
    let applier = RuntimeApplier::new(runtime, MemoryLocaleStore::with_locale(locale), source);
    applier.run(root, None).await
}
