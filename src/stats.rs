use std::time::Duration;

/// 单个目标语言的构建统计
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocaleStats {
    pub locale: String,
    pub dictionary_entries: usize,
    pub cache_hits: usize,
    pub cache_misses: usize,
    pub batches_sent: usize,
}

/// 构建统计
#[derive(Debug, Default)]
pub struct BuildStats {
    pub scan_time: Duration,
    pub translation_time: Duration,
    pub files_scanned: usize,
    pub strings_registered: usize,
    pub collisions: usize,
    pub locales: Vec<LocaleStats>,
}

impl BuildStats {
    /// 全部语言的缓存命中数
    pub fn total_cache_hits(&self) -> usize {
        self.locales.iter().map(|l| l.cache_hits).sum()
    }

    /// 全部语言的缓存未命中数（即发送给翻译服务的文本数）
    pub fn total_cache_misses(&self) -> usize {
        self.locales.iter().map(|l| l.cache_misses).sum()
    }

    pub fn total_batches(&self) -> usize {
        self.locales.iter().map(|l| l.batches_sent).sum()
    }
}

/// 打印构建统计
pub fn print_build_stats(stats: &BuildStats, total_duration: Duration) {
    println!("\n📊 构建统计报告:");
    println!("═══════════════════════════════════════");

    println!("⏱️  时间分解:");
    println!("   文件扫描: {}", format_duration(stats.scan_time));
    println!("   翻译与写入: {}", format_duration(stats.translation_time));
    println!("   总耗时: {}", format_duration(total_duration));

    println!("\n🔤 文本统计:");
    println!("   扫描文件: {} 个", stats.files_scanned);
    println!("   登记文本: {} 项", stats.strings_registered);
    if stats.collisions > 0 {
        println!("   ⚠️  哈希冲突: {} 次", stats.collisions);
    }

    println!("\n🌐 语言统计:");
    for locale in &stats.locales {
        println!(
            "   {}: {} 条 (缓存命中 {}，新翻译 {}，批次 {})",
            locale.locale,
            locale.dictionary_entries,
            locale.cache_hits,
            locale.cache_misses,
            locale.batches_sent
        );
    }

    let lookups = stats.total_cache_hits() + stats.total_cache_misses();
    if lookups > 0 {
        let hit_rate = stats.total_cache_hits() as f64 / lookups as f64;
        println!("\n💾 缓存统计:");
        println!("   缓存命中: {} 次", stats.total_cache_hits());
        println!("   缓存未命中: {} 次", stats.total_cache_misses());
        println!("   命中率: {:.1}%", hit_rate * 100.0);
        println!("   请求批次: {} 个", stats.total_batches());
    }
}

/// 格式化持续时间
pub fn format_duration(duration: Duration) -> String {
    let millis = duration.as_millis();
    if millis < 1000 {
        format!("{}ms", millis)
    } else {
        format!("{:.3}s", duration.as_secs_f64())
    }
}
