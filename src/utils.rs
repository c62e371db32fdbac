use std::path::{Path, PathBuf};

use tracing::warn;
use walkdir::WalkDir;

use crate::api_constants::{env_vars, service_config::HTML_EXTENSION};
use crate::error::Result;
use crate::i18n_error;

/// 初始化日志系统
///
/// 级别由 `AUTO_I18N_LOG` 控制：`debug`、`info`（默认）或 `quiet`
pub fn init_logging() {
    let setting = std::env::var(env_vars::LOG_LEVEL).unwrap_or_default();

    let level = match setting.trim().to_ascii_lowercase().as_str() {
        "quiet" => return,
        "debug" | "verbose" => tracing::Level::DEBUG,
        "warn" => tracing::Level::WARN,
        _ => tracing::Level::INFO,
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}

/// 递归列出目录下的全部 `.html` 文件，按路径排序
pub fn list_html_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(i18n_error!(file_op, dir.display(), "扫描", "目录不存在"));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir).follow_links(false) {
        let entry = entry.map_err(|e| i18n_error!(file_op, dir.display(), "扫描", e))?;
        if entry.file_type().is_file()
            && entry.path().extension().is_some_and(|ext| ext == HTML_EXTENSION)
        {
            files.push(entry.into_path());
        }
    }

    files.sort();
    Ok(files)
}

/// 检查待渲染的页面：必须是已存在的文件，扩展名不是 `.html` 时仅警告
pub fn validate_input_file(path: &Path) -> Result<()> {
    if !path.is_file() {
        let reason = if path.exists() { "输入路径不是文件" } else { "输入文件不存在" };
        return Err(i18n_error!(file_op, path.display(), "读取", reason));
    }

    match path.extension() {
        Some(ext) if ext == HTML_EXTENSION => {}
        other => warn!(
            "⚠️  页面扩展名不是 .{}: {}",
            HTML_EXTENSION,
            other.map(|e| e.to_string_lossy()).unwrap_or_default()
        ),
    }

    Ok(())
}

/// 渲染结果路径：显式指定时直接使用，否则为同目录下的 `<名称>.<语言>.html`
pub fn generate_output_path(input: &Path, output: &Option<PathBuf>, locale: &str) -> PathBuf {
    match output {
        Some(path) => path.clone(),
        None => {
            let stem = input.file_stem().unwrap_or_default().to_string_lossy();
            input.with_file_name(format!("{}.{}.{}", stem, locale, HTML_EXTENSION))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_generate_output_path() {
        assert_eq!(
            generate_output_path(Path::new("site/index.html"), &None, "en"),
            PathBuf::from("site/index.en.html")
        );
        assert_eq!(
            generate_output_path(
                Path::new("site/index.html"),
                &Some(PathBuf::from("out.html")),
                "en"
            ),
            PathBuf::from("out.html")
        );
    }

    #[test]
    fn test_list_html_files_recursive_and_sorted() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("b/c")).unwrap();
        fs::write(dir.path().join("b/c/z.html"), "").unwrap();
        fs::write(dir.path().join("a.html"), "").unwrap();
        fs::write(dir.path().join("style.css"), "").unwrap();
        fs::write(dir.path().join("b/page.htm"), "").unwrap();

        let files = list_html_files(dir.path()).unwrap();
        assert_eq!(
            files,
            vec![dir.path().join("a.html"), dir.path().join("b/c/z.html")]
        );
    }

    #[test]
    fn test_list_html_files_missing_dir() {
        assert!(list_html_files(Path::new("/definitely/not/here")).is_err());
    }

    #[test]
    fn test_validate_input_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("index.html");
        fs::write(&file, "<p>Hola</p>").unwrap();

        assert!(validate_input_file(&file).is_ok());
        assert!(validate_input_file(dir.path()).is_err());
        assert!(validate_input_file(&dir.path().join("missing.html")).is_err());
    }
}
