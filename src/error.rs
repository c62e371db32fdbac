//! 错误类型
//!
//! 构建期的所有错误都是致命的；运行期只有字典获取失败会被降级为警告

use std::fmt;

use anyhow::Error as AnyhowError;

#[derive(Debug)]
pub enum I18nError {
    /// 配置缺失或无效，在任何工作开始前返回
    Configuration { field: String, reason: String },

    /// 翻译服务返回非成功状态，`message` 为原始响应体
    TranslationApi {
        status_code: u16,
        message: String,
        api_url: String,
    },

    /// 连接失败、超时或字典请求返回非成功状态
    Network {
        message: String,
        status_code: Option<u16>,
    },

    HtmlParse { details: String },

    /// `operation` 取值如“读取”“写入”“创建目录”
    FileOperation {
        path: String,
        operation: String,
        source: String,
    },

    /// 缓存、字典或API响应的JSON无法解析
    Serialization { details: String },

    Internal { source: AnyhowError },
}

impl fmt::Display for I18nError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            I18nError::Configuration { field, reason } => {
                write!(f, "配置错误 [{}]: {}", field, reason)
            }
            I18nError::TranslationApi {
                status_code,
                message,
                api_url,
            } => {
                write!(f, "翻译API错误 [{}] {}: {}", status_code, api_url, message)
            }
            I18nError::Network {
                message,
                status_code,
            } => {
                if let Some(code) = status_code {
                    write!(f, "网络请求失败 [{}]: {}", code, message)
                } else {
                    write!(f, "网络请求失败: {}", message)
                }
            }
            I18nError::HtmlParse { details } => {
                write!(f, "HTML解析失败: {}", details)
            }
            I18nError::FileOperation {
                path,
                operation,
                source,
            } => {
                write!(f, "文件{}操作失败 [{}]: {}", operation, path, source)
            }
            I18nError::Serialization { details } => {
                write!(f, "JSON处理失败: {}", details)
            }
            I18nError::Internal { source } => {
                write!(f, "内部处理错误: {}", source)
            }
        }
    }
}

impl std::error::Error for I18nError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            I18nError::Internal { source } => Some(source.as_ref()),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, I18nError>;

/// 构造 `I18nError` 的简写
#[macro_export]
macro_rules! i18n_error {
    (config, $field:expr, $reason:expr) => {
        $crate::error::I18nError::Configuration {
            field: $field.to_string(),
            reason: $reason.to_string(),
        }
    };
    (translation_api, $code:expr, $msg:expr, $url:expr) => {
        $crate::error::I18nError::TranslationApi {
            status_code: $code,
            message: $msg.to_string(),
            api_url: $url.to_string(),
        }
    };
    (network, $msg:expr) => {
        $crate::error::I18nError::Network {
            message: $msg.to_string(),
            status_code: None,
        }
    };
    (network, $msg:expr, $code:expr) => {
        $crate::error::I18nError::Network {
            message: $msg.to_string(),
            status_code: Some($code),
        }
    };
    (html_parse, $details:expr) => {
        $crate::error::I18nError::HtmlParse {
            details: $details.to_string(),
        }
    };
    (file_op, $path:expr, $op:expr, $source:expr) => {
        $crate::error::I18nError::FileOperation {
            path: $path.to_string(),
            operation: $op.to_string(),
            source: $source.to_string(),
        }
    };
}

impl From<AnyhowError> for I18nError {
    fn from(error: AnyhowError) -> Self {
        I18nError::Internal { source: error }
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl From<reqwest::Error> for I18nError {
    fn from(error: reqwest::Error) -> Self {
        let status_code = error.status().map(|s| s.as_u16());
        I18nError::Network {
            message: error.to_string(),
            status_code,
        }
    }
}

/// 未携带路径的IO错误；需要路径时请使用 `i18n_error!(file_op, ..)`
impl From<std::io::Error> for I18nError {
    fn from(error: std::io::Error) -> Self {
        I18nError::FileOperation {
            path: "-".to_string(),
            operation: format!("{:?}", error.kind()),
            source: error.to_string(),
        }
    }
}

impl From<serde_json::Error> for I18nError {
    fn from(error: serde_json::Error) -> Self {
        I18nError::Serialization {
            details: error.to_string(),
        }
    }
}
