//! auto-i18n - 静态HTML站点自动翻译库
//!
//! 构建期扫描HTML、批量翻译并生成各语言字典；运行期在页面中按同一套
//! 规范化与哈希规则回填译文。两端共用 `keys` 与 `dom` 模块。

pub mod api_constants;
pub mod applier;
pub mod cache;
pub mod config;
pub mod dom;
pub mod error;
pub mod extractor;
pub mod html_processor;
pub mod keys;
pub mod stats;
pub mod translator;

#[cfg(not(target_arch = "wasm32"))]
pub mod builder;
#[cfg(not(target_arch = "wasm32"))]
pub mod utils;

#[cfg(target_arch = "wasm32")]
pub mod web;

#[cfg(all(test, not(target_arch = "wasm32")))]
mod test_server;
