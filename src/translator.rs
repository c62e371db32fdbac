//! 翻译服务
//!
//! `TranslationProvider` 接收一批原文并按输入顺序返回译文；
//! `DeepLProvider` 是基于DeepL HTTP接口的实现。

use async_trait::async_trait;

use crate::error::Result;

/// 批量翻译服务
#[async_trait]
pub trait TranslationProvider {
    /// 翻译一批文本，返回值与输入一一对应且顺序相同
    async fn translate_batch(
        &self,
        texts: &[String],
        source_locale: &str,
        target_locale: &str,
    ) -> Result<Vec<String>>;
}

#[cfg(not(target_arch = "wasm32"))]
pub use deepl::DeepLProvider;

#[cfg(not(target_arch = "wasm32"))]
mod deepl {
    use std::time::Duration;

    use anyhow::Context;
    use async_trait::async_trait;
    use reqwest::Client;
    use serde::Deserialize;
    use tracing::debug;

    use super::TranslationProvider;
    use crate::api_constants::api_config::AUTH_SCHEME;
    use crate::config::BuildConfig;
    use crate::error::Result;
    use crate::i18n_error;

    #[derive(Debug, Deserialize)]
    struct DeepLResponse {
        translations: Vec<DeepLTranslation>,
    }

    #[derive(Debug, Deserialize)]
    struct DeepLTranslation {
        text: String,
    }

    /// DeepL翻译客户端
    #[derive(Debug, Clone)]
    pub struct DeepLProvider {
        client: Client,
        api_url: String,
        api_key: String,
    }

    impl DeepLProvider {
        pub fn new(config: &BuildConfig) -> Result<Self> {
            let client = Client::builder()
                .timeout(Duration::from_secs(config.request_timeout_secs()))
                .build()
                .context("创建HTTP客户端失败")?;

            Ok(Self {
                client,
                api_url: config.api_url().to_string(),
                api_key: config.api_key().to_string(),
            })
        }
    }

    /// 构造表单字段：每条原文一个 `text`，语言代码大写
    pub(super) fn form_fields<'a>(
        texts: &'a [String],
        source_locale: &str,
        target_locale: &str,
    ) -> Vec<(&'static str, std::borrow::Cow<'a, str>)> {
        let mut fields: Vec<(&'static str, std::borrow::Cow<'a, str>)> = texts
            .iter()
            .map(|t| ("text", std::borrow::Cow::Borrowed(t.as_str())))
            .collect();
        fields.push(("target_lang", target_locale.to_uppercase().into()));
        fields.push(("source_lang", source_locale.to_uppercase().into()));
        fields
    }

    /// 解析响应体，校验译文数量与输入一致
    pub(super) fn parse_response(body: &str, expected: usize, api_url: &str) -> Result<Vec<String>> {
        let parsed: DeepLResponse = serde_json::from_str(body)?;
        if parsed.translations.len() != expected {
            return Err(i18n_error!(
                translation_api,
                200,
                format!(
                    "译文数量不匹配: 期望 {} 条，实际 {} 条",
                    expected,
                    parsed.translations.len()
                ),
                api_url
            ));
        }
        Ok(parsed.translations.into_iter().map(|t| t.text).collect())
    }

    #[async_trait]
    impl TranslationProvider for DeepLProvider {
        async fn translate_batch(
            &self,
            texts: &[String],
            source_locale: &str,
            target_locale: &str,
        ) -> Result<Vec<String>> {
            if texts.is_empty() {
                return Ok(vec![]);
            }

            debug!("发送翻译请求: {} 条 -> {}", texts.len(), target_locale);

            let response = self
                .client
                .post(&self.api_url)
                .header(
                    reqwest::header::AUTHORIZATION,
                    format!("{} {}", AUTH_SCHEME, self.api_key),
                )
                .form(&form_fields(texts, source_locale, target_locale))
                .send()
                .await?;

            let status = response.status();
            let body = response.text().await?;

            if !status.is_success() {
                return Err(i18n_error!(translation_api, status.as_u16(), body, self.api_url));
            }

            parse_response(&body, texts.len(), &self.api_url)
        }
    }
}
