//! 翻译能力：DeepL HTTP客户端与同步器之间的trait接缝

use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

const DEEPL_API_URL: &str = "https://api-free.deepl.com/v2/translate";
/// 防御性超时：网络卡死不能挂起整个进程
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Error, Debug)]
pub enum TranslateError {
    #[error("HTTP请求失败: {0}")]
    Http(#[from] reqwest::Error),
    #[error("翻译服务返回异常状态 {status}: {body}")]
    Provider { status: u16, body: String },
    #[error("翻译服务响应中没有译文")]
    EmptyResponse,
}

/// 文本翻译能力；空输入直接返回空结果，不发起网络调用
pub trait Translator {
    fn translate(&self, text: &str, target_lang: &str) -> Result<String, TranslateError>;
}

#[derive(Deserialize)]
struct DeepLResponse {
    translations: Vec<DeepLTranslation>,
}

#[derive(Deserialize)]
struct DeepLTranslation {
    text: String,
}

/// DeepL v2接口的阻塞式客户端
pub struct DeepLClient {
    http: reqwest::blocking::Client,
    api_key: String,
}

impl DeepLClient {
    pub fn new(api_key: &str) -> Result<Self, TranslateError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            api_key: api_key.to_string(),
        })
    }
}

impl Translator for DeepLClient {
    fn translate(&self, text: &str, target_lang: &str) -> Result<String, TranslateError> {
        if text.is_empty() {
            return Ok(String::new());
        }

        let target = target_lang.to_uppercase();
        let params = [
            ("auth_key", self.api_key.as_str()),
            ("text", text),
            ("target_lang", target.as_str()),
        ];
        let response = self.http.post(DEEPL_API_URL).form(&params).send()?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().unwrap_or_default();
            return Err(TranslateError::Provider { status, body });
        }

        let parsed: DeepLResponse = response.json()?;
        let translated = parsed
            .translations
            .into_iter()
            .next()
            .map(|t| t.text)
            .ok_or(TranslateError::EmptyResponse)?;
        debug!("译文获取成功，目标语言: {}，长度: {}", target, translated.len());
        Ok(translated)
    }
}
