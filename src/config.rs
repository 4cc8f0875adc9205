//! 应用配置：启动时构建一次，各组件以引用方式持有，无全局可变状态

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// 基准语言：键集合与结构以该语言为准
pub const BASE_LANG: &str = "fr";

/// 需要同步的目标语言（固定顺序）
pub const TARGET_LANGS: [&str; 6] = ["en", "de", "es", "it", "nl", "pt"];

/// 全部语言（基准语言在前，导出列的规范顺序）
pub const ALL_LANGS: [&str; 7] = ["fr", "en", "de", "es", "it", "nl", "pt"];

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置文件读取失败: {0}")]
    Io(#[from] std::io::Error),
    #[error("配置文件解析失败: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("缺少必需配置项: {0}")]
    Missing(&'static str),
}

/// 配置文件的原始形态，所有字段可缺省以便逐项报错
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawConfig {
    #[serde(rename = "DeepLApiKey")]
    deepl_api_key: Option<String>,
    #[serde(rename = "BasePath")]
    base_path: Option<String>,
    #[serde(rename = "ImportExportPath", alias = "importExportPath")]
    import_export_path: Option<String>,
    #[serde(rename = "ExcludedDirs")]
    excluded_dirs: Option<Vec<String>>,
    #[serde(rename = "ExcludedFiles")]
    excluded_files: Option<Vec<String>>,
}

/// 校验后的应用配置
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// DeepL接口密钥
    pub deepl_api_key: String,
    /// 资源组扫描根目录
    pub base_path: PathBuf,
    /// CSV导出/审计报告输出目录
    pub import_export_path: PathBuf,
    /// 扫描时整棵跳过的目录名
    pub excluded_dirs: Vec<String>,
    /// 扫描时忽略的文件名
    pub excluded_files: Vec<String>,
}

impl AppConfig {
    /// 从JSON配置文件加载；缺少必需项视为启动失败
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        let raw: RawConfig = serde_json::from_str(&text)?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawConfig) -> Result<Self, ConfigError> {
        let api_key = raw
            .deepl_api_key
            .filter(|k| !k.trim().is_empty())
            .ok_or(ConfigError::Missing("DeepLApiKey"))?;
        let base_path = raw.base_path.ok_or(ConfigError::Missing("BasePath"))?;
        let import_export_path = raw
            .import_export_path
            .ok_or(ConfigError::Missing("ImportExportPath"))?;

        Ok(Self {
            deepl_api_key: api_key,
            base_path: resolve_home(&base_path),
            import_export_path: resolve_home(&import_export_path),
            excluded_dirs: raw.excluded_dirs.unwrap_or_else(default_excluded_dirs),
            excluded_files: raw.excluded_files.unwrap_or_default(),
        })
    }
}

fn default_excluded_dirs() -> Vec<String> {
    vec!["node_modules".to_string(), ".angular".to_string()]
}

/// 将 `~/` 前缀展开为用户主目录
pub fn resolve_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}
