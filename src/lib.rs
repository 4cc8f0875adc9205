//! 多语言JSON资源翻译同步工具库
//!
//! 以fr为基准语言，保持各语言资源树结构一致并补全缺失译文，
//! 提供路径编解码、键排序、CSV批量导出/导入与缺失键审计

pub mod config;
pub mod model;
pub mod service;
pub mod utils;

// 重新导出主要类型
pub use config::{AppConfig, ConfigError, ALL_LANGS, BASE_LANG, TARGET_LANGS};
pub use model::key_sorter::sort_keys;
pub use model::path_codec::{flatten, unflatten};
pub use service::auditor::{AuditError, MissingKeyAuditor};
pub use service::synchronizer::{SyncError, TreeSynchronizer};
pub use service::transcoder::{CsvTranscoder, TranscodeError};
pub use service::translator::{DeepLClient, TranslateError, Translator};
