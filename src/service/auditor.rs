//! 缺失键审计器：报告各语言之间顶层键的覆盖缺口
//!
//! 只检查每个语言文件的顶层属性名，不深入嵌套键（沿用既有口径，
//! 扩展到嵌套键需先确认意图）。报告为普通逗号分隔、不加引号的CSV。

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;
use tracing::info;

use crate::config::{AppConfig, ALL_LANGS, BASE_LANG};
use crate::utils::fs::{ensure_json_file, find_resource_groups, read_json_file, FsError};

/// 基准语言自身也缺键时的占位标记
pub const MISSING_FR: &str = "MISSING_FR";
const AUDIT_FILE_NAME: &str = "missing_translations.csv";
const AUDIT_HEADER: &str = "FilePath,Key,FR_Value,MissingLanguages";

#[derive(Error, Debug)]
pub enum AuditError {
    #[error("IO失败: {0}")]
    Io(#[from] std::io::Error),
    #[error("文件访问失败: {0}")]
    Fs(#[from] FsError),
}

pub struct MissingKeyAuditor<'a> {
    config: &'a AppConfig,
}

impl<'a> MissingKeyAuditor<'a> {
    pub fn new(config: &'a AppConfig) -> Self {
        Self { config }
    }

    /// 审计所有资源组，返回报告文件路径
    pub fn audit_all(&self) -> Result<PathBuf, AuditError> {
        let groups = find_resource_groups(
            &self.config.base_path,
            &format!("{BASE_LANG}.json"),
            &self.config.excluded_dirs,
            &self.config.excluded_files,
        );

        let mut csv = String::from(AUDIT_HEADER);
        csv.push('\n');
        let mut gaps = 0usize;
        for group in &groups {
            gaps += self.audit_group(group, &mut csv)?;
        }

        fs::create_dir_all(&self.config.import_export_path)?;
        let out = self.config.import_export_path.join(AUDIT_FILE_NAME);
        fs::write(&out, &csv)?;
        info!("审计完成: {}（{} 个缺口）", out.display(), gaps);
        Ok(out)
    }

    fn audit_group(&self, group: &Path, csv: &mut String) -> Result<usize, AuditError> {
        // 顶层键 → 定义它的语言集合，保持首次出现顺序
        let mut keys: Vec<String> = Vec::new();
        let mut presence: HashMap<String, HashSet<&str>> = HashMap::new();
        let mut base_values: HashMap<String, String> = HashMap::new();

        for lang in ALL_LANGS {
            let lang_file = group.join(format!("{lang}.json"));
            ensure_json_file(&lang_file)?;
            let tree = read_json_file(&lang_file)?;
            let Some(map) = tree.as_object() else {
                continue;
            };
            for (key, value) in map {
                if !presence.contains_key(key) {
                    keys.push(key.clone());
                }
                presence.entry(key.clone()).or_default().insert(lang);
                if lang == BASE_LANG {
                    base_values.insert(key.clone(), top_level_text(value));
                }
            }
        }

        let mut gaps = 0usize;
        for key in &keys {
            let missing: Vec<&str> = ALL_LANGS
                .iter()
                .filter(|lang| !presence[key].contains(**lang))
                .copied()
                .collect();
            if missing.is_empty() {
                continue;
            }
            let base_value = base_values
                .get(key)
                .cloned()
                .unwrap_or_else(|| MISSING_FR.to_string());
            csv.push_str(&format!(
                "{},{},{},{}\n",
                group.display(),
                key,
                base_value,
                missing.join(";")
            ));
            gaps += 1;
        }
        Ok(gaps)
    }
}

/// 顶层值的单行文本：字符串取原文，容器用紧凑JSON，null记空
fn top_level_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
