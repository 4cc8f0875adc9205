//! 树同步器：以基准语言为权威结构，逐语言补全缺失译文
//!
//! 深度优先按基准树的属性插入顺序遍历；已有的非空译文永不覆盖。
//! 每种语言处理完立即排序落盘，组内翻译失败时已完成的语言保持已保存状态。

use std::path::Path;

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::config::{AppConfig, BASE_LANG, TARGET_LANGS};
use crate::model::key_sorter::sort_keys;
use crate::service::translator::{TranslateError, Translator};
use crate::utils::fs::{
    ensure_json_file, find_resource_groups, read_json_file, write_json_file, FsError,
};

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("文件访问失败: {0}")]
    Fs(#[from] FsError),
    #[error("翻译失败: {0}")]
    Translate(#[from] TranslateError),
}

pub struct TreeSynchronizer<'a> {
    config: &'a AppConfig,
    translator: &'a dyn Translator,
}

impl<'a> TreeSynchronizer<'a> {
    pub fn new(config: &'a AppConfig, translator: &'a dyn Translator) -> Self {
        Self { config, translator }
    }

    /// 同步所有资源组；单组失败只中止该组，其余组继续。返回失败组数
    pub fn sync_all(&self) -> usize {
        let groups = find_resource_groups(
            &self.config.base_path,
            &format!("{BASE_LANG}.json"),
            &self.config.excluded_dirs,
            &self.config.excluded_files,
        );
        let mut failures = 0usize;
        for group in &groups {
            if let Err(e) = self.sync_group(group) {
                error!("资源组 {} 同步失败: {}", group.display(), e);
                failures += 1;
            }
        }
        info!("同步完成: 共 {} 组，失败 {} 组", groups.len(), failures);
        failures
    }

    /// 同步单个资源组目录
    pub fn sync_group(&self, dir: &Path) -> Result<(), SyncError> {
        let base_file = dir.join(format!("{BASE_LANG}.json"));
        let base = read_json_file(&base_file)?;
        write_json_file(&base_file, &sort_keys(&base))?;

        for lang in TARGET_LANGS {
            let lang_file = dir.join(format!("{lang}.json"));
            ensure_json_file(&lang_file)?;
            let mut target = read_json_file(&lang_file)?;
            self.fill(&base, &mut target, lang, "")?;
            write_json_file(&lang_file, &sort_keys(&target))?;
            info!("{} 已同步", lang_file.display());
        }
        Ok(())
    }

    /// 递归补全：对象按基准键补位，数组按基准长度增长，字符串叶子按需翻译
    fn fill(
        &self,
        base: &Value,
        target: &mut Value,
        lang: &str,
        path: &str,
    ) -> Result<(), SyncError> {
        match base {
            Value::Object(base_map) => {
                if !target.is_object() {
                    if !target.is_null() {
                        warn!("路径 '{}' 处的目标值不是对象，原值被替换", path);
                    }
                    *target = Value::Object(Map::new());
                }
                let Value::Object(target_map) = target else {
                    return Ok(());
                };
                for (key, base_child) in base_map {
                    let child_path = if path.is_empty() {
                        key.clone()
                    } else {
                        format!("{path}.{key}")
                    };
                    let slot = target_map
                        .entry(key.clone())
                        .or_insert_with(|| Value::Object(Map::new()));
                    self.fill(base_child, slot, lang, &child_path)?;
                }
            }
            Value::Array(base_items) => {
                if !target.is_array() {
                    if !target.is_null() {
                        // 数据丢失边界：非数组值被整体替换
                        warn!("路径 '{}' 处的目标值不是数组，原值被替换", path);
                    }
                    *target = Value::Array(Vec::new());
                }
                let Value::Array(target_items) = target else {
                    return Ok(());
                };
                while target_items.len() < base_items.len() {
                    target_items.push(Value::Object(Map::new()));
                }
                for (idx, base_child) in base_items.iter().enumerate() {
                    let child_path = format!("{path}[{idx}]");
                    self.fill(base_child, &mut target_items[idx], lang, &child_path)?;
                }
            }
            Value::String(base_text) => {
                let needs_translation = match target {
                    Value::String(existing) => existing.is_empty(),
                    _ => true,
                };
                if needs_translation {
                    let translated = self.translator.translate(base_text, lang)?;
                    *target = Value::String(translated);
                }
            }
            // 数字/布尔/null 不是可翻译单元，原样略过
            _ => {}
        }
        Ok(())
    }
}
