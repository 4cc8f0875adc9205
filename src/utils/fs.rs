//! IO helper: JSON文件读写与资源组发现

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::warn;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum FsError {
    #[error("IO失败: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON解析失败: {0}")]
    Json(#[from] serde_json::Error),
}

/// 从文件读取JSON数据
pub fn read_json_file(p: &Path) -> Result<Value, FsError> {
    let f = File::open(p)?;
    let rdr = BufReader::new(f);
    let v: Value = serde_json::from_reader(rdr)?;
    Ok(v)
}

/// 将JSON数据保存到文件（格式化输出）
pub fn write_json_file(p: &Path, value: &Value) -> Result<(), FsError> {
    let f = File::create(p)?;
    serde_json::to_writer_pretty(f, value)?;
    Ok(())
}

/// 文件不存在时创建一个空对象文件
pub fn ensure_json_file(p: &Path) -> Result<(), FsError> {
    if !p.exists() {
        write_json_file(p, &Value::Object(Map::new()))?;
    }
    Ok(())
}

/// 发现资源组：包含基准语言文件的目录
///
/// 排除目录整棵跳过；不可读的条目记录告警后继续扫描其余部分
pub fn find_resource_groups(
    base: &Path,
    base_file_name: &str,
    excluded_dirs: &[String],
    excluded_files: &[String],
) -> Vec<PathBuf> {
    find_named_files(base, excluded_dirs, excluded_files, |name| {
        name == base_file_name
    })
    .iter()
    .filter_map(|f| f.parent().map(Path::to_path_buf))
    .collect()
}

/// 收集全部JSON文件（用于全量维护操作）
pub fn find_json_files(
    base: &Path,
    excluded_dirs: &[String],
    excluded_files: &[String],
) -> Vec<PathBuf> {
    find_named_files(base, excluded_dirs, excluded_files, |name| {
        name.ends_with(".json")
    })
}

fn find_named_files(
    base: &Path,
    excluded_dirs: &[String],
    excluded_files: &[String],
    matches: impl Fn(&str) -> bool,
) -> Vec<PathBuf> {
    let walker = WalkDir::new(base)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            !(entry.file_type().is_dir()
                && excluded_dirs
                    .iter()
                    .any(|dir| entry.file_name().to_string_lossy() == dir.as_str()))
        });

    let mut files = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("目录读取失败，跳过该子树: {}", e);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if matches(&name) && !excluded_files.iter().any(|f| f == name.as_ref()) {
            files.push(entry.into_path());
        }
    }
    files
}
