//! 全量维护操作：对扫描范围内的每个JSON文件做排序/扁平化/还原嵌套
//!
//! 每个文件独立处理，单个文件失败只记录告警，不中止整个批次。

use tracing::{info, warn};

use crate::config::AppConfig;
use crate::model::key_sorter::sort_keys;
use crate::model::path_codec;
use crate::utils::fs::{find_json_files, read_json_file, write_json_file};

/// 递归排序所有JSON文件的键，返回成功处理的文件数
pub fn sort_all(config: &AppConfig) -> usize {
    process_all(config, "排序", |tree| Some(sort_keys(tree)))
}

/// 将所有JSON文件替换为扁平形式，返回成功处理的文件数
pub fn flatten_all(config: &AppConfig) -> usize {
    process_all(config, "扁平化", |tree| {
        tree.as_object()
            .map(|_| serde_json::Value::Object(path_codec::flatten(tree)))
    })
}

/// 将所有扁平JSON文件还原为嵌套形式，返回成功处理的文件数
pub fn unflatten_all(config: &AppConfig) -> usize {
    process_all(config, "还原嵌套", |tree| {
        tree.as_object().map(path_codec::unflatten)
    })
}

fn process_all(
    config: &AppConfig,
    operation: &str,
    transform: impl Fn(&serde_json::Value) -> Option<serde_json::Value>,
) -> usize {
    let files = find_json_files(
        &config.base_path,
        &config.excluded_dirs,
        &config.excluded_files,
    );
    let mut processed = 0usize;
    for file in &files {
        let tree = match read_json_file(file) {
            Ok(tree) => tree,
            Err(e) => {
                warn!("{}跳过 {}: {}", operation, file.display(), e);
                continue;
            }
        };
        let Some(transformed) = transform(&tree) else {
            warn!("{}跳过 {}: 根节点不是对象", operation, file.display());
            continue;
        };
        match write_json_file(file, &transformed) {
            Ok(()) => {
                info!("{}完成: {}", operation, file.display());
                processed += 1;
            }
            Err(e) => warn!("{}写回失败 {}: {}", operation, file.display(), e),
        }
    }
    info!("{}批次结束: {}/{} 个文件", operation, processed, files.len());
    processed
}
