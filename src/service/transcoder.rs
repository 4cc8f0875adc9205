//! CSV转码器：翻译表格的批量导出与导入
//!
//! 字段以罕用单字符 `µ` 分隔（避免与自然语言中的逗号冲突），数据行
//! 每个单元格都包双引号，单元格内换行写出时转义为 `\n` 两个字符、
//! 读入时还原。导入直接写扁平映射，不重建嵌套（刻意保留的历史行为）。

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::{AppConfig, ALL_LANGS, BASE_LANG};
use crate::model::path_codec;
use crate::utils::fs::{
    ensure_json_file, find_resource_groups, read_json_file, write_json_file, FsError,
};

/// 字段分隔符
pub const SEPARATOR: char = 'µ';
/// 缺失或空白译文的占位标记
pub const MISSING_TRANSLATION: &str = "MISSING_TRANSLATION";
const EXPORT_FILE_NAME: &str = "translations_export.csv";
const GROUP_COLUMN: &str = "FilePath";
const KEY_COLUMN: &str = "Key";

#[derive(Error, Debug)]
pub enum TranscodeError {
    #[error("IO失败: {0}")]
    Io(#[from] std::io::Error),
    #[error("文件访问失败: {0}")]
    Fs(#[from] FsError),
    #[error("CSV文件不存在: {}", .0.display())]
    CsvNotFound(PathBuf),
    #[error("CSV表头缺少必需列: {0}")]
    MissingColumn(&'static str),
}

pub struct CsvTranscoder<'a> {
    config: &'a AppConfig,
}

impl<'a> CsvTranscoder<'a> {
    pub fn new(config: &'a AppConfig) -> Self {
        Self { config }
    }

    /// 导出所有资源组为一张翻译表，返回输出文件路径
    pub fn export_all(&self) -> Result<PathBuf, TranscodeError> {
        let groups = find_resource_groups(
            &self.config.base_path,
            &format!("{BASE_LANG}.json"),
            &self.config.excluded_dirs,
            &self.config.excluded_files,
        );

        let mut csv = String::new();
        let mut header: Vec<&str> = vec![GROUP_COLUMN, KEY_COLUMN];
        header.extend(ALL_LANGS);
        csv.push_str(&header.join(&SEPARATOR.to_string()));
        csv.push('\n');

        for group in &groups {
            self.export_group(group, &mut csv)?;
        }

        fs::create_dir_all(&self.config.import_export_path)?;
        let out = self.config.import_export_path.join(EXPORT_FILE_NAME);
        fs::write(&out, &csv)?;
        info!("导出完成: {}（{} 个资源组）", out.display(), groups.len());
        Ok(out)
    }

    fn export_group(&self, group: &Path, csv: &mut String) -> Result<(), TranscodeError> {
        // 各语言扁平树的叶子路径并集，保持首次出现顺序
        let mut keys: Vec<String> = Vec::new();
        let mut cells: HashMap<String, HashMap<&str, String>> = HashMap::new();

        for lang in ALL_LANGS {
            let lang_file = group.join(format!("{lang}.json"));
            ensure_json_file(&lang_file)?;
            let tree = read_json_file(&lang_file)?;
            for (path, value) in path_codec::flatten(&tree) {
                let text = scalar_text(&value);
                let cell = if text.trim().is_empty() {
                    MISSING_TRANSLATION.to_string()
                } else {
                    text
                };
                if !cells.contains_key(&path) {
                    keys.push(path.clone());
                }
                cells.entry(path).or_default().insert(lang, cell);
            }
        }

        for key in &keys {
            let mut row: Vec<String> = vec![group.display().to_string(), key.clone()];
            for lang in ALL_LANGS {
                let cell = cells[key]
                    .get(lang)
                    .cloned()
                    .unwrap_or_else(|| MISSING_TRANSLATION.to_string());
                row.push(cell);
            }
            csv.push_str(&quote_row(&row));
        }
        Ok(())
    }

    /// 从CSV导入译文；语言身份来自表头而非固定列表
    pub fn import_csv(&self, csv_path: &Path) -> Result<(), TranscodeError> {
        if !csv_path.exists() {
            return Err(TranscodeError::CsvNotFound(csv_path.to_path_buf()));
        }
        let content = fs::read_to_string(csv_path)?;
        let mut lines = content.lines();
        let Some(header_line) = lines.next() else {
            warn!("CSV为空，没有可导入的内容: {}", csv_path.display());
            return Ok(());
        };

        let headers = split_row(header_line);
        let group_idx = headers
            .iter()
            .position(|h| h == GROUP_COLUMN)
            .ok_or(TranscodeError::MissingColumn(GROUP_COLUMN))?;
        let key_idx = headers
            .iter()
            .position(|h| h == KEY_COLUMN)
            .ok_or(TranscodeError::MissingColumn(KEY_COLUMN))?;
        let lang_columns: Vec<(usize, &String)> = headers
            .iter()
            .enumerate()
            .filter(|(idx, _)| *idx != group_idx && *idx != key_idx)
            .collect();

        let mut imported = 0usize;
        for (offset, line) in lines.enumerate() {
            let line_no = offset + 2; // 表头占第1行
            if line.trim().is_empty() {
                continue;
            }
            let cells = split_row(line);
            if cells.len() != headers.len() {
                warn!(
                    "第 {} 行列数不匹配（期望 {}，实得 {}），跳过",
                    line_no,
                    headers.len(),
                    cells.len()
                );
                continue;
            }

            let group_dir = Path::new(&cells[group_idx]);
            let key = &cells[key_idx];
            for (col, lang) in &lang_columns {
                let cell = &cells[*col];
                if cell.is_empty() || cell == MISSING_TRANSLATION {
                    continue;
                }
                let value = cell.replace("\\n", "\n");
                match self.write_translation(group_dir, lang, key, &value) {
                    Ok(true) => imported += 1,
                    Ok(false) => {}
                    Err(e) => {
                        warn!(
                            "第 {} 行键 '{}' 写入 {}/{}.json 失败: {}",
                            line_no,
                            key,
                            group_dir.display(),
                            lang,
                            e
                        );
                    }
                }
            }
        }
        info!("导入完成: {} 条译文", imported);
        Ok(())
    }

    /// 在扁平表示上设置单个键后重新落盘；文件缺失时跳过该语言
    fn write_translation(
        &self,
        group_dir: &Path,
        lang: &str,
        key: &str,
        value: &str,
    ) -> Result<bool, TranscodeError> {
        let lang_file = group_dir.join(format!("{lang}.json"));
        if !lang_file.exists() {
            warn!("语言文件不存在，跳过: {}", lang_file.display());
            return Ok(false);
        }
        let tree = read_json_file(&lang_file)?;
        let mut flat = path_codec::flatten(&tree);
        flat.insert(key.to_string(), Value::String(value.to_string()));
        write_json_file(&lang_file, &Value::Object(flat))?;
        Ok(true)
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn quote_row(cells: &[String]) -> String {
    let quoted: Vec<String> = cells
        .iter()
        .map(|cell| format!("\"{}\"", cell.replace('\n', "\\n")))
        .collect();
    let mut line = quoted.join(&SEPARATOR.to_string());
    line.push('\n');
    line
}

fn split_row(line: &str) -> Vec<String> {
    line.split(SEPARATOR)
        .map(|cell| cell.trim_matches('"').to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn test_config(base: PathBuf, exports: PathBuf) -> AppConfig {
        AppConfig {
            deepl_api_key: "fake-api-key-for-testing".to_string(),
            base_path: base,
            import_export_path: exports,
            excluded_dirs: vec!["node_modules".to_string()],
            excluded_files: Vec::new(),
        }
    }

    fn make_group(root: &Path, name: &str, fr: &Value, en: &Value) -> PathBuf {
        let group = root.join(name);
        fs::create_dir_all(&group).expect("建目录失败");
        write_json_file(&group.join("fr.json"), fr).expect("写入失败");
        write_json_file(&group.join("en.json"), en).expect("写入失败");
        group
    }

    #[test]
    fn test_export_marks_missing_translations() {
        let dir = tempdir().expect("创建临时目录失败");
        let group = make_group(dir.path(), "app", &json!({"a": "X"}), &json!({}));

        let config = test_config(dir.path().to_path_buf(), dir.path().join("out"));
        let out = CsvTranscoder::new(&config).export_all().expect("导出应该成功");

        let content = fs::read_to_string(out).expect("读取失败");
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], format!("FilePathµKeyµ{}", ALL_LANGS.join("µ")));

        let row = lines[1];
        assert!(row.starts_with(&format!("\"{}\"µ\"a\"µ\"X\"", group.display())));
        assert!(row.contains(MISSING_TRANSLATION), "en缺失应该打占位标记");
    }

    #[test]
    fn test_export_blank_value_counts_as_missing() {
        let dir = tempdir().expect("创建临时目录失败");
        make_group(dir.path(), "app", &json!({"a": "X"}), &json!({"a": "   "}));

        let config = test_config(dir.path().to_path_buf(), dir.path().join("out"));
        let out = CsvTranscoder::new(&config).export_all().expect("导出应该成功");

        let content = fs::read_to_string(out).expect("读取失败");
        // en列是空白串，也按缺失处理
        assert!(content.contains(&format!("\"X\"µ\"{MISSING_TRANSLATION}\"")));
    }

    #[test]
    fn test_export_escapes_newlines() {
        let dir = tempdir().expect("创建临时目录失败");
        make_group(
            dir.path(),
            "app",
            &json!({"multi": "ligne un\nligne deux"}),
            &json!({}),
        );

        let config = test_config(dir.path().to_path_buf(), dir.path().join("out"));
        let out = CsvTranscoder::new(&config).export_all().expect("导出应该成功");

        let content = fs::read_to_string(out).expect("读取失败");
        assert!(content.contains(r#""ligne un\nligne deux""#));
        assert_eq!(content.lines().count(), 2, "换行必须转义，不能撑开行数");
    }

    #[test]
    fn test_export_flattens_nested_and_array_keys() {
        let dir = tempdir().expect("创建临时目录失败");
        make_group(
            dir.path(),
            "app",
            &json!({"menu": {"items": [{"label": "Un"}]}}),
            &json!({}),
        );

        let config = test_config(dir.path().to_path_buf(), dir.path().join("out"));
        let out = CsvTranscoder::new(&config).export_all().expect("导出应该成功");

        let content = fs::read_to_string(out).expect("读取失败");
        assert!(content.contains("\"menu.items[0].label\""));
    }

    #[test]
    fn test_import_writes_flat_representation() {
        let dir = tempdir().expect("创建临时目录失败");
        let group = make_group(
            dir.path(),
            "app",
            &json!({"menu": {"title": "Accueil"}}),
            &json!({"menu": {"title": "Home"}}),
        );

        let config = test_config(dir.path().to_path_buf(), dir.path().join("out"));
        let csv_path = dir.path().join("import.csv");
        fs::write(
            &csv_path,
            format!(
                "FilePathµKeyµfrµen\n\"{}\"µ\"menu.title\"µ\"\"µ\"Start\"\n",
                group.display()
            ),
        )
        .expect("写入失败");

        CsvTranscoder::new(&config)
            .import_csv(&csv_path)
            .expect("导入应该成功");

        let en = read_json_file(&group.join("en.json")).expect("读取失败");
        // 导入写扁平键，不重建嵌套
        assert_eq!(en, json!({"menu.title": "Start"}));
        // 空的fr单元格不触碰fr文件
        let fr = read_json_file(&group.join("fr.json")).expect("读取失败");
        assert_eq!(fr, json!({"menu": {"title": "Accueil"}}));
    }

    #[test]
    fn test_import_inserts_new_keys() {
        let dir = tempdir().expect("创建临时目录失败");
        let group = make_group(dir.path(), "app", &json!({}), &json!({"a": "One"}));

        let config = test_config(dir.path().to_path_buf(), dir.path().join("out"));
        let csv_path = dir.path().join("import.csv");
        fs::write(
            &csv_path,
            format!(
                "FilePathµKeyµen\n\"{}\"µ\"nouveau\"µ\"Fresh\"\n",
                group.display()
            ),
        )
        .expect("写入失败");

        CsvTranscoder::new(&config)
            .import_csv(&csv_path)
            .expect("导入应该成功");

        let en = read_json_file(&group.join("en.json")).expect("读取失败");
        assert_eq!(en["nouveau"], json!("Fresh"));
        assert_eq!(en["a"], json!("One"), "原有键保持不变");
    }

    #[test]
    fn test_import_unescapes_newlines() {
        let dir = tempdir().expect("创建临时目录失败");
        let group = make_group(dir.path(), "app", &json!({}), &json!({}));

        let config = test_config(dir.path().to_path_buf(), dir.path().join("out"));
        let csv_path = dir.path().join("import.csv");
        fs::write(
            &csv_path,
            format!(
                "FilePathµKeyµen\n\"{}\"µ\"multi\"µ\"ligne un\\nligne deux\"\n",
                group.display()
            ),
        )
        .expect("写入失败");

        CsvTranscoder::new(&config)
            .import_csv(&csv_path)
            .expect("导入应该成功");

        let en = read_json_file(&group.join("en.json")).expect("读取失败");
        assert_eq!(en["multi"], json!("ligne un\nligne deux"));
    }

    #[test]
    fn test_import_skips_malformed_rows_and_continues() {
        let dir = tempdir().expect("创建临时目录失败");
        let group = make_group(dir.path(), "app", &json!({}), &json!({}));

        let config = test_config(dir.path().to_path_buf(), dir.path().join("out"));
        let csv_path = dir.path().join("import.csv");
        fs::write(
            &csv_path,
            format!(
                "FilePathµKeyµen\n\"colonne manquante\"\n\"{}\"µ\"a\"µ\"Good\"\n",
                group.display()
            ),
        )
        .expect("写入失败");

        CsvTranscoder::new(&config)
            .import_csv(&csv_path)
            .expect("坏行不应该中止导入");

        let en = read_json_file(&group.join("en.json")).expect("读取失败");
        assert_eq!(en["a"], json!("Good"), "坏行之后的行应该照常处理");
    }

    #[test]
    fn test_import_language_identity_from_header() {
        let dir = tempdir().expect("创建临时目录失败");
        let group = make_group(dir.path(), "app", &json!({}), &json!({}));
        write_json_file(&group.join("de.json"), &json!({})).expect("写入失败");

        let config = test_config(dir.path().to_path_buf(), dir.path().join("out"));
        let csv_path = dir.path().join("import.csv");
        // 列顺序打乱：de在en之前，按表头识别而非位置
        fs::write(
            &csv_path,
            format!(
                "KeyµdeµFilePathµen\n\"a\"µ\"Hallo\"µ\"{}\"µ\"Hello\"\n",
                group.display()
            ),
        )
        .expect("写入失败");

        CsvTranscoder::new(&config)
            .import_csv(&csv_path)
            .expect("导入应该成功");

        let de = read_json_file(&group.join("de.json")).expect("读取失败");
        let en = read_json_file(&group.join("en.json")).expect("读取失败");
        assert_eq!(de["a"], json!("Hallo"));
        assert_eq!(en["a"], json!("Hello"));
    }

    #[test]
    fn test_import_missing_header_column_is_rejected() {
        let dir = tempdir().expect("创建临时目录失败");
        let config = test_config(dir.path().to_path_buf(), dir.path().join("out"));
        let csv_path = dir.path().join("import.csv");
        fs::write(&csv_path, "Cheminµen\n").expect("写入失败");

        let err = CsvTranscoder::new(&config)
            .import_csv(&csv_path)
            .expect_err("缺少必需列应该报错");
        assert!(matches!(err, TranscodeError::MissingColumn(_)));
    }

    #[test]
    fn test_export_import_roundtrip_preserves_flat_content() {
        let dir = tempdir().expect("创建临时目录失败");
        let group = make_group(
            dir.path(),
            "app",
            &json!({"menu": {"title": "Accueil", "items": ["Un"]}}),
            &json!({"menu": {"title": "Home", "items": ["One"]}}),
        );
        for lang in ["de", "es", "it", "nl", "pt"] {
            write_json_file(
                &group.join(format!("{lang}.json")),
                &json!({"menu": {"title": format!("T-{lang}"), "items": [format!("I-{lang}")]}}),
            )
            .expect("写入失败");
        }

        let config = test_config(dir.path().to_path_buf(), dir.path().join("out"));
        let transcoder = CsvTranscoder::new(&config);

        let before: Vec<_> = ALL_LANGS
            .iter()
            .map(|lang| {
                path_codec::flatten(
                    &read_json_file(&group.join(format!("{lang}.json"))).expect("读取失败"),
                )
            })
            .collect();

        let out = transcoder.export_all().expect("导出应该成功");
        transcoder.import_csv(&out).expect("导入应该成功");

        let after: Vec<_> = ALL_LANGS
            .iter()
            .map(|lang| {
                path_codec::flatten(
                    &read_json_file(&group.join(format!("{lang}.json"))).expect("读取失败"),
                )
            })
            .collect();

        // 导入后文件趋于扁平，但扁平内容保持一致
        assert_eq!(before, after, "原样导入导出应该保持扁平内容不变");
    }
}
