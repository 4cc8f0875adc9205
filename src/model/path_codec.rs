//! 路径编解码：嵌套JSON树 ⇄ 扁平键值映射
//!
//! 叶子路径以 `.` 连接对象键，数组成员在宿主键后追加 `[索引]`，
//! 例如 `a.b[0].c`。重复键策略固定为保留首个值（first-seen），
//! 每次冲突都会记录告警，全库只使用这一种策略。

use serde_json::{Map, Value};
use tracing::warn;

/// 深度优先、从左到右地将树展开为 叶子路径→标量 的有序映射
pub fn flatten(tree: &Value) -> Map<String, Value> {
    let mut flat = Map::new();
    collect(tree, "", &mut flat);
    flat
}

fn collect(value: &Value, prefix: &str, flat: &mut Map<String, Value>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                collect(child, &path, flat);
            }
        }
        Value::Array(items) => {
            for (idx, child) in items.iter().enumerate() {
                collect(child, &format!("{prefix}[{idx}]"), flat);
            }
        }
        scalar => {
            if prefix.is_empty() {
                return;
            }
            if flat.contains_key(prefix) {
                warn!("扁平化时检测到重复键 '{}'，保留首个值", prefix);
            } else {
                flat.insert(prefix.to_string(), scalar.clone());
            }
        }
    }
}

/// 将扁平映射还原为嵌套树，满足 `unflatten(flatten(T)) == T`
/// （对无路径冲突的树成立）
pub fn unflatten(flat: &Map<String, Value>) -> Value {
    let mut root = Map::new();
    for (path, value) in flat {
        let segments: Vec<&str> = path.split('.').collect();
        place(&mut root, &segments, path, value.clone());
    }
    Value::Object(root)
}

/// 解析单个路径段：`items[2][0]` → ("items", [2, 0])
///
/// 括号内容不是合法索引时整段按字面键处理
fn parse_segment(segment: &str) -> (&str, Vec<usize>) {
    let Some(bracket) = segment.find('[') else {
        return (segment, Vec::new());
    };
    if !segment.ends_with(']') {
        return (segment, Vec::new());
    }

    let (name, mut tail) = segment.split_at(bracket);
    let mut indices = Vec::new();
    while let Some(end) = tail.find(']') {
        match tail[1..end].parse::<usize>() {
            Ok(idx) => indices.push(idx),
            Err(_) => return (segment, Vec::new()),
        }
        tail = &tail[end + 1..];
        if tail.is_empty() {
            break;
        }
        if !tail.starts_with('[') {
            return (segment, Vec::new());
        }
    }
    (name, indices)
}

fn place(target: &mut Map<String, Value>, segments: &[&str], path: &str, value: Value) {
    let (name, indices) = parse_segment(segments[0]);
    let rest = &segments[1..];

    if indices.is_empty() {
        if rest.is_empty() {
            if matches!(
                target.get(name),
                Some(Value::Object(_)) | Some(Value::Array(_))
            ) {
                warn!("路径 '{}' 处的容器被标量覆盖", path);
            }
            target.insert(name.to_string(), value);
            return;
        }
        let entry = target
            .entry(name.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !entry.is_object() {
            warn!("路径 '{}' 处的标量被对象替换", path);
            *entry = Value::Object(Map::new());
        }
        if let Value::Object(map) = entry {
            place(map, rest, path, value);
        }
    } else {
        let entry = target
            .entry(name.to_string())
            .or_insert_with(|| Value::Array(Vec::new()));
        if !entry.is_array() {
            warn!("路径 '{}' 处的非数组值被数组替换", path);
            *entry = Value::Array(Vec::new());
        }
        if let Value::Array(items) = entry {
            place_in_array(items, &indices, rest, path, value);
        }
    }
}

fn place_in_array(
    items: &mut Vec<Value>,
    indices: &[usize],
    rest: &[&str],
    path: &str,
    value: Value,
) {
    let idx = indices[0];
    // 用null占位补齐到目标索引
    while items.len() <= idx {
        items.push(Value::Null);
    }
    let slot = &mut items[idx];

    if indices.len() > 1 {
        if !slot.is_array() {
            if !slot.is_null() {
                warn!("路径 '{}' 处的非数组值被数组替换", path);
            }
            *slot = Value::Array(Vec::new());
        }
        if let Value::Array(inner) = slot {
            place_in_array(inner, &indices[1..], rest, path, value);
        }
    } else if rest.is_empty() {
        *slot = value;
    } else {
        if !slot.is_object() {
            if !slot.is_null() {
                warn!("路径 '{}' 处的标量被对象替换", path);
            }
            *slot = Value::Object(Map::new());
        }
        if let Value::Object(map) = slot {
            place(map, rest, path, value);
        }
    }
}
