//! 键排序器：递归按序号字符串升序重排所有对象键
//!
//! 仅调整对象键顺序（包括数组内嵌套的对象），数组元素顺序与所有值
//! 保持不变，用于产出确定性、diff友好的持久化输出。

use serde_json::{Map, Value};

/// 返回键已排序的新树，原树不变；重复调用结果相同
pub fn sort_keys(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let mut sorted = Map::new();
            for key in keys {
                sorted.insert(key.clone(), sort_keys(&map[key]));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(sort_keys).collect()),
        scalar => scalar.clone(),
    }
}
