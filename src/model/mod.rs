//! 树模型层：路径编解码与键排序

pub mod key_sorter;
pub mod path_codec;
