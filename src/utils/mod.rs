//! 基础工具层：文件IO与目录遍历

pub mod fs;
