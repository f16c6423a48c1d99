//! # Error 模块
//!
//! 定义 fx-runtime 中使用的错误类型。
//!
//! 运行时状态变更（pause/stop 等）没有错误路径：失配一律表现为
//! 空操作或 `None`，单个效果的异常绝不打断帧循环。
//! 类型化错误只出现在数据边界（默认选项配置的解析与应用）。

use thiserror::Error;

/// 默认选项配置错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// JSON 解析失败
    #[error("默认选项 JSON 解析失败: {0}")]
    InvalidJson(String),

    /// 配置引用了未注册的效果名
    #[error("默认选项引用了未注册的效果 '{name}'")]
    UnknownEffect { name: String },
}

/// Result 类型别名
pub type ConfigResult<T> = Result<T, ConfigError>;
