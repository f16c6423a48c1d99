//! # Options 模块
//!
//! 效果选项的请求、默认值与解析。
//!
//! ## 解析优先级
//!
//! ```text
//! 调用点显式值 > 按效果名注册的默认值 > 全局兜底默认值
//! ```
//!
//! [`EffectRequest`] 是调用点传入的部分选项（字段全部可缺省）；
//! [`EffectOptions`] 是解析后的完整选项。按名默认值既可在注册
//! 配方时给出，也可用 [`DefaultsConfig`] 以 JSON 数据整表下发。

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{ConfigError, ConfigResult};

/// 全局兜底默认值
///
/// 这些常量是选项兜底的**唯一来源**，任何需要兜底值的地方都应
/// 使用这些常量，而非硬编码数字。
pub mod defaults {
    /// 起始延迟（毫秒）
    pub const DELAY: f32 = 0.0;
    /// 效果时长（毫秒）
    pub const DURATION: f32 = 1000.0;
    /// 强度缩放
    pub const SCALE: f32 = 1.0;
}

/// 调用点的效果选项请求
///
/// 未给出的字段按解析优先级回退。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectRequest {
    /// 起始延迟（毫秒）
    pub delay: Option<f32>,
    /// 效果时长（毫秒）
    pub duration: Option<f32>,
    /// 强度缩放
    pub scale: Option<f32>,
    /// 是否循环
    #[serde(rename = "loop")]
    pub looping: Option<bool>,
    /// 是否加亮混合
    pub blend: Option<bool>,
    /// 是否跟随主体
    pub follow: Option<bool>,
    /// 是否垫在主体之后
    pub behind: Option<bool>,
    /// 显式指定的贴图集合
    pub images: Option<Vec<String>>,
}

impl EffectRequest {
    /// 创建空请求（全部回退默认值）
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置时长
    pub fn duration(mut self, ms: f32) -> Self {
        self.duration = Some(ms);
        self
    }

    /// 设置延迟
    pub fn delay(mut self, ms: f32) -> Self {
        self.delay = Some(ms);
        self
    }

    /// 设置强度缩放
    pub fn scale(mut self, scale: f32) -> Self {
        self.scale = Some(scale);
        self
    }

    /// 设置是否循环
    pub fn looping(mut self, looping: bool) -> Self {
        self.looping = Some(looping);
        self
    }

    /// 设置是否加亮混合
    pub fn blend(mut self, blend: bool) -> Self {
        self.blend = Some(blend);
        self
    }

    /// 设置是否跟随
    pub fn follow(mut self, follow: bool) -> Self {
        self.follow = Some(follow);
        self
    }

    /// 设置是否垫底
    pub fn behind(mut self, behind: bool) -> Self {
        self.behind = Some(behind);
        self
    }

    /// 设置贴图集合
    pub fn images(mut self, images: Vec<String>) -> Self {
        self.images = Some(images);
        self
    }

    /// 以 `fallback` 填补本请求的缺省字段（显式值优先）
    pub fn or(&self, fallback: &EffectRequest) -> EffectRequest {
        EffectRequest {
            delay: self.delay.or(fallback.delay),
            duration: self.duration.or(fallback.duration),
            scale: self.scale.or(fallback.scale),
            looping: self.looping.or(fallback.looping),
            blend: self.blend.or(fallback.blend),
            follow: self.follow.or(fallback.follow),
            behind: self.behind.or(fallback.behind),
            images: self.images.clone().or_else(|| fallback.images.clone()),
        }
    }

    /// 用全局兜底默认值补齐，得到完整选项
    pub fn resolve(&self) -> EffectOptions {
        EffectOptions {
            delay: self.delay.unwrap_or(defaults::DELAY),
            duration: self.duration.unwrap_or(defaults::DURATION),
            scale: self.scale.unwrap_or(defaults::SCALE),
            looping: self.looping.unwrap_or(false),
            blend: self.blend.unwrap_or(false),
            follow: self.follow.unwrap_or(false),
            behind: self.behind.unwrap_or(false),
            images: self.images.clone().unwrap_or_default(),
        }
    }
}

/// 解析后的完整效果选项
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EffectOptions {
    /// 起始延迟（毫秒）
    pub delay: f32,
    /// 效果时长（毫秒）
    pub duration: f32,
    /// 强度缩放
    pub scale: f32,
    /// 是否循环
    pub looping: bool,
    /// 是否加亮混合
    pub blend: bool,
    /// 是否跟随主体
    pub follow: bool,
    /// 是否垫在主体之后
    pub behind: bool,
    /// 贴图集合（可为空，配方必须容忍）
    pub images: Vec<String>,
}

impl Default for EffectOptions {
    fn default() -> Self {
        EffectRequest::default().resolve()
    }
}

/// 按效果名的默认选项整表
///
/// 表结构按字段分组、以效果名为键，可直接从 JSON 载入：
///
/// ```json
/// {
///   "duration": { "disco": 2500 },
///   "loop": { "hover": true, "disco": true },
///   "blend": { "explode": true },
///   "follow": { "radial": true },
///   "behind": { "radial": true }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    /// 按名时长默认值
    pub duration: HashMap<String, f32>,
    /// 按名延迟默认值
    pub delay: HashMap<String, f32>,
    /// 按名强度默认值
    pub scale: HashMap<String, f32>,
    /// 按名循环默认值
    #[serde(rename = "loop")]
    pub looping: HashMap<String, bool>,
    /// 按名混合默认值
    pub blend: HashMap<String, bool>,
    /// 按名跟随默认值
    pub follow: HashMap<String, bool>,
    /// 按名垫底默认值
    pub behind: HashMap<String, bool>,
}

impl DefaultsConfig {
    /// 从 JSON 文本解析
    pub fn from_json(text: &str) -> ConfigResult<Self> {
        serde_json::from_str(text).map_err(|e| ConfigError::InvalidJson(e.to_string()))
    }

    /// 收集某个效果名的按名默认值（部分请求）
    pub fn request_for(&self, name: &str) -> EffectRequest {
        EffectRequest {
            delay: self.delay.get(name).copied(),
            duration: self.duration.get(name).copied(),
            scale: self.scale.get(name).copied(),
            looping: self.looping.get(name).copied(),
            blend: self.blend.get(name).copied(),
            follow: self.follow.get(name).copied(),
            behind: self.behind.get(name).copied(),
            images: None,
        }
    }

    /// 配置中引用的全部效果名
    pub fn referenced_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .duration
            .keys()
            .chain(self.delay.keys())
            .chain(self.scale.keys())
            .chain(self.looping.keys())
            .chain(self.blend.keys())
            .chain(self.follow.keys())
            .chain(self.behind.keys())
            .map(|s| s.as_str())
            .collect();
        names.sort_unstable();
        names.dedup();
        names
    }
}
