//! # Registry 模块
//!
//! 效果名到配方的映射。
//!
//! ## 设计说明
//!
//! 不做运行期方法合成：效果是显式的
//! `名字 -> 带类别标签的条目` 映射，调用路径统一走
//! [`Effects::invoke`](crate::manager::Effects::invoke)
//! 查表分发，保留"注册任意配方"的扩展性，去掉运行期元编程。
//!
//! 配方是外部提供的不透明变异器：动画类向补间句柄追加插值步骤，
//! 粒子/合成类向引擎填充粒子数据并发射。注册表本身不做任何
//! 效果数学，只负责缠绕选项默认值与生命周期管线。

use std::collections::HashMap;
use std::rc::Rc;

use crate::engine::EffectEngine;
use crate::error::{ConfigError, ConfigResult};
use crate::options::{DefaultsConfig, EffectOptions, EffectRequest};
use crate::scene::{Scene, ViewId};
use crate::tween::Animator;

/// 动画类配方：向主体的补间句柄追加插值步骤
pub type AnimationRecipe = Rc<dyn Fn(&mut Scene, ViewId, &EffectOptions, &mut Animator)>;

/// 粒子/合成类配方：向引擎填充粒子数据并发射
pub type EngineRecipe = Rc<dyn Fn(&mut Scene, ViewId, &EffectOptions, &mut EffectEngine)>;

/// 效果类别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectKind {
    /// 补间动画（作用在主体自身属性上）
    Animation,
    /// 粒子效果（独立粒子爆发，可叠加）
    Particle,
    /// 合成效果（多图层叠加，每主体单例）
    Composite,
}

/// 配方闭包（按类别区分签名）
#[derive(Clone)]
pub(crate) enum Recipe {
    Animation(AnimationRecipe),
    Engine(EngineRecipe),
}

/// 注册表条目
pub struct EffectEntry {
    /// 效果类别
    pub kind: EffectKind,
    /// 配方
    pub(crate) recipe: Recipe,
    /// 按名默认选项（部分请求）
    pub defaults: EffectRequest,
}

/// 效果注册表
///
/// 同名后注册覆盖先注册（连同类别与默认值整条替换）。
#[derive(Default)]
pub struct EffectRegistry {
    entries: HashMap<String, EffectEntry>,
}

impl std::fmt::Debug for EffectRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectRegistry")
            .field("entries", &self.entries.len())
            .finish()
    }
}

impl EffectRegistry {
    /// 创建空注册表
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册动画类效果
    pub fn register_animation(
        &mut self,
        name: impl Into<String>,
        recipe: impl Fn(&mut Scene, ViewId, &EffectOptions, &mut Animator) + 'static,
    ) {
        self.entries.insert(
            name.into(),
            EffectEntry {
                kind: EffectKind::Animation,
                recipe: Recipe::Animation(Rc::new(recipe)),
                defaults: EffectRequest::default(),
            },
        );
    }

    /// 注册粒子类效果
    pub fn register_particle(
        &mut self,
        name: impl Into<String>,
        recipe: impl Fn(&mut Scene, ViewId, &EffectOptions, &mut EffectEngine) + 'static,
    ) {
        self.entries.insert(
            name.into(),
            EffectEntry {
                kind: EffectKind::Particle,
                recipe: Recipe::Engine(Rc::new(recipe)),
                defaults: EffectRequest::default(),
            },
        );
    }

    /// 注册合成类效果
    pub fn register_composite(
        &mut self,
        name: impl Into<String>,
        recipe: impl Fn(&mut Scene, ViewId, &EffectOptions, &mut EffectEngine) + 'static,
    ) {
        self.entries.insert(
            name.into(),
            EffectEntry {
                kind: EffectKind::Composite,
                recipe: Recipe::Engine(Rc::new(recipe)),
                defaults: EffectRequest::default(),
            },
        );
    }

    /// 设置某个效果的按名默认选项
    ///
    /// 未注册的名字静默忽略（与运行时空操作原则一致）。
    pub fn set_defaults(&mut self, name: &str, defaults: EffectRequest) {
        if let Some(entry) = self.entries.get_mut(name) {
            entry.defaults = defaults;
        }
    }

    /// 以 JSON 默认值整表覆盖按名默认选项
    ///
    /// # 错误
    /// - [`ConfigError::UnknownEffect`]: 表里引用了未注册的效果名
    pub fn apply_defaults_config(&mut self, config: &DefaultsConfig) -> ConfigResult<()> {
        for name in config.referenced_names() {
            if !self.entries.contains_key(name) {
                return Err(ConfigError::UnknownEffect {
                    name: name.to_string(),
                });
            }
        }
        for name in config.referenced_names() {
            let defaults = config.request_for(name);
            self.set_defaults(name, defaults);
        }
        Ok(())
    }

    /// 查询条目
    pub fn get(&self, name: &str) -> Option<&EffectEntry> {
        self.entries.get(name)
    }

    /// 查询效果类别
    pub fn kind_of(&self, name: &str) -> Option<EffectKind> {
        self.entries.get(name).map(|e| e.kind)
    }

    /// 解析某次调用的完整选项
    ///
    /// 优先级：调用点显式值 > 按名默认值 > 全局兜底。
    /// 未注册的名字按无按名默认值处理。
    pub fn resolve_options(&self, name: &str, request: &EffectRequest) -> EffectOptions {
        match self.entries.get(name) {
            Some(entry) => request.or(&entry.defaults).resolve(),
            None => request.resolve(),
        }
    }

    /// 已注册的效果名（无序）
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(|s| s.as_str())
    }

    /// 已注册的效果数量
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
