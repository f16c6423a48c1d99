//! # FX Runtime
//!
//! 2D 游戏引擎的视觉效果层核心。
//!
//! ## 架构概述
//!
//! `fx-runtime` 是纯逻辑核心，不依赖任何 IO 或渲染后端。
//! 宿主持有 [`Scene`]，通过帧循环驱动 [`Effects`]：
//!
//! ```text
//! Host                               Effects
//!   │                                   │
//!   │── invoke(scene, 名, 主体, 选项) ─►│  领取引擎 / 建动画实例
//!   │◄─── Option<EffectHandle> ─────────│
//!   │                                   │
//!   │── tick(scene, dt) ───────────────►│  推进、收割、循环重启
//!   │                                   │
//!   │── pause / resume / stop / commit ─►│  按作用域分发状态变更
//! ```
//!
//! ## 核心类型
//!
//! - [`Effects`]：效果管理器（池、注册表、名槽、每帧驱动）
//! - [`EffectEngine`]：粒子/合成引擎适配器
//! - [`Scene`] / [`Style`]：保留模式视图存储与变换状态
//! - [`Animator`]：补间原语（then/now/wait/clear/commit）
//! - [`ParticleEngine`] / [`Particle`]：粒子原语与不透明载荷记录
//!
//! ## 使用示例
//!
//! ```ignore
//! use fx_runtime::{Effects, EffectRequest, Scene, Style};
//!
//! let mut scene = Scene::new();
//! let hero = scene.create_view(Style::with_frame(100.0, 100.0, 40.0, 40.0));
//!
//! let mut fx = Effects::standard();
//! fx.invoke(&mut scene, "explode", hero, EffectRequest::new());
//!
//! // 主循环
//! loop {
//!     let dt = wait_for_frame();
//!     fx.tick(&mut scene, dt);
//! }
//! ```
//!
//! ## 模块结构
//!
//! - [`manager`]：效果管理器 / 调度器
//! - [`engine`]：引擎适配器（pause/resume/stop/commit/update）
//! - [`pool`]：引擎实例池
//! - [`registry`]：效果名到配方的映射
//! - [`library`]：标准配方目录与默认选项表
//! - [`scene`] / [`style`]：视图层级与样式
//! - [`tween`] / [`easing`]：补间原语与缓动函数
//! - [`particle`]：粒子原语
//! - [`images`]：按名贴图解析
//! - [`options`]：选项请求、解析与数据化默认表
//! - [`diagnostic`]：注册表/贴图静态检查
//! - [`error`]：错误类型定义

pub mod diagnostic;
pub mod easing;
pub mod engine;
pub mod error;
pub mod images;
pub mod library;
pub mod manager;
pub mod options;
pub mod particle;
pub mod pool;
pub mod registry;
pub mod scene;
pub mod style;
pub mod tween;

// 重导出核心类型
pub use diagnostic::{analyze_effects, Diagnostic, DiagnosticLevel, DiagnosticResult};
pub use easing::EasingFunction;
pub use engine::{EffectEngine, EngineKind};
pub use error::{ConfigError, ConfigResult};
pub use images::ImageLibrary;
pub use manager::{AnimationId, EffectHandle, Effects};
pub use options::{DefaultsConfig, EffectOptions, EffectRequest};
pub use particle::{Particle, ParticleEngine};
pub use pool::{EngineId, EnginePool};
pub use registry::{EffectKind, EffectRegistry};
pub use scene::{Scene, ViewId};
pub use style::{CompositeOperation, Style, StyleProp};
pub use tween::Animator;
