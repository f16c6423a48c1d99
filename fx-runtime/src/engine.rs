//! # Engine 模块
//!
//! 粒子/合成引擎适配器：给原始粒子原语套上统一的生命周期控制面。
//!
//! ## 状态机
//!
//! ```text
//! Idle -> Active -> Idle
//!          │
//!          ├─ Paused   （逻辑标志，保留分配、跳过推进）
//!          └─ Following（正交标志，每帧镜像主体变换）
//! ```
//!
//! 停止存在刻意的不对称：非跟随且未强制时，`stop` 只掐掉内部循环
//! 计时，让爆炸这类视觉上独立于主体的效果自然放完。

use crate::options::EffectOptions;
use crate::particle::ParticleEngine;
use crate::scene::{Scene, ViewId};
use crate::style::CompositeOperation;
use crate::tween::Animator;

/// 引擎种类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineKind {
    /// 粒子引擎（爆炸、火花等独立粒子）
    Particle,
    /// 合成引擎（多图层叠加，带画布级合成副作用）
    Composite,
}

/// 效果引擎
///
/// 池化对象：构造一次、反复回收。每个引擎在场景中拥有一个
/// 常驻视图，激活时挂接为主体的兄弟视图，释放时摘除。
#[derive(Debug)]
pub struct EffectEngine {
    /// 引擎种类
    kind: EngineKind,
    /// 引擎自身的场景视图
    view: ViewId,
    /// 被装饰的主体（None 表示空闲）
    pub subject: Option<ViewId>,
    /// 效果名（用于按名过滤）
    pub group: String,
    /// 暂停标志
    pub paused: bool,
    /// 跟随标志
    pub follow: bool,
    /// 原始粒子原语
    pub particles: ParticleEngine,
    /// 引擎自身视图上的视觉补间（disco 的淡入淡出等）
    pub anim: Animator,
    /// 循环重启计时器
    pub(crate) anim_loop: Animator,
    /// 本次激活解析后的选项（循环重启时复用）
    pub(crate) options: EffectOptions,
}

impl EffectEngine {
    /// 构造新引擎，在场景中创建其常驻视图
    pub(crate) fn new(kind: EngineKind, scene: &mut Scene) -> Self {
        let view = scene.create_view(crate::style::Style::default());
        Self {
            kind,
            view,
            subject: None,
            group: String::new(),
            paused: false,
            follow: false,
            particles: ParticleEngine::new(),
            anim: Animator::new(view),
            anim_loop: Animator::new(view),
            options: EffectOptions::default(),
        }
    }

    /// 引擎种类
    pub fn kind(&self) -> EngineKind {
        self.kind
    }

    /// 引擎自身的视图
    pub fn view(&self) -> ViewId {
        self.view
    }

    /// 是否还有未过期的粒子数据
    pub fn has_live_particles(&self) -> bool {
        self.particles.active_count() > 0
    }

    /// 激活：绑定主体、挂入渲染层级、按主体变换摆位
    ///
    /// 引擎视图成为主体的兄弟（主体无父视图时挂在根容器），
    /// `behind` 选项决定层级偏移方向。
    pub(crate) fn begin(
        &mut self,
        scene: &mut Scene,
        subject: ViewId,
        group: &str,
        opts: &EffectOptions,
    ) {
        self.subject = Some(subject);
        self.group = group.to_string();
        self.paused = false;
        self.follow = opts.follow;
        self.options = opts.clone();

        match scene.superview(subject) {
            Some(parent) => scene.add_subview(parent, self.view),
            None => scene.remove_from_superview(self.view),
        }

        let Some(sub) = scene.style(subject).cloned() else {
            return;
        };
        let Some(es) = scene.style_mut(self.view) else {
            return;
        };
        es.x = sub.x;
        es.y = sub.y;
        es.offset_x = sub.offset_x;
        es.offset_y = sub.offset_y;
        es.width = sub.width.max(1.0);
        es.height = sub.height.max(1.0);
        es.anchor_x = es.width / 2.0;
        es.anchor_y = es.height / 2.0;
        es.z_index = if opts.behind {
            sub.z_index - 1
        } else {
            sub.z_index + 1
        };
        es.scale = opts.scale;
        es.scale_x = sub.scale_x;
        es.scale_y = sub.scale_y;
        es.flip_x = sub.flip_x;
        es.flip_y = sub.flip_y;
        es.visible = true;
        es.opacity = 1.0;
    }

    /// 暂停推进；幂等
    pub fn pause(&mut self) {
        self.anim.pause();
        self.anim_loop.pause();
        self.paused = true;
    }

    /// 恢复推进；幂等，未暂停时为空操作
    pub fn resume(&mut self) {
        self.anim.resume();
        self.anim_loop.resume();
        self.paused = false;
    }

    /// 停止
    ///
    /// 无条件掐掉内部循环计时。仅当持有主体且（跟随或强制）时
    /// 执行完整收尾：杀死粒子、清除视觉副作用、摘出层级、
    /// 释放主体与效果名。
    ///
    /// # 返回
    /// - `true`: 发生了完整收尾（调用方应同步清理名槽）
    /// - `false`: 空操作或仅掐掉计时（滞留效果继续自然放完）
    pub fn stop(&mut self, scene: &mut Scene, force: bool) -> bool {
        self.anim_loop.clear();

        if self.subject.is_none() {
            // 已释放：重入 stop 为空操作
            return false;
        }
        if !(self.follow || force) {
            return false;
        }

        self.anim.clear();
        self.particles.kill_all();
        self.paused = false;
        self.follow = false;

        if let Some(style) = scene.style_mut(self.view) {
            if self.kind == EngineKind::Composite {
                style.opacity = 1.0;
                style.composite_operation = CompositeOperation::SourceOver;
            }
        }
        scene.remove_from_superview(self.view);

        self.subject = None;
        self.group.clear();
        true
    }

    /// 立即完成
    ///
    /// 总是先掐掉循环计时；跟随或强制时把在飞补间一步写到终值
    /// （终态与自然播完一致），然后执行 [`stop`](Self::stop)。
    ///
    /// # 返回
    /// 同 [`stop`](Self::stop)。
    pub fn commit(&mut self, scene: &mut Scene, force: bool) -> bool {
        self.anim_loop.clear();

        if self.subject.is_some() && (self.follow || force) {
            self.anim.commit(scene);
            return self.stop(scene, true);
        }
        false
    }

    /// 每帧推进
    ///
    /// 未暂停时推进粒子与两条补间；跟随时无条件镜像主体的位置、
    /// 偏移与可见性，并在主体换容器后重新挂接。
    ///
    /// # 返回
    /// - `true`: 循环计时器在本次调用中走完（管理器据此调度重启）
    pub fn update(&mut self, scene: &mut Scene, dt: f32) -> bool {
        let mut loop_elapsed = false;

        if !self.paused {
            self.particles.run_tick(dt);
            self.anim.update(scene, dt);
            loop_elapsed = self.anim_loop.update(scene, dt);
        }

        if self.follow {
            if let Some(subject) = self.subject {
                if let Some(sub) = scene.style(subject).cloned() {
                    if let Some(es) = scene.style_mut(self.view) {
                        es.x = sub.x;
                        es.y = sub.y;
                        es.offset_x = sub.offset_x;
                        es.offset_y = sub.offset_y;
                        es.visible = sub.visible;
                    }
                }

                let parent = scene.superview(subject);
                if scene.superview(self.view) != parent {
                    match parent {
                        Some(p) => scene.add_subview(p, self.view),
                        None => scene.remove_from_superview(self.view),
                    }
                }
            }
        }

        loop_elapsed
    }
}
