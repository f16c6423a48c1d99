//! # Manager 模块
//!
//! 效果系统的每帧驱动器。
//!
//! ## 执行模型
//!
//! ```text
//! Host                               Effects
//!   │                                   │
//!   │── invoke(scene, 名, 主体, 选项) ─►│  领取引擎 / 建动画实例
//!   │◄─── Option<EffectHandle> ─────────│
//!   │                                   │
//!   │── tick(scene, dt) ───────────────►│  推进、收割、循环重启
//!   │                                   │
//! ```
//!
//! [`Effects`] 是宿主构造一次、显式传递的上下文对象（依赖注入，
//! 无全局单例）。场景通过 `&mut Scene` 参数进入，帧源就是宿主
//! 对 [`tick`](Effects::tick) 的调用本身；丢弃该值即完成拆除。
//!
//! ## 调度规则
//!
//! - 分发顺序固定：动画在前，其次粒子池，最后合成池
//! - 收割只发生在 tick：粒子耗尽的引擎被强制停止并归还池子
//! - 循环重启搭在被替换引擎自身的计时器上；重启触发前先校验
//!   名槽仍指向该引擎，外部替换/停止即隐式取消

use std::collections::HashMap;

use crate::engine::{EffectEngine, EngineKind};
use crate::error::ConfigResult;
use crate::images::ImageLibrary;
use crate::options::{DefaultsConfig, EffectOptions, EffectRequest};
use crate::pool::{EngineId, EnginePool};
use crate::registry::{EffectKind, EffectRegistry, Recipe};
use crate::scene::{Scene, ViewId};
use crate::tween::Animator;

/// 动画实例标识符
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AnimationId(u64);

impl AnimationId {
    /// 获取内部 id 值
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// 效果句柄
///
/// [`Effects::invoke`] 的返回值；`None` 表示效果拒绝执行
/// （未注册、配方未产生任何数据、或单例守卫命中）。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectHandle {
    /// 动画实例
    Animation(AnimationId),
    /// 粒子引擎
    Particle(EngineId),
    /// 合成引擎
    Composite(EngineId),
}

/// 名槽：指向主体上某个效果名的活跃引擎
///
/// 管理器独占的显式映射，同时承担去重与循环重启的活性校验
/// 两个职责；不在主体对象上挂任何反向引用。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct EngineSlot {
    kind: EngineKind,
    id: EngineId,
}

/// 活跃动画实例
struct ActiveAnimation {
    id: AnimationId,
    subject: ViewId,
    name: String,
    options: EffectOptions,
    anim: Animator,
    /// 外部打断标志：stop/commit 置位，抑制循环续播
    interrupting: bool,
}

/// 状态变更种类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StateChange {
    Pause,
    Resume,
    Stop,
    Commit,
}

/// 池子推进的单步结果
enum TickOutcome {
    /// 无事发生
    Advanced,
    /// 引擎被收割（携带收割前的主体与效果名）
    Reaped {
        subject: Option<ViewId>,
        group: String,
    },
    /// 循环计时到期
    LoopElapsed {
        subject: Option<ViewId>,
        group: String,
        options: EffectOptions,
    },
}

/// 效果管理器
pub struct Effects {
    /// 效果注册表
    registry: EffectRegistry,
    /// 贴图解析器
    images: ImageLibrary,
    /// 活跃动画实例
    anims: Vec<ActiveAnimation>,
    /// 粒子引擎池
    particle_pool: EnginePool,
    /// 合成引擎池
    composite_pool: EnginePool,
    /// 名槽映射
    slots: HashMap<(ViewId, String), EngineSlot>,
    /// 下一个动画 id
    next_anim_id: u64,
}

impl Default for Effects {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Effects {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Effects")
            .field("registry", &self.registry)
            .field("anims", &self.anims.len())
            .field("particle_pool", &self.particle_pool.active_count())
            .field("composite_pool", &self.composite_pool.active_count())
            .finish()
    }
}

impl Effects {
    /// 创建空管理器（无配方、无贴图）
    pub fn new() -> Self {
        Self {
            registry: EffectRegistry::new(),
            images: ImageLibrary::new(),
            anims: Vec::new(),
            particle_pool: EnginePool::new(EngineKind::Particle),
            composite_pool: EnginePool::new(EngineKind::Composite),
            slots: HashMap::new(),
            next_anim_id: 0,
        }
    }

    /// 创建带标准配方目录的管理器
    pub fn standard() -> Self {
        let mut fx = Self::new();
        crate::library::install(&mut fx);
        fx
    }

    // ========== 注册 ==========

    /// 注册动画类效果（同名覆盖）
    pub fn register_animation_effect(
        &mut self,
        name: impl Into<String>,
        recipe: impl Fn(&mut Scene, ViewId, &EffectOptions, &mut Animator) + 'static,
    ) {
        self.registry.register_animation(name, recipe);
    }

    /// 注册粒子类效果（同名覆盖）
    pub fn register_particle_effect(
        &mut self,
        name: impl Into<String>,
        recipe: impl Fn(&mut Scene, ViewId, &EffectOptions, &mut EffectEngine) + 'static,
    ) {
        self.registry.register_particle(name, recipe);
    }

    /// 注册合成类效果（同名覆盖；每主体单例）
    pub fn register_composite_effect(
        &mut self,
        name: impl Into<String>,
        recipe: impl Fn(&mut Scene, ViewId, &EffectOptions, &mut EffectEngine) + 'static,
    ) {
        self.registry.register_composite(name, recipe);
    }

    /// 设置某个效果的按名默认选项
    pub fn set_effect_defaults(&mut self, name: &str, defaults: EffectRequest) {
        self.registry.set_defaults(name, defaults);
    }

    /// 以 JSON 默认值整表覆盖按名默认选项
    pub fn apply_defaults_config(&mut self, config: &DefaultsConfig) -> ConfigResult<()> {
        self.registry.apply_defaults_config(config)
    }

    /// 设置贴图解析器
    pub fn set_image_library(&mut self, images: ImageLibrary) {
        self.images = images;
    }

    /// 当前贴图解析器
    pub fn images(&self) -> &ImageLibrary {
        &self.images
    }

    /// 当前注册表
    pub fn registry(&self) -> &EffectRegistry {
        &self.registry
    }

    // ========== 调用 ==========

    /// 调用一个具名效果
    ///
    /// # 返回
    /// - `Some(handle)`: 效果已启动
    /// - `None`: 效果拒绝执行（未注册、配方未产生数据、单例守卫）
    pub fn invoke(
        &mut self,
        scene: &mut Scene,
        name: &str,
        subject: ViewId,
        request: EffectRequest,
    ) -> Option<EffectHandle> {
        if self.registry.get(name).is_none() {
            tracing::warn!(effect = name, "调用了未注册的效果名");
            return None;
        }
        let options = self.registry.resolve_options(name, &request);
        self.invoke_resolved(scene, name, subject, options)
    }

    /// 以已解析的选项调用（循环重启复用此路径）
    fn invoke_resolved(
        &mut self,
        scene: &mut Scene,
        name: &str,
        subject: ViewId,
        options: EffectOptions,
    ) -> Option<EffectHandle> {
        let (kind, recipe) = match self.registry.get(name) {
            Some(entry) => (entry.kind, entry.recipe.clone()),
            None => return None,
        };

        match (kind, recipe) {
            (EffectKind::Animation, Recipe::Animation(recipe)) => {
                self.invoke_animation(scene, name, subject, options, &recipe)
            }
            (EffectKind::Particle, Recipe::Engine(recipe)) => {
                self.invoke_engine(scene, EngineKind::Particle, name, subject, options, &recipe)
            }
            (EffectKind::Composite, Recipe::Engine(recipe)) => self.invoke_engine(
                scene,
                EngineKind::Composite,
                name,
                subject,
                options,
                &recipe,
            ),
            // 注册接口保证类别与配方签名一致
            _ => None,
        }
    }

    /// 启动动画类效果
    fn invoke_animation(
        &mut self,
        scene: &mut Scene,
        name: &str,
        subject: ViewId,
        options: EffectOptions,
        recipe: &crate::registry::AnimationRecipe,
    ) -> Option<EffectHandle> {
        // 同名同主体先强制完成旧实例，杜绝并发双实例
        if let Some(pos) = self
            .anims
            .iter()
            .position(|a| a.subject == subject && a.name == name)
        {
            let mut prior = self.anims.remove(pos);
            prior.interrupting = true;
            prior.anim.commit(scene);
        }

        let mut anim = Animator::new(subject);
        let lead_steps = if options.delay > 0.0 {
            anim.wait(options.delay);
            1
        } else {
            0
        };
        recipe(scene, subject, &options, &mut anim);

        if anim.step_count() <= lead_steps {
            // 配方没有排任何插值步骤：效果拒绝
            return None;
        }

        self.next_anim_id += 1;
        let id = AnimationId(self.next_anim_id);
        self.anims.push(ActiveAnimation {
            id,
            subject,
            name: name.to_string(),
            options,
            anim,
            interrupting: false,
        });
        Some(EffectHandle::Animation(id))
    }

    /// 启动粒子/合成类效果
    fn invoke_engine(
        &mut self,
        scene: &mut Scene,
        kind: EngineKind,
        name: &str,
        subject: ViewId,
        mut options: EffectOptions,
        recipe: &crate::registry::EngineRecipe,
    ) -> Option<EffectHandle> {
        // 合成类每主体单例：名槽被占则拒绝
        if kind == EngineKind::Composite && self.slots.contains_key(&(subject, name.to_string())) {
            return None;
        }

        if options.images.is_empty() {
            options.images = self.images.get(name);
            if options.images.is_empty() {
                tracing::warn!(effect = name, "效果没有可用贴图集合");
            }
        }

        let pool = match kind {
            EngineKind::Particle => &mut self.particle_pool,
            EngineKind::Composite => &mut self.composite_pool,
        };
        let id = pool.obtain(scene);
        let engine = pool.get_mut(id).expect("刚领取的引擎必然存在");

        engine.begin(scene, subject, name, &options);
        recipe(scene, subject, &options, engine);

        if !engine.has_live_particles() {
            // 配方拒绝执行（例如内部守卫提前返回）：立即归还
            engine.stop(scene, true);
            pool.release(id);
            return None;
        }

        if options.looping {
            engine.anim_loop.clear();
            engine.anim_loop.wait(options.duration);
        }

        self.slots
            .insert((subject, name.to_string()), EngineSlot { kind, id });

        Some(match kind {
            EngineKind::Particle => EffectHandle::Particle(id),
            EngineKind::Composite => EffectHandle::Composite(id),
        })
    }

    // ========== 每帧驱动 ==========

    /// 推进一帧
    ///
    /// # 参数
    /// - `dt`: 流逝时间（毫秒）
    pub fn tick(&mut self, scene: &mut Scene, dt: f32) {
        self.tick_animations(scene, dt);
        self.tick_pool(scene, EngineKind::Particle, dt);
        self.tick_pool(scene, EngineKind::Composite, dt);
    }

    /// 推进全部动画实例
    fn tick_animations(&mut self, scene: &mut Scene, dt: f32) {
        let mut restarts: Vec<(String, ViewId, EffectOptions)> = Vec::new();

        let mut i = 0;
        while i < self.anims.len() {
            let a = &mut self.anims[i];
            let finished = a.anim.update(scene, dt);

            if finished {
                let a = self.anims.remove(i);
                // 自然播完且要求循环：续播；外部打断不续播
                if a.options.looping && !a.interrupting {
                    restarts.push((a.name, a.subject, a.options));
                }
                continue;
            }
            if a.interrupting && a.anim.is_idle() {
                // 外部打断后时间轴已空：收尾
                self.anims.remove(i);
                continue;
            }
            i += 1;
        }

        for (name, subject, mut options) in restarts {
            options.delay = 0.0;
            self.invoke_resolved(scene, &name, subject, options);
        }
    }

    /// 推进一个引擎池
    fn tick_pool(&mut self, scene: &mut Scene, kind: EngineKind, dt: f32) {
        for id in self.pool(kind).active_ids() {
            let outcome = {
                let pool = self.pool_mut(kind);
                if !pool.is_active(id) {
                    continue;
                }
                let engine = pool.get_mut(id).expect("活跃引擎必然存在");

                if engine.has_live_particles() {
                    if engine.update(scene, dt) {
                        TickOutcome::LoopElapsed {
                            subject: engine.subject,
                            group: engine.group.clone(),
                            options: engine.options.clone(),
                        }
                    } else {
                        TickOutcome::Advanced
                    }
                } else {
                    // 唯一的收割点：粒子耗尽即强停归还
                    let subject = engine.subject;
                    let group = engine.group.clone();
                    engine.stop(scene, true);
                    pool.release(id);
                    TickOutcome::Reaped { subject, group }
                }
            };

            match outcome {
                TickOutcome::Advanced => {}
                TickOutcome::Reaped {
                    subject: Some(subject),
                    group,
                } => {
                    self.remove_slot_if(subject, &group, kind, id);
                }
                TickOutcome::Reaped { subject: None, .. } => {}
                TickOutcome::LoopElapsed {
                    subject: Some(subject),
                    group,
                    mut options,
                } => {
                    // 活性校验：名槽不再指向本引擎说明已被外部替换或
                    // 停止，重启静默取消
                    let key = (subject, group.clone());
                    if self.slots.get(&key) != Some(&EngineSlot { kind, id }) {
                        continue;
                    }
                    {
                        let pool = self.pool_mut(kind);
                        if let Some(engine) = pool.get_mut(id) {
                            engine.stop(scene, true);
                        }
                        pool.release(id);
                    }
                    self.slots.remove(&key);

                    options.delay = 0.0;
                    self.invoke_resolved(scene, &group, subject, options);
                }
                TickOutcome::LoopElapsed { subject: None, .. } => {}
            }
        }
    }

    // ========== 状态变更 ==========

    /// 暂停（作用域见 [`stop`](Self::stop)）
    pub fn pause(&mut self, scene: &mut Scene, subject: Option<ViewId>, name: Option<&str>) {
        self.apply_state(scene, subject, name, StateChange::Pause);
    }

    /// 恢复（作用域见 [`stop`](Self::stop)）
    pub fn resume(&mut self, scene: &mut Scene, subject: Option<ViewId>, name: Option<&str>) {
        self.apply_state(scene, subject, name, StateChange::Resume);
    }

    /// 停止
    ///
    /// 作用域：`subject` 缺省则全局；给定 `subject` 时 `name`
    /// 缺省作用于该主体全部效果，否则只作用于同名效果。
    ///
    /// 非跟随引擎不会被强拆，继续自然放完（停止不对称）。
    pub fn stop(&mut self, scene: &mut Scene, subject: Option<ViewId>, name: Option<&str>) {
        self.apply_state(scene, subject, name, StateChange::Stop);
    }

    /// 立即完成（作用域见 [`stop`](Self::stop)）
    pub fn commit(&mut self, scene: &mut Scene, subject: Option<ViewId>, name: Option<&str>) {
        self.apply_state(scene, subject, name, StateChange::Commit);
    }

    /// 按作用域分发状态变更：动画在前，其次粒子池，最后合成池
    fn apply_state(
        &mut self,
        scene: &mut Scene,
        subject: Option<ViewId>,
        name: Option<&str>,
        change: StateChange,
    ) {
        let matches = |s: ViewId, g: &str| -> bool {
            match subject {
                None => true,
                Some(want) => s == want && name.is_none_or(|n| n == g),
            }
        };

        for a in &mut self.anims {
            if !matches(a.subject, &a.name) {
                continue;
            }
            match change {
                StateChange::Pause => a.anim.pause(),
                StateChange::Resume => a.anim.resume(),
                StateChange::Stop => {
                    a.interrupting = true;
                    a.anim.clear();
                }
                StateChange::Commit => {
                    a.interrupting = true;
                    a.anim.commit(scene);
                }
            }
        }

        for kind in [EngineKind::Particle, EngineKind::Composite] {
            for id in self.pool(kind).active_ids() {
                let teardown = {
                    let pool = self.pool_mut(kind);
                    if !pool.is_active(id) {
                        continue;
                    }
                    let engine = pool.get_mut(id).expect("活跃引擎必然存在");
                    let Some(engine_subject) = engine.subject else {
                        continue;
                    };
                    if !matches(engine_subject, &engine.group) {
                        continue;
                    }

                    let key = (engine_subject, engine.group.clone());
                    match change {
                        StateChange::Pause => {
                            engine.pause();
                            None
                        }
                        StateChange::Resume => {
                            engine.resume();
                            None
                        }
                        StateChange::Stop => engine.stop(scene, false).then_some(key),
                        StateChange::Commit => engine.commit(scene, false).then_some(key),
                    }
                };

                if let Some((s, g)) = teardown {
                    self.remove_slot_if(s, &g, kind, id);
                }
            }
        }
    }

    // ========== 查询 ==========

    /// 通过句柄访问引擎（动画句柄返回 `None`）
    pub fn engine(&self, handle: EffectHandle) -> Option<&EffectEngine> {
        match handle {
            EffectHandle::Animation(_) => None,
            EffectHandle::Particle(id) => self.particle_pool.get(id),
            EffectHandle::Composite(id) => self.composite_pool.get(id),
        }
    }

    /// 主体上某个效果名当前的活跃引擎
    pub fn engine_for(&self, subject: ViewId, name: &str) -> Option<&EffectEngine> {
        let slot = self.slots.get(&(subject, name.to_string()))?;
        self.pool(slot.kind).get(slot.id)
    }

    /// 句柄对应的引擎是否仍处于活跃集合
    pub fn is_engine_active(&self, handle: EffectHandle) -> bool {
        match handle {
            EffectHandle::Animation(id) => self.anims.iter().any(|a| a.id == id),
            EffectHandle::Particle(id) => self.particle_pool.is_active(id),
            EffectHandle::Composite(id) => self.composite_pool.is_active(id),
        }
    }

    /// 活跃动画实例数量
    pub fn active_animation_count(&self) -> usize {
        self.anims.len()
    }

    /// 某类引擎池的活跃实例数量
    pub fn active_engine_count(&self, kind: EngineKind) -> usize {
        self.pool(kind).active_count()
    }

    /// 某类引擎池的实例总量（活跃 + 空闲）
    pub fn pooled_engine_count(&self, kind: EngineKind) -> usize {
        self.pool(kind).len()
    }

    fn pool(&self, kind: EngineKind) -> &EnginePool {
        match kind {
            EngineKind::Particle => &self.particle_pool,
            EngineKind::Composite => &self.composite_pool,
        }
    }

    fn pool_mut(&mut self, kind: EngineKind) -> &mut EnginePool {
        match kind {
            EngineKind::Particle => &mut self.particle_pool,
            EngineKind::Composite => &mut self.composite_pool,
        }
    }

    /// 名槽仍指向该引擎时移除（防止替换后误清新槽）
    fn remove_slot_if(&mut self, subject: ViewId, group: &str, kind: EngineKind, id: EngineId) {
        let key = (subject, group.to_string());
        if self.slots.get(&key) == Some(&EngineSlot { kind, id }) {
            self.slots.remove(&key);
        }
    }
}
