//! # Particle 模块
//!
//! 粒子渲染原语：粒子记录池、发射与按时推进。
//!
//! ## 设计原则
//!
//! - 每个数值通道都是**不透明载荷**：核心只按流逝时间统一积分
//!   （`值 += 导数·s; 导数 += 二阶导数·s`，`s = dt/1000`），
//!   运动学含义完全由配方层赋予
//! - 记录只回收不销毁，预热后发射零分配

use serde::{Deserialize, Serialize};

use crate::style::CompositeOperation;

/// 单个粒子记录
///
/// 字段按通道成组：笛卡尔位置、极坐标位置、旋转、缩放、透明度，
/// 每组带一阶/二阶导数（单位为每秒）。`delay` 与 `ttl` 以毫秒计。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    /// 横坐标
    pub x: f32,
    /// 纵坐标
    pub y: f32,
    /// 横向速度
    pub dx: f32,
    /// 纵向速度
    pub dy: f32,
    /// 横向加速度
    pub ddx: f32,
    /// 纵向加速度
    pub ddy: f32,

    /// 是否按极坐标求位置
    ///
    /// 为真时位置由 `(ox, oy) + radius·(cos θ, sin θ)` 导出，
    /// 笛卡尔速度通道不参与。
    pub polar: bool,
    /// 极坐标原点横坐标
    pub ox: f32,
    /// 极坐标原点纵坐标
    pub oy: f32,
    /// 极径
    pub radius: f32,
    /// 极径变化率
    pub dradius: f32,
    /// 极径变化率的变化率
    pub ddradius: f32,
    /// 极角
    pub theta: f32,
    /// 极角变化率
    pub dtheta: f32,
    /// 极角变化率的变化率
    pub ddtheta: f32,

    /// 自身旋转角度
    pub r: f32,
    /// 旋转速度
    pub dr: f32,
    /// 旋转加速度
    pub ddr: f32,

    /// 缩放
    pub scale: f32,
    /// 缩放变化率
    pub dscale: f32,
    /// 缩放变化率的变化率
    pub ddscale: f32,

    /// 透明度
    pub opacity: f32,
    /// 透明度变化率
    pub dopacity: f32,
    /// 透明度变化率的变化率
    pub ddopacity: f32,

    /// 宽度
    pub width: f32,
    /// 高度
    pub height: f32,
    /// 锚点横坐标
    pub anchor_x: f32,
    /// 锚点纵坐标
    pub anchor_y: f32,

    /// 变为活跃前的延迟（毫秒）
    pub delay: f32,
    /// 剩余存活时间（毫秒，允许 `f32::INFINITY`）
    pub ttl: f32,

    /// 贴图路径（None 表示无贴图粒子）
    pub image: Option<String>,
    /// 合成模式
    pub composite_operation: CompositeOperation,
}

impl Default for Particle {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            dx: 0.0,
            dy: 0.0,
            ddx: 0.0,
            ddy: 0.0,
            polar: false,
            ox: 0.0,
            oy: 0.0,
            radius: 0.0,
            dradius: 0.0,
            ddradius: 0.0,
            theta: 0.0,
            dtheta: 0.0,
            ddtheta: 0.0,
            r: 0.0,
            dr: 0.0,
            ddr: 0.0,
            scale: 1.0,
            dscale: 0.0,
            ddscale: 0.0,
            opacity: 1.0,
            dopacity: 0.0,
            ddopacity: 0.0,
            width: 1.0,
            height: 1.0,
            anchor_x: 0.0,
            anchor_y: 0.0,
            delay: 0.0,
            ttl: 1000.0,
            image: None,
            composite_operation: CompositeOperation::SourceOver,
        }
    }
}

impl Particle {
    /// 重置为默认载荷（回收复用时调用）
    fn reset(&mut self) {
        *self = Self::default();
    }

    /// 按流逝时间统一积分所有通道
    ///
    /// `dt` 毫秒；导数单位为每秒。
    fn advance(&mut self, dt: f32) {
        let s = dt / 1000.0;

        if self.polar {
            self.radius += self.dradius * s;
            self.dradius += self.ddradius * s;
            self.theta += self.dtheta * s;
            self.dtheta += self.ddtheta * s;
            self.x = self.ox + self.radius * self.theta.cos();
            self.y = self.oy + self.radius * self.theta.sin();
        } else {
            self.x += self.dx * s;
            self.dx += self.ddx * s;
            self.y += self.dy * s;
            self.dy += self.ddy * s;
        }

        self.r += self.dr * s;
        self.dr += self.ddr * s;
        self.scale += self.dscale * s;
        self.dscale += self.ddscale * s;
        self.opacity += self.dopacity * s;
        self.dopacity += self.ddopacity * s;
    }
}

/// 粒子引擎原语
///
/// 持有活跃粒子与空闲记录两个集合。
/// 配方通过 [`obtain_particle_array`](ParticleEngine::obtain_particle_array)
/// 领取记录、填充后 [`emit_particles`](ParticleEngine::emit_particles)。
#[derive(Debug, Default)]
pub struct ParticleEngine {
    /// 活跃粒子（按发射顺序）
    active: Vec<Particle>,
    /// 空闲记录
    free: Vec<Particle>,
}

impl ParticleEngine {
    /// 创建空引擎
    pub fn new() -> Self {
        Self::default()
    }

    /// 领取 `count` 条记录
    ///
    /// 优先复用空闲记录（重置为默认载荷），不足时新建。
    pub fn obtain_particle_array(&mut self, count: usize) -> Vec<Particle> {
        let mut batch = Vec::with_capacity(count);
        for _ in 0..count {
            match self.free.pop() {
                Some(mut p) => {
                    p.reset();
                    batch.push(p);
                }
                None => batch.push(Particle::default()),
            }
        }
        batch
    }

    /// 发射一批粒子，使其进入活跃集合
    pub fn emit_particles(&mut self, batch: Vec<Particle>) {
        self.active.extend(batch);
    }

    /// 发射调用方自行构造的外部粒子记录
    pub fn add_external_particles(&mut self, batch: Vec<Particle>) {
        self.active.extend(batch);
    }

    /// 活跃粒子数量（含延迟未生效的粒子）
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// 活跃粒子（按发射顺序）
    pub fn active(&self) -> &[Particle] {
        &self.active
    }

    /// 杀死全部粒子，记录回收待复用
    pub fn kill_all(&mut self) {
        self.free.append(&mut self.active);
    }

    /// 推进所有活跃粒子
    ///
    /// 延迟未耗尽的粒子只倒计时；`ttl` 耗尽的粒子被回收。
    ///
    /// # 参数
    /// - `dt`: 流逝时间（毫秒）
    pub fn run_tick(&mut self, dt: f32) {
        let mut i = 0;
        while i < self.active.len() {
            let p = &mut self.active[i];

            if p.delay > 0.0 {
                // 延迟跨零的这一帧只激活，不推进
                p.delay = (p.delay - dt).max(0.0);
                i += 1;
                continue;
            }

            p.ttl -= dt;
            if p.ttl <= 0.0 {
                let mut dead = self.active.remove(i);
                dead.reset();
                self.free.push(dead);
                continue;
            }

            p.advance(dt);
            i += 1;
        }
    }
}
