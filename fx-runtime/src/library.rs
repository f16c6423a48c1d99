//! # Library 模块
//!
//! 标准配方目录：具名效果的数学与默认选项表。
//!
//! 配方是核心的**参数化输入**：这里的每个函数都只通过
//! [`Animator`] / [`EffectEngine`] 的公开表面填充数据，
//! 不触碰生命周期管线。宿主可以用同样的签名注册自己的配方，
//! 同名覆盖内置条目。
//!
//! 所有随机参数经 `fastrand` 滚动；测试通过 `fastrand::seed`
//! 固定序列。

use std::f32::consts::TAU;

use crate::easing::EasingFunction;
use crate::engine::EffectEngine;
use crate::manager::Effects;
use crate::options::{DefaultsConfig, EffectOptions};
use crate::scene::{Scene, ViewId};
use crate::style::{CompositeOperation, StyleProp};
use crate::tween::Animator;

/// 在 `[lo, hi)` 内滚动一个浮点数
fn roll(lo: f32, hi: f32) -> f32 {
    lo + fastrand::f32() * (hi - lo)
}

/// 从集合中随机选一张贴图；空集合返回 `None`（缺图不是错误）
fn choose(set: &[String]) -> Option<String> {
    if set.is_empty() {
        None
    } else {
        Some(set[fastrand::usize(..set.len())].clone())
    }
}

/// 混合选项对应的合成模式
fn blend_mode(opts: &EffectOptions) -> CompositeOperation {
    if opts.blend {
        CompositeOperation::Lighter
    } else {
        CompositeOperation::SourceOver
    }
}

/// 内置默认选项表
///
/// 与 JSON 数据表同构，可整表导出/替换。
pub fn default_options() -> DefaultsConfig {
    let mut config = DefaultsConfig::default();
    config.duration.insert("disco".into(), 2500.0);
    for name in ["hover", "spin", "squish", "sway", "disco", "sparkle"] {
        config.looping.insert(name.into(), true);
    }
    config.blend.insert("explode".into(), true);
    config.follow.insert("radial".into(), true);
    config.follow.insert("sparkle".into(), true);
    config.behind.insert("radial".into(), true);
    config
}

/// 把标准目录装进管理器
pub fn install(fx: &mut Effects) {
    fx.register_animation_effect("hover", hover);
    fx.register_animation_effect("shake", shake);
    fx.register_animation_effect("spin", spin);
    fx.register_animation_effect("squish", squish);
    fx.register_animation_effect("sway", sway);

    fx.register_particle_effect("explode", explode);
    fx.register_particle_effect("sparkle", sparkle);
    fx.register_particle_effect("confetti", confetti);
    fx.register_particle_effect("fireworks", fireworks);

    fx.register_composite_effect("disco", disco);
    fx.register_composite_effect("radial", radial);

    let config = default_options();
    for name in config.referenced_names() {
        let defaults = config.request_for(name);
        fx.set_effect_defaults(name, defaults);
    }
}

// ========== 动画类 ==========

/// 上下浮动
fn hover(scene: &mut Scene, subject: ViewId, opts: &EffectOptions, anim: &mut Animator) {
    let Some(vs) = scene.style(subject) else {
        return;
    };
    let dt = opts.duration / 4.0;
    let dy = 6.0 * opts.scale;
    let y = vs.y;

    anim.then(vec![(StyleProp::Y, y - dy)], dt, EasingFunction::EaseOut)
        .then(vec![(StyleProp::Y, y)], dt, EasingFunction::EaseIn)
        .then(vec![(StyleProp::Y, y + dy)], dt, EasingFunction::EaseOut)
        .then(vec![(StyleProp::Y, y)], dt, EasingFunction::EaseIn);
}

/// 抖动：幅度逐步衰减的随机方向位移
fn shake(scene: &mut Scene, subject: ViewId, opts: &EffectOptions, anim: &mut Animator) {
    let Some(vs) = scene.style_mut(subject) else {
        return;
    };
    let dt = opts.duration / 16.0;
    let m = 1.75 * opts.scale;
    let (x, y, s) = (vs.x, vs.y, vs.scale);
    let (ax, ay) = (vs.anchor_x, vs.anchor_y);
    // 围着中心抖，结束时恢复原锚点
    vs.anchor_x = vs.width / 2.0;
    vs.anchor_y = vs.height / 2.0;

    anim.then(
        vec![(StyleProp::Scale, s * (1.0 + 0.05 * m))],
        dt,
        EasingFunction::EaseIn,
    );
    for k in (1..=14).rev() {
        let kf = k as f32;
        let angle = TAU * fastrand::f32();
        let swell = if k >= 5 { 0.004 * kf - 0.01 } else { 0.002 * kf };
        anim.then(
            vec![
                (StyleProp::X, x + kf * m * angle.cos()),
                (StyleProp::Y, y + kf * m * angle.sin()),
                (StyleProp::Scale, s * (1.0 + swell * m)),
            ],
            dt,
            EasingFunction::EaseInOut,
        );
    }
    anim.then(
        vec![
            (StyleProp::X, x),
            (StyleProp::Y, y),
            (StyleProp::AnchorX, ax),
            (StyleProp::AnchorY, ay),
            (StyleProp::Scale, s),
        ],
        dt,
        EasingFunction::EaseIn,
    );
}

/// 自转一周
fn spin(scene: &mut Scene, subject: ViewId, opts: &EffectOptions, anim: &mut Animator) {
    let Some(vs) = scene.style(subject) else {
        return;
    };
    let dr = TAU * opts.scale;

    anim.then(
        vec![(StyleProp::R, vs.r + dr)],
        opts.duration,
        EasingFunction::Linear,
    );
}

/// 压扁-拉伸
fn squish(scene: &mut Scene, subject: ViewId, opts: &EffectOptions, anim: &mut Animator) {
    let Some(vs) = scene.style(subject) else {
        return;
    };
    let dt = opts.duration / 4.0;
    let (sx, sy) = (vs.scale_x, vs.scale_y);
    let dsx = sx * 0.1 * opts.scale;
    let dsy = sy * 0.1 * opts.scale;

    anim.then(
        vec![(StyleProp::ScaleX, sx - dsx), (StyleProp::ScaleY, sy + dsy)],
        dt,
        EasingFunction::EaseOut,
    )
    .then(
        vec![(StyleProp::ScaleX, sx), (StyleProp::ScaleY, sy)],
        dt,
        EasingFunction::EaseIn,
    )
    .then(
        vec![(StyleProp::ScaleX, sx + dsx), (StyleProp::ScaleY, sy - dsy)],
        dt,
        EasingFunction::EaseOut,
    )
    .then(
        vec![(StyleProp::ScaleX, sx), (StyleProp::ScaleY, sy)],
        dt,
        EasingFunction::EaseIn,
    );
}

/// 左右摇摆
fn sway(scene: &mut Scene, subject: ViewId, opts: &EffectOptions, anim: &mut Animator) {
    let Some(vs) = scene.style(subject) else {
        return;
    };
    let dt = opts.duration / 4.0;
    let dx = 6.0 * opts.scale;
    let x = vs.x;

    anim.then(vec![(StyleProp::X, x - dx)], dt, EasingFunction::EaseOut)
        .then(vec![(StyleProp::X, x)], dt, EasingFunction::EaseIn)
        .then(vec![(StyleProp::X, x + dx)], dt, EasingFunction::EaseOut)
        .then(vec![(StyleProp::X, x)], dt, EasingFunction::EaseIn);
}

// ========== 粒子类 ==========

/// 爆炸：16 块碎片极坐标外抛，减速、减缩、自转
fn explode(scene: &mut Scene, subject: ViewId, opts: &EffectOptions, engine: &mut EffectEngine) {
    let Some(vs) = scene.style(subject) else {
        return;
    };
    let count = 16;
    let size = 50.0;
    let ttl = opts.duration;
    let stop = -1000.0 / ttl;
    let x = (vs.width - size) / 2.0;
    let y = (vs.height - size) / 2.0;
    let composite = blend_mode(opts);

    let mut data = engine.particles.obtain_particle_array(count);
    for p in &mut data {
        p.polar = true;
        p.ox = x + roll(-5.0, 5.0);
        p.oy = y + roll(-5.0, 5.0);
        p.radius = roll(-5.0, 5.0);
        p.dradius = roll(0.0, 400.0);
        p.ddradius = stop * p.dradius;
        p.theta = TAU * fastrand::f32();
        p.r = TAU * fastrand::f32();
        p.dr = roll(-4.0, 4.0);
        p.ddr = stop * p.dr;
        p.anchor_x = size / 2.0;
        p.anchor_y = size / 2.0;
        p.width = size;
        p.height = size;
        p.scale = roll(0.25, 2.5);
        p.dscale = stop * p.scale;
        p.ttl = ttl;
        p.image = choose(&opts.images);
        p.composite_operation = composite;
    }
    engine.particles.emit_particles(data);
}

/// 闪光：围绕主体错峰冒出、上飘、淡出的光点
fn sparkle(scene: &mut Scene, subject: ViewId, opts: &EffectOptions, engine: &mut EffectEngine) {
    let Some(vs) = scene.style(subject) else {
        return;
    };
    let count = 12;
    let ttl = opts.duration;
    let stop = -1000.0 / ttl;
    let size = (vs.width.max(vs.height) / 5.0).max(8.0);
    let composite = blend_mode(opts);

    let mut data = engine.particles.obtain_particle_array(count);
    for (i, p) in data.iter_mut().enumerate() {
        p.x = roll(0.0, vs.width.max(1.0)) - size / 2.0;
        p.y = roll(0.0, vs.height.max(1.0)) - size / 2.0;
        p.dx = roll(-8.0, 8.0);
        p.dy = roll(-30.0, -10.0) * opts.scale;
        p.r = TAU * fastrand::f32();
        p.dr = roll(-2.0, 2.0);
        p.anchor_x = size / 2.0;
        p.anchor_y = size / 2.0;
        p.width = size;
        p.height = size;
        p.scale = roll(0.3, 1.0);
        p.opacity = 1.0;
        p.dopacity = stop;
        // 错峰：前一半时长内陆续点亮
        p.delay = ttl * 0.5 * (i as f32) / (count as f32);
        p.ttl = ttl - p.delay;
        p.image = choose(&opts.images);
        p.composite_operation = composite;
    }
    engine.particles.emit_particles(data);
}

/// 彩带：从主体上沿撒下，重力下落、旋转、横向漂移
fn confetti(scene: &mut Scene, subject: ViewId, opts: &EffectOptions, engine: &mut EffectEngine) {
    let Some(vs) = scene.style(subject) else {
        return;
    };
    let count = 24;
    let ttl = opts.duration;
    let stop = -1000.0 / ttl;
    let composite = blend_mode(opts);

    let mut data = engine.particles.obtain_particle_array(count);
    for p in &mut data {
        let size = roll(4.0, 10.0) * opts.scale;
        p.x = roll(0.0, vs.width.max(1.0));
        p.y = roll(-vs.height.max(1.0) * 0.5, 0.0);
        p.dx = roll(-60.0, 60.0);
        p.dy = roll(60.0, 140.0);
        p.ddy = 80.0;
        p.r = TAU * fastrand::f32();
        p.dr = roll(-6.0, 6.0);
        p.anchor_x = size / 2.0;
        p.anchor_y = size / 2.0;
        p.width = size;
        p.height = size;
        p.dopacity = stop;
        p.ttl = ttl;
        p.image = choose(&opts.images);
        p.composite_operation = composite;
    }
    engine.particles.emit_particles(data);
}

/// 烟花：双环均匀角度爆发，外环先行、内环延迟跟进
fn fireworks(scene: &mut Scene, subject: ViewId, opts: &EffectOptions, engine: &mut EffectEngine) {
    let Some(vs) = scene.style(subject) else {
        return;
    };
    let count = 32;
    let ttl = opts.duration;
    let stop = -1000.0 / ttl;
    let composite = blend_mode(opts);

    let mut data = engine.particles.obtain_particle_array(count);
    for (i, p) in data.iter_mut().enumerate() {
        let outer = i % 2 == 0;
        p.polar = true;
        p.ox = vs.width / 2.0 + roll(-3.0, 3.0);
        p.oy = vs.height / 2.0 + roll(-3.0, 3.0);
        p.theta = TAU * (i as f32) / (count as f32) + roll(-0.1, 0.1);
        let burst_speed = if outer {
            roll(220.0, 320.0)
        } else {
            roll(90.0, 160.0)
        };
        p.dradius = burst_speed * opts.scale;
        p.ddradius = stop * p.dradius;
        p.dtheta = roll(-0.2, 0.2);
        p.anchor_x = 8.0;
        p.anchor_y = 8.0;
        p.width = 16.0;
        p.height = 16.0;
        p.scale = roll(0.5, 1.2);
        p.dscale = stop * p.scale;
        p.dopacity = stop * 0.8;
        p.delay = if outer { 0.0 } else { ttl * 0.15 };
        p.ttl = ttl - p.delay;
        p.image = choose(&opts.images);
        p.composite_operation = composite;
    }
    engine.particles.emit_particles(data);
}

// ========== 合成类 ==========

/// 迪斯科：压暗底图，斜向扫过一片错峰绽放的彩灯，裁回主体形状
fn disco(scene: &mut Scene, subject: ViewId, opts: &EffectOptions, engine: &mut EffectEngine) {
    let Some(vs) = scene.style(subject).cloned() else {
        return;
    };
    let ttl = opts.duration;
    let stop = -1000.0 / ttl;
    let subject_image = scene.image(subject).map(str::to_string);
    let has_image = subject_image.is_some();

    // 灯的数量与排布：中间行最宽的菱形点阵
    let rows = 7.0_f32;
    let cols = rows;
    let min_per_row = 6.0_f32;
    let growth = 2.0_f32;
    let mut count = 3usize;
    let mut r = 0.0;
    while r < rows {
        let per_row = if r < rows / 2.0 {
            min_per_row + r * growth
        } else {
            min_per_row + (rows - 1.0 - r) * growth
        };
        count += per_row as usize;
        r += 1.0;
    }

    // 引擎整体淡入淡出
    if let Some(es) = scene.style_mut(engine.view()) {
        es.composite_operation = if has_image {
            CompositeOperation::SourceOver
        } else {
            CompositeOperation::Lighter
        };
        es.opacity = 0.0;
    }
    engine
        .anim
        .now(
            vec![(StyleProp::Opacity, 1.0)],
            ttl / 4.0,
            EasingFunction::EaseOut,
        )
        .wait(ttl / 2.0)
        .then(
            vec![(StyleProp::Opacity, 0.0)],
            ttl / 4.0,
            EasingFunction::EaseIn,
        );

    let mut data = engine.particles.obtain_particle_array(count);

    // 底图画进画布
    if let Some(image) = &subject_image {
        let base = &mut data[count - 1];
        base.width = vs.width;
        base.height = vs.height;
        base.composite_operation = CompositeOperation::SourceOver;
        base.ttl = ttl;
        base.image = Some(image.clone());
    }

    // 压暗底图，黑暗中蹦迪
    let darker = &mut data[count - 2];
    darker.width = vs.width;
    darker.height = vs.height;
    darker.composite_operation = CompositeOperation::SourceOver;
    darker.opacity = 0.5;
    darker.ttl = ttl;
    darker.image = opts.images.iter().find(|u| u.contains("darker")).cloned();

    // 彩灯
    let lights: Vec<String> = opts
        .images
        .iter()
        .filter(|u| u.contains("light"))
        .cloned()
        .collect();
    let size = vs.width / 10.0;
    let mut row = 0.0_f32;
    let mut col = 0.0_f32;
    let mut lights_per_row = min_per_row;
    for i in (1..=count - 3).rev() {
        if col >= lights_per_row {
            col = 0.0;
            row += 1.0;
            if row < rows / 2.0 {
                lights_per_row += growth;
            } else {
                lights_per_row -= growth;
            }
        }

        let light = &mut data[i];
        if row < rows / 2.0 {
            light.x = col * (vs.width / cols) - size / 2.0;
            light.y = 2.0 * row * (vs.height / rows) - col * (vs.height / cols) - size / 2.0;
        } else {
            let new_row = row - (rows / 2.0).floor();
            light.x = (2.0 * new_row - 1.0) * (vs.width / rows) + col * (vs.width / cols)
                - size / 2.0;
            light.y = vs.height - col * (vs.height / cols) - size / 2.0;
        }

        light.x += vs.width / 4.0;
        light.y -= vs.height / 4.0;
        light.dx = vs.width * stop;
        light.dy = -vs.height * stop;
        light.anchor_x = size / 2.0;
        light.anchor_y = size / 2.0;
        light.width = size;
        light.height = size;
        light.scale = 0.0;
        light.dscale = -3.0 * stop;
        light.ddscale = 2.0 * stop * light.dscale;
        light.opacity = 0.5;
        light.composite_operation = CompositeOperation::Lighter;
        light.delay = ttl * (row / rows) * (col / cols);
        light.ttl = ttl - light.delay;
        light.image = choose(&lights);

        col += 1.0;
    }

    // 裁出主体形状
    if let Some(image) = &subject_image {
        let clip = &mut data[0];
        clip.width = vs.width;
        clip.height = vs.height;
        clip.composite_operation = CompositeOperation::DestinationAtop;
        clip.ttl = ttl;
        clip.image = Some(image.clone());
    }

    engine.particles.emit_particles(data);
}

/// 径向光辉：整组贴图同心旋转，外层快内层慢，常驻直到外部停止
fn radial(scene: &mut Scene, subject: ViewId, opts: &EffectOptions, engine: &mut EffectEngine) {
    let Some(vs) = scene.style(subject).cloned() else {
        return;
    };
    // 贴图集合为空时不产生任何粒子，调用自然被拒绝
    let count = opts.images.len();
    let width = vs.width;
    let height = width;

    let mut data = engine.particles.obtain_particle_array(count);
    for (i, p) in data.iter_mut().enumerate() {
        p.image = Some(opts.images[i].clone());
        p.x = (vs.width - width) / 2.0;
        p.y = (vs.height - height) / 2.0;
        p.r = TAU * fastrand::f32();
        p.dr = 0.32 * 0.67_f32.powi(i as i32);
        p.anchor_x = width / 2.0;
        p.anchor_y = height / 2.0;
        p.width = width;
        p.height = height;
        p.scale = 4.0 * opts.scale;
        p.ttl = f32::INFINITY;
        p.composite_operation = CompositeOperation::Lighter;
    }
    engine.particles.emit_particles(data);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manager::EffectHandle;
    use crate::options::EffectRequest;
    use crate::registry::EffectKind;
    use crate::style::Style;

    fn fixture() -> (Effects, Scene, ViewId) {
        fastrand::seed(7);
        let fx = Effects::standard();
        let mut scene = Scene::new();
        let subject = scene.create_view(Style::with_frame(100.0, 100.0, 40.0, 40.0));
        (fx, scene, subject)
    }

    #[test]
    fn test_install_registers_catalog() {
        let fx = Effects::standard();
        let registry = fx.registry();
        assert_eq!(registry.len(), 11);

        for name in ["hover", "shake", "spin", "squish", "sway"] {
            assert_eq!(registry.kind_of(name), Some(EffectKind::Animation));
        }
        for name in ["explode", "sparkle", "confetti", "fireworks"] {
            assert_eq!(registry.kind_of(name), Some(EffectKind::Particle));
        }
        for name in ["disco", "radial"] {
            assert_eq!(registry.kind_of(name), Some(EffectKind::Composite));
        }
    }

    #[test]
    fn test_default_option_table() {
        let fx = Effects::standard();
        let registry = fx.registry();

        let disco = registry.resolve_options("disco", &EffectRequest::new());
        assert_eq!(disco.duration, 2500.0);
        assert!(disco.looping);

        let explode = registry.resolve_options("explode", &EffectRequest::new());
        assert!(explode.blend);
        assert!(!explode.looping);
        assert_eq!(explode.duration, 1000.0);

        let radial = registry.resolve_options("radial", &EffectRequest::new());
        assert!(radial.follow);
        assert!(radial.behind);

        let sparkle = registry.resolve_options("sparkle", &EffectRequest::new());
        assert!(sparkle.follow);
        assert!(sparkle.looping);
    }

    #[test]
    fn test_explode_emits_sixteen() {
        let (mut fx, mut scene, subject) = fixture();
        let handle = fx
            .invoke(&mut scene, "explode", subject, EffectRequest::new())
            .expect("explode 应当启动");

        let engine = fx.engine(handle).unwrap();
        assert_eq!(engine.particles.active_count(), 16);
        for p in engine.particles.active() {
            assert!(p.polar);
            assert!(p.dradius >= 0.0 && p.dradius < 400.0);
            assert!(p.scale >= 0.25 && p.scale < 2.5);
            assert_eq!(p.ttl, 1000.0);
            // explode 默认 blend
            assert_eq!(p.composite_operation, CompositeOperation::Lighter);
        }
    }

    #[test]
    fn test_explode_on_missing_subject_declines() {
        let (mut fx, mut scene, subject) = fixture();
        scene.remove_view(subject);
        assert_eq!(
            fx.invoke(&mut scene, "explode", subject, EffectRequest::new()),
            None
        );
    }

    #[test]
    fn test_sparkle_staggers_delays() {
        let (mut fx, mut scene, subject) = fixture();
        let handle = fx
            .invoke(&mut scene, "sparkle", subject, EffectRequest::new())
            .unwrap();

        let engine = fx.engine(handle).unwrap();
        assert_eq!(engine.particles.active_count(), 12);
        let delays: Vec<f32> = engine.particles.active().iter().map(|p| p.delay).collect();
        assert_eq!(delays[0], 0.0);
        assert!(delays.windows(2).all(|w| w[0] < w[1]));
        // 总时长不变：delay + ttl == duration
        for p in engine.particles.active() {
            assert!((p.delay + p.ttl - 1000.0).abs() < 0.001);
        }
    }

    #[test]
    fn test_confetti_falls() {
        let (mut fx, mut scene, subject) = fixture();
        let handle = fx
            .invoke(&mut scene, "confetti", subject, EffectRequest::new())
            .unwrap();

        let engine = fx.engine(handle).unwrap();
        assert_eq!(engine.particles.active_count(), 24);
        for p in engine.particles.active() {
            assert!(p.dy > 0.0);
            assert!(p.ddy > 0.0);
        }
    }

    #[test]
    fn test_fireworks_rings() {
        let (mut fx, mut scene, subject) = fixture();
        let handle = fx
            .invoke(&mut scene, "fireworks", subject, EffectRequest::new())
            .unwrap();

        let engine = fx.engine(handle).unwrap();
        assert_eq!(engine.particles.active_count(), 32);
        let delayed = engine
            .particles
            .active()
            .iter()
            .filter(|p| p.delay > 0.0)
            .count();
        // 内环延迟跟进
        assert_eq!(delayed, 16);
    }

    #[test]
    fn test_disco_light_grid() {
        let (mut fx, mut scene, subject) = fixture();
        fx.set_image_library(crate::images::ImageLibrary::from_paths([
            "addons/effects/images/disco/darker.png",
            "addons/effects/images/disco/light_red.png",
            "addons/effects/images/disco/light_blue.png",
        ]));

        let handle = fx
            .invoke(&mut scene, "disco", subject, EffectRequest::new())
            .unwrap();
        let engine = fx.engine(handle).unwrap();
        // 3 + (6+8+10+12+10+8+6) = 63
        assert_eq!(engine.particles.active_count(), 63);

        // 压暗层找到了 darker 贴图
        let darker = engine
            .particles
            .active()
            .iter()
            .find(|p| p.image.as_deref() == Some("addons/effects/images/disco/darker.png"));
        assert!(darker.is_some());

        // 灯光只用 light 贴图，加亮混合
        let lights = engine
            .particles
            .active()
            .iter()
            .filter(|p| p.composite_operation == CompositeOperation::Lighter)
            .count();
        assert_eq!(lights, 60);
    }

    #[test]
    fn test_disco_uses_subject_image_for_base_and_clip() {
        let (mut fx, mut scene, subject) = fixture();
        scene.set_image(subject, "resources/images/hero.png");

        let handle = fx
            .invoke(&mut scene, "disco", subject, EffectRequest::new())
            .unwrap();
        let engine = fx.engine(handle).unwrap();

        let clip = engine
            .particles
            .active()
            .iter()
            .find(|p| p.composite_operation == CompositeOperation::DestinationAtop)
            .expect("有底图时应有裁剪层");
        assert_eq!(clip.image.as_deref(), Some("resources/images/hero.png"));
    }

    #[test]
    fn test_radial_spins_layers_at_decreasing_rates() {
        let (mut fx, mut scene, subject) = fixture();
        let images = vec![
            "resources/images/radial/ray_0.png".to_string(),
            "resources/images/radial/ray_1.png".to_string(),
            "resources/images/radial/ray_2.png".to_string(),
        ];

        let handle = fx
            .invoke(
                &mut scene,
                "radial",
                subject,
                EffectRequest::new().images(images),
            )
            .unwrap();
        assert!(matches!(handle, EffectHandle::Composite(_)));

        let engine = fx.engine(handle).unwrap();
        assert_eq!(engine.particles.active_count(), 3);
        let rates: Vec<f32> = engine.particles.active().iter().map(|p| p.dr).collect();
        assert!(rates.windows(2).all(|w| w[0] > w[1]));
        assert!(engine.particles.active().iter().all(|p| p.ttl.is_infinite()));
        // 默认垫在主体之后
        let subject_z = scene.style(subject).unwrap().z_index;
        assert_eq!(scene.style(engine.view()).unwrap().z_index, subject_z - 1);
    }

    #[test]
    fn test_radial_with_no_images_declines() {
        let (mut fx, mut scene, subject) = fixture();
        assert_eq!(
            fx.invoke(&mut scene, "radial", subject, EffectRequest::new()),
            None
        );
    }

    #[test]
    fn test_shake_restores_baseline() {
        let (mut fx, mut scene, subject) = fixture();
        let before = scene.style(subject).unwrap().clone();

        fx.invoke(&mut scene, "shake", subject, EffectRequest::new());
        // 播完：16 步 × 62.5ms
        for _ in 0..80 {
            fx.tick(&mut scene, 16.0);
        }

        let after = scene.style(subject).unwrap();
        assert!((after.x - before.x).abs() < 0.001);
        assert!((after.y - before.y).abs() < 0.001);
        assert!((after.scale - before.scale).abs() < 0.001);
        assert_eq!(after.anchor_x, before.anchor_x);
        assert_eq!(fx.active_animation_count(), 0);
    }

    #[test]
    fn test_spin_advances_rotation() {
        let (mut fx, mut scene, subject) = fixture();
        fx.invoke(&mut scene, "spin", subject, EffectRequest::new().looping(false));

        for _ in 0..70 {
            fx.tick(&mut scene, 16.0);
        }
        let r = scene.style(subject).unwrap().r;
        assert!((r - TAU).abs() < 0.001);
    }
}
