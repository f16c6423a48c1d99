//! fx-runtime 无头演示宿主
//!
//! 搭一个最小场景，触发指定效果，以固定步长驱动帧循环，
//! 通过 tracing 输出每帧摘要。不依赖任何渲染设备。

use clap::Parser;
use fx_runtime::{
    analyze_effects, EffectRequest, Effects, EngineKind, ImageLibrary, Scene, Style,
};

/// 命令行参数
#[derive(Parser, Debug)]
#[command(name = "fx-host", about = "以固定步长驱动效果系统的无头演示")]
struct Args {
    /// 要触发的效果名
    #[arg(short, long, default_value = "explode")]
    effect: String,

    /// 模拟帧数
    #[arg(short, long, default_value_t = 180)]
    frames: u32,

    /// 每帧步长（毫秒）
    #[arg(long, default_value_t = 16.0)]
    dt: f32,

    /// 随机种子
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

/// 演示用的资源清单（真实项目由资源加载器提供）
fn demo_image_library() -> ImageLibrary {
    ImageLibrary::from_paths([
        "addons/effects/images/explode/flame_01.png",
        "addons/effects/images/explode/flame_02.png",
        "addons/effects/images/sparkle/glint.png",
        "addons/effects/images/confetti/ribbon.png",
        "addons/effects/images/fireworks/spark.png",
        "addons/effects/images/disco/darker.png",
        "addons/effects/images/disco/light_red.png",
        "addons/effects/images/disco/light_blue.png",
        "addons/effects/images/disco/light_green.png",
        "addons/effects/images/radial/ray_0.png",
        "addons/effects/images/radial/ray_1.png",
    ])
}

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let args = Args::parse();
    fastrand::seed(args.seed);

    // 最小场景：舞台容器 + 一个主体
    let mut scene = Scene::new();
    let stage = scene.create_view(Style::with_frame(0.0, 0.0, 960.0, 640.0));
    let hero = scene.create_view(Style::with_frame(460.0, 300.0, 40.0, 40.0));
    scene.add_subview(stage, hero);

    let mut fx = Effects::standard();
    fx.set_image_library(demo_image_library());

    // 启动前静态诊断
    let report = analyze_effects(&fx);
    for diag in &report.diagnostics {
        tracing::warn!("{diag}");
    }

    let Some(handle) = fx.invoke(&mut scene, &args.effect, hero, EffectRequest::new()) else {
        tracing::error!(effect = %args.effect, "效果拒绝执行");
        return;
    };
    tracing::info!(effect = %args.effect, ?handle, "效果已启动");

    for frame in 0..args.frames {
        // 让主体转圈，顺便检验跟随效果
        let t = frame as f32 * args.dt / 1000.0;
        if let Some(s) = scene.style_mut(hero) {
            s.x = 460.0 + 120.0 * t.cos();
            s.y = 300.0 + 120.0 * t.sin();
        }

        fx.tick(&mut scene, args.dt);

        if frame == args.frames / 3 {
            tracing::info!(frame, "暂停主体上的全部效果");
            fx.pause(&mut scene, Some(hero), None);
        }
        if frame == args.frames / 2 {
            tracing::info!(frame, "恢复");
            fx.resume(&mut scene, Some(hero), None);
        }

        if frame % 30 == 0 {
            tracing::info!(
                frame,
                anims = fx.active_animation_count(),
                particle_engines = fx.active_engine_count(EngineKind::Particle),
                composite_engines = fx.active_engine_count(EngineKind::Composite),
                "帧摘要"
            );
        }
    }

    fx.stop(&mut scene, None, None);
    fx.tick(&mut scene, args.dt);
    tracing::info!(
        particle_pool = fx.pooled_engine_count(EngineKind::Particle),
        composite_pool = fx.pooled_engine_count(EngineKind::Composite),
        "演示结束"
    );
}
