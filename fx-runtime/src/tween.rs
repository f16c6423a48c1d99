//! # Tween 模块
//!
//! 数值属性的底层补间原语。
//!
//! ## 执行模型
//!
//! ```text
//! anim.then(目标, 时长, 缓动).wait(毫秒).then(...)   // 排队
//! anim.update(scene, dt)                             // 每帧推进
//! ```
//!
//! 一个 [`Animator`] 绑定单个目标视图，维护一条插值步骤队列：
//! 每步在开始时快照当前属性值作为起点，结束时写入终值。
//! 帧间剩余时间在步骤之间结转，链式片段不会因帧边界漂移。

use std::collections::VecDeque;

use crate::easing::EasingFunction;
use crate::scene::{Scene, ViewId};
use crate::style::StyleProp;

/// 单步的目标属性集合
pub type TweenTargets = Vec<(StyleProp, f32)>;

/// 插值步骤
#[derive(Debug, Clone)]
enum Step {
    /// 在 `duration` 毫秒内插值到目标属性值
    To {
        targets: TweenTargets,
        duration: f32,
        easing: EasingFunction,
    },
    /// 空转等待
    Wait { duration: f32 },
}

impl Step {
    fn duration(&self) -> f32 {
        match self {
            Step::To { duration, .. } => *duration,
            Step::Wait { duration } => *duration,
        }
    }
}

/// 正在执行的步骤
#[derive(Debug, Clone)]
struct Running {
    step: Step,
    /// 步骤开始时快照的起点值（与 To 的 targets 平行）
    from: Vec<f32>,
    /// 本步已经过的时间
    elapsed: f32,
}

/// 补间执行器
///
/// 绑定单个目标视图的插值时间轴。
/// 效果系统用它驱动主体动画（shake 等）和引擎自身的视觉补间
/// （disco 的淡入淡出）以及循环重启计时。
#[derive(Debug)]
pub struct Animator {
    /// 目标视图
    target: ViewId,
    /// 待执行步骤队列
    queue: VecDeque<Step>,
    /// 当前步骤
    current: Option<Running>,
    /// 暂停标志（逻辑暂停，不是调度原语）
    paused: bool,
}

impl Animator {
    /// 创建绑定到目标视图的补间执行器
    pub fn new(target: ViewId) -> Self {
        Self {
            target,
            queue: VecDeque::new(),
            current: None,
            paused: false,
        }
    }

    /// 目标视图
    pub fn target(&self) -> ViewId {
        self.target
    }

    /// 排队一个插值步骤
    pub fn then(
        &mut self,
        targets: TweenTargets,
        duration: f32,
        easing: EasingFunction,
    ) -> &mut Self {
        self.queue.push_back(Step::To {
            targets,
            duration,
            easing,
        });
        self
    }

    /// 中断当前时间轴，立即从这个步骤重新开始
    pub fn now(
        &mut self,
        targets: TweenTargets,
        duration: f32,
        easing: EasingFunction,
    ) -> &mut Self {
        self.clear();
        self.then(targets, duration, easing)
    }

    /// 排队一段空转等待
    pub fn wait(&mut self, duration: f32) -> &mut Self {
        self.queue.push_back(Step::Wait { duration });
        self
    }

    /// 丢弃全部队列与当前步骤（不改动目标属性）
    pub fn clear(&mut self) {
        self.queue.clear();
        self.current = None;
    }

    /// 立即完成：按排队顺序写入每个插值步骤的终值，然后清空
    ///
    /// 终态与自然播完一致（同属性后排目标覆盖先排目标）。
    pub fn commit(&mut self, scene: &mut Scene) {
        if let Some(running) = self.current.take() {
            apply_final(scene, self.target, &running.step);
        }
        while let Some(step) = self.queue.pop_front() {
            apply_final(scene, self.target, &step);
        }
    }

    /// 暂停推进；幂等
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// 恢复推进；幂等，未暂停时为空操作
    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// 是否处于暂停
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// 时间轴是否已空
    pub fn is_idle(&self) -> bool {
        self.current.is_none() && self.queue.is_empty()
    }

    /// 步骤总数（含当前步骤）
    pub(crate) fn step_count(&self) -> usize {
        self.queue.len() + usize::from(self.current.is_some())
    }

    /// 推进时间轴
    ///
    /// # 参数
    /// - `dt`: 流逝时间（毫秒）
    ///
    /// # 返回
    /// - `true`: 时间轴在本次调用中播完（只在播完那一次返回）
    /// - `false`: 仍在进行、处于暂停或早已播完
    pub fn update(&mut self, scene: &mut Scene, dt: f32) -> bool {
        if self.paused {
            return false;
        }

        let mut remaining = dt;
        let mut finished = false;

        loop {
            if self.current.is_none() {
                let Some(step) = self.queue.pop_front() else {
                    break;
                };
                let running = self.start_step(scene, step);
                self.current = Some(running);
            }

            let step_done = {
                let running = self.current.as_mut().expect("current step present");
                running.elapsed += remaining;
                running.elapsed >= running.step.duration()
            };

            if step_done {
                // 本步完成：写入终值，结转剩余时间
                let done = self.current.take().expect("current step present");
                remaining = done.elapsed - done.step.duration();
                apply_final(scene, self.target, &done.step);

                if self.queue.is_empty() {
                    finished = true;
                    break;
                }
                if remaining <= 0.0 {
                    break;
                }
            } else {
                let running = self.current.as_ref().expect("current step present");
                if let Step::To {
                    targets,
                    duration,
                    easing,
                } = &running.step
                {
                    let eased = easing.apply(running.elapsed / *duration);
                    if let Some(style) = scene.style_mut(self.target) {
                        for ((prop, to), from) in targets.iter().zip(running.from.iter()) {
                            style.set(*prop, from + (to - from) * eased);
                        }
                    }
                }
                break;
            }
        }

        finished
    }

    /// 开始一个步骤：快照起点值
    fn start_step(&self, scene: &Scene, step: Step) -> Running {
        let from = match &step {
            Step::To { targets, .. } => {
                let style = scene.style(self.target);
                targets
                    .iter()
                    .map(|(prop, to)| style.map(|s| s.get(*prop)).unwrap_or(*to))
                    .collect()
            }
            Step::Wait { .. } => Vec::new(),
        };
        Running {
            step,
            from,
            elapsed: 0.0,
        }
    }
}

/// 写入一个步骤的终值（等待步骤无终值）
fn apply_final(scene: &mut Scene, target: ViewId, step: &Step) {
    let Step::To { targets, .. } = step else {
        return;
    };
    let Some(style) = scene.style_mut(target) else {
        return;
    };
    for (prop, to) in targets {
        style.set(*prop, *to);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::Style;

    fn scene_with_view(y: f32) -> (Scene, ViewId) {
        let mut scene = Scene::new();
        let id = scene.create_view(Style::with_frame(0.0, y, 10.0, 10.0));
        (scene, id)
    }

    #[test]
    fn test_single_step_linear() {
        let (mut scene, id) = scene_with_view(0.0);
        let mut anim = Animator::new(id);
        anim.then(vec![(StyleProp::Y, 100.0)], 1000.0, EasingFunction::Linear);

        assert!(!anim.update(&mut scene, 500.0));
        assert!((scene.style(id).unwrap().y - 50.0).abs() < 0.001);

        // 播完那一次返回 true，之后不再返回
        assert!(anim.update(&mut scene, 500.0));
        assert_eq!(scene.style(id).unwrap().y, 100.0);
        assert!(!anim.update(&mut scene, 16.0));
        assert!(anim.is_idle());
    }

    #[test]
    fn test_chain_carries_leftover_time() {
        let (mut scene, id) = scene_with_view(0.0);
        let mut anim = Animator::new(id);
        anim.then(vec![(StyleProp::Y, 10.0)], 100.0, EasingFunction::Linear)
            .then(vec![(StyleProp::Y, 20.0)], 100.0, EasingFunction::Linear);

        // 150ms：第一步播完，剩余 50ms 进入第二步
        assert!(!anim.update(&mut scene, 150.0));
        assert!((scene.style(id).unwrap().y - 15.0).abs() < 0.001);

        assert!(anim.update(&mut scene, 50.0));
        assert_eq!(scene.style(id).unwrap().y, 20.0);
    }

    #[test]
    fn test_wait_delays_next_step() {
        let (mut scene, id) = scene_with_view(0.0);
        let mut anim = Animator::new(id);
        anim.wait(200.0)
            .then(vec![(StyleProp::Y, 10.0)], 100.0, EasingFunction::Linear);

        assert!(!anim.update(&mut scene, 100.0));
        assert_eq!(scene.style(id).unwrap().y, 0.0);

        // 等待结束，剩余 50ms 推进插值
        assert!(!anim.update(&mut scene, 150.0));
        assert!((scene.style(id).unwrap().y - 5.0).abs() < 0.001);
    }

    #[test]
    fn test_commit_matches_natural_completion() {
        let (mut scene, id) = scene_with_view(100.0);
        let mut anim = Animator::new(id);
        // hover 形状的时间轴：上-回-下-回
        anim.then(vec![(StyleProp::Y, 94.0)], 250.0, EasingFunction::EaseOut)
            .then(vec![(StyleProp::Y, 100.0)], 250.0, EasingFunction::EaseIn)
            .then(vec![(StyleProp::Y, 106.0)], 250.0, EasingFunction::EaseOut)
            .then(vec![(StyleProp::Y, 100.0)], 250.0, EasingFunction::EaseIn);

        anim.update(&mut scene, 300.0);
        assert_ne!(scene.style(id).unwrap().y, 100.0);

        anim.commit(&mut scene);
        assert_eq!(scene.style(id).unwrap().y, 100.0);
        assert!(anim.is_idle());
    }

    #[test]
    fn test_now_replaces_timeline() {
        let (mut scene, id) = scene_with_view(0.0);
        let mut anim = Animator::new(id);
        anim.then(vec![(StyleProp::Y, 100.0)], 1000.0, EasingFunction::Linear);
        anim.update(&mut scene, 500.0);

        anim.now(vec![(StyleProp::Y, 0.0)], 100.0, EasingFunction::Linear);
        assert!(anim.update(&mut scene, 100.0));
        assert_eq!(scene.style(id).unwrap().y, 0.0);
    }

    #[test]
    fn test_clear_keeps_current_value() {
        let (mut scene, id) = scene_with_view(0.0);
        let mut anim = Animator::new(id);
        anim.then(vec![(StyleProp::Y, 100.0)], 1000.0, EasingFunction::Linear);
        anim.update(&mut scene, 250.0);
        let y = scene.style(id).unwrap().y;

        anim.clear();
        assert!(anim.is_idle());
        assert!(!anim.update(&mut scene, 500.0));
        // clear 不回写属性
        assert_eq!(scene.style(id).unwrap().y, y);
    }

    #[test]
    fn test_pause_resume() {
        let (mut scene, id) = scene_with_view(0.0);
        let mut anim = Animator::new(id);
        anim.then(vec![(StyleProp::Y, 100.0)], 100.0, EasingFunction::Linear);

        anim.pause();
        anim.pause(); // 幂等
        assert!(!anim.update(&mut scene, 1000.0));
        assert_eq!(scene.style(id).unwrap().y, 0.0);

        anim.resume();
        assert!(anim.update(&mut scene, 100.0));
        assert_eq!(scene.style(id).unwrap().y, 100.0);
    }

    #[test]
    fn test_zero_duration_step() {
        let (mut scene, id) = scene_with_view(0.0);
        let mut anim = Animator::new(id);
        anim.then(vec![(StyleProp::Y, 42.0)], 0.0, EasingFunction::Linear);

        assert!(anim.update(&mut scene, 16.0));
        assert_eq!(scene.style(id).unwrap().y, 42.0);
    }

    #[test]
    fn test_missing_view_does_not_crash() {
        let mut scene = Scene::new();
        let id = scene.create_view(Style::default());
        scene.remove_view(id);

        let mut anim = Animator::new(id);
        anim.then(vec![(StyleProp::Y, 10.0)], 100.0, EasingFunction::Linear);
        anim.update(&mut scene, 50.0);
        anim.commit(&mut scene);
    }

    #[test]
    fn test_last_target_wins_on_commit() {
        let (mut scene, id) = scene_with_view(0.0);
        let mut anim = Animator::new(id);
        anim.then(vec![(StyleProp::Y, 50.0)], 100.0, EasingFunction::Linear)
            .then(vec![(StyleProp::Y, 20.0)], 100.0, EasingFunction::Linear);

        anim.commit(&mut scene);
        assert_eq!(scene.style(id).unwrap().y, 20.0);
    }
}
