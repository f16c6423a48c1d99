//! # Pool 模块
//!
//! 可复用的引擎实例分配器。
//!
//! ## 不变量
//!
//! - 任意时刻每个实例恰好处于活跃/空闲两个集合之一
//! - 实例只回收不销毁，预热后按效果分配为零
//! - 活跃集按领取顺序迭代；快照式迭代容忍迭代中途释放
//!   （被释放的 id 不会被访问第二次，也不会破坏迭代）

use crate::engine::{EffectEngine, EngineKind};
use crate::scene::Scene;

/// 池内引擎标识符
///
/// 池下标，随池增长分配，永不失效。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EngineId(usize);

impl EngineId {
    /// 获取内部下标
    pub fn value(&self) -> usize {
        self.0
    }
}

impl std::fmt::Display for EngineId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EngineId({})", self.0)
    }
}

/// 引擎池
#[derive(Debug)]
pub struct EnginePool {
    /// 本池构造的引擎种类
    kind: EngineKind,
    /// 全部实例（下标即 id）
    engines: Vec<EffectEngine>,
    /// 实例是否活跃
    active: Vec<bool>,
    /// 活跃 id，按领取顺序
    order: Vec<EngineId>,
    /// 空闲 id
    free: Vec<EngineId>,
}

impl EnginePool {
    /// 创建指定种类的空池
    pub fn new(kind: EngineKind) -> Self {
        Self {
            kind,
            engines: Vec::new(),
            active: Vec::new(),
            order: Vec::new(),
            free: Vec::new(),
        }
    }

    /// 领取一个实例
    ///
    /// 有空闲实例则复用，否则构造新实例（在场景中创建其常驻视图）。
    pub fn obtain(&mut self, scene: &mut Scene) -> EngineId {
        let id = match self.free.pop() {
            Some(id) => id,
            None => {
                let id = EngineId(self.engines.len());
                self.engines.push(EffectEngine::new(self.kind, scene));
                self.active.push(false);
                id
            }
        };
        self.active[id.0] = true;
        self.order.push(id);
        id
    }

    /// 释放实例回空闲集合
    ///
    /// 已空闲的实例静默忽略。
    pub fn release(&mut self, id: EngineId) {
        if !self.is_active(id) {
            return;
        }
        self.active[id.0] = false;
        self.order.retain(|x| *x != id);
        self.free.push(id);
    }

    /// 实例是否处于活跃集合
    pub fn is_active(&self, id: EngineId) -> bool {
        self.active.get(id.0).copied().unwrap_or(false)
    }

    /// 按领取顺序的活跃 id 快照
    ///
    /// 调用方遍历快照时应以 [`is_active`](Self::is_active) 过滤，
    /// 这样迭代中途的释放既不会二次访问也不会破坏迭代。
    pub fn active_ids(&self) -> Vec<EngineId> {
        self.order.clone()
    }

    /// 按领取顺序访问每个活跃实例
    ///
    /// 只做就地修改；迭代中需要释放实例的调用方应改用
    /// [`active_ids`](Self::active_ids) 快照加
    /// [`is_active`](Self::is_active) 过滤的走法。
    pub fn for_each_active(&mut self, mut f: impl FnMut(&mut EffectEngine)) {
        for id in self.active_ids() {
            if !self.is_active(id) {
                continue;
            }
            if let Some(engine) = self.engines.get_mut(id.0) {
                f(engine);
            }
        }
    }

    /// 访问实例
    pub fn get(&self, id: EngineId) -> Option<&EffectEngine> {
        self.engines.get(id.0)
    }

    /// 可变访问实例
    pub fn get_mut(&mut self, id: EngineId) -> Option<&mut EffectEngine> {
        self.engines.get_mut(id.0)
    }

    /// 活跃实例数量
    pub fn active_count(&self) -> usize {
        self.order.len()
    }

    /// 实例总数（活跃 + 空闲）
    pub fn len(&self) -> usize {
        self.engines.len()
    }

    /// 池是否为空
    pub fn is_empty(&self) -> bool {
        self.engines.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool_and_scene() -> (EnginePool, Scene) {
        (EnginePool::new(EngineKind::Particle), Scene::new())
    }

    /// 活跃/空闲互斥：每个实例恰好属于其中之一
    fn assert_exclusive(pool: &EnginePool) {
        for i in 0..pool.len() {
            let id = EngineId(i);
            let in_order = pool.order.contains(&id);
            let in_free = pool.free.contains(&id);
            assert!(in_order != in_free, "{} 同时或均不属于两个集合", id);
            assert_eq!(pool.is_active(id), in_order);
        }
    }

    #[test]
    fn test_obtain_constructs_then_reuses() {
        let (mut pool, mut scene) = pool_and_scene();

        let a = pool.obtain(&mut scene);
        let b = pool.obtain(&mut scene);
        assert_ne!(a, b);
        assert_eq!(pool.len(), 2);
        assert_exclusive(&pool);

        pool.release(a);
        assert_exclusive(&pool);

        // 复用空闲实例，不新建
        let c = pool.obtain(&mut scene);
        assert_eq!(c, a);
        assert_eq!(pool.len(), 2);
        assert_exclusive(&pool);
    }

    #[test]
    fn test_double_release_is_noop() {
        let (mut pool, mut scene) = pool_and_scene();
        let id = pool.obtain(&mut scene);

        pool.release(id);
        pool.release(id);

        assert_eq!(pool.active_count(), 0);
        assert_eq!(pool.free.len(), 1);
        assert_exclusive(&pool);
    }

    #[test]
    fn test_active_ids_insertion_order() {
        let (mut pool, mut scene) = pool_and_scene();
        let a = pool.obtain(&mut scene);
        let b = pool.obtain(&mut scene);
        let c = pool.obtain(&mut scene);

        assert_eq!(pool.active_ids(), vec![a, b, c]);

        pool.release(b);
        assert_eq!(pool.active_ids(), vec![a, c]);

        // 重新领取排到末尾
        let b2 = pool.obtain(&mut scene);
        assert_eq!(b2, b);
        assert_eq!(pool.active_ids(), vec![a, c, b]);
    }

    #[test]
    fn test_release_during_snapshot_walk() {
        let (mut pool, mut scene) = pool_and_scene();
        let a = pool.obtain(&mut scene);
        let b = pool.obtain(&mut scene);
        let c = pool.obtain(&mut scene);

        let mut visited = Vec::new();
        for id in pool.active_ids() {
            if !pool.is_active(id) {
                continue;
            }
            visited.push(id);
            if id == a {
                // 迭代中途释放后面的实例：不得被访问
                pool.release(c);
            }
            pool.release(id);
        }

        assert_eq!(visited, vec![a, b]);
        assert_eq!(pool.active_count(), 0);
        assert_exclusive(&pool);
    }

    #[test]
    fn test_for_each_active_visits_in_order() {
        let (mut pool, mut scene) = pool_and_scene();
        let a = pool.obtain(&mut scene);
        let b = pool.obtain(&mut scene);
        pool.release(a);

        let mut visited = Vec::new();
        pool.for_each_active(|engine| visited.push(engine.view()));
        let b_view = pool.get(b).unwrap().view();
        assert_eq!(visited, vec![b_view]);
    }

    #[test]
    fn test_engine_kind_propagates() {
        let mut scene = Scene::new();
        let mut pool = EnginePool::new(EngineKind::Composite);
        let id = pool.obtain(&mut scene);
        assert_eq!(pool.get(id).unwrap().kind(), EngineKind::Composite);
    }
}
