//! # Scene 模块
//!
//! 保留模式的视图存储与层级关系。
//!
//! 核心只依赖这里暴露的窄接口：创建/查询样式、挂接/摘除子视图。
//! 真实渲染由宿主遍历层级完成，本模块不做任何绘制。
//!
//! ## 设计说明
//!
//! - 视图以计数器分配的 [`ViewId`] 标识，保证全局唯一
//! - 无父视图的视图位于隐式根容器下
//! - 对失效 id 的操作一律静默忽略，不会中断帧循环

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::style::Style;

/// 视图唯一标识符
///
/// 由 [`Scene`] 在创建视图时分配，使用内部计数器生成，不会重复。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ViewId(u64);

impl ViewId {
    /// 获取内部 id 值
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ViewId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ViewId({})", self.0)
    }
}

/// 单个视图
#[derive(Debug, Clone)]
struct View {
    /// 样式状态
    style: Style,
    /// 父视图（None 表示位于根容器）
    parent: Option<ViewId>,
    /// 子视图（按挂接顺序）
    children: Vec<ViewId>,
    /// 关联的图片路径（可选，供合成类配方读取）
    image: Option<String>,
}

/// 视图场景
///
/// 宿主创建并持有唯一一份 [`Scene`]，效果系统通过 `&mut Scene`
/// 参数访问它（依赖注入，不存在全局单例）。
#[derive(Debug, Default)]
pub struct Scene {
    /// 视图表
    views: HashMap<ViewId, View>,
    /// 下一个视图 id
    next_id: u64,
}

impl Scene {
    /// 创建空场景
    pub fn new() -> Self {
        Self::default()
    }

    /// 创建视图，返回分配的 id
    ///
    /// 新视图位于根容器下。
    pub fn create_view(&mut self, style: Style) -> ViewId {
        self.next_id += 1;
        let id = ViewId(self.next_id);
        self.views.insert(
            id,
            View {
                style,
                parent: None,
                children: Vec::new(),
                image: None,
            },
        );
        id
    }

    /// 移除视图
    ///
    /// 其子视图回到根容器。对失效 id 静默忽略。
    pub fn remove_view(&mut self, id: ViewId) {
        self.remove_from_superview(id);
        if let Some(view) = self.views.remove(&id) {
            for child in view.children {
                if let Some(c) = self.views.get_mut(&child) {
                    c.parent = None;
                }
            }
        }
    }

    /// 视图是否存在
    pub fn contains(&self, id: ViewId) -> bool {
        self.views.contains_key(&id)
    }

    /// 读取样式
    pub fn style(&self, id: ViewId) -> Option<&Style> {
        self.views.get(&id).map(|v| &v.style)
    }

    /// 可变访问样式
    pub fn style_mut(&mut self, id: ViewId) -> Option<&mut Style> {
        self.views.get_mut(&id).map(|v| &mut v.style)
    }

    /// 读取父视图
    pub fn superview(&self, id: ViewId) -> Option<ViewId> {
        self.views.get(&id).and_then(|v| v.parent)
    }

    /// 读取子视图列表
    pub fn children(&self, id: ViewId) -> &[ViewId] {
        self.views
            .get(&id)
            .map(|v| v.children.as_slice())
            .unwrap_or(&[])
    }

    /// 将 `child` 挂接为 `parent` 的子视图
    ///
    /// 若 `child` 已有父视图则先摘除。自挂接与失效 id 静默忽略。
    pub fn add_subview(&mut self, parent: ViewId, child: ViewId) {
        if parent == child || !self.views.contains_key(&parent) || !self.views.contains_key(&child)
        {
            return;
        }

        self.remove_from_superview(child);

        if let Some(p) = self.views.get_mut(&parent) {
            p.children.push(child);
        }
        if let Some(c) = self.views.get_mut(&child) {
            c.parent = Some(parent);
        }
    }

    /// 把视图从其父视图摘除，回到根容器
    pub fn remove_from_superview(&mut self, id: ViewId) {
        let Some(parent) = self.views.get(&id).and_then(|v| v.parent) else {
            return;
        };

        if let Some(p) = self.views.get_mut(&parent) {
            p.children.retain(|c| *c != id);
        }
        if let Some(v) = self.views.get_mut(&id) {
            v.parent = None;
        }
    }

    /// 设置视图关联的图片路径
    pub fn set_image(&mut self, id: ViewId, path: impl Into<String>) {
        if let Some(v) = self.views.get_mut(&id) {
            v.image = Some(path.into());
        }
    }

    /// 读取视图关联的图片路径
    pub fn image(&self, id: ViewId) -> Option<&str> {
        self.views.get(&id).and_then(|v| v.image.as_deref())
    }

    /// 当前视图总数
    pub fn len(&self) -> usize {
        self.views.len()
    }

    /// 是否没有任何视图
    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }
}
