//! # Style 模块
//!
//! 视图的变换与绘制状态。
//!
//! ## 设计原则
//!
//! - 所有状态必须**显式建模**、可序列化
//! - 字段集合即宿主渲染层消费的完整表面，核心不做语义解释

use serde::{Deserialize, Serialize};

/// 画布合成模式
///
/// 宿主渲染层据此决定图层混合方式，核心只负责传递。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CompositeOperation {
    /// 常规覆盖绘制
    #[default]
    SourceOver,
    /// 加亮混合（发光类效果）
    Lighter,
    /// 以已有内容为形状裁剪
    DestinationAtop,
}

/// 视图样式
///
/// 表示一个视图的完整变换与绘制状态。
/// 效果系统对宿主实体的全部读写都经过此结构。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Style {
    /// 横坐标
    pub x: f32,
    /// 纵坐标
    pub y: f32,
    /// 横向偏移（叠加在 x 上，由跟随逻辑镜像）
    pub offset_x: f32,
    /// 纵向偏移
    pub offset_y: f32,
    /// 宽度
    pub width: f32,
    /// 高度
    pub height: f32,
    /// 锚点横坐标（旋转/缩放中心）
    pub anchor_x: f32,
    /// 锚点纵坐标
    pub anchor_y: f32,
    /// 整体缩放
    pub scale: f32,
    /// 横向缩放
    pub scale_x: f32,
    /// 纵向缩放
    pub scale_y: f32,
    /// 旋转角度（弧度）
    pub r: f32,
    /// 绘制层级
    pub z_index: i32,
    /// 透明度 (0.0 - 1.0)
    pub opacity: f32,
    /// 合成模式
    pub composite_operation: CompositeOperation,
    /// 是否可见
    pub visible: bool,
    /// 横向翻转
    pub flip_x: bool,
    /// 纵向翻转
    pub flip_y: bool,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            offset_x: 0.0,
            offset_y: 0.0,
            width: 0.0,
            height: 0.0,
            anchor_x: 0.0,
            anchor_y: 0.0,
            scale: 1.0,
            scale_x: 1.0,
            scale_y: 1.0,
            r: 0.0,
            z_index: 0,
            opacity: 1.0,
            composite_operation: CompositeOperation::SourceOver,
            visible: true,
            flip_x: false,
            flip_y: false,
        }
    }
}

impl Style {
    /// 创建指定位置与尺寸的样式
    pub fn with_frame(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            ..Self::default()
        }
    }

    /// 读取可插值属性的当前值
    pub fn get(&self, prop: StyleProp) -> f32 {
        match prop {
            StyleProp::X => self.x,
            StyleProp::Y => self.y,
            StyleProp::OffsetX => self.offset_x,
            StyleProp::OffsetY => self.offset_y,
            StyleProp::Width => self.width,
            StyleProp::Height => self.height,
            StyleProp::AnchorX => self.anchor_x,
            StyleProp::AnchorY => self.anchor_y,
            StyleProp::Scale => self.scale,
            StyleProp::ScaleX => self.scale_x,
            StyleProp::ScaleY => self.scale_y,
            StyleProp::R => self.r,
            StyleProp::Opacity => self.opacity,
        }
    }

    /// 写入可插值属性
    pub fn set(&mut self, prop: StyleProp, value: f32) {
        match prop {
            StyleProp::X => self.x = value,
            StyleProp::Y => self.y = value,
            StyleProp::OffsetX => self.offset_x = value,
            StyleProp::OffsetY => self.offset_y = value,
            StyleProp::Width => self.width = value,
            StyleProp::Height => self.height = value,
            StyleProp::AnchorX => self.anchor_x = value,
            StyleProp::AnchorY => self.anchor_y = value,
            StyleProp::Scale => self.scale = value,
            StyleProp::ScaleX => self.scale_x = value,
            StyleProp::ScaleY => self.scale_y = value,
            StyleProp::R => self.r = value,
            StyleProp::Opacity => self.opacity = value,
        }
    }
}

/// 可插值的样式属性
///
/// 补间系统通过此枚举定位属性，避免字符串查表。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StyleProp {
    /// 横坐标
    X,
    /// 纵坐标
    Y,
    /// 横向偏移
    OffsetX,
    /// 纵向偏移
    OffsetY,
    /// 宽度
    Width,
    /// 高度
    Height,
    /// 锚点横坐标
    AnchorX,
    /// 锚点纵坐标
    AnchorY,
    /// 整体缩放
    Scale,
    /// 横向缩放
    ScaleX,
    /// 纵向缩放
    ScaleY,
    /// 旋转角度
    R,
    /// 透明度
    Opacity,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_style_default() {
        let s = Style::default();
        assert_eq!(s.x, 0.0);
        assert_eq!(s.scale, 1.0);
        assert_eq!(s.scale_x, 1.0);
        assert_eq!(s.opacity, 1.0);
        assert_eq!(s.composite_operation, CompositeOperation::SourceOver);
        assert!(s.visible);
        assert!(!s.flip_x);
    }

    #[test]
    fn test_style_with_frame() {
        let s = Style::with_frame(10.0, 20.0, 100.0, 50.0);
        assert_eq!(s.x, 10.0);
        assert_eq!(s.y, 20.0);
        assert_eq!(s.width, 100.0);
        assert_eq!(s.height, 50.0);
        // 其余字段保持默认
        assert_eq!(s.opacity, 1.0);
    }

    #[test]
    fn test_style_prop_roundtrip() {
        let mut s = Style::default();
        let props = [
            StyleProp::X,
            StyleProp::Y,
            StyleProp::OffsetX,
            StyleProp::OffsetY,
            StyleProp::Width,
            StyleProp::Height,
            StyleProp::AnchorX,
            StyleProp::AnchorY,
            StyleProp::Scale,
            StyleProp::ScaleX,
            StyleProp::ScaleY,
            StyleProp::R,
            StyleProp::Opacity,
        ];

        for (i, prop) in props.iter().enumerate() {
            s.set(*prop, i as f32 + 0.5);
        }
        for (i, prop) in props.iter().enumerate() {
            assert_eq!(s.get(*prop), i as f32 + 0.5);
        }
    }

    #[test]
    fn test_style_serialization() {
        let mut s = Style::with_frame(1.0, 2.0, 3.0, 4.0);
        s.composite_operation = CompositeOperation::Lighter;
        s.z_index = -2;

        let json = serde_json::to_string(&s).unwrap();
        let loaded: Style = serde_json::from_str(&json).unwrap();
        assert_eq!(s, loaded);
    }
}
