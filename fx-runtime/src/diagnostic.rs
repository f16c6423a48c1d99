//! # 诊断模块
//!
//! 对注册表与贴图配置做静态检查，不依赖场景或帧循环。
//!
//! ## 设计原则
//!
//! - 纯函数 API，可在无 IO 环境下运行
//! - 诊断分级：Error（必须修复）、Warn（建议修复）、Info（信息提示）
//! - 运行期对这些问题一律静默容忍（无致命路径原则），
//!   诊断只是把它们提前暴露给工具链

use crate::manager::Effects;
use crate::options::EffectRequest;
use crate::registry::EffectKind;

/// 诊断级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DiagnosticLevel {
    /// 信息提示
    Info,
    /// 警告（建议修复）
    Warn,
    /// 错误（必须修复）
    Error,
}

impl std::fmt::Display for DiagnosticLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "INFO"),
            Self::Warn => write!(f, "WARN"),
            Self::Error => write!(f, "ERROR"),
        }
    }
}

/// 诊断条目
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// 诊断级别
    pub level: DiagnosticLevel,
    /// 涉及的效果名
    pub effect: String,
    /// 诊断消息
    pub message: String,
}

impl Diagnostic {
    /// 创建错误诊断
    pub fn error(effect: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: DiagnosticLevel::Error,
            effect: effect.into(),
            message: message.into(),
        }
    }

    /// 创建警告诊断
    pub fn warn(effect: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: DiagnosticLevel::Warn,
            effect: effect.into(),
            message: message.into(),
        }
    }

    /// 创建信息诊断
    pub fn info(effect: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: DiagnosticLevel::Info,
            effect: effect.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.level, self.effect, self.message)
    }
}

/// 诊断结果
#[derive(Debug, Clone, Default)]
pub struct DiagnosticResult {
    /// 诊断条目列表
    pub diagnostics: Vec<Diagnostic>,
}

impl DiagnosticResult {
    /// 是否含有错误级条目
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.level == DiagnosticLevel::Error)
    }

    /// 指定级别的条目
    pub fn at_level(&self, level: DiagnosticLevel) -> Vec<&Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.level == level)
            .collect()
    }

    /// 条目总数
    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    /// 是否没有任何条目
    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// 检查管理器的注册表与贴图配置
///
/// 检查项：
/// - 粒子/合成效果按名解析不到任何贴图（Warn；运行期表现为无贴图粒子）
/// - 默认时长解析为非正值（Error；`stop = -1000/ttl` 会发散）
/// - 注册表为空（Info）
pub fn analyze_effects(fx: &Effects) -> DiagnosticResult {
    let mut result = DiagnosticResult::default();
    let registry = fx.registry();

    if registry.is_empty() {
        result
            .diagnostics
            .push(Diagnostic::info("", "注册表为空，没有任何可调用的效果"));
        return result;
    }

    let mut names: Vec<&str> = registry.names().collect();
    names.sort_unstable();

    for name in names {
        let Some(kind) = registry.kind_of(name) else {
            continue;
        };
        let options = registry.resolve_options(name, &EffectRequest::new());

        if options.duration <= 0.0 {
            result.diagnostics.push(Diagnostic::error(
                name,
                format!("默认时长解析为 {}，必须为正", options.duration),
            ));
        }

        if matches!(kind, EffectKind::Particle | EffectKind::Composite)
            && fx.images().get(name).is_empty()
        {
            result
                .diagnostics
                .push(Diagnostic::warn(name, "按名解析不到任何贴图"));
        }
    }

    result
}
