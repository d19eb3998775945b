//! 命令执行指标
//!
//! `MetricsRecorder` 是遥测中间件唯一依赖的指标接口；
//! `InMemoryMetrics` 为其进程内实现，由调用方显式构造并注入，不使用全局状态。
use bon::Builder;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// 被记录的度量
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Measure {
    /// 命令执行次数
    Executions,
    /// 命令失败次数
    Errors,
}

/// 指标记录器
pub trait MetricsRecorder: Send + Sync {
    fn record(&self, measure: Measure, command: &'static str);
}

/// 对度量的聚合视图
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MetricView {
    ExecutionCount,
    ErrorCount,
    ExecutionCountByCommand,
    ErrorCountByCommand,
}

impl MetricView {
    pub const ALL: [MetricView; 4] = [
        MetricView::ExecutionCount,
        MetricView::ErrorCount,
        MetricView::ExecutionCountByCommand,
        MetricView::ErrorCountByCommand,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            MetricView::ExecutionCount => "execution_count",
            MetricView::ErrorCount => "error_count",
            MetricView::ExecutionCountByCommand => "execution_count_by_command",
            MetricView::ErrorCountByCommand => "error_count_by_command",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            MetricView::ExecutionCount => "Number of command executions",
            MetricView::ErrorCount => "Number of command errors",
            MetricView::ExecutionCountByCommand => "Number of command executions by command",
            MetricView::ErrorCountByCommand => "Number of command errors by command",
        }
    }

    pub fn measure(&self) -> Measure {
        match self {
            MetricView::ExecutionCount | MetricView::ExecutionCountByCommand => Measure::Executions,
            MetricView::ErrorCount | MetricView::ErrorCountByCommand => Measure::Errors,
        }
    }

    pub fn by_command(&self) -> bool {
        matches!(
            self,
            MetricView::ExecutionCountByCommand | MetricView::ErrorCountByCommand
        )
    }
}

/// 指标配置
#[derive(Builder, Clone, Debug)]
pub struct MetricsConfig {
    /// 需要注册的视图；为空时回落到全部视图
    #[builder(default = MetricView::ALL.to_vec())]
    pub views: Vec<MetricView>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            views: MetricView::ALL.to_vec(),
        }
    }
}

/// 进程内指标注册表
pub struct InMemoryMetrics {
    views: Vec<MetricView>,
    executions: AtomicU64,
    errors: AtomicU64,
    executions_by_command: DashMap<&'static str, AtomicU64>,
    errors_by_command: DashMap<&'static str, AtomicU64>,
}

impl InMemoryMetrics {
    pub fn new(config: MetricsConfig) -> Self {
        let mut views = if config.views.is_empty() {
            MetricView::ALL.to_vec()
        } else {
            config.views
        };

        // 重复注册同一视图没有意义
        let mut seen = Vec::with_capacity(views.len());
        views.retain(|v| {
            if seen.contains(v) {
                false
            } else {
                seen.push(*v);
                true
            }
        });

        Self {
            views,
            executions: AtomicU64::new(0),
            errors: AtomicU64::new(0),
            executions_by_command: DashMap::new(),
            errors_by_command: DashMap::new(),
        }
    }

    pub fn views(&self) -> &[MetricView] {
        &self.views
    }

    pub fn is_registered(&self, view: MetricView) -> bool {
        self.views.contains(&view)
    }

    /// 视图的当前值；按命令聚合的视图返回所有命令之和；未注册返回 `None`
    pub fn count(&self, view: MetricView) -> Option<u64> {
        if !self.is_registered(view) {
            return None;
        }

        if view.by_command() {
            return Some(
                self.per_command(view.measure())
                    .iter()
                    .map(|e| e.value().load(Ordering::Relaxed))
                    .sum(),
            );
        }

        Some(self.total(view.measure()).load(Ordering::Relaxed))
    }

    /// 按命令聚合的视图中某个命令的值；视图未注册或不按命令聚合时返回 `None`
    pub fn count_by_command(&self, view: MetricView, command: &str) -> Option<u64> {
        if !self.is_registered(view) || !view.by_command() {
            return None;
        }

        Some(
            self.per_command(view.measure())
                .get(command)
                .map_or(0, |c| c.load(Ordering::Relaxed)),
        )
    }

    fn total(&self, measure: Measure) -> &AtomicU64 {
        match measure {
            Measure::Executions => &self.executions,
            Measure::Errors => &self.errors,
        }
    }

    fn per_command(&self, measure: Measure) -> &DashMap<&'static str, AtomicU64> {
        match measure {
            Measure::Executions => &self.executions_by_command,
            Measure::Errors => &self.errors_by_command,
        }
    }

    fn tracks_by_command(&self, measure: Measure) -> bool {
        self.views
            .iter()
            .any(|v| v.by_command() && v.measure() == measure)
    }
}

impl Default for InMemoryMetrics {
    fn default() -> Self {
        Self::new(MetricsConfig::default())
    }
}

impl MetricsRecorder for InMemoryMetrics {
    fn record(&self, measure: Measure, command: &'static str) {
        self.total(measure).fetch_add(1, Ordering::Relaxed);

        if self.tracks_by_command(measure) {
            self.per_command(measure)
                .entry(command)
                .or_insert_with(|| AtomicU64::new(0))
                .fetch_add(1, Ordering::Relaxed);
        }
    }
}
