//! 命令总线的横切中间件
//!
//! - `logger`：命令成功执行后输出一条结构化日志（命令名 + 参数 JSON）；
//! - `telemetry`：为每次执行开启追踪 span，并向注入的 `MetricsRecorder` 记录执行/错误计数；
//! - `notifier`：执行前后经 `EventDispatcher` 派发 `received` / `executed` 事件。
//!
//! 三者都只依赖进程内接口，可按需组合：
//!
//! ```rust
//! use commandbus::InMemoryCommandBus;
//! use commandbus_middleware::{InMemoryMetrics, Logger, MetricsConfig, Telemetry};
//! use std::sync::Arc;
//!
//! let bus = InMemoryCommandBus::new();
//! let metrics = Arc::new(InMemoryMetrics::new(MetricsConfig::default()));
//! bus.use_middleware(Telemetry::new(metrics.clone()));
//! bus.use_middleware(Logger::default());
//! assert_eq!(bus.middleware_len(), 2);
//! ```
pub mod logger;
pub mod metrics;
pub mod notifier;
pub mod telemetry;

pub use logger::{Logger, LoggerConfig};
pub use metrics::{InMemoryMetrics, Measure, MetricView, MetricsConfig, MetricsRecorder};
pub use notifier::{
    CommandEvent, EXECUTED, EventDispatcher, EventNotifier, InMemoryEventDispatcher, RECEIVED,
};
pub use telemetry::Telemetry;
