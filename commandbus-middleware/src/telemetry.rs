//! 追踪与指标中间件（Telemetry）
//!
//! 每次执行开启一个 `command` span（`otel.name` 为小写命令名），
//! 记录一次执行；失败时在返回错误之前标记 span 并记录一次错误。
use crate::metrics::{Measure, MetricsRecorder};
use async_trait::async_trait;
use commandbus::{AnyCommand, AppContext, AppError, Middleware, Next};
use std::sync::Arc;
use tracing::Instrument;
use tracing::field;

/// 向内层传递的上下文键：当前命令名
pub const COMMAND_NAME_KEY: &str = "command.name";

pub struct Telemetry {
    metrics: Arc<dyn MetricsRecorder>,
}

impl Telemetry {
    pub fn new(metrics: Arc<dyn MetricsRecorder>) -> Self {
        Self { metrics }
    }
}

#[async_trait]
impl Middleware for Telemetry {
    async fn handle(
        &self,
        ctx: &AppContext,
        cmd: &mut dyn AnyCommand,
        next: Next<'_>,
    ) -> Result<(), AppError> {
        let name = cmd.name();
        let span = tracing::info_span!(
            "command",
            otel.name = %name.to_lowercase(),
            command.name = name,
            otel.status_code = field::Empty,
            error = field::Empty,
        );

        let ctx = ctx.clone().with_value(COMMAND_NAME_KEY, name);
        self.metrics.record(Measure::Executions, name);

        let res = next.run(&ctx, cmd).instrument(span.clone()).await;

        if let Err(err) = &res {
            span.record("otel.status_code", "ERROR");
            span.record("error", field::display(err));
            self.metrics.record(Measure::Errors, name);
        }

        res
    }
}
