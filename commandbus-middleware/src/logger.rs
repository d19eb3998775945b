//! 日志中间件（Logger）
//!
//! 命令成功执行后输出一条结构化日志，包含命令名与 JSON 形式的参数；
//! 失败的命令不输出日志，错误原样返回。
use async_trait::async_trait;
use bon::Builder;
use commandbus::{AnyCommand, AppContext, AppError, Middleware, Next};
use tracing::Level;

/// 日志中间件配置
#[derive(Builder, Clone, Copy, Debug)]
pub struct LoggerConfig {
    /// 日志级别
    #[builder(default = Level::INFO)]
    pub level: Level,
    /// 是否输出命令参数
    #[builder(default = true)]
    pub log_params: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            log_params: true,
        }
    }
}

// tracing 的级别须为常量，这里按配置展开到对应的宏
macro_rules! log_at {
    ($level:expr, $($arg:tt)+) => {{
        let level = $level;
        if level == Level::ERROR {
            tracing::error!($($arg)+)
        } else if level == Level::WARN {
            tracing::warn!($($arg)+)
        } else if level == Level::INFO {
            tracing::info!($($arg)+)
        } else if level == Level::DEBUG {
            tracing::debug!($($arg)+)
        } else {
            tracing::trace!($($arg)+)
        }
    }};
}

#[derive(Clone, Copy, Debug, Default)]
pub struct Logger {
    config: LoggerConfig,
}

impl Logger {
    pub fn new(config: LoggerConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Middleware for Logger {
    async fn handle(
        &self,
        ctx: &AppContext,
        cmd: &mut dyn AnyCommand,
        next: Next<'_>,
    ) -> Result<(), AppError> {
        next.run(ctx, cmd).await?;

        let command = cmd.name();
        if self.config.log_params {
            let params = match cmd.to_json() {
                Ok(v) => v.to_string(),
                Err(e) => format!("<unserializable: {e}>"),
            };
            log_at!(self.config.level, command, params = %params, "executing command");
        } else {
            log_at!(self.config.level, command, "executing command");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use commandbus::{Command, CommandBus, InMemoryCommandBus, handler_fn};
    use serde::Serialize;
    use std::io;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Serialize, Command)]
    struct CreateUser {
        name: String,
        fail: bool,
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Captured {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    fn capture() -> (Captured, tracing::subscriber::DefaultGuard) {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(Level::TRACE)
            .finish();
        (captured, tracing::subscriber::set_default(subscriber))
    }

    fn bus_with(logger: Logger) -> InMemoryCommandBus {
        let bus = InMemoryCommandBus::new();
        bus.register::<CreateUser, _>(Arc::new(handler_fn(|_ctx, cmd: &mut CreateUser| {
            if cmd.fail {
                return Err(AppError::Validation("command was failed".into()));
            }
            Ok(())
        })))
        .unwrap();
        bus.use_middleware(logger);
        bus
    }

    #[tokio::test]
    async fn logs_successful_command_with_params() {
        let (captured, _guard) = capture();
        let bus = bus_with(Logger::default());

        let mut cmd = CreateUser {
            name: "alice".into(),
            fail: false,
        };
        bus.execute(&AppContext::default(), &mut cmd).await.unwrap();

        let out = captured.contents();
        let line = out
            .lines()
            .find(|l| l.contains("executing command"))
            .unwrap_or_else(|| panic!("no log line in {out}"));
        assert!(line.contains("INFO"), "{line}");
        assert!(line.contains("CreateUser"), "{line}");
        assert!(line.contains(r#""name":"alice""#), "{line}");
    }

    #[tokio::test]
    async fn failed_command_is_not_logged() {
        let (captured, _guard) = capture();
        let bus = bus_with(Logger::default());

        let mut cmd = CreateUser {
            name: "bob".into(),
            fail: true,
        };
        let err = bus
            .execute(&AppContext::default(), &mut cmd)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
        assert!(!captured.contents().contains("executing command"));
    }

    #[tokio::test]
    async fn honours_level_and_param_switch() {
        let (captured, _guard) = capture();
        let config = LoggerConfig::builder()
            .level(Level::DEBUG)
            .log_params(false)
            .build();
        let bus = bus_with(Logger::new(config));

        let mut cmd = CreateUser {
            name: "carol".into(),
            fail: false,
        };
        bus.execute(&AppContext::default(), &mut cmd).await.unwrap();

        let out = captured.contents();
        let line = out
            .lines()
            .find(|l| l.contains("executing command"))
            .unwrap_or_else(|| panic!("no log line in {out}"));
        assert!(line.contains("DEBUG"), "{line}");
        assert!(!line.contains("carol"), "{line}");
    }
}
