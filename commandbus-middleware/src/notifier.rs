//! 事件通知中间件（EventNotifier）
//!
//! 在命令进入时派发 `<command>.received`，成功执行后派发 `<command>.executed`；
//! 执行失败时只返回错误，不派发 `executed`。
//!
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use commandbus::{AnyCommand, AppContext, AppError, Command, Middleware, Next};
use dashmap::DashMap;
use std::fmt;
use std::sync::Arc;

/// 命令已接收
pub const RECEIVED: &str = "received";
/// 命令已成功执行
pub const EXECUTED: &str = "executed";

/// 命令生命周期事件，借用正在执行的命令
pub struct CommandEvent<'a> {
    phase: &'static str,
    command: &'a dyn AnyCommand,
    occurred_at: DateTime<Utc>,
}

impl<'a> CommandEvent<'a> {
    pub fn new(phase: &'static str, command: &'a dyn AnyCommand) -> Self {
        Self {
            phase,
            command,
            occurred_at: Utc::now(),
        }
    }

    /// 事件类型：`小写命令名.阶段`，如 `createuser.received`
    pub fn event_type(&self) -> String {
        event_type(self.command.name(), self.phase)
    }

    pub fn phase(&self) -> &'static str {
        self.phase
    }

    pub fn data(&self) -> &'a dyn AnyCommand {
        self.command
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }
}

impl fmt::Debug for CommandEvent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandEvent")
            .field("event_type", &self.event_type())
            .field("occurred_at", &self.occurred_at)
            .finish()
    }
}

fn event_type(command: &str, phase: &str) -> String {
    format!("{}.{}", command.to_lowercase(), phase)
}

/// 某个命令类型在指定阶段的事件类型
pub fn event_type_of<C: Command>(phase: &str) -> String {
    event_type(C::NAME, phase)
}

/// 事件派发器：将命令事件交给订阅者
#[async_trait]
pub trait EventDispatcher: Send + Sync {
    async fn dispatch(&self, ctx: &AppContext, event: &CommandEvent<'_>);
}

pub type Listener = Arc<dyn Fn(&AppContext, &CommandEvent<'_>) + Send + Sync>;

/// 简单的内存事件派发器
/// - 按事件类型订阅，同一类型的监听器按注册顺序同步调用
/// - 无订阅者时派发被忽略
#[derive(Default)]
pub struct InMemoryEventDispatcher {
    listeners: DashMap<String, Vec<Listener>>,
}

impl InMemoryEventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on<F>(&self, event_type: impl Into<String>, listener: F)
    where
        F: Fn(&AppContext, &CommandEvent<'_>) + Send + Sync + 'static,
    {
        self.listeners
            .entry(event_type.into())
            .or_default()
            .push(Arc::new(listener));
    }

    pub fn listener_count(&self, event_type: &str) -> usize {
        self.listeners.get(event_type).map_or(0, |l| l.len())
    }
}

#[async_trait]
impl EventDispatcher for InMemoryEventDispatcher {
    async fn dispatch(&self, ctx: &AppContext, event: &CommandEvent<'_>) {
        let event_type = event.event_type();
        // 先克隆出监听器再调用，避免监听器内再次订阅时持有分片锁
        let Some(listeners) = self.listeners.get(&event_type).map(|l| l.clone()) else {
            tracing::trace!(event_type = %event_type, "no listener for command event");
            return;
        };

        for listener in listeners {
            listener(ctx, event);
        }
    }
}

pub struct EventNotifier {
    dispatcher: Arc<dyn EventDispatcher>,
}

impl EventNotifier {
    pub fn new(dispatcher: Arc<dyn EventDispatcher>) -> Self {
        Self { dispatcher }
    }
}

#[async_trait]
impl Middleware for EventNotifier {
    async fn handle(
        &self,
        ctx: &AppContext,
        cmd: &mut dyn AnyCommand,
        next: Next<'_>,
    ) -> Result<(), AppError> {
        self.dispatcher
            .dispatch(ctx, &CommandEvent::new(RECEIVED, &*cmd))
            .await;

        next.run(ctx, cmd).await?;

        self.dispatcher
            .dispatch(ctx, &CommandEvent::new(EXECUTED, &*cmd))
            .await;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use commandbus::{CommandBus, InMemoryCommandBus, handler_fn};
    use serde::Serialize;
    use std::sync::Mutex;

    #[derive(Debug, Serialize, Command)]
    struct CreateUser {
        fail: bool,
    }

    fn recording(
        dispatcher: &InMemoryEventDispatcher,
        log: &Arc<Mutex<Vec<String>>>,
        event_type: String,
    ) {
        let log = log.clone();
        dispatcher.on(event_type, move |_ctx, event| {
            assert!(event.data().is::<CreateUser>());
            log.lock().unwrap().push(event.event_type());
        });
    }

    #[test]
    fn event_type_is_lowercase_name_and_phase() {
        assert_eq!(event_type_of::<CreateUser>(RECEIVED), "createuser.received");
        assert_eq!(event_type_of::<CreateUser>(EXECUTED), "createuser.executed");

        let cmd = CreateUser { fail: false };
        let event = CommandEvent::new(EXECUTED, &cmd);
        assert_eq!(event.event_type(), "createuser.executed");
        assert_eq!(event.phase(), EXECUTED);
        assert!(event.data().downcast_ref::<CreateUser>().is_some());
    }

    #[tokio::test]
    async fn executed_is_only_dispatched_on_success() {
        let dispatcher = Arc::new(InMemoryEventDispatcher::new());
        let log = Arc::new(Mutex::new(Vec::new()));
        recording(&dispatcher, &log, event_type_of::<CreateUser>(RECEIVED));
        recording(&dispatcher, &log, event_type_of::<CreateUser>(EXECUTED));
        assert_eq!(dispatcher.listener_count("createuser.received"), 1);

        let bus = InMemoryCommandBus::new();
        bus.register::<CreateUser, _>(Arc::new(handler_fn(|_ctx, cmd: &mut CreateUser| {
            if cmd.fail {
                return Err(AppError::Validation("command was failed".into()));
            }
            Ok(())
        })))
        .unwrap();
        bus.use_middleware(EventNotifier::new(dispatcher.clone()));

        let ctx = AppContext::default();
        assert!(bus.execute(&ctx, &mut CreateUser { fail: true }).await.is_err());
        assert_eq!(*log.lock().unwrap(), vec!["createuser.received"]);

        log.lock().unwrap().clear();
        bus.execute(&ctx, &mut CreateUser { fail: false })
            .await
            .unwrap();
        assert_eq!(
            *log.lock().unwrap(),
            vec!["createuser.received", "createuser.executed"]
        );
    }
}
