use bon::Builder;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};

/// 应用层上下文（Application Context）
///
/// 承载一次命令执行所需的横切信息，例如：
/// - 业务语境：关联追踪 `correlation_id`、因果链 `causation_id`、执行者类型/ID；
/// - 幂等键（`idempotency_key`）：用于在基础设施层实现请求幂等；
/// - 取消与截止时间：总线本身从不检查，由处理器/中间件自行遵守；
/// - 请求级键值（`values`）：中间件可派生新上下文并向内传递。
///
/// 典型用法：
/// ```rust
/// use commandbus::context::AppContext;
///
/// let ctx = AppContext::builder()
///     .correlation_id("cor-123")
///     .actor_type("user")
///     .actor_id("u-1")
///     .idempotency_key("idem-xyz")
///     .build();
///
/// assert_eq!(ctx.correlation_id(), Some("cor-123"));
/// assert!(!ctx.is_cancelled());
/// ```
#[derive(Builder, Clone, Debug, Default)]
pub struct AppContext {
    /// 关联ID
    #[builder(into)]
    correlation_id: Option<String>,
    /// 因果ID
    #[builder(into)]
    causation_id: Option<String>,
    /// 触发命令的主体类型（如用户、系统等）
    #[builder(into)]
    actor_type: Option<String>,
    /// 触发命令的主体ID
    #[builder(into)]
    actor_id: Option<String>,
    /// 幂等键（可选）：为空则由上层或基础设施决定是否参与幂等
    #[builder(into)]
    idempotency_key: Option<String>,
    #[builder(default)]
    cancellation: CancellationToken,
    deadline: Option<Instant>,
    #[builder(default)]
    values: BTreeMap<String, String>,
}

impl AppContext {
    pub fn correlation_id(&self) -> Option<&str> {
        self.correlation_id.as_deref()
    }

    pub fn causation_id(&self) -> Option<&str> {
        self.causation_id.as_deref()
    }

    pub fn actor_type(&self) -> Option<&str> {
        self.actor_type.as_deref()
    }

    pub fn actor_id(&self) -> Option<&str> {
        self.actor_id.as_deref()
    }

    pub fn idempotency_key(&self) -> Option<&str> {
        self.idempotency_key.as_deref()
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// 等待取消信号
    pub fn cancelled(&self) -> WaitForCancellationFuture<'_> {
        self.cancellation.cancelled()
    }

    pub fn cancel(&self) {
        self.cancellation.cancel();
    }

    /// 派生子上下文：子令牌随父令牌一同取消，反之不然
    pub fn child(&self) -> Self {
        Self {
            cancellation: self.cancellation.child_token(),
            ..self.clone()
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn is_expired(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// 距离截止时间的剩余时长；无截止时间返回 `None`，已过期返回零
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|d| d.saturating_duration_since(Instant::now()))
    }

    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn value(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn values(&self) -> &BTreeMap<String, String> {
        &self.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_value_derives_new_context() {
        let base = AppContext::builder().correlation_id("cor-1").build();
        let derived = base.clone().with_value("command.name", "CreateUser");

        assert_eq!(base.value("command.name"), None);
        assert_eq!(derived.value("command.name"), Some("CreateUser"));
        assert_eq!(derived.correlation_id(), Some("cor-1"));
    }

    #[test]
    fn child_is_cancelled_with_parent() {
        let parent = AppContext::default();
        let child = parent.child();

        child.cancel();
        assert!(child.is_cancelled());
        assert!(!parent.is_cancelled());

        let other = parent.child();
        parent.cancel();
        assert!(other.is_cancelled());
    }

    #[test]
    fn deadline_helpers() {
        let ctx = AppContext::default();
        assert!(!ctx.is_expired());
        assert_eq!(ctx.remaining(), None);

        let expired = AppContext::default().with_deadline(Instant::now() - Duration::from_millis(5));
        assert!(expired.is_expired());
        assert_eq!(expired.remaining(), Some(Duration::ZERO));

        let pending = AppContext::default().with_timeout(Duration::from_secs(60));
        assert!(!pending.is_expired());
        assert!(pending.remaining().unwrap() > Duration::from_secs(30));
    }
}
