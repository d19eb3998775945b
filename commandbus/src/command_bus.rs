use crate::{command::Command, context::AppContext, error::AppError};
use async_trait::async_trait;

/// 命令总线（Command Bus）
///
/// - 负责根据命令的具体类型路由到对应的处理器；
/// - 执行前后经过已安装的中间件链；
/// - 该 trait 带有泛型方法，通常以具体实现类型注入使用。
#[async_trait]
pub trait CommandBus: Send + Sync {
    /// 执行命令，处理器可原地修改 `cmd`
    ///
    /// - `ctx`：应用上下文（链路追踪、取消信号、幂等键等）
    /// - `cmd`：具体命令实例
    async fn execute<C>(&self, ctx: &AppContext, cmd: &mut C) -> Result<(), AppError>
    where
        C: Command;

    /// 按值分发命令，成功后返回（可能已被修改的）命令
    async fn dispatch<C>(&self, ctx: &AppContext, mut cmd: C) -> Result<C, AppError>
    where
        C: Command,
    {
        self.execute(ctx, &mut cmd).await?;
        Ok(cmd)
    }
}
