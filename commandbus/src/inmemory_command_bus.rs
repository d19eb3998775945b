use crate::{
    command::{self, Command},
    command_bus::CommandBus,
    command_handler::CommandHandler,
    context::AppContext,
    error::AppError,
    middleware::{Middleware, MiddlewareChain},
    registry::{HandlerFn, HandlerRegistry},
};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;

/// 基于内存的 CommandBus 实现
/// - 通过 TypeId 注册不同 Command 对应的 Handler
/// - 运行时以类型擦除（AnyCommand）方式经过中间件链并调度到处理器
/// - 注册与安装中间件应在启动阶段完成；之后的并发执行只读取快照
#[derive(Default)]
pub struct InMemoryCommandBus {
    registry: HandlerRegistry,
    chain: RwLock<MiddlewareChain>,
}

impl InMemoryCommandBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册命令处理器
    pub fn register<C, H>(&self, handler: Arc<H>) -> Result<(), AppError>
    where
        C: Command,
        H: CommandHandler<C> + 'static,
    {
        self.registry.register::<C, H>(handler)
    }

    /// 命令名称到处理器的映射
    pub fn handlers(&self) -> HashMap<&'static str, HandlerFn> {
        self.registry.handlers()
    }

    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    /// 追加中间件；先追加者位于最外层
    pub fn use_middleware<M: Middleware>(&self, middleware: M) {
        self.use_all([Arc::new(middleware) as Arc<dyn Middleware>]);
    }

    /// 按顺序追加一组中间件
    pub fn use_all<I>(&self, middleware: I)
    where
        I: IntoIterator<Item = Arc<dyn Middleware>>,
    {
        let mut chain = self.chain.write();
        *chain = chain.with(middleware);
        tracing::debug!(layers = chain.len(), "command bus middleware installed");
    }

    pub fn middleware_len(&self) -> usize {
        self.chain.read().len()
    }
}

#[async_trait]
impl CommandBus for InMemoryCommandBus {
    async fn execute<C: Command>(&self, ctx: &AppContext, cmd: &mut C) -> Result<(), AppError> {
        command::validate::<C>()?;

        let Some(handler) = self.registry.lookup(TypeId::of::<C>()) else {
            return Err(AppError::HandlerNotFound(C::NAME));
        };

        let chain = self.chain.read().clone();
        tracing::trace!(command = C::NAME, layers = chain.len(), "dispatching command");

        chain.run(ctx, cmd, &handler).await
    }
}
