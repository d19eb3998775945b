//! 中间件（Middleware）与调用链组合
//!
//! 中间件以统一的 `(ctx, cmd, next) -> Result` 形状包裹处理器执行，
//! 可在调用 `next` 前后执行横切逻辑（日志、追踪、事件通知等），
//! 也可自行决定吞掉、包装或透传错误。
//!
//! 组合顺序在构建调用链时固定：先加入者位于最外层，
//! 进入时最先执行，返回时最后执行。
use crate::{command::AnyCommand, context::AppContext, error::AppError, registry::HandlerFn};
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

#[async_trait]
pub trait Middleware: Send + Sync + 'static {
    /// 处理一次命令执行；调用 `next.run(ctx, cmd)` 进入内层
    async fn handle(
        &self,
        ctx: &AppContext,
        cmd: &mut dyn AnyCommand,
        next: Next<'_>,
    ) -> Result<(), AppError>;
}

/// 调用链中剩余的部分（内层中间件 + 最终处理器）
pub struct Next<'a> {
    chain: &'a [Arc<dyn Middleware>],
    endpoint: &'a HandlerFn,
}

impl<'a> Next<'a> {
    pub(crate) fn new(chain: &'a [Arc<dyn Middleware>], endpoint: &'a HandlerFn) -> Self {
        Self { chain, endpoint }
    }

    /// 剩余中间件数量（不含最终处理器）
    pub fn remaining(&self) -> usize {
        self.chain.len()
    }

    pub async fn run(self, ctx: &AppContext, cmd: &mut dyn AnyCommand) -> Result<(), AppError> {
        match self.chain.split_first() {
            Some((outer, inner)) => {
                outer
                    .handle(ctx, cmd, Next::new(inner, self.endpoint))
                    .await
            }
            None => (self.endpoint)(ctx, cmd).await,
        }
    }
}

/// 不可变的中间件序列
///
/// 追加中间件会生成新的序列（写时复制），已在执行中的调用
/// 仍使用其开始时拿到的快照。
#[derive(Clone, Default)]
pub struct MiddlewareChain {
    layers: Arc<[Arc<dyn Middleware>]>,
}

impl MiddlewareChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// 返回追加了 `layers` 的新调用链，原序列保持不变
    pub fn with<I>(&self, layers: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn Middleware>>,
    {
        let layers: Arc<[Arc<dyn Middleware>]> =
            self.layers.iter().cloned().chain(layers).collect();
        Self { layers }
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// 以 `endpoint` 为最内层运行整条调用链
    pub async fn run(
        &self,
        ctx: &AppContext,
        cmd: &mut dyn AnyCommand,
        endpoint: &HandlerFn,
    ) -> Result<(), AppError> {
        Next::new(&self.layers, endpoint).run(ctx, cmd).await
    }
}

impl fmt::Debug for MiddlewareChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MiddlewareChain")
            .field("len", &self.layers.len())
            .finish()
    }
}
