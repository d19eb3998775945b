use crate::{command::Command, context::AppContext, error::AppError};
use async_trait::async_trait;
use std::marker::PhantomData;

/// 命令处理器
///
/// 每个命令类型恰好对应一个处理器。处理器以 `&mut C` 接收命令，
/// 可原地修改；结果统一为 `Result<(), AppError>`，错误原样返回给调用方。
#[async_trait]
pub trait CommandHandler<C>: Send + Sync
where
    C: Command,
{
    async fn handle(&self, ctx: &AppContext, cmd: &mut C) -> Result<(), AppError>;
}

/// 同步闭包处理器，见 [`handler_fn`]
pub struct FnHandler<C, F> {
    f: F,
    _marker: PhantomData<fn(&mut C)>,
}

/// 将 `Fn(&AppContext, &mut C) -> Result<(), AppError>` 包装为处理器
pub fn handler_fn<C, F>(f: F) -> FnHandler<C, F>
where
    C: Command,
    F: Fn(&AppContext, &mut C) -> Result<(), AppError> + Send + Sync + 'static,
{
    FnHandler {
        f,
        _marker: PhantomData,
    }
}

#[async_trait]
impl<C, F> CommandHandler<C> for FnHandler<C, F>
where
    C: Command,
    F: Fn(&AppContext, &mut C) -> Result<(), AppError> + Send + Sync + 'static,
{
    async fn handle(&self, ctx: &AppContext, cmd: &mut C) -> Result<(), AppError> {
        (self.f)(ctx, cmd)
    }
}

/// 不会失败的闭包处理器，见 [`infallible_fn`]
pub struct InfallibleFn<C, F> {
    f: F,
    _marker: PhantomData<fn(&mut C)>,
}

/// 将无返回值的 `Fn(&AppContext, &mut C)` 提升为处理器，执行结果恒为成功
pub fn infallible_fn<C, F>(f: F) -> InfallibleFn<C, F>
where
    C: Command,
    F: Fn(&AppContext, &mut C) + Send + Sync + 'static,
{
    InfallibleFn {
        f,
        _marker: PhantomData,
    }
}

#[async_trait]
impl<C, F> CommandHandler<C> for InfallibleFn<C, F>
where
    C: Command,
    F: Fn(&AppContext, &mut C) + Send + Sync + 'static,
{
    async fn handle(&self, ctx: &AppContext, cmd: &mut C) -> Result<(), AppError> {
        (self.f)(ctx, cmd);
        Ok(())
    }
}
