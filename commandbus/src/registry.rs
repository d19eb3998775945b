use crate::{
    command::{self, AnyCommand, Command},
    command_handler::CommandHandler,
    context::AppContext,
    error::AppError,
};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::any::TypeId;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

pub type CmdHandlerFuture<'a> = Pin<Box<dyn Future<Output = Result<(), AppError>> + Send + 'a>>;

/// 类型擦除后的处理器，作为调用链的最内层被调用
pub type HandlerFn = Arc<
    dyn for<'a> Fn(&'a AppContext, &'a mut dyn AnyCommand) -> CmdHandlerFuture<'a> + Send + Sync,
>;

struct Registration {
    name: &'static str,
    handler: HandlerFn,
}

/// 命令处理器注册表
/// - 以命令的 `TypeId` 为路由键，每个命令类型只允许注册一次
/// - 命令名称（`Command::NAME`）同样唯一，作为 `handlers()` 视图的键
/// - 注册项与注册表同生命周期，不提供删除
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: DashMap<TypeId, Registration>,
    names: DashMap<&'static str, TypeId>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册命令处理器
    ///
    /// 先占用命令名再写入处理器，并发注册同名命令时只有一个会成功
    pub fn register<C, H>(&self, handler: Arc<H>) -> Result<(), AppError>
    where
        C: Command,
        H: CommandHandler<C> + 'static,
    {
        command::validate::<C>()?;

        let key = TypeId::of::<C>();

        // 同一类型重复注册，或不同类型声明了同名 NAME，均视为重复
        let Entry::Vacant(name_slot) = self.names.entry(C::NAME) else {
            return Err(AppError::DuplicateRegistration { command: C::NAME });
        };

        self.handlers.insert(
            key,
            Registration {
                name: C::NAME,
                handler: erase::<C, H>(handler),
            },
        );
        name_slot.insert(key);

        tracing::debug!(command = C::NAME, "command handler registered");
        Ok(())
    }

    /// 命令名称到处理器的快照；并发注册可能不会反映在已取得的快照中
    pub fn handlers(&self) -> HashMap<&'static str, HandlerFn> {
        self.handlers
            .iter()
            .map(|e| (e.value().name, e.value().handler.clone()))
            .collect()
    }

    /// 获取已注册的命令名列表（只读视图）
    pub fn registered_commands(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.handlers.iter().map(|e| e.value().name).collect();
        names.sort_unstable();
        names
    }

    pub fn contains<C: Command>(&self) -> bool {
        self.handlers.contains_key(&TypeId::of::<C>())
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    pub(crate) fn lookup(&self, key: TypeId) -> Option<HandlerFn> {
        self.handlers.get(&key).map(|h| h.handler.clone())
    }
}

pub(crate) fn bind<F>(f: F) -> HandlerFn
where
    F: for<'a> Fn(&'a AppContext, &'a mut dyn AnyCommand) -> CmdHandlerFuture<'a>
        + Send
        + Sync
        + 'static,
{
    Arc::new(f)
}

fn erase<C, H>(handler: Arc<H>) -> HandlerFn
where
    C: Command,
    H: CommandHandler<C> + 'static,
{
    bind(move |ctx, cmd| {
        let handler = handler.clone();

        Box::pin(async move {
            let found = cmd.name();
            // 键与闭包同一泛型 C，正常情况下这里的 downcast 永远不会失败
            match cmd.downcast_mut::<C>() {
                Some(cmd) => handler.handle(ctx, cmd).await,
                None => Err(AppError::TypeMismatch {
                    expected: C::NAME,
                    found,
                }),
            }
        })
    })
}
