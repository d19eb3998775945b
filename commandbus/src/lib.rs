//! 进程内命令总线（commandbus）
//!
//! 将“要做什么”（命令）与“怎么做”（处理器）解耦：
//! - 命令按自身类型路由到唯一注册的处理器（`registry`）；
//! - 每次执行经过有序的中间件链（`middleware`），由先注册者位于最外层；
//! - 处理器统一返回 `Result<(), AppError>`，错误原样透传给调用方。
//!
//! 典型用法：
//! 1. 定义命令（`#[derive(Command, Serialize)]`）与处理器；
//! 2. 启动阶段调用 `register` 与 `use_middleware`；
//! 3. 运行阶段并发调用 `execute` / `dispatch`。
//!
pub mod command;
pub mod command_bus;
pub mod command_handler;
pub mod context;
pub mod error;
pub mod inmemory_command_bus;
pub mod middleware;
pub mod registry;

pub use command::{AnyCommand, Command};
pub use command_bus::CommandBus;
pub use command_handler::{CommandHandler, handler_fn, infallible_fn};
pub use context::AppContext;
pub use error::AppError;
pub use inmemory_command_bus::InMemoryCommandBus;
pub use middleware::{Middleware, MiddlewareChain, Next};

/// `#[derive(Command)]`：以结构体名（或 `#[command(name = "...")]`）生成 `Command::NAME`
pub use commandbus_macros::Command;

// 允许在本 crate 内部通过 ::commandbus 进行自引用，
// 以便派生宏在本 crate 的测试中也能解析到 ::commandbus 路径。
extern crate self as commandbus;
