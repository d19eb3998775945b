use async_trait::async_trait;
use commandbus::{
    AnyCommand, AppContext, AppError, Command, CommandBus, CommandHandler, InMemoryCommandBus,
    Middleware, Next, infallible_fn,
};
use serde::Serialize;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Serialize, Command)]
struct CreateUser {
    name: String,
    id: Option<u32>,
}

struct CreateUserHandler;

#[async_trait]
impl CommandHandler<CreateUser> for CreateUserHandler {
    async fn handle(&self, _ctx: &AppContext, cmd: &mut CreateUser) -> Result<(), AppError> {
        if cmd.name.is_empty() {
            return Err(AppError::Validation("name is empty".into()));
        }
        cmd.id = Some(42);
        Ok(())
    }
}

#[derive(Debug, Serialize, Command)]
struct DeleteUser {
    id: u32,
}

/// 记录每条命令的执行结果
struct Audit;

#[async_trait]
impl Middleware for Audit {
    async fn handle(
        &self,
        ctx: &AppContext,
        cmd: &mut dyn AnyCommand,
        next: Next<'_>,
    ) -> Result<(), AppError> {
        let name = cmd.name();
        let res = next.run(ctx, cmd).await;
        tracing::info!(command = name, ok = res.is_ok(), "audit");
        res
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "debug".into()))
        .init();

    let bus = InMemoryCommandBus::new();
    bus.register::<CreateUser, _>(Arc::new(CreateUserHandler))?;
    bus.register::<DeleteUser, _>(Arc::new(infallible_fn(|_ctx, cmd: &mut DeleteUser| {
        tracing::info!(id = cmd.id, "user deleted");
    })))?;
    bus.use_middleware(Audit);

    let ctx = AppContext::builder()
        .correlation_id("cor-1")
        .causation_id("cau-1")
        .actor_type("user")
        .actor_id("u-1")
        .idempotency_key("idem-1")
        .build();

    let user = bus
        .dispatch(
            &ctx,
            CreateUser {
                name: "Alice".into(),
                id: None,
            },
        )
        .await?;
    tracing::info!(id = ?user.id, "user created");

    bus.execute(&ctx, &mut DeleteUser { id: 42 }).await?;

    // 未注册的命令 -> 返回 HandlerNotFound 错误
    #[derive(Debug, Serialize, Command)]
    struct UpdateUser {
        id: u32,
        name: String,
    }

    if let Err(AppError::HandlerNotFound(name)) = bus
        .execute(
            &ctx,
            &mut UpdateUser {
                id: 7,
                name: "Eve".into(),
            },
        )
        .await
    {
        tracing::warn!(command = name, "handler not found as expected");
    }
    Ok(())
}
