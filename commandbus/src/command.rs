use crate::error::AppError;
use serde::Serialize;
use std::any::{Any, TypeId};

/// 应用层命令（Command）
///
/// 表达“意图”的写操作请求，通常会修改领域状态。
/// - 不返回业务数据，仅表达执行结果（成功/失败）；处理器可原地修改命令本身。
/// - 路由键为命令的具体类型（`TypeId`），调用方无需另行指定字符串键。
/// - 建议保持语义化的“动宾结构”命名，如 `CreateUser`、`CloseOrder`。
///
/// 关联常量：
/// - `NAME`：命令的稳定名称，用于日志、追踪、事件类型与 `handlers()` 视图。
///   避免依赖 `type_name::<T>()`；通常由 `#[derive(Command)]` 生成。
pub trait Command: Serialize + Send + Sync + 'static {
    /// 命令的稳定名称（建议常量字符串，不随重构变化）
    const NAME: &'static str;
}

/// 类型擦除后的命令视图
///
/// 中间件对所有命令类型通用，只能通过该视图访问命令：
/// 读取名称、序列化参数，或在确知类型时向下转型后原地修改。
pub trait AnyCommand: Send + Sync {
    fn name(&self) -> &'static str;

    fn command_type_id(&self) -> TypeId;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// 将命令序列化为 JSON（日志等横切关注点使用）
    fn to_json(&self) -> Result<serde_json::Value, serde_json::Error>;
}

impl<C: Command> AnyCommand for C {
    fn name(&self) -> &'static str {
        C::NAME
    }

    fn command_type_id(&self) -> TypeId {
        TypeId::of::<C>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn to_json(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

impl<'a> dyn AnyCommand + 'a {
    pub fn is<C: Command>(&self) -> bool {
        self.command_type_id() == TypeId::of::<C>()
    }

    pub fn downcast_ref<C: Command>(&self) -> Option<&C> {
        self.as_any().downcast_ref::<C>()
    }

    pub fn downcast_mut<C: Command>(&mut self) -> Option<&mut C> {
        self.as_any_mut().downcast_mut::<C>()
    }
}

/// 校验命令名称的形状
///
/// 名称会被拼进事件类型（`name.phase`）与追踪 span，因此只接受
/// 以 ASCII 字母开头、由 ASCII 字母数字或 `_` 组成的非空字符串。
pub fn validate_command_name(name: &'static str) -> Result<(), AppError> {
    let mut chars = name.chars();

    let Some(first) = chars.next() else {
        return Err(AppError::InvalidCommandShape {
            command: name,
            reason: "command name is empty",
        });
    };

    if !first.is_ascii_alphabetic() {
        return Err(AppError::InvalidCommandShape {
            command: name,
            reason: "command name must start with an ASCII letter",
        });
    }

    if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(AppError::InvalidCommandShape {
            command: name,
            reason: "command name may only contain ASCII letters, digits or '_'",
        });
    }

    Ok(())
}

pub(crate) fn validate<C: Command>() -> Result<(), AppError> {
    validate_command_name(C::NAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Serialize)]
    struct Rename {
        to: String,
    }

    impl Command for Rename {
        const NAME: &'static str = "Rename";
    }

    #[derive(Debug, Serialize)]
    struct Other;

    impl Command for Other {
        const NAME: &'static str = "Other";
    }

    #[test]
    fn accepts_identifier_like_names() {
        for name in ["CreateUser", "close_order", "V2Migrate"] {
            assert!(validate_command_name(name).is_ok(), "{name}");
        }
    }

    #[test]
    fn rejects_malformed_names() {
        for name in ["", "1Create", "create user", "user.created", "_hidden", "Créer"] {
            match validate_command_name(name) {
                Err(AppError::InvalidCommandShape { command, .. }) => assert_eq!(command, name),
                other => panic!("unexpected result for {name:?}: {other:?}"),
            }
        }
    }

    #[test]
    fn erased_view_downcasts_to_concrete_type() {
        let mut cmd = Rename { to: "a".into() };
        let erased: &mut dyn AnyCommand = &mut cmd;

        assert_eq!(erased.name(), "Rename");
        assert!(erased.is::<Rename>());
        assert!(erased.downcast_ref::<Other>().is_none());

        erased.downcast_mut::<Rename>().unwrap().to = "b".into();
        assert_eq!(erased.to_json().unwrap(), serde_json::json!({ "to": "b" }));
        assert_eq!(cmd.to, "b");
    }
}
