/// 命令总线与处理器共用的错误类型
///
/// 前四个变体由总线自身在进入中间件链之前产生，中间件无法拦截；
/// 其余变体由处理器（或中间件）经结果槽返回，总线原样透传。
#[non_exhaustive]
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("invalid command shape: command={command}, reason={reason}")]
    InvalidCommandShape {
        command: &'static str,
        reason: &'static str,
    },

    #[error("handler already registered: command={command}")]
    DuplicateRegistration { command: &'static str },

    #[error("handler not found: {0}")]
    HandlerNotFound(&'static str),

    #[error("type mismatch: expected={expected}, found={found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("validation: {0}")]
    Validation(String),

    #[error("authorization: {0}")]
    Authorization(String),

    #[error("infra: {0}")]
    Infra(String),

    #[error("cancelled: command={0}")]
    Cancelled(&'static str),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// 是否为总线在调度前产生的错误（注册/路由/形状校验）
    pub fn is_dispatch_error(&self) -> bool {
        matches!(
            self,
            AppError::InvalidCommandShape { .. }
                | AppError::DuplicateRegistration { .. }
                | AppError::HandlerNotFound(_)
                | AppError::TypeMismatch { .. }
        )
    }
}
