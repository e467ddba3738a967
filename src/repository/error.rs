// ==========================================
// Controle PCP - 仓储层错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use thiserror::Error;

/// 仓储层错误类型
#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("记录未找到: {entity} with id={id}")]
    NotFound { entity: String, id: String },

    #[error("批次已存在: {0}")]
    DuplicateLot(String),

    #[error("未知看板标志: {flag} (方案 {schema})")]
    UnknownFlag { flag: String, schema: String },

    #[error("数据验证失败: {0}")]
    ValidationError(String),

    #[error("锁获取失败: {0}")]
    LockError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result 类型别名
pub type RepositoryResult<T> = Result<T, RepositoryError>;
