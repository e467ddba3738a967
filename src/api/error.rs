// ==========================================
// Controle PCP - API层错误类型
// ==========================================
// 职责: 定义API层错误类型，把各层错误转换为带显式原因的错误消息
// ==========================================

use crate::engine::filter::SelectionError;
use crate::importer::error::ImportError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 输入错误
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    #[error("尚未加载 OF 数据")]
    NoDataLoaded,

    // ==========================================
    // 导入错误
    // ==========================================
    #[error("缺少必需列: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("不支持的文件格式: {0}")]
    UnsupportedFileFormat(String),

    #[error("文件导入失败: {0}")]
    ImportError(String),

    // ==========================================
    // 看板错误
    // ==========================================
    #[error("数据验证失败: {0}")]
    ValidationError(String),

    #[error("业务规则违反: {0}")]
    BusinessRuleViolation(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("配置错误: {0}")]
    ConfigError(String),

    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ==========================================
// 从 ImportError 转换
// ==========================================
impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::MissingColumn(columns) => ApiError::MissingColumns(columns),
            ImportError::UnsupportedFileFormat(msg) => ApiError::UnsupportedFileFormat(msg),
            ImportError::FileNotFound(path) => ApiError::NotFound(format!("文件 {}", path)),
            ImportError::Other(err) => ApiError::Other(err),
            other => ApiError::ImportError(other.to_string()),
        }
    }
}

// ==========================================
// 从 SelectionError 转换
// ==========================================
impl From<SelectionError> for ApiError {
    fn from(err: SelectionError) -> Self {
        ApiError::InvalidInput(err.to_string())
    }
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            RepositoryError::DuplicateLot(id) => {
                ApiError::BusinessRuleViolation(format!("批次 {} 已存在", id))
            }
            RepositoryError::UnknownFlag { flag, schema } => {
                ApiError::InvalidInput(format!("标志 {} 不属于方案 {}", flag, schema))
            }
            RepositoryError::ValidationError(msg) => ApiError::ValidationError(msg),
            RepositoryError::LockError(msg) => {
                ApiError::InternalError(format!("锁获取失败: {}", msg))
            }
            RepositoryError::Other(err) => ApiError::Other(err),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_import_error_conversion() {
        let api_err: ApiError =
            ImportError::MissingColumn(vec!["balance".to_string(), "plan_id".to_string()]).into();
        match api_err {
            ApiError::MissingColumns(columns) => assert_eq!(columns.len(), 2),
            _ => panic!("Expected MissingColumns"),
        }

        let api_err: ApiError = ImportError::UnsupportedFileFormat("x.pdf".to_string()).into();
        assert!(matches!(api_err, ApiError::UnsupportedFileFormat(_)));
    }

    #[test]
    fn test_repository_error_conversion() {
        let repo_err = RepositoryError::NotFound {
            entity: "Lot".to_string(),
            id: "L-1".to_string(),
        };
        let api_err: ApiError = repo_err.into();
        match api_err {
            ApiError::NotFound(msg) => {
                assert!(msg.contains("Lot"));
                assert!(msg.contains("L-1"));
            }
            _ => panic!("Expected NotFound"),
        }

        let api_err: ApiError = RepositoryError::DuplicateLot("L-1".to_string()).into();
        assert!(matches!(api_err, ApiError::BusinessRuleViolation(_)));
    }

    #[test]
    fn test_selection_error_conversion() {
        let api_err: ApiError = SelectionError::UnknownDimension("color".to_string()).into();
        match api_err {
            ApiError::InvalidInput(msg) => assert!(msg.contains("color")),
            _ => panic!("Expected InvalidInput"),
        }
    }
}
