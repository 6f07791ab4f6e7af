// ==========================================
// 产品配置引擎 - 错误类型
// ==========================================
// 工具: thiserror 派生宏
// 约定: 查询失败一律以数据返回,不 panic
// ==========================================

use thiserror::Error;

/// 引擎层错误类型
#[derive(Error, Debug)]
pub enum EngineError {
    // ===== 规则错误 =====
    #[error("未知的包含模式代码: {code}")]
    UnknownContainmentMode { code: i64 },

    // ===== 状态错误 =====
    #[error("配置状态缺少产品描述")]
    MissingProductDescriptor,

    // ===== 配置 =====
    #[error("配置错误: {0}")]
    Config(String),
}

/// 目录获取错误类型
///
/// 需要 Clone: 合并中的获取结果会分发给所有等待者
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CatalogError {
    #[error("目录文档不存在: product_id={product_id}, document={document}")]
    NotFound { product_id: i64, document: String },

    #[error("目录文档读取失败 ({document}): {message}")]
    Io { document: String, message: String },

    #[error("目录文档解析失败 ({document}): {message}")]
    Parse { document: String, message: String },

    #[error("缓存锁获取失败: {0}")]
    Lock(String),
}

/// Result 类型别名
pub type EngineResult<T> = Result<T, EngineError>;

/// Result 类型别名
pub type CatalogResult<T> = Result<T, CatalogError>;
