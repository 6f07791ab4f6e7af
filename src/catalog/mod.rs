// ==========================================
// 产品配置引擎 - 目录层
// ==========================================
// 职责: 目录文档获取、解析、索引与缓存
// 红线: 目录构建后只读; 引擎层只借用
// ==========================================

pub mod resource;
pub mod service;
pub mod source;

pub use resource::{CatalogDocument, DatasheetBundle, DocumentKind, ResourceCatalog};
pub use service::CatalogService;
pub use source::{CatalogSource, FileCatalogSource, StaticCatalogSource};
