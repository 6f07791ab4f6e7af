// ==========================================
// 产品配置引擎 - 目录来源
// ==========================================
// 职责: 定义目录文档获取接口 (不含缓存)
// 实现: FileCatalogSource (目录树) / StaticCatalogSource (内存)
// ==========================================

use crate::catalog::resource::DocumentKind;
use crate::error::{CatalogError, CatalogResult};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

// ==========================================
// CatalogSource Trait
// ==========================================
// 用途: 按产品 id 获取原始 JSON 文档
// 实现者: FileCatalogSource / StaticCatalogSource / 网络来源 (外部)
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// 获取某产品的某类文档原文
    ///
    /// # 返回
    /// - Ok(json): 文档原文
    /// - Err(CatalogError::NotFound): 文档不存在
    async fn fetch_document(&self, product_id: i64, kind: DocumentKind) -> CatalogResult<String>;
}

// ==========================================
// FileCatalogSource - 目录树来源
// ==========================================
// 布局: <root>/<product_id>/<kind>.json
#[derive(Debug, Clone)]
pub struct FileCatalogSource {
    root: PathBuf,
}

impl FileCatalogSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn document_path(&self, product_id: i64, kind: DocumentKind) -> PathBuf {
        self.root
            .join(product_id.to_string())
            .join(kind.file_name())
    }
}

#[async_trait]
impl CatalogSource for FileCatalogSource {
    async fn fetch_document(&self, product_id: i64, kind: DocumentKind) -> CatalogResult<String> {
        let path = self.document_path(product_id, kind);
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => {
                tracing::debug!(product_id, document = %kind, path = %path.display(), "目录文档已读取");
                Ok(content)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(CatalogError::NotFound {
                product_id,
                document: kind.to_string(),
            }),
            Err(e) => Err(CatalogError::Io {
                document: path.display().to_string(),
                message: e.to_string(),
            }),
        }
    }
}

// ==========================================
// StaticCatalogSource - 内存来源
// ==========================================
// 用途: 嵌入场景与测试; 记录获取次数
#[derive(Debug, Default)]
pub struct StaticCatalogSource {
    documents: RwLock<HashMap<(i64, DocumentKind), String>>,
    fetch_count: AtomicUsize,
}

impl StaticCatalogSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// 登记文档 (覆盖同键旧文档)
    pub fn insert(&self, product_id: i64, kind: DocumentKind, json: impl Into<String>) {
        match self.documents.write() {
            Ok(mut documents) => {
                documents.insert((product_id, kind), json.into());
            }
            Err(e) => tracing::warn!("静态目录写锁获取失败: {}", e),
        }
    }

    /// 链式登记
    pub fn with_document(
        self,
        product_id: i64,
        kind: DocumentKind,
        json: impl Into<String>,
    ) -> Self {
        self.insert(product_id, kind, json);
        self
    }

    pub fn remove(&self, product_id: i64, kind: DocumentKind) {
        if let Ok(mut documents) = self.documents.write() {
            documents.remove(&(product_id, kind));
        }
    }

    /// 累计获取次数 (含失败)
    pub fn fetch_count(&self) -> usize {
        self.fetch_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CatalogSource for StaticCatalogSource {
    async fn fetch_document(&self, product_id: i64, kind: DocumentKind) -> CatalogResult<String> {
        self.fetch_count.fetch_add(1, Ordering::SeqCst);
        let documents = self
            .documents
            .read()
            .map_err(|e| CatalogError::Lock(e.to_string()))?;
        documents
            .get(&(product_id, kind))
            .cloned()
            .ok_or_else(|| CatalogError::NotFound {
                product_id,
                document: kind.to_string(),
            })
    }
}
