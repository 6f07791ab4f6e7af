// ==========================================
// 产品配置引擎 - 目录服务 (缓存 + 获取合并)
// ==========================================
// 职责: 按产品 id 缓存目录与数据表文档集合
// 红线: 同一产品 id 的并发获取只触发一次来源请求
// 红线: 全部子文档成功后才整体写入缓存; 部分失败不缓存
// 生命周期: invalidate(product_id) / clear() 显式失效
// ==========================================

use crate::catalog::resource::{DatasheetBundle, DocumentKind, ResourceCatalog};
use crate::catalog::source::CatalogSource;
use crate::config::EngineConfig;
use crate::domain::datasheet::Datasheet;
use crate::domain::state::ConfigurationState;
use crate::engine::datasheet::DatasheetGenerator;
use crate::error::{CatalogError, CatalogResult};
use futures::future::{BoxFuture, FutureExt, Shared};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

type SharedFetch<T> = Shared<BoxFuture<'static, CatalogResult<Arc<T>>>>;

/// 进行中的获取 (ticket 区分同键的先后两次获取)
struct Pending<T> {
    ticket: u64,
    fetch: SharedFetch<T>,
}

/// 单类缓存槽
struct Slot<T> {
    ready: HashMap<i64, Arc<T>>,
    pending: HashMap<i64, Pending<T>>,
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Self {
            ready: HashMap::new(),
            pending: HashMap::new(),
        }
    }
}

impl<T> Slot<T> {
    fn clear(&mut self) {
        self.ready.clear();
        self.pending.clear();
    }
}

#[derive(Default)]
struct CacheState {
    next_ticket: u64,
    catalogs: Slot<ResourceCatalog>,
    bundles: Slot<DatasheetBundle>,
}

/// 槽位选择
#[derive(Debug, Clone, Copy)]
enum SlotKind {
    Catalog,
    Bundle,
}

trait SlotAccess: Sized {
    fn slot(state: &mut CacheState) -> &mut Slot<Self>;
}

impl SlotAccess for ResourceCatalog {
    fn slot(state: &mut CacheState) -> &mut Slot<Self> {
        &mut state.catalogs
    }
}

impl SlotAccess for DatasheetBundle {
    fn slot(state: &mut CacheState) -> &mut Slot<Self> {
        &mut state.bundles
    }
}

// ==========================================
// CatalogService - 目录服务
// ==========================================
pub struct CatalogService {
    source: Arc<dyn CatalogSource>,
    config: EngineConfig,
    cache: Mutex<CacheState>,
}

impl CatalogService {
    pub fn new(source: Arc<dyn CatalogSource>, config: EngineConfig) -> Self {
        Self {
            source,
            config,
            cache: Mutex::new(CacheState::default()),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn lock(&self) -> CatalogResult<MutexGuard<'_, CacheState>> {
        self.cache
            .lock()
            .map_err(|e| CatalogError::Lock(e.to_string()))
    }

    // ==========================================
    // 公开接口
    // ==========================================

    /// 获取资源目录 (缓存命中或合并获取)
    #[tracing::instrument(skip(self))]
    pub async fn catalog(&self, product_id: i64) -> CatalogResult<Arc<ResourceCatalog>> {
        let source = Arc::clone(&self.source);
        self.load(product_id, SlotKind::Catalog, move || {
            async move {
                let json = source
                    .fetch_document(product_id, DocumentKind::Catalog)
                    .await?;
                ResourceCatalog::from_json(product_id, &json).map(Arc::new)
            }
            .boxed()
        })
        .await
    }

    /// 获取数据表文档集合 (四个文档并发获取)
    #[tracing::instrument(skip(self))]
    pub async fn bundle(&self, product_id: i64) -> CatalogResult<Arc<DatasheetBundle>> {
        let source = Arc::clone(&self.source);
        self.load(product_id, SlotKind::Bundle, move || {
            async move {
                let (names, validators, commodities, formulas) = futures::try_join!(
                    source.fetch_document(product_id, DocumentKind::Names),
                    source.fetch_document(product_id, DocumentKind::Validators),
                    source.fetch_document(product_id, DocumentKind::Commodities),
                    source.fetch_document(product_id, DocumentKind::Formulas),
                )?;
                DatasheetBundle::from_documents(&names, &validators, &commodities, &formulas)
                    .map(Arc::new)
            }
            .boxed()
        })
        .await
    }

    /// 生成技术数据表
    ///
    /// 文档获取失败或生成出错时返回空数据表 + 告警, 不向上传播
    #[tracing::instrument(skip(self, state), fields(instance_id = %state.instance_id))]
    pub async fn datasheet(&self, product_id: i64, state: &ConfigurationState) -> Datasheet {
        let fetched = futures::try_join!(self.catalog(product_id), self.bundle(product_id));
        let (catalog, bundle) = match fetched {
            Ok(pair) => pair,
            Err(e) => {
                tracing::warn!(product_id, error = %e, "数据表文档不可用, 返回空数据表");
                return Datasheet::degraded(format!("数据表文档不可用: {}", e));
            }
        };

        let generator = DatasheetGenerator::new(self.config.clone());
        match generator.generate(&catalog, &bundle, state) {
            Ok(datasheet) => datasheet,
            Err(e) => {
                tracing::warn!(product_id, error = %e, "数据表生成失败, 返回空数据表");
                Datasheet::degraded(format!("数据表生成失败: {}", e))
            }
        }
    }

    /// 使某产品的缓存失效 (进行中的获取完成后不再写入)
    pub fn invalidate(&self, product_id: i64) -> CatalogResult<()> {
        let mut cache = self.lock()?;
        cache.catalogs.ready.remove(&product_id);
        cache.catalogs.pending.remove(&product_id);
        cache.bundles.ready.remove(&product_id);
        cache.bundles.pending.remove(&product_id);
        tracing::info!(product_id, "目录缓存已失效");
        Ok(())
    }

    /// 清空全部缓存
    pub fn clear(&self) -> CatalogResult<()> {
        let mut cache = self.lock()?;
        cache.catalogs.clear();
        cache.bundles.clear();
        tracing::info!("目录缓存已清空");
        Ok(())
    }

    /// 目录与数据表文档是否均已缓存
    pub fn is_cached(&self, product_id: i64) -> bool {
        self.lock()
            .map(|cache| {
                cache.catalogs.ready.contains_key(&product_id)
                    && cache.bundles.ready.contains_key(&product_id)
            })
            .unwrap_or(false)
    }

    // ==========================================
    // 内部: 合并获取
    // ==========================================

    async fn load<T, F>(&self, product_id: i64, kind: SlotKind, start: F) -> CatalogResult<Arc<T>>
    where
        T: SlotAccess + Send + Sync + 'static,
        F: FnOnce() -> BoxFuture<'static, CatalogResult<Arc<T>>>,
    {
        let (ticket, fetch) = {
            let mut cache = self.lock()?;
            let ticket = cache.next_ticket;
            let slot = T::slot(&mut cache);

            if let Some(hit) = slot.ready.get(&product_id) {
                tracing::debug!(product_id, ?kind, "缓存命中");
                return Ok(Arc::clone(hit));
            }
            match slot.pending.get(&product_id) {
                Some(pending) => {
                    tracing::debug!(product_id, ?kind, "合并进行中的获取");
                    (pending.ticket, pending.fetch.clone())
                }
                None => {
                    tracing::info!(product_id, ?kind, "开始获取目录文档");
                    let fetch = start().shared();
                    slot.pending.insert(
                        product_id,
                        Pending {
                            ticket,
                            fetch: fetch.clone(),
                        },
                    );
                    cache.next_ticket += 1;
                    (ticket, fetch)
                }
            }
        };

        let result = fetch.await;

        let mut cache = self.lock()?;
        let slot = T::slot(&mut cache);
        let current = slot
            .pending
            .get(&product_id)
            .map(|pending| pending.ticket == ticket)
            .unwrap_or(false);
        if current {
            slot.pending.remove(&product_id);
            match &result {
                Ok(value) => {
                    slot.ready.insert(product_id, Arc::clone(value));
                    tracing::info!(product_id, ?kind, "目录文档已缓存");
                }
                Err(e) => {
                    tracing::warn!(product_id, ?kind, error = %e, "目录文档获取失败, 不写入缓存")
                }
            }
        }
        result
    }
}
