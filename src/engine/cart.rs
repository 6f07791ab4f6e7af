// ==========================================
// 产品配置引擎 - 购物车适配
// ==========================================
// 职责: 定义购物车查询 trait, 实现依赖倒置
// 说明: 引擎只需要"购物车中已有哪些产品", 不依赖购物车存储
// ==========================================

use std::sync::RwLock;

/// 购物车适配器 Trait
///
/// 过滤器以此判定"关联产品"约束 (relatedProducts)
pub trait CartAdapter: Send + Sync {
    /// 购物车中已有的产品 id
    fn product_ids_in_cart(&self) -> Vec<i64>;
}

/// 空购物车
///
/// 用于不需要关联产品判定的场景 (如单元测试)
#[derive(Debug, Clone, Default)]
pub struct NoOpCart;

impl CartAdapter for NoOpCart {
    fn product_ids_in_cart(&self) -> Vec<i64> {
        tracing::debug!("NoOpCart: 购物车为空");
        Vec::new()
    }
}

/// 内存购物车
///
/// 由会话方维护产品 id 列表
#[derive(Debug, Default)]
pub struct StaticCart {
    product_ids: RwLock<Vec<i64>>,
}

impl StaticCart {
    pub fn new(product_ids: Vec<i64>) -> Self {
        Self {
            product_ids: RwLock::new(product_ids),
        }
    }

    /// 加入产品 (已存在则忽略)
    pub fn add(&self, product_id: i64) {
        if let Ok(mut ids) = self.product_ids.write() {
            if !ids.contains(&product_id) {
                ids.push(product_id);
            }
        }
    }

    /// 移除产品, 返回是否有移除
    pub fn remove(&self, product_id: i64) -> bool {
        match self.product_ids.write() {
            Ok(mut ids) => {
                let before = ids.len();
                ids.retain(|id| *id != product_id);
                ids.len() != before
            }
            Err(_) => false,
        }
    }
}

impl CartAdapter for StaticCart {
    fn product_ids_in_cart(&self) -> Vec<i64> {
        match self.product_ids.read() {
            Ok(ids) => ids.clone(),
            Err(e) => {
                tracing::warn!("购物车读锁获取失败, 视为空购物车: {}", e);
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noop_cart_is_empty() {
        assert!(NoOpCart.product_ids_in_cart().is_empty());
    }

    #[test]
    fn test_static_cart_add_remove() {
        let cart = StaticCart::new(vec![1]);
        cart.add(2);
        cart.add(2);
        assert_eq!(cart.product_ids_in_cart(), vec![1, 2]);
        assert!(cart.remove(1));
        assert!(!cart.remove(1));
        assert_eq!(cart.product_ids_in_cart(), vec![2]);
    }
}
