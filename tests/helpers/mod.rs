// ==========================================
// 集成测试共享辅助
// ==========================================

#![allow(dead_code)]

pub mod product_fixture;
pub mod state_builder;
