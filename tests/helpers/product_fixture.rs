// ==========================================
// 产品目录夹具 - 用于集成测试
// ==========================================
// 产品 42 "Janela de correr":
//   型号 1 (A): piece=2, maxW=500    型号 2 (B): piece=1
//   分组 1 Vidros    → 组成 10 Vidro    → 可选项 100 Incolor / 101 Fumê
//                    → 组成 11 Película → 可选项 110 Jateada (组 HIDE: 已选 101)
//   分组 2 Ferragens → 组成 20 Puxador  → 可选项 200 Alça (依赖 100,110)
//                                          组合 2001 Preto(1) / 2002 Branco(2,副色3) / 2003 Natural(4, 默认)
// ==========================================

use product_configurator::catalog::{DocumentKind, StaticCatalogSource};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};

pub const PRODUCT_ID: i64 = 42;

pub struct ProductFixture {
    pub product_id: i64,
    pub catalog: Value,
    pub names: Value,
    pub validators: Value,
    pub commodities: Value,
    pub formulas: Value,
}

impl ProductFixture {
    pub fn window() -> Self {
        Self {
            product_id: PRODUCT_ID,
            catalog: json!({
                "product": {"id": PRODUCT_ID, "name": "Janela de correr"},
                "models": [
                    {"id": 1, "name": "A", "piece": 2, "maxW": 500},
                    {"id": 2, "name": "B", "piece": 1}
                ],
                "lines": [{"id": 1, "name": "Suprema"}],
                "classifications": [{"id": 10, "name": "Correr"}],
                "groups": [
                    {"id": 1, "name": "Vidros", "order": 1},
                    {"id": 2, "name": "Ferragens", "order": 2}
                ],
                "compositions": [
                    {"id": 10, "groupID": 1, "name": "Vidro"},
                    {"id": 11, "groupID": 1, "name": "Película"},
                    {"id": 20, "groupID": 2, "name": "Puxador"}
                ],
                "optionals": [
                    {"id": 100, "parent": 10, "title": "Incolor"},
                    {"id": 101, "parent": 10, "title": "Fumê"},
                    {"id": 110, "parent": 11, "title": "Jateada"},
                    {"id": 200, "parent": 20, "title": "Alça", "dependents": "100,110"}
                ],
                "combinations": [
                    {"id": 1000, "parent": 100, "color": 1},
                    {"id": 1100, "parent": 110, "color": 2},
                    {"id": 2001, "parent": 200, "name": "Preto", "color": 1},
                    {"id": 2002, "parent": 200, "name": "Branco", "color": 2, "secondaryColors": "3"},
                    {"id": 2003, "parent": 200, "name": "Natural", "color": 4, "isDefault": true}
                ],
                "ruleGroups": [
                    {"id": 1, "action": "HIDE", "ownerKind": "COMPOSITION", "ownerId": 11,
                     "message": "Película indisponível para vidro fumê",
                     "rules": [{"id": 1, "opt": "101", "rOpt": 1}]}
                ]
            }),
            names: json!({
                "501": {"name": "Vidro incolor 4mm"},
                "601": {"name": "Puxador alça"}
            }),
            validators: json!({
                "7": {
                    "title": "Vidro por área",
                    "formula": [
                        {"id": 1, "piece": 1, "consumption": "100", "weight": "101"},
                        {"id": 2, "piece": 2, "consumption": "102", "technical": "103"}
                    ],
                    "rule": [{"id": 1, "opt": "100", "rOpt": 1}]
                }
            }),
            commodities: json!({"commodity": [
                {"id": 1, "input": 501, "parent": 1000, "groupId": 1, "opt": 100, "fK": 1,
                 "validator": "7"},
                {"id": 2, "input": 601, "groupId": 2, "opt": 200, "colorFree": true,
                 "level": "COMPOSITION"}
            ]}),
            formulas: json!({
                "100": {"formula": "area * 1.1"},
                "101": {"formula": "area * 10"},
                "102": {"formula": "pieces"},
                "103": {"formula": "max(width_1, width_2) / 0"}
            }),
        }
    }

    pub fn document(&self, kind: DocumentKind) -> String {
        let value = match kind {
            DocumentKind::Catalog => &self.catalog,
            DocumentKind::Names => &self.names,
            DocumentKind::Validators => &self.validators,
            DocumentKind::Commodities => &self.commodities,
            DocumentKind::Formulas => &self.formulas,
        };
        value.to_string()
    }

    /// 内存来源 (可排除部分文档)
    pub fn static_source_without(&self, missing: &[DocumentKind]) -> StaticCatalogSource {
        let source = StaticCatalogSource::new();
        for kind in [
            DocumentKind::Catalog,
            DocumentKind::Names,
            DocumentKind::Validators,
            DocumentKind::Commodities,
            DocumentKind::Formulas,
        ] {
            if !missing.contains(&kind) {
                source.insert(self.product_id, kind, self.document(kind));
            }
        }
        source
    }

    pub fn static_source(&self) -> StaticCatalogSource {
        self.static_source_without(&[])
    }

    /// 写入 <root>/<product_id>/<kind>.json
    pub fn write_to(&self, root: &Path) -> PathBuf {
        let dir = root.join(self.product_id.to_string());
        std::fs::create_dir_all(&dir).unwrap();
        for kind in [
            DocumentKind::Catalog,
            DocumentKind::Names,
            DocumentKind::Validators,
            DocumentKind::Commodities,
            DocumentKind::Formulas,
        ] {
            std::fs::write(dir.join(kind.file_name()), self.document(kind)).unwrap();
        }
        dir
    }
}
