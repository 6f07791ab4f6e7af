// ==========================================
// 产品配置引擎 - 引擎配置
// ==========================================
// 存储: JSON 文件 / 字符串, 缺省字段取默认值
// ==========================================

use crate::error::{EngineError, EngineResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// 名称缺失标记模板的占位符
pub const NAME_ID_PLACEHOLDER: &str = "{id}";

/// 无规则组命中时的默认可见性 (按实体类型)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultVisibility {
    /// 组成默认可见
    pub composition: bool,
    /// 可选项默认可见
    pub optional: bool,
}

impl Default for DefaultVisibility {
    fn default() -> Self {
        Self {
            composition: true,
            optional: true,
        }
    }
}

/// 引擎配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub default_visibility: DefaultVisibility,

    /// 名称缺失时的带内标记; "{id}" 替换为投入品编号
    pub missing_name_marker: String,

    /// 关系列表非空而当前维度无选择时判为无效
    pub require_selection_for_relations: bool,

    /// 文件目录来源的根目录
    pub catalog_root: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_visibility: DefaultVisibility::default(),
            missing_name_marker: "#ERRO: nome não encontrado ({id})".to_string(),
            require_selection_for_relations: true,
            catalog_root: None,
        }
    }
}

impl EngineConfig {
    pub fn from_json_str(json: &str) -> EngineResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| EngineError::Config(format!("引擎配置解析失败: {}", e)))
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> EngineResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            EngineError::Config(format!("引擎配置读取失败 ({}): {}", path.display(), e))
        })?;
        let config = Self::from_json_str(&content)?;
        tracing::info!(path = %path.display(), "引擎配置已加载");
        Ok(config)
    }

    /// 生成名称缺失标记
    pub fn missing_name(&self, input: i64) -> String {
        self.missing_name_marker
            .replace(NAME_ID_PLACEHOLDER, &input.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert!(config.default_visibility.composition);
        assert!(config.default_visibility.optional);
        assert!(config.require_selection_for_relations);
        assert_eq!(config.missing_name(501), "#ERRO: nome não encontrado (501)");
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = EngineConfig::from_json_str(
            r#"{"default_visibility":{"optional":false},"missing_name_marker":"?{id}?"}"#,
        )
        .unwrap();
        assert!(config.default_visibility.composition);
        assert!(!config.default_visibility.optional);
        assert!(config.require_selection_for_relations);
        assert_eq!(config.missing_name(7), "?7?");
    }

    #[test]
    fn test_invalid_json_is_config_error() {
        let err = EngineConfig::from_json_str("{not json").unwrap_err();
        assert!(matches!(err, EngineError::Config(_)));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"catalog_root":"/srv/catalog"}}"#).unwrap();
        let config = EngineConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.catalog_root, Some(PathBuf::from("/srv/catalog")));
        assert!(EngineConfig::from_json_file("/nonexistent/engine.json").is_err());
    }
}
