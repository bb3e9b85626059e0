use serde::{Deserialize, Serialize};
use utils_common::RacketAttribute;

use crate::error::ConfigError;

/// 目录配置 - 由宿主页面以 JSON 传入，缺失字段取默认值
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct CatalogConfig {
    /// 每页条数
    pub page_size: usize,
    /// 参与文本搜索的属性，按顺序匹配
    pub searchable: Vec<RacketAttribute>,
    /// 球拍列表接口
    pub rackets_endpoint: String,
    /// 收藏接口（POST 收藏，DELETE 取消收藏）
    pub favorites_endpoint: String,
    /// 当前用户，匿名会话为 None
    pub user_id: Option<String>,
    /// 日志级别: error / warn / info / debug / trace
    pub log_level: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            page_size: 16,
            searchable: vec![
                RacketAttribute::Name,
                RacketAttribute::Balance,
                RacketAttribute::Series,
                RacketAttribute::Weight,
            ],
            rackets_endpoint: "/api/rackets".to_string(),
            favorites_endpoint: "/api/rackets/fav".to_string(),
            user_id: None,
            log_level: "info".to_string(),
        }
    }
}

impl CatalogConfig {
    /// 从 JSON 解析并校验，空字符串视为全部默认
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: CatalogConfig = if json.trim().is_empty() {
            CatalogConfig::default()
        } else {
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.page_size == 0 {
            return Err(ConfigError::ZeroPageSize);
        }
        if self.searchable.is_empty() {
            return Err(ConfigError::NoSearchableAttributes);
        }
        Ok(())
    }

    pub fn log_level(&self) -> log::LevelFilter {
        self.log_level.parse().unwrap_or(log::LevelFilter::Info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_uses_defaults() {
        let config = CatalogConfig::from_json("").unwrap();
        assert_eq!(config, CatalogConfig::default());
        assert_eq!(config.page_size, 16);
    }

    #[test]
    fn partial_json_keeps_other_defaults() {
        let config = CatalogConfig::from_json(r#"{"page_size": 8, "user_id": "u-1"}"#).unwrap();
        assert_eq!(config.page_size, 8);
        assert_eq!(config.user_id.as_deref(), Some("u-1"));
        assert_eq!(config.rackets_endpoint, "/api/rackets");
        assert_eq!(config.searchable.len(), 4);
    }

    #[test]
    fn rejects_invalid_values() {
        assert_eq!(
            CatalogConfig::from_json(r#"{"page_size": 0}"#),
            Err(ConfigError::ZeroPageSize)
        );
        assert_eq!(
            CatalogConfig::from_json(r#"{"searchable": []}"#),
            Err(ConfigError::NoSearchableAttributes)
        );
        assert!(matches!(
            CatalogConfig::from_json(r#"{"searchable": ["grip"]}"#),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn unknown_log_level_falls_back_to_info() {
        let config = CatalogConfig {
            log_level: "loud".to_string(),
            ..CatalogConfig::default()
        };
        assert_eq!(config.log_level(), log::LevelFilter::Info);
    }
}
