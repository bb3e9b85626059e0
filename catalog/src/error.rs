use thiserror::Error;
use utils_common::{CodecError, UnknownAttribute};

/// 目录加载失败
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    /// 网络层失败（请求未完成、跨域等）
    #[error("请求球拍列表失败: {0}")]
    Transport(String),
    /// 服务端返回非 2xx
    #[error("Failed to fetch: {status}")]
    Http { status: u16 },
    /// 响应体无法解析
    #[error("解析球拍列表失败: {0}")]
    Parse(String),
    /// 数据违反标识符约束
    #[error("目录数据无效: {0}")]
    InvalidSnapshot(String),
}

impl From<CodecError> for LoadError {
    fn from(e: CodecError) -> Self {
        LoadError::Parse(e.to_string())
    }
}

/// 收藏同步失败 - 非致命，只作为警告上报
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FavoriteSyncError {
    #[error("收藏请求失败: {0}")]
    Transport(String),
    /// 远端返回 success = false
    #[error("收藏被远端拒绝: {}", .0.as_deref().unwrap_or("未知错误"))]
    Rejected(Option<String>),
}

/// 配置错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("解析配置失败: {0}")]
    Parse(String),
    #[error("每页条数必须大于 0")]
    ZeroPageSize,
    #[error("至少需要一个可搜索属性")]
    NoSearchableAttributes,
}

/// JS 接口层统一错误
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Favorite(#[from] FavoriteSyncError),
    #[error(transparent)]
    Attribute(#[from] UnknownAttribute),
    #[error("参数格式错误: {0}")]
    Argument(String),
}
