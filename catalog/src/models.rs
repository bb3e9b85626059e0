use serde::{Deserialize, Serialize};
use serde_json::Value;
use utils_common::Racket;

use crate::store::LoadStatus;

/// 球拍接口返回的原始记录
///
/// 数据库里标识符可能是数字，文本字段可能是数字或空字符串，这里统一宽松解析。
#[derive(Deserialize, Debug, Clone, Default)]
pub struct RacketRecord {
    #[serde(default)]
    pub racket_id: Value,
    #[serde(default)]
    pub name: Value,
    #[serde(default)]
    pub series: Value,
    #[serde(default)]
    pub balance: Value,
    #[serde(default)]
    pub weight: Value,
    #[serde(default)]
    pub manufacturer_id: Value,
    #[serde(default)]
    pub stiffness: Value,
    #[serde(default)]
    pub color: Value,
    #[serde(default)]
    pub max_tension: Value,
    #[serde(default)]
    pub price: Value,
    #[serde(default)]
    pub description: Value,
    #[serde(default)]
    pub img_url: Value,
}

impl From<RacketRecord> for Racket {
    fn from(record: RacketRecord) -> Self {
        Racket {
            id: text(&record.racket_id).unwrap_or_default(),
            name: text(&record.name).unwrap_or_default(),
            series: text(&record.series),
            balance: text(&record.balance),
            weight: text(&record.weight),
            manufacturer_id: text(&record.manufacturer_id),
            stiffness: text(&record.stiffness),
            color: text(&record.color),
            max_tension: text(&record.max_tension),
            price: number(&record.price),
            description: text(&record.description),
            img_url: text(&record.img_url),
        }
    }
}

/// 解析接口返回的 JSON 数组
pub fn parse_rackets(json: &str) -> Result<Vec<Racket>, serde_json::Error> {
    let records: Vec<RacketRecord> = serde_json::from_str(json)?;
    Ok(records.into_iter().map(Racket::from).collect())
}

// 字符串去空白，数字转文本，其余视为缺失
fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|price| price.is_finite())
}

/// 收藏接口请求体
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteBody<'a> {
    pub racket_id: &'a str,
    pub user_id: &'a str,
}

/// 收藏接口响应体
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct FavoriteResponse {
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
}

/// 卡片 - 当前页中的一个球拍及其收藏状态
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct RacketCard {
    #[serde(flatten)]
    pub racket: Racket,
    pub favorited: bool,
}

/// 详情页 - 球拍及其展示名称和零售商链接
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct RacketDetail {
    #[serde(flatten)]
    pub racket: Racket,
    /// 名称前三个词
    pub display_name: String,
    pub retailer_url: String,
    pub favorited: bool,
}

/// 展示层读取的只读视图
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct CatalogView {
    /// 存储的加载状态
    pub status: LoadStatus,
    /// 是否已加载完成；为 false 时空列表表示"尚未就绪"而不是"没有结果"
    pub ready: bool,
    /// 当前页
    pub rackets: Vec<RacketCard>,
    /// 筛选结果总数
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
    pub search: String,
}
