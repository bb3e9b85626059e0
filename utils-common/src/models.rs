use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 球拍条目 - 目录中的一条记录
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Racket {
    /// 球拍唯一标识符（非空，同一目录内唯一）
    #[serde(rename = "racket_id")]
    pub id: String,
    /// 球拍名称
    pub name: String,
    /// 系列
    #[serde(default)]
    pub series: Option<String>,
    /// 平衡点（头重、均衡、头轻）
    #[serde(default)]
    pub balance: Option<String>,
    /// 重量等级，例如 3U、4U
    #[serde(default)]
    pub weight: Option<String>,
    /// 厂商标识
    #[serde(default)]
    pub manufacturer_id: Option<String>,
    /// 中杆硬度
    #[serde(default)]
    pub stiffness: Option<String>,
    /// 可选颜色
    #[serde(default)]
    pub color: Option<String>,
    /// 最大拉力
    #[serde(default)]
    pub max_tension: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub description: Option<String>,
    /// 图片地址
    #[serde(default)]
    pub img_url: Option<String>,
}

impl Racket {
    /// 创建只有名称的球拍，其余属性为空
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            series: None,
            balance: None,
            weight: None,
            manufacturer_id: None,
            stiffness: None,
            color: None,
            max_tension: None,
            price: None,
            description: None,
            img_url: None,
        }
    }

    /// 读取分类属性的值，缺失时返回 None
    pub fn attribute(&self, attr: RacketAttribute) -> Option<&str> {
        match attr {
            RacketAttribute::Name => Some(self.name.as_str()),
            RacketAttribute::Series => self.series.as_deref(),
            RacketAttribute::Balance => self.balance.as_deref(),
            RacketAttribute::Weight => self.weight.as_deref(),
            RacketAttribute::Manufacturer => self.manufacturer_id.as_deref(),
            RacketAttribute::Stiffness => self.stiffness.as_deref(),
            RacketAttribute::Color => self.color.as_deref(),
        }
    }

    /// 展示用名称：按 '-' 拆分，首字母大写，只保留前 word_count 个词
    pub fn display_name(&self, word_count: usize) -> String {
        self.name
            .split('-')
            .map(capitalize)
            .take(word_count)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// 零售商搜索链接
    pub fn retailer_search_url(&self) -> String {
        let terms = self
            .display_name(4)
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("+");
        format!("https://www.amazon.com/s?k={}+badminton+racket", terms)
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// 可筛选、可搜索的分类属性
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RacketAttribute {
    Name,
    Series,
    Balance,
    Weight,
    #[serde(alias = "manufacturer_id")]
    Manufacturer,
    Stiffness,
    Color,
}

impl RacketAttribute {
    pub fn as_str(&self) -> &'static str {
        match self {
            RacketAttribute::Name => "name",
            RacketAttribute::Series => "series",
            RacketAttribute::Balance => "balance",
            RacketAttribute::Weight => "weight",
            RacketAttribute::Manufacturer => "manufacturer",
            RacketAttribute::Stiffness => "stiffness",
            RacketAttribute::Color => "color",
        }
    }
}

impl fmt::Display for RacketAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 未知属性名
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("未知的球拍属性: {0}")]
pub struct UnknownAttribute(pub String);

impl FromStr for RacketAttribute {
    type Err = UnknownAttribute;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "name" => Ok(RacketAttribute::Name),
            "series" => Ok(RacketAttribute::Series),
            "balance" => Ok(RacketAttribute::Balance),
            "weight" => Ok(RacketAttribute::Weight),
            "manufacturer" | "manufacturer_id" => Ok(RacketAttribute::Manufacturer),
            "stiffness" => Ok(RacketAttribute::Stiffness),
            "color" => Ok(RacketAttribute::Color),
            other => Err(UnknownAttribute(other.to_string())),
        }
    }
}

/// 目录快照元数据
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CatalogMetadata {
    /// 快照包含的球拍数量
    pub racket_count: usize,
    /// 快照创建时间
    pub created_at: DateTime<Utc>,
    /// 快照格式版本
    pub version: String,
    /// 数据来源（导入目录等）
    pub source: String,
}

/// 目录快照 - 压缩文件中存储的完整内容
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CatalogSnapshot {
    pub metadata: CatalogMetadata,
    pub rackets: Vec<Racket>,
}
