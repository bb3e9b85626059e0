use serde::Deserialize;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use utils_common::Racket;

/// 已知品牌，按顺序匹配；值为统一后的厂商名称
const BRANDS: &[(&str, &str)] = &[
    ("yonex", "Yonex"),
    ("victor", "Victor"),
    ("li-ning", "Li-Ning"),
    ("lining", "Li-Ning"),
    ("hundred", "Hundred"),
];

/// 重量等级标记
const WEIGHT_CLASSES: &[&str] = &["3U", "4U"];

/// 爬虫输出的原始球拍记录
#[derive(Deserialize, Debug, Clone, Default)]
pub struct ScrapedRacket {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// 数字或带货币符号的字符串
    #[serde(default)]
    pub price: Option<Value>,
    #[serde(default)]
    pub specifications: HashMap<String, Value>,
}

impl ScrapedRacket {
    fn spec(&self, key: &str) -> Option<String> {
        self.specifications.get(key).and_then(value_text)
    }
}

/// 把一批爬取记录转换为目录条目，保证标识符唯一
pub fn normalize_all(records: Vec<ScrapedRacket>) -> Vec<Racket> {
    let mut used = HashSet::new();
    records
        .into_iter()
        .map(|record| {
            let base = base_id(&record);
            let id = unique_id(&base, &mut used);
            normalize(record, id)
        })
        .collect()
}

/// 单条记录的字段映射
pub fn normalize(record: ScrapedRacket, id: String) -> Racket {
    let name = record
        .name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or("Unknown")
        .to_string();

    let price = record
        .price
        .as_ref()
        .and_then(parse_price)
        .or_else(|| record.specifications.get("Price").and_then(parse_price));

    Racket {
        id,
        manufacturer_id: infer_brand(&name),
        series: None,
        balance: record.spec("Balance"),
        weight: record.spec("Weight").map(|weight| parse_weight(&weight)),
        stiffness: record.spec("Shaft Flexibility"),
        color: record.spec("Color"),
        max_tension: record.spec("Maximum Racket Tension"),
        price,
        description: record.description.as_deref().and_then(non_blank),
        img_url: record.image_url.as_deref().and_then(non_blank),
        name,
    }
}

/// 解析价格：数字直接使用，字符串只保留数字和小数点
pub fn parse_price(value: &Value) -> Option<f64> {
    let price = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let digits: String = s.chars().filter(|c| c.is_ascii_digit() || *c == '.').collect();
            digits.parse::<f64>().ok()
        }
        _ => None,
    }?;
    price.is_finite().then_some(price)
}

/// 识别 3U / 4U 等重量等级，未识别时保留原文
pub fn parse_weight(weight: &str) -> String {
    let upper = weight.to_uppercase();
    WEIGHT_CLASSES
        .iter()
        .find(|class| upper.contains(*class))
        .map(|class| class.to_string())
        .unwrap_or_else(|| weight.trim().to_string())
}

/// 从名称中识别品牌
pub fn infer_brand(name: &str) -> Option<String> {
    let lower = name.to_lowercase();
    BRANDS
        .iter()
        .find(|(needle, _)| lower.contains(needle))
        .map(|(_, brand)| brand.to_string())
}

/// 生成 URL 友好的标识符
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for c in text.chars() {
        if c.is_alphanumeric() {
            slug.extend(c.to_lowercase());
        } else if !slug.ends_with('-') {
            slug.push('-');
        }
    }
    slug.trim_matches('-').to_string()
}

// 优先使用商品 URL 的最后一段，其次使用名称
fn base_id(record: &ScrapedRacket) -> String {
    let from_url = record
        .url
        .as_deref()
        .and_then(|url| url.trim_end_matches('/').rsplit('/').next())
        .map(|segment| slugify(segment.split('?').next().unwrap_or(segment)))
        .filter(|slug| !slug.is_empty());

    from_url
        .or_else(|| record.name.as_deref().map(slugify).filter(|slug| !slug.is_empty()))
        .unwrap_or_else(|| "racket".to_string())
}

// 重复时追加序号
fn unique_id(base: &str, used: &mut HashSet<String>) -> String {
    let mut candidate = base.to_string();
    let mut n = 2;
    while used.contains(&candidate) {
        candidate = format!("{}-{}", base, n);
        n += 1;
    }
    used.insert(candidate.clone());
    candidate
}

fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => non_blank(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn non_blank(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
