use serde::Serialize;
use std::collections::HashSet;
use utils_common::Racket;

use crate::error::LoadError;

/// 加载状态
#[derive(Serialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(tag = "state", content = "message", rename_all = "snake_case")]
pub enum LoadStatus {
    #[default]
    Idle,
    Loading,
    Loaded,
    Error(String),
}

/// 一次加载请求的凭证，只有最新一次的结果会被采用
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

/// 球拍存储 - 保存完整列表和加载状态
///
/// 只能通过 `begin_load` / `finish_load` 修改，其它组件只读。
#[derive(Debug, Default)]
pub struct ItemStore {
    rackets: Vec<Racket>,
    status: LoadStatus,
    generation: u64,
}

impl ItemStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> &LoadStatus {
        &self.status
    }

    pub fn is_loaded(&self) -> bool {
        self.status == LoadStatus::Loaded
    }

    /// 已加载时返回全部球拍，否则返回 None
    pub fn loaded(&self) -> Option<&[Racket]> {
        self.is_loaded().then_some(self.rackets.as_slice())
    }

    pub fn rackets(&self) -> &[Racket] {
        &self.rackets
    }

    pub fn get(&self, index: usize) -> Option<&Racket> {
        self.rackets.get(index)
    }

    /// 按标识符查找球拍
    pub fn find(&self, id: &str) -> Option<&Racket> {
        self.loaded()?.iter().find(|racket| racket.id == id)
    }

    /// 开始一次加载，旧的未完成请求随即作废
    pub fn begin_load(&mut self) -> LoadTicket {
        self.generation += 1;
        self.status = LoadStatus::Loading;
        LoadTicket(self.generation)
    }

    /// 提交加载结果；凭证过期时丢弃结果并返回 false
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<Vec<Racket>, LoadError>,
    ) -> bool {
        if ticket.0 != self.generation {
            log::debug!("丢弃过期的加载结果: 第 {} 次请求, 当前第 {} 次", ticket.0, self.generation);
            return false;
        }

        match result.and_then(validate_ids) {
            Ok(rackets) => {
                log::info!("球拍列表加载完成，数量: {}", rackets.len());
                self.rackets = rackets;
                self.status = LoadStatus::Loaded;
            }
            Err(e) => {
                log::error!("球拍列表加载失败: {}", e);
                self.rackets.clear();
                self.status = LoadStatus::Error(e.to_string());
            }
        }
        true
    }
}

// 标识符必须非空且唯一
fn validate_ids(rackets: Vec<Racket>) -> Result<Vec<Racket>, LoadError> {
    let mut seen = HashSet::with_capacity(rackets.len());
    for (position, racket) in rackets.iter().enumerate() {
        if racket.id.trim().is_empty() {
            return Err(LoadError::InvalidSnapshot(format!(
                "第 {} 条记录缺少标识符",
                position + 1
            )));
        }
        if !seen.insert(racket.id.as_str()) {
            return Err(LoadError::InvalidSnapshot(format!(
                "重复的标识符: {}",
                racket.id
            )));
        }
    }
    Ok(rackets)
}
