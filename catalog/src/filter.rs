use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use utils_common::{Racket, RacketAttribute};

use crate::pagination::PageState;
use crate::store::ItemStore;

/// 筛选条件 - 搜索文本加上各属性的多选集合
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    /// 搜索文本，空白视为不限制
    pub search: String,
    /// 属性 -> 接受的取值；只保存非空集合
    pub selections: BTreeMap<RacketAttribute, BTreeSet<String>>,
}

impl FilterCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_search(&mut self, query: impl Into<String>) {
        self.search = query.into();
    }

    /// 设置某属性的多选集合，空集合等于取消该条件
    pub fn set_selection<I, S>(&mut self, attr: RacketAttribute, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values: BTreeSet<String> = values.into_iter().map(Into::into).collect();
        if values.is_empty() {
            self.selections.remove(&attr);
        } else {
            self.selections.insert(attr, values);
        }
    }

    pub fn selection(&self, attr: RacketAttribute) -> Option<&BTreeSet<String>> {
        self.selections.get(&attr)
    }

    pub fn clear(&mut self) {
        self.search.clear();
        self.selections.clear();
    }

    /// 小写后的搜索词；只含空白时返回 None。非空时保留原有空白参与匹配
    fn normalized_query(&self) -> Option<String> {
        (!self.search.trim().is_empty()).then(|| self.search.to_lowercase())
    }
}

/// 筛选结果 - 按原顺序保存命中球拍在存储中的下标
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilteredView {
    indices: Vec<usize>,
}

impl FilteredView {
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn rackets<'a>(&self, store: &'a ItemStore) -> Vec<&'a Racket> {
        resolve(store, &self.indices)
    }

    /// 分页后当前页的球拍
    pub fn page<'a>(&self, store: &'a ItemStore, page: &PageState) -> Vec<&'a Racket> {
        resolve(store, page.slice(&self.indices))
    }
}

/// 某个属性的一个取值及出现次数
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct FacetValue {
    pub value: String,
    pub count: usize,
}

/// 筛选引擎 - 组合搜索和分类条件
#[derive(Debug, Clone)]
pub struct FilterEngine {
    searchable: Vec<RacketAttribute>,
}

impl FilterEngine {
    pub fn new(searchable: Vec<RacketAttribute>) -> Self {
        Self { searchable }
    }

    pub fn searchable(&self) -> &[RacketAttribute] {
        &self.searchable
    }

    /// 计算筛选结果；存储未加载完成时结果为空
    pub fn apply(&self, store: &ItemStore, criteria: &FilterCriteria) -> FilteredView {
        let Some(rackets) = store.loaded() else {
            return FilteredView::default();
        };

        let query = criteria.normalized_query();
        let indices = rackets
            .iter()
            .enumerate()
            .filter(|(_, racket)| self.matches_normalized(racket, query.as_deref(), criteria))
            .map(|(i, _)| i)
            .collect();

        FilteredView { indices }
    }

    fn matches_normalized(&self, racket: &Racket, query: Option<&str>, criteria: &FilterCriteria) -> bool {
        query.map_or(true, |q| self.matches_search(racket, q))
            && criteria
                .selections
                .iter()
                .all(|(attr, accepted)| matches_selection(racket, *attr, accepted))
    }

    // 任意一个可搜索属性包含查询词即命中；query 已是小写
    fn matches_search(&self, racket: &Racket, query: &str) -> bool {
        self.searchable.iter().any(|attr| {
            racket
                .attribute(*attr)
                .map_or(false, |value| value.to_lowercase().contains(query))
        })
    }

    /// 统计已加载球拍中某属性的所有取值，按取值排序
    pub fn facets(&self, store: &ItemStore, attr: RacketAttribute) -> Vec<FacetValue> {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for racket in store.loaded().unwrap_or_default() {
            if let Some(value) = racket.attribute(attr) {
                *counts.entry(value).or_insert(0) += 1;
            }
        }

        counts
            .into_iter()
            .map(|(value, count)| FacetValue {
                value: value.to_string(),
                count,
            })
            .collect()
    }
}

impl Default for FilterEngine {
    fn default() -> Self {
        Self::new(crate::config::CatalogConfig::default().searchable)
    }
}

fn resolve<'a>(store: &'a ItemStore, indices: &[usize]) -> Vec<&'a Racket> {
    indices.iter().filter_map(|&i| store.get(i)).collect()
}

// 空集合不限制；属性缺失时永远不满足非空条件
fn matches_selection(racket: &Racket, attr: RacketAttribute, accepted: &BTreeSet<String>) -> bool {
    if accepted.is_empty() {
        return true;
    }
    racket
        .attribute(attr)
        .map_or(false, |value| accepted.contains(value))
}
