//! 筛选、分页和收藏的性质测试
//!
//! 用随机生成的球拍、搜索词和多选集合检查：
//! - 空条件返回全部球拍且保持顺序
//! - 命中当且仅当满足搜索和全部分类条件
//! - 组合条件等于各条件结果的交集
//! - 重复筛选结果不变
//! - 各页依次拼接等于筛选结果
//! - 连续切换两次收藏恢复原状态

#![cfg(not(target_arch = "wasm32"))]

use proptest::prelude::*;
use proptest::sample::{select, subsequence};

use racket_catalog::filter::{FilterCriteria, FilterEngine, FilteredView};
use racket_catalog::store::ItemStore;
use racket_catalog::{CatalogConfig, CatalogEngine};
use utils_common::{Racket, RacketAttribute};

// ============================================================================
// 生成器
// ============================================================================

const BALANCES: &[&str] = &["Head-Heavy", "Even", "Head-Light"];
const WEIGHTS: &[&str] = &["3U", "4U", "5U"];
const BRANDS: &[&str] = &["yonex", "victor", "li-ning"];

prop_compose! {
    fn arb_racket()(
        name in "[A-Za-z0-9 ]{1,16}",
        series in proptest::option::of("[A-Za-z ]{1,8}"),
        balance in proptest::option::of(select(BALANCES)),
        weight in proptest::option::of(select(WEIGHTS)),
        brand in proptest::option::of(select(BRANDS)),
    ) -> Racket {
        let mut racket = Racket::new("", name);
        racket.series = series;
        racket.balance = balance.map(str::to_string);
        racket.weight = weight.map(str::to_string);
        racket.manufacturer_id = brand.map(str::to_string);
        racket
    }
}

/// 标识符按位置分配，保证唯一
fn arb_rackets() -> impl Strategy<Value = Vec<Racket>> {
    proptest::collection::vec(arb_racket(), 0..40).prop_map(|mut rackets| {
        for (i, racket) in rackets.iter_mut().enumerate() {
            racket.id = format!("r{}", i);
        }
        rackets
    })
}

/// 短搜索词更容易命中；包含只有空白的情况
fn arb_query() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ]{0,3}"
}

fn arb_selection(values: &'static [&'static str]) -> impl Strategy<Value = Vec<&'static str>> {
    subsequence(values, 0..=values.len())
}

// ============================================================================
// 辅助函数
// ============================================================================

fn loaded(rackets: Vec<Racket>) -> ItemStore {
    let mut store = ItemStore::new();
    let ticket = store.begin_load();
    assert!(store.finish_load(ticket, Ok(rackets)));
    store
}

fn criteria(query: &str, balances: &[&str], weights: &[&str]) -> FilterCriteria {
    let mut criteria = FilterCriteria::new();
    criteria.set_search(query);
    criteria.set_selection(RacketAttribute::Balance, balances.iter().copied());
    criteria.set_selection(RacketAttribute::Weight, weights.iter().copied());
    criteria
}

fn search_hits(engine: &FilterEngine, racket: &Racket, query: &str) -> bool {
    if query.trim().is_empty() {
        return true;
    }
    let needle = query.to_lowercase();
    engine.searchable().iter().any(|attr| {
        racket
            .attribute(*attr)
            .map_or(false, |value| value.to_lowercase().contains(&needle))
    })
}

fn selected(value: Option<&str>, accepted: &[&str]) -> bool {
    accepted.is_empty() || value.map_or(false, |v| accepted.contains(&v))
}

fn ids(view: &FilteredView, store: &ItemStore) -> Vec<String> {
    view.rackets(store).iter().map(|r| r.id.clone()).collect()
}

// ============================================================================
// 筛选
// ============================================================================

proptest! {
    #[test]
    fn empty_criteria_is_identity(rackets in arb_rackets()) {
        let store = loaded(rackets.clone());
        let view = FilterEngine::default().apply(&store, &FilterCriteria::new());
        let expected: Vec<usize> = (0..rackets.len()).collect();
        prop_assert_eq!(view.indices(), expected.as_slice());
    }

    #[test]
    fn membership_is_sound_and_complete(
        rackets in arb_rackets(),
        query in arb_query(),
        balances in arb_selection(BALANCES),
        weights in arb_selection(WEIGHTS),
    ) {
        let store = loaded(rackets);
        let engine = FilterEngine::default();
        let view = engine.apply(&store, &criteria(&query, &balances, &weights));

        for (i, racket) in store.rackets().iter().enumerate() {
            let expected = search_hits(&engine, racket, &query)
                && selected(racket.balance.as_deref(), &balances)
                && selected(racket.weight.as_deref(), &weights);
            prop_assert_eq!(
                view.indices().contains(&i),
                expected,
                "query {:?} racket {:?}",
                query,
                racket
            );
        }
    }

    #[test]
    fn combined_criteria_intersect(
        rackets in arb_rackets(),
        query in arb_query(),
        balances in arb_selection(BALANCES),
        weights in arb_selection(WEIGHTS),
    ) {
        let store = loaded(rackets);
        let engine = FilterEngine::default();

        let combined = engine.apply(&store, &criteria(&query, &balances, &weights));
        let by_search = engine.apply(&store, &criteria(&query, &[], &[]));
        let by_balance = engine.apply(&store, &criteria("", &balances, &[]));
        let by_weight = engine.apply(&store, &criteria("", &[], &weights));

        let intersection: Vec<usize> = by_search
            .indices()
            .iter()
            .copied()
            .filter(|i| by_balance.indices().contains(i) && by_weight.indices().contains(i))
            .collect();
        prop_assert_eq!(combined.indices(), intersection.as_slice());
    }

    #[test]
    fn filtering_is_idempotent(
        rackets in arb_rackets(),
        query in arb_query(),
        balances in arb_selection(BALANCES),
    ) {
        let store = loaded(rackets);
        let engine = FilterEngine::default();
        let criteria = criteria(&query, &balances, &[]);

        let first = engine.apply(&store, &criteria);
        prop_assert_eq!(&first, &engine.apply(&store, &criteria));

        // 对结果再筛选一次，全部保留
        let narrowed = loaded(first.rackets(&store).into_iter().cloned().collect());
        let again = engine.apply(&narrowed, &criteria);
        prop_assert_eq!(ids(&again, &narrowed), ids(&first, &store));
    }
}

// ============================================================================
// 分页
// ============================================================================

proptest! {
    #[test]
    fn pages_concatenate_to_filtered_view(
        rackets in arb_rackets(),
        page_size in 1usize..12,
        query in arb_query(),
        balances in arb_selection(BALANCES),
    ) {
        let config = CatalogConfig { page_size, ..CatalogConfig::default() };
        let mut engine = CatalogEngine::new(config);
        let ticket = engine.begin_load();
        engine.finish_load(ticket, Ok(rackets.clone()));
        engine.set_search_query(&query);
        engine.set_categorical_filter(RacketAttribute::Balance, balances.iter().copied());

        let store = loaded(rackets);
        let expected = ids(
            &FilterEngine::default().apply(&store, &criteria(&query, &balances, &[])),
            &store,
        );
        prop_assert_eq!(engine.total_pages(), expected.len().div_ceil(page_size).max(1));

        let mut seen = Vec::new();
        loop {
            let page = engine.page_items();
            prop_assert!(page.len() <= page_size);
            seen.extend(page.iter().map(|r| r.id.clone()));
            if !engine.next_page() {
                break;
            }
        }
        prop_assert_eq!(seen, expected);
        prop_assert_eq!(engine.current_page(), engine.total_pages());
    }
}

// ============================================================================
// 收藏
// ============================================================================

proptest! {
    #[test]
    fn double_toggle_restores_membership(
        initial in subsequence((0..10).collect::<Vec<usize>>(), 0..=10),
        toggled in proptest::collection::vec(0usize..10, 0..20),
        local in any::<bool>(),
    ) {
        let mut engine = CatalogEngine::default();
        let mut before: Vec<String> = initial.iter().map(|i| format!("r{}", i)).collect();
        before.sort();
        engine.reconcile_favorites(before.clone());

        for i in toggled {
            let id = format!("r{}", i);
            if local {
                engine.toggle_favorite_local(&id);
                engine.toggle_favorite_local(&id);
            } else {
                engine.toggle_favorite(&id);
                engine.toggle_favorite(&id);
            }
        }
        prop_assert_eq!(engine.favorite_ids(), before);
    }
}
