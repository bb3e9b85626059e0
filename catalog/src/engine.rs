use utils_common::{decode_snapshot, Racket, RacketAttribute};

use crate::config::CatalogConfig;
use crate::error::{FavoriteSyncError, LoadError};
use crate::favorites::{FavoriteRequest, FavoriteTracker};
use crate::filter::{FacetValue, FilterCriteria, FilterEngine, FilteredView};
use crate::models::{CatalogView, RacketCard, RacketDetail};
use crate::pagination::PageState;
use crate::store::{ItemStore, LoadStatus, LoadTicket};

/// 目录引擎 - 组合存储、筛选、分页和收藏
///
/// 任何会影响筛选结果的修改都会立即重新计算筛选结果并修正页码，
/// 收藏状态独立维护，不影响筛选和分页。
#[derive(Debug)]
pub struct CatalogEngine {
    config: CatalogConfig,
    store: ItemStore,
    filter: FilterEngine,
    criteria: FilterCriteria,
    view: FilteredView,
    page: PageState,
    favorites: FavoriteTracker,
}

impl CatalogEngine {
    /// 配置应已通过 `CatalogConfig::validate`
    pub fn new(config: CatalogConfig) -> Self {
        Self {
            filter: FilterEngine::new(config.searchable.clone()),
            page: PageState::new(config.page_size),
            store: ItemStore::new(),
            criteria: FilterCriteria::new(),
            view: FilteredView::default(),
            favorites: FavoriteTracker::new(),
            config,
        }
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    pub fn status(&self) -> &LoadStatus {
        self.store.status()
    }

    //===== 加载 =====

    pub fn begin_load(&mut self) -> LoadTicket {
        let ticket = self.store.begin_load();
        self.recompute();
        ticket
    }

    /// 返回结果是否被采用（过期请求的结果会被丢弃）
    pub fn finish_load(&mut self, ticket: LoadTicket, result: Result<Vec<Racket>, LoadError>) -> bool {
        let applied = self.store.finish_load(ticket, result);
        if applied {
            self.recompute();
        }
        applied
    }

    /// 从压缩快照加载。返回解码错误；标识符校验失败只体现在加载状态中
    pub fn load_snapshot(&mut self, data: &[u8]) -> Result<(), LoadError> {
        let ticket = self.begin_load();
        match decode_snapshot(data) {
            Ok(snapshot) => {
                log::debug!(
                    "快照版本 {}，创建于 {}",
                    snapshot.metadata.version,
                    snapshot.metadata.created_at
                );
                self.finish_load(ticket, Ok(snapshot.rackets));
                Ok(())
            }
            Err(e) => {
                let err = LoadError::from(e);
                self.finish_load(ticket, Err(err.clone()));
                Err(err)
            }
        }
    }

    //===== 筛选 =====

    pub fn set_search_query(&mut self, query: &str) {
        self.criteria.set_search(query);
        self.recompute();
    }

    pub fn set_categorical_filter<I, S>(&mut self, attr: RacketAttribute, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.criteria.set_selection(attr, values);
        self.recompute();
    }

    pub fn clear_filters(&mut self) {
        self.criteria.clear();
        self.recompute();
    }

    pub fn facets(&self, attr: RacketAttribute) -> Vec<FacetValue> {
        self.filter.facets(&self.store, attr)
    }

    /// 筛选结果总数
    pub fn filtered_count(&self) -> usize {
        self.view.len()
    }

    /// 按标识符查询球拍详情，不受筛选条件影响
    pub fn racket(&self, id: &str) -> Option<&Racket> {
        self.store.find(id)
    }

    /// 详情页数据
    pub fn racket_detail(&self, id: &str) -> Option<RacketDetail> {
        self.racket(id).map(|racket| RacketDetail {
            display_name: racket.display_name(3),
            retailer_url: racket.retailer_search_url(),
            favorited: self.is_favorited(id),
            racket: racket.clone(),
        })
    }

    //===== 分页 =====

    pub fn current_page(&self) -> usize {
        self.page.current()
    }

    pub fn total_pages(&self) -> usize {
        self.page.total_pages(self.view.len())
    }

    pub fn next_page(&mut self) -> bool {
        self.page.next(self.view.len())
    }

    pub fn previous_page(&mut self) -> bool {
        self.page.previous()
    }

    /// 当前页的球拍
    pub fn page_items(&self) -> Vec<&Racket> {
        self.view.page(&self.store, &self.page)
    }

    //===== 收藏 =====

    pub fn is_favorited(&self, id: &str) -> bool {
        self.favorites.is_favorited(id)
    }

    pub fn is_syncing(&self, id: &str) -> bool {
        self.favorites.is_syncing(id)
    }

    pub fn favorite_ids(&self) -> Vec<String> {
        self.favorites.ids()
    }

    /// 乐观切换收藏，返回需要发往远端的请求
    pub fn toggle_favorite(&mut self, id: &str) -> Option<FavoriteRequest> {
        self.favorites.toggle(id)
    }

    /// 只在本地切换（匿名会话），返回切换后的状态
    pub fn toggle_favorite_local(&mut self, id: &str) -> bool {
        if self.favorites.toggle(id).is_some() {
            // 没有远端参与，直接视为成功
            let _ = self.favorites.complete(id, Ok(()));
        }
        self.favorites.is_favorited(id)
    }

    pub fn complete_favorite(
        &mut self,
        id: &str,
        result: Result<(), FavoriteSyncError>,
    ) -> Result<Option<FavoriteRequest>, FavoriteSyncError> {
        self.favorites.complete(id, result)
    }

    pub fn reconcile_favorites<I, S>(&mut self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.favorites.reconcile(ids);
    }

    //===== 视图 =====

    /// 展示层使用的只读快照
    pub fn view(&self) -> CatalogView {
        let rackets = self
            .page_items()
            .into_iter()
            .map(|racket| RacketCard {
                favorited: self.is_favorited(&racket.id),
                racket: racket.clone(),
            })
            .collect();

        CatalogView {
            status: self.store.status().clone(),
            ready: self.store.is_loaded(),
            rackets,
            total: self.view.len(),
            page: self.page.current(),
            page_size: self.page.page_size(),
            total_pages: self.total_pages(),
            search: self.criteria.search.clone(),
        }
    }

    // 重新计算筛选结果并修正页码
    fn recompute(&mut self) {
        self.view = self.filter.apply(&self.store, &self.criteria);
        self.page.clamp(self.view.len());
        debug_assert!(self.page.current() <= self.total_pages());
    }
}

impl Default for CatalogEngine {
    fn default() -> Self {
        Self::new(CatalogConfig::default())
    }
}
