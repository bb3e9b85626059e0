use wasm_bindgen::prelude::*;
use serde::Serialize;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen_futures::future_to_promise;
use utils_common::RacketAttribute;

// 导出模块
pub mod config;
pub mod engine;
pub mod error;
pub mod favorites;
pub mod filter;
pub mod logging;
pub mod models;
pub mod pagination;
pub mod remote;
pub mod store;

pub use config::CatalogConfig;
pub use engine::CatalogEngine;
pub use error::{CatalogError, ConfigError, FavoriteSyncError, LoadError};
pub use models::CatalogView;
pub use remote::{FavoriteRemote, HttpBackend, RacketSource};
pub use store::LoadStatus;

#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

/// 初始化函数 - 设置错误处理
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
}

/// 版本信息
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

impl From<CatalogError> for JsValue {
    fn from(e: CatalogError) -> Self {
        JsValue::from_str(&e.to_string())
    }
}

fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value)
        .map_err(|e| JsValue::from_str(&format!("序列化结果失败: {}", e)))
}

/// 球拍目录 JS 接口 - 每个实例拥有独立的目录状态
#[wasm_bindgen]
pub struct RacketCatalog {
    engine: Rc<RefCell<CatalogEngine>>,
    backend: Rc<HttpBackend>,
    user_id: Option<String>,
}

#[wasm_bindgen]
impl RacketCatalog {
    /// 用 JSON 配置创建目录，空字符串使用默认配置
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str) -> Result<RacketCatalog, JsValue> {
        let config = CatalogConfig::from_json(config_json).map_err(CatalogError::from)?;
        logging::init_logging(config.log_level());
        log::debug!("目录配置: 每页 {} 条, 接口 {}", config.page_size, config.rackets_endpoint);

        Ok(RacketCatalog {
            backend: Rc::new(HttpBackend::new(&config)),
            user_id: config.user_id.clone(),
            engine: Rc::new(RefCell::new(CatalogEngine::new(config))),
        })
    }

    /// 从接口加载全部球拍，完成后返回当前视图。
    /// 加载失败不会 reject，错误体现在视图的 status 中。
    pub fn load(&self) -> js_sys::Promise {
        let engine = Rc::clone(&self.engine);
        let backend = Rc::clone(&self.backend);
        future_to_promise(async move {
            remote::load_rackets(&engine, backend.as_ref()).await;
            let view = engine.borrow().view();
            to_js(&view)
        })
    }

    /// 从压缩快照加载
    #[wasm_bindgen(js_name = loadSnapshot)]
    pub fn load_snapshot(&self, data: &[u8]) -> Result<JsValue, JsValue> {
        self.engine
            .borrow_mut()
            .load_snapshot(data)
            .map_err(CatalogError::from)?;
        self.view()
    }

    pub fn view(&self) -> Result<JsValue, JsValue> {
        to_js(&self.engine.borrow().view())
    }

    #[wasm_bindgen(js_name = setSearchQuery)]
    pub fn set_search_query(&self, query: &str) -> Result<JsValue, JsValue> {
        self.engine.borrow_mut().set_search_query(query);
        self.view()
    }

    /// values 为字符串数组，空数组表示取消该属性的筛选
    #[wasm_bindgen(js_name = setCategoricalFilter)]
    pub fn set_categorical_filter(&self, attribute: &str, values: JsValue) -> Result<JsValue, JsValue> {
        let attr: RacketAttribute = attribute.parse().map_err(CatalogError::from)?;
        let values: Vec<String> = serde_wasm_bindgen::from_value(values)
            .map_err(|e| CatalogError::Argument(e.to_string()))?;
        self.engine.borrow_mut().set_categorical_filter(attr, values);
        self.view()
    }

    #[wasm_bindgen(js_name = clearFilters)]
    pub fn clear_filters(&self) -> Result<JsValue, JsValue> {
        self.engine.borrow_mut().clear_filters();
        self.view()
    }

    #[wasm_bindgen(js_name = nextPage)]
    pub fn next_page(&self) -> Result<JsValue, JsValue> {
        self.engine.borrow_mut().next_page();
        self.view()
    }

    #[wasm_bindgen(js_name = previousPage)]
    pub fn previous_page(&self) -> Result<JsValue, JsValue> {
        self.engine.borrow_mut().previous_page();
        self.view()
    }

    #[wasm_bindgen(js_name = currentPage)]
    pub fn current_page(&self) -> usize {
        self.engine.borrow().current_page()
    }

    #[wasm_bindgen(js_name = totalPages)]
    pub fn total_pages(&self) -> usize {
        self.engine.borrow().total_pages()
    }

    /// 某属性的所有取值及数量，用于构建多选项
    pub fn facets(&self, attribute: &str) -> Result<JsValue, JsValue> {
        let attr: RacketAttribute = attribute.parse().map_err(CatalogError::from)?;
        to_js(&self.engine.borrow().facets(attr))
    }

    /// 球拍详情，未找到时返回 null
    pub fn racket(&self, id: &str) -> Result<JsValue, JsValue> {
        match self.engine.borrow().racket_detail(id) {
            Some(detail) => to_js(&detail),
            None => Ok(JsValue::NULL),
        }
    }

    #[wasm_bindgen(js_name = isFavorited)]
    pub fn is_favorited(&self, id: &str) -> bool {
        self.engine.borrow().is_favorited(id)
    }

    #[wasm_bindgen(js_name = isSyncing)]
    pub fn is_syncing(&self, id: &str) -> bool {
        self.engine.borrow().is_syncing(id)
    }

    /// 切换收藏。本地状态立即更新；Promise 返回最终状态，远端失败时 reject
    #[wasm_bindgen(js_name = toggleFavorite)]
    pub fn toggle_favorite(&self, id: String) -> js_sys::Promise {
        let engine = Rc::clone(&self.engine);
        let backend = Rc::clone(&self.backend);
        let user_id = self.user_id.clone();
        future_to_promise(async move {
            let favorited = remote::sync_toggle(&engine, backend.as_ref(), user_id.as_deref(), &id)
                .await
                .map_err(CatalogError::from)?;
            Ok(JsValue::from_bool(favorited))
        })
    }

    /// 用远端的收藏列表覆盖本地集合
    #[wasm_bindgen(js_name = reconcileFavorites)]
    pub fn reconcile_favorites(&self, ids: JsValue) -> Result<(), JsValue> {
        let ids: Vec<String> = serde_wasm_bindgen::from_value(ids)
            .map_err(|e| CatalogError::Argument(e.to_string()))?;
        self.engine.borrow_mut().reconcile_favorites(ids);
        Ok(())
    }

    #[wasm_bindgen(js_name = favoriteIds)]
    pub fn favorite_ids(&self) -> Result<JsValue, JsValue> {
        to_js(&self.engine.borrow().favorite_ids())
    }
}
