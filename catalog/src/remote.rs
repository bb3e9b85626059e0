//! 远端协作方：球拍列表接口和收藏接口
//!
//! 核心逻辑只依赖 `RacketSource` / `FavoriteRemote` 两个 trait，
//! 浏览器中由 `HttpBackend` 通过 fetch 实现。

use futures::future::LocalBoxFuture;
use futures::FutureExt;
use std::cell::RefCell;
use utils_common::Racket;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, RequestMode, Response};

use crate::config::CatalogConfig;
use crate::engine::CatalogEngine;
use crate::error::{FavoriteSyncError, LoadError};
use crate::favorites::FavoriteOp;
use crate::models::{parse_rackets, FavoriteBody, FavoriteResponse};

/// 获取全部球拍，不带任何筛选或分页参数
pub trait RacketSource {
    fn fetch_all(&self) -> LocalBoxFuture<'_, Result<Vec<Racket>, LoadError>>;
}

/// 远端收藏存储
pub trait FavoriteRemote {
    fn post_favorite<'a>(
        &'a self,
        user_id: &'a str,
        item_id: &'a str,
    ) -> LocalBoxFuture<'a, Result<(), FavoriteSyncError>>;

    fn delete_favorite<'a>(
        &'a self,
        user_id: &'a str,
        item_id: &'a str,
    ) -> LocalBoxFuture<'a, Result<(), FavoriteSyncError>>;
}

/// 发起一次加载；加载期间又有新的加载时，只有最后一次的结果生效
pub async fn load_rackets<S>(engine: &RefCell<CatalogEngine>, source: &S) -> bool
where
    S: RacketSource + ?Sized,
{
    let ticket = engine.borrow_mut().begin_load();
    let result = source.fetch_all().await;
    engine.borrow_mut().finish_load(ticket, result)
}

/// 切换收藏并与远端同步，返回最终的本地收藏状态。
///
/// 匿名会话只在本地切换。远端失败时本地状态已回滚，错误原样返回。
pub async fn sync_toggle<R>(
    engine: &RefCell<CatalogEngine>,
    remote: &R,
    user_id: Option<&str>,
    item_id: &str,
) -> Result<bool, FavoriteSyncError>
where
    R: FavoriteRemote + ?Sized,
{
    let Some(user_id) = user_id else {
        log::debug!("匿名会话，收藏只保存在本地: {}", item_id);
        return Ok(engine.borrow_mut().toggle_favorite_local(item_id));
    };

    let mut request = engine.borrow_mut().toggle_favorite(item_id);
    while let Some(req) = request.take() {
        let result = match req.op {
            FavoriteOp::Add => remote.post_favorite(user_id, &req.item_id).await,
            FavoriteOp::Remove => remote.delete_favorite(user_id, &req.item_id).await,
        };
        request = engine.borrow_mut().complete_favorite(&req.item_id, result)?;
    }

    Ok(engine.borrow().is_favorited(item_id))
}

/// 基于浏览器 fetch 的接口实现
#[derive(Debug, Clone)]
pub struct HttpBackend {
    rackets_endpoint: String,
    favorites_endpoint: String,
}

impl HttpBackend {
    pub fn new(config: &CatalogConfig) -> Self {
        Self {
            rackets_endpoint: config.rackets_endpoint.clone(),
            favorites_endpoint: config.favorites_endpoint.clone(),
        }
    }

    async fn load(&self) -> Result<Vec<Racket>, LoadError> {
        let (status, body) = send("GET", &self.rackets_endpoint, None)
            .await
            .map_err(LoadError::Transport)?;
        rackets_from_response(status, &body)
    }

    async fn mutate(&self, method: &str, user_id: &str, item_id: &str) -> Result<(), FavoriteSyncError> {
        let body = serde_json::to_string(&FavoriteBody {
            racket_id: item_id,
            user_id,
        })
        .map_err(|e| FavoriteSyncError::Transport(e.to_string()))?;

        let (status, text) = send(method, &self.favorites_endpoint, Some(body))
            .await
            .map_err(FavoriteSyncError::Transport)?;
        favorite_from_response(status, &text)
    }
}

/// 球拍列表接口的响应映射：非 2xx 为 `Http`，正文无法解析为 `Parse`
pub fn rackets_from_response(status: u16, body: &str) -> Result<Vec<Racket>, LoadError> {
    if !(200..300).contains(&status) {
        return Err(LoadError::Http { status });
    }
    parse_rackets(body).map_err(|e| LoadError::Parse(e.to_string()))
}

/// 收藏接口的响应映射：`success: false` 为 `Rejected`，其余失败都是 `Transport`
pub fn favorite_from_response(status: u16, body: &str) -> Result<(), FavoriteSyncError> {
    if !(200..300).contains(&status) {
        return Err(FavoriteSyncError::Transport(format!("HTTP {}", status)));
    }

    let response: FavoriteResponse = serde_json::from_str(body)
        .map_err(|e| FavoriteSyncError::Transport(format!("无法解析响应: {}", e)))?;
    if response.success {
        Ok(())
    } else {
        Err(FavoriteSyncError::Rejected(response.error))
    }
}

impl RacketSource for HttpBackend {
    fn fetch_all(&self) -> LocalBoxFuture<'_, Result<Vec<Racket>, LoadError>> {
        self.load().boxed_local()
    }
}

impl FavoriteRemote for HttpBackend {
    fn post_favorite<'a>(
        &'a self,
        user_id: &'a str,
        item_id: &'a str,
    ) -> LocalBoxFuture<'a, Result<(), FavoriteSyncError>> {
        self.mutate("POST", user_id, item_id).boxed_local()
    }

    fn delete_favorite<'a>(
        &'a self,
        user_id: &'a str,
        item_id: &'a str,
    ) -> LocalBoxFuture<'a, Result<(), FavoriteSyncError>> {
        self.mutate("DELETE", user_id, item_id).boxed_local()
    }
}

// 发送请求，返回状态码和响应文本
async fn send(method: &str, url: &str, body: Option<String>) -> Result<(u16, String), String> {
    let window = web_sys::window().ok_or_else(|| "没有可用的 window 对象".to_string())?;

    let init = RequestInit::new();
    init.set_method(method);
    init.set_mode(RequestMode::SameOrigin);
    if let Some(body) = &body {
        init.set_body(&JsValue::from_str(body));
    }

    let request = Request::new_with_str_and_init(url, &init).map_err(js_error)?;
    if body.is_some() {
        request
            .headers()
            .set("Content-Type", "application/json")
            .map_err(js_error)?;
    }

    let response: Response = JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(js_error)?
        .dyn_into()
        .map_err(js_error)?;
    let text = JsFuture::from(response.text().map_err(js_error)?)
        .await
        .map_err(js_error)?;

    Ok((response.status(), text.as_string().unwrap_or_default()))
}

fn js_error(value: JsValue) -> String {
    value
        .as_string()
        .unwrap_or_else(|| format!("{:?}", value))
}
