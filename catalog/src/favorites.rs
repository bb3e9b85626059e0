//! 收藏状态跟踪
//!
//! 收藏切换分两个阶段：
//! 1. `toggle` 同步修改本地集合，并给出需要发送的远端请求；
//! 2. `complete` 在远端请求结束后应用结果。
//!
//! 同一个球拍同时最多只有一个请求在途。在途期间再次切换只改本地状态，
//! 请求成功后若本地状态与远端确认状态不一致，`complete` 返回补发请求。
//! 请求失败时本地状态回滚到最后一次远端确认的状态。

use std::collections::{HashMap, HashSet};

use crate::error::FavoriteSyncError;

/// 远端操作类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FavoriteOp {
    /// POST 收藏
    Add,
    /// DELETE 取消收藏
    Remove,
}

impl FavoriteOp {
    /// 操作成功后的收藏状态
    fn target(self) -> bool {
        matches!(self, FavoriteOp::Add)
    }

    fn towards(favorited: bool) -> Self {
        if favorited {
            FavoriteOp::Add
        } else {
            FavoriteOp::Remove
        }
    }
}

/// 需要发往远端的收藏请求
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FavoriteRequest {
    pub item_id: String,
    pub op: FavoriteOp,
}

// 在途请求
#[derive(Debug, Clone, Copy)]
struct InFlight {
    /// 远端最后确认的状态
    confirmed: bool,
    op: FavoriteOp,
}

/// 收藏集合及在途同步状态
#[derive(Debug, Default)]
pub struct FavoriteTracker {
    favorites: HashSet<String>,
    in_flight: HashMap<String, InFlight>,
}

impl FavoriteTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// O(1) 查询
    pub fn is_favorited(&self, item_id: &str) -> bool {
        self.favorites.contains(item_id)
    }

    pub fn is_syncing(&self, item_id: &str) -> bool {
        self.in_flight.contains_key(item_id)
    }

    pub fn is_empty(&self) -> bool {
        self.favorites.is_empty()
    }

    /// 当前收藏的标识符，已排序
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.favorites.iter().cloned().collect();
        ids.sort();
        ids
    }

    /// 第一阶段：立即切换本地状态。已有在途请求时返回 None，结果由 `complete` 合并
    pub fn toggle(&mut self, item_id: &str) -> Option<FavoriteRequest> {
        let was_favorited = self.favorites.remove(item_id);
        if !was_favorited {
            self.favorites.insert(item_id.to_string());
        }
        let op = FavoriteOp::towards(!was_favorited);

        if self.in_flight.contains_key(item_id) {
            log::debug!("收藏请求在途，合并本次切换: {}", item_id);
            return None;
        }

        self.in_flight.insert(
            item_id.to_string(),
            InFlight {
                confirmed: was_favorited,
                op,
            },
        );
        Some(FavoriteRequest {
            item_id: item_id.to_string(),
            op,
        })
    }

    /// 第二阶段：应用远端结果。
    ///
    /// 成功时如需补发请求则返回 `Ok(Some(..))`；失败时回滚本地状态并返回错误。
    /// 没有对应在途请求的结果会被忽略。
    pub fn complete(
        &mut self,
        item_id: &str,
        result: Result<(), FavoriteSyncError>,
    ) -> Result<Option<FavoriteRequest>, FavoriteSyncError> {
        let Some(pending) = self.in_flight.remove(item_id) else {
            log::warn!("忽略没有在途请求的收藏结果: {}", item_id);
            return Ok(None);
        };

        match result {
            Ok(()) => {
                let confirmed = pending.op.target();
                let desired = self.is_favorited(item_id);
                if desired == confirmed {
                    return Ok(None);
                }

                let op = FavoriteOp::towards(desired);
                self.in_flight
                    .insert(item_id.to_string(), InFlight { confirmed, op });
                Ok(Some(FavoriteRequest {
                    item_id: item_id.to_string(),
                    op,
                }))
            }
            Err(e) => {
                log::warn!("收藏同步失败，回滚 {}: {}", item_id, e);
                self.set_local(item_id, pending.confirmed);
                Err(e)
            }
        }
    }

    /// 用远端快照替换收藏集合。
    ///
    /// 在途请求对应的本地状态保持不变，但其确认状态更新为远端快照中的状态，
    /// 之后请求失败会回滚到这里。
    pub fn reconcile<I, S>(&mut self, remote_ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut next: HashSet<String> = remote_ids.into_iter().map(Into::into).collect();
        for (item_id, pending) in self.in_flight.iter_mut() {
            pending.confirmed = next.contains(item_id);
            if self.favorites.contains(item_id) {
                next.insert(item_id.clone());
            } else {
                next.remove(item_id);
            }
        }
        self.favorites = next;
    }

    fn set_local(&mut self, item_id: &str, favorited: bool) {
        if favorited {
            self.favorites.insert(item_id.to_string());
        } else {
            self.favorites.remove(item_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_adds_optimistically() {
        let mut tracker = FavoriteTracker::new();
        let request = tracker.toggle("1").unwrap();
        assert_eq!(request.op, FavoriteOp::Add);
        assert!(tracker.is_favorited("1"));
        assert!(tracker.is_syncing("1"));

        assert_eq!(tracker.complete("1", Ok(())), Ok(None));
        assert!(tracker.is_favorited("1"));
        assert!(!tracker.is_syncing("1"));
    }

    #[test]
    fn toggle_removes_existing_favorite() {
        let mut tracker = FavoriteTracker::new();
        tracker.reconcile(["1"]);
        let request = tracker.toggle("1").unwrap();
        assert_eq!(request.op, FavoriteOp::Remove);
        assert!(!tracker.is_favorited("1"));
    }

    #[test]
    fn failure_reverts_to_confirmed_state() {
        let mut tracker = FavoriteTracker::new();
        tracker.toggle("1");
        let err = tracker
            .complete("1", Err(FavoriteSyncError::Transport("offline".into())))
            .unwrap_err();
        assert_eq!(err, FavoriteSyncError::Transport("offline".into()));
        assert!(!tracker.is_favorited("1"));
        assert!(!tracker.is_syncing("1"));
    }

    #[test]
    fn double_toggle_round_trips_while_in_flight() {
        let mut tracker = FavoriteTracker::new();
        assert!(tracker.toggle("1").is_some());
        assert!(tracker.toggle("1").is_none());
        assert!(!tracker.is_favorited("1"));

        // 第一次请求成功后，需要补发一次取消收藏
        let follow_up = tracker.complete("1", Ok(())).unwrap().unwrap();
        assert_eq!(follow_up.op, FavoriteOp::Remove);
        assert_eq!(tracker.complete("1", Ok(())), Ok(None));
        assert!(!tracker.is_favorited("1"));
    }

    #[test]
    fn double_toggle_round_trips_after_settling() {
        let mut tracker = FavoriteTracker::new();
        tracker.toggle("1");
        tracker.complete("1", Ok(())).unwrap();
        let request = tracker.toggle("1").unwrap();
        assert_eq!(request.op, FavoriteOp::Remove);
        tracker.complete("1", Ok(())).unwrap();
        assert!(!tracker.is_favorited("1"));
    }

    #[test]
    fn failed_follow_up_reverts_to_last_success() {
        let mut tracker = FavoriteTracker::new();
        tracker.toggle("1");
        tracker.toggle("1");
        tracker.complete("1", Ok(())).unwrap();
        assert!(tracker
            .complete("1", Err(FavoriteSyncError::Rejected(None)))
            .is_err());
        // 远端已确认收藏
        assert!(tracker.is_favorited("1"));
    }

    #[test]
    fn reconcile_keeps_in_flight_state() {
        let mut tracker = FavoriteTracker::new();
        tracker.toggle("2");
        tracker.reconcile(["1", "3"]);
        assert_eq!(tracker.ids(), ["1", "2", "3"]);
    }

    #[test]
    fn reconcile_moves_rollback_target_of_in_flight_ids() {
        let mut tracker = FavoriteTracker::new();
        tracker.toggle("1");
        // 请求在途时远端快照显示已收藏
        tracker.reconcile(["1"]);
        assert!(tracker
            .complete("1", Err(FavoriteSyncError::Transport("offline".into())))
            .is_err());
        assert!(tracker.is_favorited("1"));

        tracker.reconcile(Vec::<String>::new());
        tracker.toggle("2");
        tracker.toggle("2");
        tracker.reconcile(["2"]);
        assert!(!tracker.is_favorited("2"));
        assert!(tracker.complete("2", Err(FavoriteSyncError::Rejected(None))).is_err());
        assert!(tracker.is_favorited("2"));
    }

    #[test]
    fn stray_completion_is_ignored() {
        let mut tracker = FavoriteTracker::new();
        assert_eq!(tracker.complete("9", Ok(())), Ok(None));
        assert!(tracker.is_empty());
    }
}
