//! Session-wide player directory with a single-flight build.

use std::future::Future;
use std::path::Path;
use std::sync::{Arc, Mutex};

use futures::future::{BoxFuture, FutureExt, Shared};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::model::PlayerIndexEntry;
use crate::normalize::player_from_static_row;
use crate::transport::ApiError;

pub type PlayerIndex = Arc<Vec<PlayerIndexEntry>>;

type PendingBuild = Shared<BoxFuture<'static, Result<PlayerIndex, ApiError>>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexStatus {
    Unbuilt,
    Building,
    Ready,
}

enum IndexState {
    Unbuilt,
    Building(PendingBuild),
    Ready(PlayerIndex),
}

/// Holds the player index through `Unbuilt -> Building -> Ready`.
///
/// Every caller that arrives while a build is pending awaits that same build.
/// A failed build drops back to `Unbuilt`; `Ready` is final.
pub struct PlayerIndexCell {
    state: Mutex<IndexState>,
}

impl Default for PlayerIndexCell {
    fn default() -> Self {
        Self {
            state: Mutex::new(IndexState::Unbuilt),
        }
    }
}

impl PlayerIndexCell {
    pub fn status(&self) -> IndexStatus {
        match &*self.state.lock().expect("index lock should not be poisoned") {
            IndexState::Unbuilt => IndexStatus::Unbuilt,
            IndexState::Building(_) => IndexStatus::Building,
            IndexState::Ready(_) => IndexStatus::Ready,
        }
    }

    pub fn ready(&self) -> Option<PlayerIndex> {
        match &*self.state.lock().expect("index lock should not be poisoned") {
            IndexState::Ready(index) => Some(Arc::clone(index)),
            _ => None,
        }
    }

    /// `build` is only invoked when no index exists and none is pending.
    pub async fn get_or_build<F, Fut>(&self, build: F) -> Result<PlayerIndex, ApiError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<PlayerIndexEntry>, ApiError>> + Send + 'static,
    {
        let pending = {
            let mut state = self.state.lock().expect("index lock should not be poisoned");
            match &*state {
                IndexState::Ready(index) => return Ok(Arc::clone(index)),
                IndexState::Building(pending) => {
                    debug!(component = "player_index", event = "player_index.join_pending");
                    pending.clone()
                }
                IndexState::Unbuilt => {
                    info!(component = "player_index", event = "player_index.build.start");
                    let pending = track_build(build()).boxed().shared();
                    *state = IndexState::Building(pending.clone());
                    pending
                }
            }
        };

        let result = pending.clone().await;

        let mut state = self.state.lock().expect("index lock should not be poisoned");
        if let IndexState::Building(current) = &*state {
            if current.ptr_eq(&pending) {
                *state = match &result {
                    Ok(index) => IndexState::Ready(Arc::clone(index)),
                    Err(_) => IndexState::Unbuilt,
                };
            }
        }

        result
    }
}

async fn track_build<Fut>(build: Fut) -> Result<PlayerIndex, ApiError>
where
    Fut: Future<Output = Result<Vec<PlayerIndexEntry>, ApiError>>,
{
    match build.await {
        Ok(entries) => {
            info!(
                component = "player_index",
                event = "player_index.build.done",
                entries = entries.len()
            );
            Ok(Arc::new(entries))
        }
        Err(err) => {
            warn!(
                component = "player_index",
                event = "player_index.build.error",
                error = %err
            );
            Err(err)
        }
    }
}

/// Case-insensitive substring match on name, team and slug, in index order.
/// The query is matched as given; whitespace is significant.
pub fn search_index(entries: &[PlayerIndexEntry], query: &str, limit: usize) -> Vec<PlayerIndexEntry> {
    let needle = query.to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }

    entries
        .iter()
        .filter(|entry| {
            entry.name.to_lowercase().contains(&needle)
                || entry.team.to_lowercase().contains(&needle)
                || entry.slug.to_lowercase().contains(&needle)
        })
        .take(limit)
        .cloned()
        .collect()
}

/// Reads the pre-built dataset: a flat JSON array of player records.
pub async fn load_static_index(path: &Path) -> Result<Vec<PlayerIndexEntry>, ApiError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|err| ApiError::StaticIndex(format!("{}: {err}", path.display())))?;
    let rows: Vec<Value> = serde_json::from_slice(&bytes)
        .map_err(|err| ApiError::StaticIndex(format!("{}: {err}", path.display())))?;

    Ok(rows.iter().filter_map(player_from_static_row).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(slug: &str, name: &str, team: &str) -> PlayerIndexEntry {
        PlayerIndexEntry {
            slug: slug.to_string(),
            name: name.to_string(),
            team: team.to_string(),
            position: "Forward".to_string(),
            picture_url: None,
        }
    }

    fn directory() -> Vec<PlayerIndexEntry> {
        vec![
            entry("lionel-andres-messi-cuccittini", "Lionel Messi", "Inter Miami"),
            entry("denis-bouanga", "Denis Bouanga", "Los Angeles FC"),
            entry("riqui-puig", "Riqui Puig", "LA Galaxy"),
            entry("luis-suarez", "Luis Suárez", "Inter Miami"),
        ]
    }

    #[test]
    fn search_matches_name_team_and_slug_case_insensitively() {
        let entries = directory();

        let by_team = search_index(&entries, "inter MIAMI", 10);
        assert_eq!(
            by_team.iter().map(|e| e.slug.as_str()).collect::<Vec<_>>(),
            vec!["lionel-andres-messi-cuccittini", "luis-suarez"]
        );

        let by_slug = search_index(&entries, "cuccittini", 10);
        assert_eq!(by_slug.len(), 1);

        let by_name = search_index(&entries, "suárez", 10);
        assert_eq!(by_name[0].slug, "luis-suarez");
    }

    #[test]
    fn search_respects_limit_and_ignores_empty_queries() {
        let entries = directory();
        assert_eq!(search_index(&entries, "i", 2).len(), 2);
        assert!(search_index(&entries, "", 10).is_empty());
    }

    #[test]
    fn search_keeps_whitespace_in_the_query() {
        let entries = directory();
        assert_eq!(search_index(&entries, " ", 10).len(), 4);
        assert_eq!(search_index(&entries, "riqui puig", 10).len(), 1);
        assert!(search_index(&entries, "puig ", 10).is_empty());
    }

    #[tokio::test]
    async fn failed_build_resets_to_unbuilt_and_retries() {
        let cell = PlayerIndexCell::default();
        assert_eq!(cell.status(), IndexStatus::Unbuilt);

        let failed = cell
            .get_or_build(|| async {
                Err::<Vec<PlayerIndexEntry>, _>(ApiError::Transport("offline".to_string()))
            })
            .await;
        assert_eq!(failed, Err(ApiError::Transport("offline".to_string())));
        assert_eq!(cell.status(), IndexStatus::Unbuilt);
        assert!(cell.ready().is_none());

        let built = cell
            .get_or_build(|| async { Ok::<_, ApiError>(directory()) })
            .await
            .unwrap();
        assert_eq!(built.len(), 4);
        assert_eq!(cell.status(), IndexStatus::Ready);

        let again = cell
            .get_or_build(|| async { Err::<Vec<PlayerIndexEntry>, _>(ApiError::NotConfigured) })
            .await
            .unwrap();
        assert!(Arc::ptr_eq(&built, &again));
    }
}
