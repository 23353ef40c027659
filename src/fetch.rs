use serde::Deserialize;

use crate::errors::RetmapError;
use crate::tree::{self, CardTree};

/// One item of the `GET <base>/cards/` response. The stream is stateful:
/// a group marker sets the path for every card that follows it.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ApiItem {
    Group(ApiGroup),
    Card(ApiCard),
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiGroup {
    pub group: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiCard {
    /// Not all backend versions send the card id.
    #[serde(default)]
    pub cid: Option<u64>,
    /// Last review time, Unix seconds.
    pub time: f64,
    pub difficulty: f64,
    pub stability: f64,
    pub decay: f64,
    pub front: String,
    pub back: String,
    #[serde(default)]
    pub paused: bool,
}

/// Dataset client plus the last successfully built tree.
///
/// `refresh` takes `&mut self`, so a second refresh cannot run against the
/// same store while one is in flight; callers serialize on the store. A
/// failed fetch records the error and leaves the previous tree untouched.
pub struct CardStore {
    client: reqwest::Client,
    base_url: String,
    tree: Option<CardTree>,
    last_error: Option<String>,
}

impl CardStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            tree: None,
            last_error: None,
        }
    }

    /// The last successfully loaded tree, if any.
    pub fn tree(&self) -> Option<&CardTree> {
        self.tree.as_ref()
    }

    /// The error from the most recent failed refresh. Cleared on success.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Fetch the dataset and rebuild the tree from scratch. No automatic
    /// retry; the caller re-invokes on user request.
    pub async fn refresh(&mut self) -> Result<(), RetmapError> {
        match self.fetch_items().await {
            Ok(items) => {
                let tree = tree::build_tree(&items);
                tracing::info!("dataset refresh: {} items, {} nodes", items.len(), tree.len());
                self.tree = Some(tree);
                self.last_error = None;
                Ok(())
            }
            Err(e) => {
                tracing::warn!("dataset refresh failed: {}", e);
                self.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    async fn fetch_items(&self) -> Result<Vec<ApiItem>, RetmapError> {
        let url = format!("{}/cards/", self.base_url.trim_end_matches('/'));
        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(RetmapError::HttpStatus(status.as_u16()));
        }
        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_format_distinguishes_markers_from_cards() {
        let raw = r#"[
            {"group":["Math","Algebra"]},
            {"cid":7,"time":1700000000,"difficulty":5.2,"stability":10,
             "decay":0.5,"front":"f","back":"b"},
            {"time":1700000000,"difficulty":3,"stability":0,"decay":0.2,
             "front":"f2","back":"b2","paused":true}
        ]"#;
        let items: Vec<ApiItem> = serde_json::from_str(raw).unwrap();
        assert_eq!(items.len(), 3);
        match &items[0] {
            ApiItem::Group(g) => assert_eq!(g.group, vec!["Math", "Algebra"]),
            _ => panic!("expected group marker"),
        }
        match &items[1] {
            ApiItem::Card(c) => {
                assert_eq!(c.cid, Some(7));
                assert!(!c.paused);
            }
            _ => panic!("expected card"),
        }
        match &items[2] {
            ApiItem::Card(c) => {
                assert_eq!(c.cid, None);
                assert!(c.paused);
            }
            _ => panic!("expected card"),
        }
    }

    #[test]
    fn failed_refresh_preserves_previous_tree() {
        // Store with no reachable backend: refresh errors, tree survives.
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let mut store = CardStore::new("http://127.0.0.1:1");
            store.tree = Some(crate::tree::CardTree::new());
            assert!(store.refresh().await.is_err());
            assert!(store.tree().is_some());
            assert!(store.last_error().is_some());
        });
    }
}
