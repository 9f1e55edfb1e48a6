//! Remote data cache ("items store").
//!
//! Source of truth for full domain nodes and relations; the graph mirror store
//! only keeps renderable copies. Lookups that miss the cache go to the
//! [`GraphApi`], and concurrent lookups of the same missing id share a single
//! request: the first caller fetches, later callers wait for its outcome.

use crate::api::GraphApi;
use crate::error::{ApiError, ApiResult};
use crate::geometry::Point;
use crate::types::{Node, NodeId, Relation, RelationDirection, RelationId};
use indexmap::IndexMap;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, trace};

type Outcome<T> = ApiResult<Option<T>>;

enum Claim<T> {
    /// This caller performs the fetch and must complete the claim
    Leader(watch::Sender<Option<Outcome<T>>>),
    /// Another caller is fetching; wait for its outcome
    Follower(watch::Receiver<Option<Outcome<T>>>),
}

/// Per-id in-flight request table.
struct SingleFlight<T> {
    pending: Mutex<HashMap<String, watch::Receiver<Option<Outcome<T>>>>>,
}

impl<T: Clone> SingleFlight<T> {
    fn new() -> Self {
        Self {
            pending: Mutex::new(HashMap::new()),
        }
    }

    fn claim(&self, id: &str) -> Claim<T> {
        let mut pending = self.pending.lock();
        if let Some(rx) = pending.get(id) {
            // A leader that was dropped mid-flight leaves a closed channel behind
            if rx.has_changed().is_ok() {
                return Claim::Follower(rx.clone());
            }
        }
        let (tx, rx) = watch::channel(None);
        pending.insert(id.to_string(), rx);
        Claim::Leader(tx)
    }

    fn complete(&self, id: &str, tx: watch::Sender<Option<Outcome<T>>>, outcome: Outcome<T>) {
        self.pending.lock().remove(id);
        tx.send_replace(Some(outcome));
    }

    async fn wait(mut rx: watch::Receiver<Option<Outcome<T>>>) -> Outcome<T> {
        match rx.wait_for(Option::is_some).await {
            Ok(value) => value
                .clone()
                .unwrap_or_else(|| Err(ApiError::Transport("request cancelled".into()))),
            Err(_) => Err(ApiError::Transport("request cancelled".into())),
        }
    }

    fn in_flight(&self) -> usize {
        self.pending.lock().len()
    }
}

/// Fetch whichever of `ids` are missing from `cache`, coalescing with
/// requests already in flight. Returns the found items in `ids` order.
async fn load_many<T, F, Fut>(
    cache: &Mutex<IndexMap<String, T>>,
    flights: &SingleFlight<T>,
    ids: &[String],
    id_of: fn(&T) -> &str,
    fetch: F,
) -> ApiResult<Vec<T>>
where
    T: Clone,
    F: FnOnce(Vec<String>) -> Fut,
    Fut: Future<Output = ApiResult<Vec<T>>>,
{
    let mut leaders = Vec::new();
    let mut followers = Vec::new();
    {
        let cached = cache.lock();
        for id in ids {
            if cached.contains_key(id) {
                continue;
            }
            match flights.claim(id) {
                Claim::Leader(tx) => leaders.push((id.clone(), tx)),
                Claim::Follower(rx) => followers.push(rx),
            }
        }
    }

    let mut first_error = None;

    if !leaders.is_empty() {
        let wanted: Vec<String> = leaders.iter().map(|(id, _)| id.clone()).collect();
        trace!(count = wanted.len(), "fetching missing items");
        match fetch(wanted).await {
            Ok(items) => {
                let mut by_id: HashMap<String, T> = items
                    .into_iter()
                    .map(|item| (id_of(&item).to_string(), item))
                    .collect();
                for (id, tx) in leaders {
                    let item = by_id.remove(&id);
                    if let Some(item) = &item {
                        cache.lock().insert(id.clone(), item.clone());
                    }
                    flights.complete(&id, tx, Ok(item));
                }
            }
            Err(e) => {
                debug!("item fetch failed: {e}");
                for (id, tx) in leaders {
                    flights.complete(&id, tx, Err(e.clone()));
                }
                first_error = Some(e);
            }
        }
    }

    for rx in followers {
        if let Err(e) = SingleFlight::<T>::wait(rx).await {
            first_error.get_or_insert(e);
        }
    }

    if let Some(e) = first_error {
        return Err(e);
    }

    let cached = cache.lock();
    Ok(ids.iter().filter_map(|id| cached.get(id).cloned()).collect())
}

fn node_key(node: &Node) -> &str {
    &node.id
}

fn relation_key(relation: &Relation) -> &str {
    &relation.id
}

pub struct ItemsStore {
    api: Arc<dyn GraphApi>,
    nodes: Mutex<IndexMap<NodeId, Node>>,
    relations: Mutex<IndexMap<RelationId, Relation>>,
    node_flights: SingleFlight<Node>,
    relation_flights: SingleFlight<Relation>,
}

impl ItemsStore {
    pub fn new(api: Arc<dyn GraphApi>) -> Self {
        Self {
            api,
            nodes: Mutex::new(IndexMap::new()),
            relations: Mutex::new(IndexMap::new()),
            node_flights: SingleFlight::new(),
            relation_flights: SingleFlight::new(),
        }
    }

    pub fn api(&self) -> &Arc<dyn GraphApi> {
        &self.api
    }

    // ------------------------------------------------------------------
    // Nodes
    // ------------------------------------------------------------------

    /// Locally cached node only; never fetches.
    pub fn store_node(&self, id: &str) -> Option<Node> {
        self.nodes.lock().get(id).cloned()
    }

    pub fn store_nodes(&self, ids: &[NodeId]) -> Vec<Node> {
        let nodes = self.nodes.lock();
        ids.iter().filter_map(|id| nodes.get(id).cloned()).collect()
    }

    /// Cached nodes that exist in the database.
    pub fn store_non_pseudo_nodes(&self) -> Vec<Node> {
        self.nodes
            .lock()
            .values()
            .filter(|node| !node.is_pseudo())
            .cloned()
            .collect()
    }

    pub fn has_node(&self, id: &str) -> bool {
        self.nodes.lock().contains_key(id)
    }

    /// Cached node, or fetched from the remote collaborator.
    pub async fn get_node(&self, id: &str) -> ApiResult<Option<Node>> {
        let found = self.get_nodes(&[id.to_string()]).await?;
        Ok(found.into_iter().next())
    }

    /// Cached and fetched nodes in `ids` order; unknown ids are skipped.
    pub async fn get_nodes(&self, ids: &[NodeId]) -> ApiResult<Vec<Node>> {
        let api = self.api.clone();
        load_many(
            &self.nodes,
            &self.node_flights,
            ids,
            node_key,
            |wanted| async move { api.fetch_nodes(&wanted).await },
        )
        .await
    }

    pub fn set_node(&self, node: Node) {
        self.nodes.lock().insert(node.id.clone(), node);
    }

    pub fn set_nodes(&self, nodes: impl IntoIterator<Item = Node>) {
        let mut cached = self.nodes.lock();
        for node in nodes {
            cached.insert(node.id.clone(), node);
        }
    }

    /// Remove a node together with every cached relation attached to it.
    pub fn remove_node(&self, id: &str) -> Option<Node> {
        let removed = self.nodes.lock().shift_remove(id);
        self.relations.lock().retain(|_, relation| !relation.connects(id));
        removed
    }

    pub fn remove_nodes(&self, ids: &[NodeId]) {
        {
            let mut cached = self.nodes.lock();
            for id in ids {
                cached.shift_remove(id);
            }
        }
        self.relations
            .lock()
            .retain(|_, relation| !ids.iter().any(|id| relation.connects(id)));
    }

    /// Persist a node's position in its style record.
    pub fn set_node_position(&self, id: &str, position: Point) -> bool {
        let mut nodes = self.nodes.lock();
        let Some(node) = nodes.get_mut(id) else {
            return false;
        };
        node.style.insert("x".into(), position.x.to_string());
        node.style.insert("y".into(), position.y.to_string());
        true
    }

    pub fn node_count(&self) -> usize {
        self.nodes.lock().len()
    }

    // ------------------------------------------------------------------
    // Relations
    // ------------------------------------------------------------------

    pub fn store_relation(&self, id: &str) -> Option<Relation> {
        self.relations.lock().get(id).cloned()
    }

    pub fn store_relations(&self, ids: &[RelationId]) -> Vec<Relation> {
        let relations = self.relations.lock();
        ids.iter().filter_map(|id| relations.get(id).cloned()).collect()
    }

    pub fn has_relation(&self, id: &str) -> bool {
        self.relations.lock().contains_key(id)
    }

    pub async fn get_relation(&self, id: &str) -> ApiResult<Option<Relation>> {
        let found = self.get_relations(&[id.to_string()]).await?;
        Ok(found.into_iter().next())
    }

    pub async fn get_relations(&self, ids: &[RelationId]) -> ApiResult<Vec<Relation>> {
        let api = self.api.clone();
        load_many(
            &self.relations,
            &self.relation_flights,
            ids,
            relation_key,
            |wanted| async move { api.fetch_relations(&wanted).await },
        )
        .await
    }

    pub fn set_relation(&self, relation: Relation) {
        self.relations.lock().insert(relation.id.clone(), relation);
    }

    pub fn set_relations(&self, relations: impl IntoIterator<Item = Relation>) {
        let mut cached = self.relations.lock();
        for relation in relations {
            cached.insert(relation.id.clone(), relation);
        }
    }

    pub fn remove_relation(&self, id: &str) -> Option<Relation> {
        self.relations.lock().shift_remove(id)
    }

    pub fn remove_relations(&self, ids: &[RelationId]) {
        let mut cached = self.relations.lock();
        for id in ids {
            cached.shift_remove(id);
        }
    }

    pub fn relation_count(&self) -> usize {
        self.relations.lock().len()
    }

    /// Cached relations attached to `node_id`, each with its direction as seen
    /// from that node. Feeds the relation list of a focused node's details.
    pub fn relations_of(&self, node_id: &str) -> Vec<(RelationDirection, Relation)> {
        self.relations
            .lock()
            .values()
            .filter_map(|relation| {
                relation
                    .direction_from(node_id)
                    .map(|direction| (direction, relation.clone()))
            })
            .collect()
    }

    // ------------------------------------------------------------------

    /// Number of ids currently being fetched.
    pub fn in_flight(&self) -> usize {
        self.node_flights.in_flight() + self.relation_flights.in_flight()
    }

    pub fn clear(&self) {
        self.nodes.lock().clear();
        self.relations.lock().clear();
    }
}
