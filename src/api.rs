//! Contract with the remote data collaborator.
//!
//! The HTTP layer itself lives outside this crate; the canvas only needs the
//! node and relation shapes from [`crate::types`] and the calls below.

use crate::error::ApiResult;
use crate::types::{Node, NodeConnection, NodeId, Relation, RelationId, StyleProperties};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Body of a node creation request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewNode {
    pub labels: Vec<NodeId>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub style: StyleProperties,
}

/// Body of a relation creation request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewRelation {
    pub source_id: NodeId,
    pub target_id: NodeId,
    #[serde(rename = "type")]
    pub relation_type: NodeId,
}

#[async_trait]
pub trait GraphApi: Send + Sync {
    async fn post_node(&self, node: NewNode) -> ApiResult<Node>;

    async fn post_relation(&self, relation: NewRelation) -> ApiResult<Relation>;

    async fn delete_node(&self, id: &str) -> ApiResult<()>;

    /// Bulk fetch. Ids unknown to the server are left out of the result.
    async fn fetch_nodes(&self, ids: &[NodeId]) -> ApiResult<Vec<Node>>;

    async fn fetch_relations(&self, ids: &[RelationId]) -> ApiResult<Vec<Relation>>;

    /// Relations touching `id` paired with the node on their other end.
    async fn node_connections(&self, id: &str) -> ApiResult<Vec<NodeConnection>>;

    /// All relations whose both endpoints are among `ids`.
    async fn relations_by_node_ids(&self, ids: &[NodeId]) -> ApiResult<Vec<Relation>>;
}
