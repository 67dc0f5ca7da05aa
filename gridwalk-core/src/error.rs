use thiserror::Error;

use crate::state::NodeId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WalkError{
    /// The walker sits on a node with no neighbors and cannot propose a move.
    /// Fatal for the chain, but never for other chains.
    #[error("node {0} has no neighbors, no move can be proposed")]
    EmptyNeighborhood(NodeId),
    #[error("node {node} is out of range for an instance with {size} nodes")]
    NodeOutOfRange{ node: NodeId, size: usize },
}
