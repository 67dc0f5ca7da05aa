use std::fmt::Formatter;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::error::WalkError;
use crate::traits::State;

/// Opaque node identifier. Indexes the adjacency storage and the visit histogram.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(transparent)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl NodeId{
    #[inline]
    pub fn index(self) -> usize{
        self.0 as usize
    }
}

impl From<u32> for NodeId{
    fn from(i: u32) -> Self{
        NodeId(i)
    }
}

impl std::fmt::Display for NodeId{
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The state of a single random-walk chain.
///
/// `visits[i]` counts the iterations that *started* at node `i`, so the histogram
/// always sums to `num_steps`. The trajectory, if kept, holds the same
/// starting nodes in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalkState{
    current: NodeId,
    visits: Vec<u64>,
    trajectory: Option<Vec<NodeId>>,
    num_steps: u64,
    num_acceptances: u64,
}

impl WalkState{
    /// A fresh chain at `initial` on an instance with `size` nodes
    pub fn new(initial: NodeId, size: usize, record_trajectory: bool) -> Result<Self, WalkError>{
        if initial.index() >= size{
            return Err(WalkError::NodeOutOfRange{ node: initial, size });
        }
        let trajectory = if record_trajectory { Some(Vec::new()) } else { None };
        return Ok(Self{
            current: initial,
            visits: vec![0; size],
            trajectory,
            num_steps: 0,
            num_acceptances: 0
        });
    }

    pub fn current(&self) -> NodeId{
        self.current
    }
    pub fn visits(&self) -> &[u64]{
        &self.visits
    }
    pub fn trajectory(&self) -> Option<&[NodeId]>{
        self.trajectory.as_deref()
    }
    pub fn num_steps(&self) -> u64{
        self.num_steps
    }
    pub fn num_acceptances(&self) -> u64{
        self.num_acceptances
    }
    pub fn acceptance_rate(&self) -> f64{
        if self.num_steps == 0{
            return 0.0;
        }
        (self.num_acceptances as f64) / (self.num_steps as f64)
    }

    /// Book-keeping of one completed iteration that started at `old_state`.
    /// Must be called exactly once per iteration.
    pub(crate) fn record(&mut self, old_state: NodeId, accepted: bool){
        self.visits[old_state.index()] += 1;
        if let Some(traj) = self.trajectory.as_mut(){
            traj.push(old_state);
        }
        self.num_steps += 1;
        if accepted{
            self.num_acceptances += 1;
        }
    }
}

impl State<NodeId> for WalkState{
    fn accept_move(&mut self, mv: NodeId) {
        self.current = mv;
    }
}

/// Sum the histograms of independent chains. Only meaningful after all chains completed.
pub fn merge_visits<'a, It>(states: It) -> Vec<u64>
where It: IntoIterator<Item=&'a WalkState>
{
    let mut merged: Vec<u64> = Vec::new();
    for st in states{
        if merged.is_empty(){
            merged.resize(st.visits.len(), 0);
        }
        for (m, &v) in merged.iter_mut().zip_eq(st.visits.iter()){
            *m += v;
        }
    }
    return merged;
}
