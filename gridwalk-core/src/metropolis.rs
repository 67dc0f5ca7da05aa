//! Random walks over an [`Instance`].
//!
//! [`MetropolisHastingsSampler`] proposes a uniformly random neighbor and accepts it with probability
//!     $$ \alpha = \min(1, \frac{s(p)}{s(o)} \frac{d(o)}{d(p)}) $$
//! where $s$ is the score and $d$ the degree. The degree factor is the Hastings correction for the
//! asymmetric proposal `1/d(o)`, so the chain is in detailed balance with the distribution
//! proportional to $s$.
//!
//! [`UniformWalkSampler`] always moves and converges to the distribution proportional to $d$.
use num_traits::NumCast;
use num_traits::real::Real;
use rand::Rng;
use rand::distributions::{Distribution, Standard};

use crate::error::WalkError;
use crate::state::{NodeId, WalkState};
use crate::traits::{Instance, Sampler, State};

#[inline]
fn weight_of<W: Real>(n: usize) -> W{
    <W as NumCast>::from(n).expect("node degree must be representable as a weight")
}

/// Draw a uniformly random neighbor of `node`
#[inline]
fn propose<I, Rn>(instance: &I, node: NodeId, rng: &mut Rn) -> Result<NodeId, WalkError>
where I: Instance + ?Sized, Rn: Rng + ?Sized
{
    let nbrs = instance.neighbors(node);
    if nbrs.is_empty(){
        return Err(WalkError::EmptyNeighborhood(node));
    }
    Ok(nbrs[rng.gen_range(0..nbrs.len())])
}

pub struct MetropolisHastingsSampler<I: Instance>{
    pub instance: I,
}

impl<I: Instance> MetropolisHastingsSampler<I>{
    pub fn new(instance: I) -> Self{
        return Self{instance};
    }

    /// Unclamped acceptance ratio of the move `old_state -> proposal`.
    /// Values at or above one are always accepted.
    pub fn acceptance_ratio(&self, old_state: NodeId, proposal: NodeId) -> I::Weight{
        let score_ratio = self.instance.score(proposal) / self.instance.score(old_state);
        let degree_ratio = weight_of::<I::Weight>(self.instance.degree(old_state))
            / weight_of::<I::Weight>(self.instance.degree(proposal));
        return score_ratio * degree_ratio;
    }
}

impl<I, Rn> Sampler<Rn> for MetropolisHastingsSampler<I>
where I: Instance, Rn: Rng + ?Sized, Standard: Distribution<I::Weight>
{
    type SampleType = WalkState;
    type Error = WalkError;

    fn advance(&self, state: &mut WalkState, rng: &mut Rn) -> Result<(), WalkError> {
        let old_state = state.current();
        let proposal = propose(&self.instance, old_state, rng)?;
        let alpha = self.acceptance_ratio(old_state, proposal);
        let u: I::Weight = rng.sample(Standard);
        let accepted = u < alpha;
        state.record(old_state, accepted);
        if accepted{
            state.accept_move(proposal);
        }
        Ok(())
    }

    fn sweep(&self, state: &mut WalkState, rng: &mut Rn) -> Result<(), WalkError> {
        self.advance_n(self.instance.size() as u64, state, rng)
    }
}

/// Unbiased random walk: every proposal is accepted
pub struct UniformWalkSampler<I: Instance>{
    pub instance: I,
}

impl<I: Instance> UniformWalkSampler<I>{
    pub fn new(instance: I) -> Self{
        return Self{instance};
    }
}

impl<I, Rn> Sampler<Rn> for UniformWalkSampler<I>
where I: Instance, Rn: Rng + ?Sized
{
    type SampleType = WalkState;
    type Error = WalkError;

    fn advance(&self, state: &mut WalkState, rng: &mut Rn) -> Result<(), WalkError> {
        let old_state = state.current();
        let next = propose(&self.instance, old_state, rng)?;
        state.record(old_state, true);
        state.accept_move(next);
        Ok(())
    }

    fn sweep(&self, state: &mut WalkState, rng: &mut Rn) -> Result<(), WalkError> {
        self.advance_n(self.instance.size() as u64, state, rng)
    }
}

/// Pick an initial node uniformly at random, or validate the supplied one
pub fn initial_state<I, Rn>(instance: &I, initial: Option<NodeId>, record_trajectory: bool, rng: &mut Rn)
    -> Result<WalkState, WalkError>
where I: Instance + ?Sized, Rn: Rng + ?Sized
{
    let n = instance.size();
    let node = match initial{
        Some(node) => node,
        None => {
            if n == 0{
                return Err(WalkError::NodeOutOfRange{ node: NodeId(0), size: 0 });
            }
            NodeId(rng.gen_range(0..n as u32))
        }
    };
    WalkState::new(node, n, record_trajectory)
}
