use num_traits::real::Real;

use crate::state::NodeId;

/// A Markov Chain state is mutated by accepting moves proposed by a sampler
pub trait State<Mv>{
    fn accept_move(&mut self, mv: Mv);
}

/// An instance is the immutable graph a walker moves over, together with the
/// unnormalized target weight of each node.
/// It must be immutable and thread-safe. Neighborhoods are symmetric.
pub trait Instance{
    type Weight: Real;
    /// Number of nodes
    fn size(&self) -> usize;
    /// Nodes adjacent to `node`. Panics if `node` is not a node of the instance
    fn neighbors(&self, node: NodeId) -> &[NodeId];
    fn degree(&self, node: NodeId) -> usize{
        self.neighbors(node).len()
    }
    /// Unnormalized target weight of a node, strictly positive
    fn score(&self, node: NodeId) -> Self::Weight;
}

impl<'a, I: Instance + ?Sized> Instance for &'a I{
    type Weight = I::Weight;
    fn size(&self) -> usize{
        (**self).size()
    }
    fn neighbors(&self, node: NodeId) -> &[NodeId]{
        (**self).neighbors(node)
    }
    fn score(&self, node: NodeId) -> Self::Weight{
        (**self).score(node)
    }
}

/// General sampler type
pub trait Sampler<Rn: ?Sized>{
    type SampleType;
    type Error;
    fn advance(&self, state: &mut Self::SampleType, rng: &mut Rn) -> Result<(), Self::Error>;
    /// A sweep performs a number of advances that scales linearly with the system size.
    fn sweep(&self, state: &mut Self::SampleType, rng: &mut Rn) -> Result<(), Self::Error>;

    /// Advance `n` times, stopping at the first error
    fn advance_n(&self, n: u64, state: &mut Self::SampleType, rng: &mut Rn) -> Result<(), Self::Error>{
        for _ in 0..n{
            self.advance(state, rng)?;
        }
        Ok(())
    }

    fn sweep_n(&self, n: u64, state: &mut Self::SampleType, rng: &mut Rn) -> Result<(), Self::Error>{
        for _ in 0..n{
            self.sweep(state, rng)?;
        }
        Ok(())
    }
}
