use itertools::Itertools;

use crate::traits::*;

/// Samples an ensemble of independent chains using the same sampler S.
/// Each chain owns its state and its own random number generator,
/// so the outcome does not depend on how chains are scheduled.
pub struct EnsembleSampler<S>{
    pub sub_sampler: S,
}
impl<S> EnsembleSampler<S>{
    pub fn new(sub_sampler: S) -> Self{
        return Self{sub_sampler};
    }

    /// Advance every chain `n` times and report each chain's outcome.
    /// A failing chain stops at its error without affecting the others.
    pub fn advance_each<Rn>(&self, n: u64, states: &mut Vec<S::SampleType>, rng_vec: &mut Vec<Rn>)
        -> Vec<Result<(), S::Error>>
    where S: Sampler<Rn>
    {
        states.iter_mut().zip_eq(rng_vec.iter_mut())
            .map(|(xi, rng)| self.sub_sampler.advance_n(n, xi, rng))
            .collect()
    }
}

impl<Rn, S: Sampler<Rn>>
Sampler<Vec<Rn>> for EnsembleSampler<S>
{
    type SampleType=Vec<S::SampleType>;
    type Error=S::Error;

    fn advance(&self, state: &mut Vec<S::SampleType>, rng_vec: &mut Vec<Rn>) -> Result<(), S::Error> {
        for (xi, rng) in state.iter_mut().zip_eq(rng_vec.iter_mut()){
            self.sub_sampler.advance(xi, rng)?;
        }
        Ok(())
    }

    fn sweep(&self, state: &mut Vec<S::SampleType>, rng_vec: &mut Vec<Rn>) -> Result<(), S::Error> {
        for (xi, rng) in state.iter_mut().zip_eq(rng_vec.iter_mut()){
            self.sub_sampler.sweep(xi, rng)?;
        }
        Ok(())
    }
}
