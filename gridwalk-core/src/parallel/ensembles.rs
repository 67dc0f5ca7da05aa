use crate::traits::*;
use rayon::prelude::*;

/// Samples an ensemble of independent chains using the same sampler S,
/// one rayon task per chain. Gives the same results as
/// [`EnsembleSampler`](crate::ensembles::EnsembleSampler) for the same generators.
pub struct ThreadedEnsembleSampler<S>{
    pub sub_sampler: S,
}
impl<S> ThreadedEnsembleSampler<S>{
    pub fn new(sub_sampler: S) -> Self{
        return Self{sub_sampler};
    }

    pub fn advance_each<Rn>(&self, n: u64, states: &mut Vec<S::SampleType>, rng_vec: &mut Vec<Rn>)
        -> Vec<Result<(), S::Error>>
    where   Rn: Send,
            S: Sampler<Rn> + Sync,
            S::SampleType: Send,
            S::Error: Send
    {
        states.par_iter_mut().zip_eq(rng_vec.par_iter_mut())
            .map(|(xi, rng)| self.sub_sampler.advance_n(n, xi, rng))
            .collect()
    }
}


impl<Rn: Send, S >
Sampler<Vec<Rn>> for ThreadedEnsembleSampler<S>
where   S: Sampler<Rn> + Sync,
        S::SampleType: Send,
        S::Error: Send
{
    type SampleType=Vec<S::SampleType>;
    type Error=S::Error;

    fn advance(&self, state: &mut Vec<S::SampleType>, rng_vec: &mut Vec<Rn>) -> Result<(), S::Error> {
        state.par_iter_mut().zip_eq(rng_vec.par_iter_mut())
            .map(|(xi, rng)| self.sub_sampler.advance(xi, rng))
            .collect()
    }

    fn sweep(&self, state: &mut Vec<S::SampleType>, rng_vec: &mut Vec<Rn>) -> Result<(), S::Error> {
        state.par_iter_mut().zip_eq(rng_vec.par_iter_mut())
            .map(|(xi, rng)| self.sub_sampler.sweep(xi, rng))
            .collect()
    }
}
