use std::fmt::Formatter;
use std::time;

use anyhow::{bail, Context};
use log::{info, warn};
use rand::prelude::*;
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};

use gridwalk_core::ensembles::EnsembleSampler;
use gridwalk_core::metropolis::{initial_state, MetropolisHastingsSampler, UniformWalkSampler};
use gridwalk_core::parallel::ensembles::ThreadedEnsembleSampler;
use gridwalk_core::traits::*;
use gridwalk_core::{NodeId, WalkError, WalkState};

use crate::graph::{GraphSpec, WalkGraph};
use crate::results::{WalkResults, WalkSamples};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WalkKind{
    /// Score-targeting walk with the degree-corrected acceptance rule
    MetropolisHastings,
    /// Unconditional move to a uniformly random neighbor
    Uniform
}

impl std::fmt::Display for WalkKind{
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self{
            WalkKind::MetropolisHastings => write!(f, "Metropolis-Hastings"),
            WalkKind::Uniform => write!(f, "Uniform random walk")
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalkParams{
    pub graph: GraphSpec,
    /// Iterations per chain
    pub num_steps: u64,
    pub num_chains: u32,
    pub threads: u32,
    /// Start every chain here instead of at a uniformly random node
    pub initial_node: Option<u32>,
    pub record_trajectory: bool,
    pub seed: Option<u64>
}

impl Default for WalkParams{
    fn default() -> Self {
        Self{
            graph: GraphSpec::default(),
            num_steps: 10000,
            num_chains: 1,
            threads: 1,
            initial_node: None,
            record_trajectory: false,
            seed: None
        }
    }
}

pub struct WalkRunner<'a>{
    params: &'a WalkParams,
    instance: &'a WalkGraph,
}

impl<'a> WalkRunner<'a>{
    pub fn new(instance: &'a WalkGraph, params: &'a WalkParams) -> Self{
        return Self{params, instance};
    }

    fn seed_rng(&self) -> Xoshiro256PlusPlus{
        return match self.params.seed{
            Some(seed) => Xoshiro256PlusPlus::seed_from_u64(seed),
            None => {
                let mut rngt = thread_rng();
                let mut seed_seq = [0u8; 32];
                rngt.fill_bytes(&mut seed_seq);
                Xoshiro256PlusPlus::from_seed(seed_seq)
            }
        };
    }

    /// One non-overlapping stream per chain
    pub fn chain_rngs(&self, rng: &mut Xoshiro256PlusPlus) -> Vec<Xoshiro256PlusPlus>{
        let m = self.params.num_chains as usize;
        let mut rng_vec = Vec::with_capacity(m);
        for _ in 0..m{
            rng_vec.push(rng.clone());
            rng.jump();
        }
        return rng_vec;
    }

    pub fn generate_init_states(&self, rng_vec: &mut [Xoshiro256PlusPlus]) -> Result<Vec<WalkState>, WalkError>{
        let initial = self.params.initial_node.map(NodeId);
        rng_vec.iter_mut()
            .map(|rng| initial_state(self.instance, initial, self.params.record_trajectory, rng))
            .collect()
    }

    pub fn run(&self, kind: WalkKind) -> anyhow::Result<(WalkResults, WalkSamples)>{
        if self.params.num_chains == 0{
            bail!("num_chains must be at least 1");
        }
        let mut rng = self.seed_rng();
        let mut rng_vec = self.chain_rngs(&mut rng);
        let mut states = self.generate_init_states(&mut rng_vec)
            .context("Failed to initialize the chains")?;
        let initial_nodes: Vec<NodeId> = states.iter().map(|st| st.current()).collect();

        info!("-- {} begin", kind);
        let start = time::Instant::now();
        let outcomes = match kind{
            WalkKind::MetropolisHastings => {
                self.run_chains(MetropolisHastingsSampler::new(self.instance), &mut states, &mut rng_vec)?
            }
            WalkKind::Uniform => {
                self.run_chains(UniformWalkSampler::new(self.instance), &mut states, &mut rng_vec)?
            }
        };
        let end = start.elapsed();
        info!("-- {} finished", kind);
        info!("Duration: {:5.4} s", end.as_secs_f64());
        for (i, (outcome, st)) in outcomes.iter().zip(states.iter()).enumerate(){
            if let Err(e) = outcome{
                warn!("Chain {} stopped after {} steps: {}", i, st.num_steps(), e);
            }
        }

        let results = WalkResults::new(kind, self.params.clone(), self.instance,
                                       &initial_nodes, &states, &outcomes, end.as_secs_f64());
        let samples = WalkSamples::new(&initial_nodes, &states);
        return Ok((results, samples));
    }

    fn run_chains<S>(&self, sampler: S, states: &mut Vec<WalkState>, rng_vec: &mut Vec<Xoshiro256PlusPlus>)
        -> anyhow::Result<Vec<Result<(), WalkError>>>
    where S: Sampler<Xoshiro256PlusPlus, SampleType=WalkState, Error=WalkError> + Sync
    {
        let n = self.params.num_steps;
        if self.params.threads > 1{
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(self.params.threads as usize)
                .build()?;
            let ensemble = ThreadedEnsembleSampler::new(sampler);
            Ok(pool.install(|| ensemble.advance_each(n, states, rng_vec)))
        } else {
            let ensemble = EnsembleSampler::new(sampler);
            Ok(ensemble.advance_each(n, states, rng_vec))
        }
    }
}

#[cfg(test)]
mod tests{
    use crate::score::ScoreSpec;
    use super::*;

    fn params(num_chains: u32, threads: u32) -> WalkParams{
        WalkParams{
            num_steps: 20_000,
            num_chains,
            threads,
            record_trajectory: true,
            seed: Some(1234),
            ..Default::default()
        }
    }

    #[test]
    fn test_run_conserves_steps(){
        let g = WalkGraph::grid(5, 5, &ScoreSpec::default()).unwrap();
        let p = params(3, 1);
        let (results, samples) = WalkRunner::new(&g, &p).run(WalkKind::MetropolisHastings).unwrap();
        assert_eq!(results.visits.iter().sum::<u64>(), 3 * 20_000);
        assert_eq!(results.num_steps, 3 * 20_000);
        assert_eq!(results.num_failed(), 0);
        assert_eq!(samples.trajectories.len(), 3);
        for (traj, visits) in samples.trajectories.iter().zip(samples.visits.iter()){
            assert_eq!(traj.len(), 20_000);
            assert_eq!(visits.iter().sum::<u64>(), 20_000);
        }
    }

    #[test]
    fn test_seeded_runs_are_reproducible_across_threads(){
        let g = WalkGraph::grid(4, 3, &ScoreSpec::default()).unwrap();
        let (seq, seq_samples) = WalkRunner::new(&g, &params(4, 1)).run(WalkKind::MetropolisHastings).unwrap();
        let (par, par_samples) = WalkRunner::new(&g, &params(4, 4)).run(WalkKind::MetropolisHastings).unwrap();
        assert_eq!(seq.visits, par.visits);
        assert_eq!(seq_samples.trajectories, par_samples.trajectories);
        assert_eq!(seq_samples.initial_nodes, par_samples.initial_nodes);
    }

    #[test]
    fn test_chains_use_distinct_streams(){
        let g = WalkGraph::grid(5, 5, &ScoreSpec::default()).unwrap();
        let p = WalkParams{ initial_node: Some(0), ..params(2, 1) };
        let (_, samples) = WalkRunner::new(&g, &p).run(WalkKind::Uniform).unwrap();
        assert_eq!(samples.initial_nodes, vec![0, 0]);
        assert_ne!(samples.trajectories[0], samples.trajectories[1]);
    }

    #[test]
    fn test_converges_to_score_distribution(){
        let g = WalkGraph::grid(5, 5, &ScoreSpec::default()).unwrap();
        let p = WalkParams{ num_steps: 250_000, record_trajectory: false, ..params(4, 4) };
        let (results, _) = WalkRunner::new(&g, &p).run(WalkKind::MetropolisHastings).unwrap();
        println!("total variation: {}", results.total_variation);
        assert!(results.total_variation < 0.05);
    }

    #[test]
    fn test_failed_chain_is_reported(){
        // node 2 is isolated
        let g = WalkGraph::from_parts(3, &[(0, 1)], &[1.0, 1.0, 1.0]).unwrap();
        let p = WalkParams{ initial_node: Some(2), ..params(2, 2) };
        let (results, _) = WalkRunner::new(&g, &p).run(WalkKind::MetropolisHastings).unwrap();
        assert_eq!(results.num_failed(), 2);
        assert_eq!(results.num_steps, 0);
        assert!(results.chains.iter().all(|c| c.error.is_some() && c.num_steps == 0));
    }

    #[test]
    fn test_invalid_params(){
        let g = WalkGraph::grid(2, 2, &ScoreSpec::default()).unwrap();
        let p = WalkParams{ initial_node: Some(4), ..params(1, 1) };
        assert!(WalkRunner::new(&g, &p).run(WalkKind::MetropolisHastings).is_err());
        let p = params(0, 1);
        assert!(WalkRunner::new(&g, &p).run(WalkKind::MetropolisHastings).is_err());
    }

    #[test]
    fn test_params_yaml(){
        let p: WalkParams = serde_yaml::from_str("num_steps: 500\nseed: 3\n").unwrap();
        assert_eq!(p.num_steps, 500);
        assert_eq!(p.seed, Some(3));
        assert_eq!(p.num_chains, 1);
        assert_eq!(p.graph, GraphSpec::default());
        let s = serde_yaml::to_string(&p).unwrap();
        let q: WalkParams = serde_yaml::from_str(&s).unwrap();
        assert_eq!(p, q);
    }
}
