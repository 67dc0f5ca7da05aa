use std::ffi::OsStr;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use itertools::Itertools;
use ndarray::prelude::*;
use serde::{Deserialize, Serialize};

use gridwalk_core::traits::Instance;
use gridwalk_core::{NodeId, WalkError, WalkState};
use gridwalk_core::state::merge_visits;

use crate::graph::WalkGraph;
use crate::walk::{WalkKind, WalkParams};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainSummary{
    pub initial_node: u32,
    pub final_node: u32,
    pub num_steps: u64,
    pub num_acceptances: u64,
    pub acceptance_rate: f64,
    /// Set when the chain stopped early
    pub error: Option<String>
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalkResults{
    pub method: WalkKind,
    pub params: WalkParams,
    /// Wall-clock duration of the sampling loop in seconds
    pub timing: f64,
    pub num_nodes: u64,
    pub num_edges: u64,
    pub grid_shape: Option<(u32, u32)>,
    /// Completed iterations summed over all chains
    pub num_steps: u64,
    /// Visit histogram merged over all chains
    pub visits: Vec<u64>,
    pub frequencies: Vec<f64>,
    /// Stationary distribution of the method on this graph
    pub target: Vec<f64>,
    pub total_variation: f64,
    pub chains: Vec<ChainSummary>
}

impl WalkResults{
    pub fn new(method: WalkKind, params: WalkParams, instance: &WalkGraph,
               initial_nodes: &[NodeId], states: &[WalkState], outcomes: &[Result<(), WalkError>],
               timing: f64) -> Self
    {
        let chains = initial_nodes.iter().zip_eq(states.iter()).zip_eq(outcomes.iter())
            .map(|((init, st), outcome)| ChainSummary{
                initial_node: init.0,
                final_node: st.current().0,
                num_steps: st.num_steps(),
                num_acceptances: st.num_acceptances(),
                acceptance_rate: st.acceptance_rate(),
                error: outcome.as_ref().err().map(|e| e.to_string())
            })
            .collect();
        let mut visits = merge_visits(states);
        visits.resize(instance.size(), 0);
        let frequencies = empirical_frequencies(&visits);
        let target = target_distribution(method, instance);
        let total_variation = total_variation(&frequencies, &target);

        return Self{
            method,
            params,
            timing,
            num_nodes: instance.size() as u64,
            num_edges: instance.num_edges() as u64,
            grid_shape: instance.grid_shape(),
            num_steps: visits.iter().sum(),
            visits,
            frequencies,
            target,
            total_variation,
            chains
        };
    }

    pub fn num_failed(&self) -> usize{
        self.chains.iter().filter(|c| c.error.is_some()).count()
    }

    /// Visits laid out as `height x width`, row `y`, column `x`. `None` unless the graph is a grid
    pub fn visit_grid(&self) -> Option<Array2<u64>>{
        let (w, h) = self.grid_shape?;
        Array2::from_shape_vec((h as usize, w as usize), self.visits.clone()).ok()
    }

    pub fn frequency_grid(&self) -> Option<Array2<f64>>{
        let (w, h) = self.grid_shape?;
        Array2::from_shape_vec((h as usize, w as usize), self.frequencies.clone()).ok()
    }
}

/// Normalized score for Metropolis-Hastings, normalized degree for the uniform walk
pub fn target_distribution(method: WalkKind, instance: &WalkGraph) -> Vec<f64>{
    let weights: Vec<f64> = match method{
        WalkKind::MetropolisHastings => instance.scores().to_vec(),
        WalkKind::Uniform => (0..instance.size() as u32)
            .map(|i| instance.degree(NodeId(i)) as f64).collect()
    };
    let total: f64 = weights.iter().sum();
    if total <= 0.0{
        return vec![0.0; weights.len()];
    }
    weights.into_iter().map(|w| w / total).collect()
}

pub fn empirical_frequencies(visits: &[u64]) -> Vec<f64>{
    let total: u64 = visits.iter().sum();
    if total == 0{
        return vec![0.0; visits.len()];
    }
    visits.iter().map(|&v| (v as f64) / (total as f64)).collect()
}

pub fn total_variation(p: &[f64], q: &[f64]) -> f64{
    0.5 * p.iter().zip_eq(q.iter()).map(|(a, b)| (a - b).abs()).sum::<f64>()
}

/// One row per node: `node,x,y,score,visits,frequency,target`. Coordinates are empty off-grid
pub fn write_histogram_csv(path: &str, instance: &WalkGraph, results: &WalkResults) -> std::io::Result<()>{
    let mut f = BufWriter::new(File::create(path)?);
    writeln!(f, "node,x,y,score,visits,frequency,target")?;
    for i in 0..instance.size(){
        let node = NodeId(i as u32);
        let (x, y) = match instance.coord(node){
            Some(c) => (c.x.to_string(), c.y.to_string()),
            None => (String::new(), String::new())
        };
        writeln!(f, "{},{},{},{},{},{},{}", i, x, y, instance.score(node),
                 results.visits[i], results.frequencies[i], results.target[i])?;
    }
    f.flush()
}

/// Raw chain output for post-hoc inspection and rendering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalkSamples{
    pub num_nodes: u64,
    pub initial_nodes: Vec<u32>,
    /// Per chain, the node occupied at the start of each iteration. Empty unless recorded
    pub trajectories: Vec<Vec<u32>>,
    pub visits: Vec<Vec<u64>>
}

impl WalkSamples{
    pub fn new(initial_nodes: &[NodeId], states: &[WalkState]) -> Self{
        let num_nodes = states.first().map_or(0, |st| st.visits().len() as u64);
        return Self{
            num_nodes,
            initial_nodes: initial_nodes.iter().map(|n| n.0).collect(),
            trajectories: states.iter()
                .map(|st| st.trajectory().map_or_else(Vec::new, |t| t.iter().map(|n| n.0).collect()))
                .collect(),
            visits: states.iter().map(|st| st.visits().to_vec()).collect()
        };
    }

    /// Pickle for a `.pkl` extension, bincode otherwise
    pub fn write(&self, path: &str) -> anyhow::Result<()>{
        let mut f = BufWriter::new(File::create(path)?);
        let ext = Path::new(path).extension().and_then(OsStr::to_str);
        if ext == Some("pkl"){
            serde_pickle::to_writer(&mut f, self, serde_pickle::SerOptions::new())?;
        } else {
            bincode::serialize_into(&mut f, self)?;
        }
        f.flush()?;
        Ok(())
    }
}
