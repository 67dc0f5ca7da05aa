//!
//! Random walks on graphs whose long-run visit frequencies follow a prescribed distribution.
//!
//! Trait descriptions:
//!    An *instance* is an immutable graph together with a strictly positive score on each node,
//!    the unnormalized target distribution. It must be immutable and thread-safe.
//!
//!    A *state* is the mutable position of one chain, along with its visit histogram
//!    and (optionally) its trajectory
//!
//!    A *sampler* advances a state using immutable data, an instance,
//!    along with a random number generator
//!
//! Independent chains never share a state; their histograms are merged once all chains have finished.
//!
use std::fs::File;

use anyhow::{bail, Context};
use log::info;
use serde::{Deserialize, Serialize};
use simple_logger::SimpleLogger;
use structopt::StructOpt;

pub use gridwalk_core::{csr, ensembles, error, metropolis, parallel, state, traits};
pub use gridwalk_core::traits::*;
pub use gridwalk_core::{NodeId, WalkError, WalkState};

pub mod graph;
pub mod results;
pub mod score;
pub mod util;
pub mod walk;

use crate::graph::{GraphSpec, GraphValidationError, WalkGraph};
use crate::results::{write_histogram_csv, WalkResults};
use crate::walk::{WalkKind, WalkParams, WalkRunner};

#[derive(Debug, StructOpt)]
#[structopt(name = "gridwalk", about = "Metropolis-Hastings and uniform random walks on graphs.")]
pub struct Prog{
    /// YAML file with the walk method and its parameters
    pub method_file: String,
    #[structopt(short, long, default_value="walk_results.yml")]
    pub output_file: String,
    /// Adjacency-list file of the graph. Replaces the graph of the method file
    #[structopt(long)]
    pub instance: Option<String>,
    /// Per-chain trajectories and histograms (.pkl for pickle, bincode otherwise)
    #[structopt(long)]
    pub sample_output: Option<String>,
    #[structopt(long, help="Per-node visit counts as CSV")]
    pub histogram_output: Option<String>,
    /// Overrides the seed of the method file
    #[structopt(long)]
    pub seed: Option<u64>
}

impl Prog{
    pub fn read_method(&self) -> anyhow::Result<Method>{
        let yaml_str = std::fs::read_to_string(&self.method_file)
            .with_context(|| format!("Failed to read method file {}", self.method_file))?;
        let method: Method = serde_yaml::from_str(&yaml_str)
            .with_context(|| format!("Failed to parse method file {}", self.method_file))?;
        Ok(method)
    }

    pub fn read_instance(&self, params: &WalkParams) -> Result<WalkGraph, GraphValidationError>{
        return match &self.instance{
            Some(path) => WalkGraph::from_spec(&GraphSpec::File{ path: path.clone() }),
            None => WalkGraph::from_spec(&params.graph)
        };
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Method{
    MH(WalkParams),
    RandomWalk(WalkParams)
}

impl Method{
    pub fn kind(&self) -> WalkKind{
        match self{
            Method::MH(_) => WalkKind::MetropolisHastings,
            Method::RandomWalk(_) => WalkKind::Uniform
        }
    }
    pub fn params(&self) -> &WalkParams{
        match self{
            Method::MH(p) | Method::RandomWalk(p) => p
        }
    }
    pub fn params_mut(&mut self) -> &mut WalkParams{
        match self{
            Method::MH(p) | Method::RandomWalk(p) => p
        }
    }
}

pub fn run_program(prog: Prog) -> anyhow::Result<()>{
    SimpleLogger::new().with_level(log::LevelFilter::Info).env().init()?;
    let method = prog.read_method()?;
    run_method(&prog, method)?;
    Ok(())
}

/// Run the walk, write every requested output, then fail if any chain stopped early
pub fn run_method(prog: &Prog, mut method: Method) -> anyhow::Result<WalkResults>{
    if let Some(seed) = prog.seed{
        method.params_mut().seed = Some(seed);
    }
    let kind = method.kind();
    let params = method.params();
    let instance = prog.read_instance(params).context("Invalid graph")?;

    println!(" ** {} **", kind);
    info!("Graph: {} nodes, {} edges", instance.size(), instance.num_edges());
    info!("Number of steps: {} x {} chains", params.num_steps, params.num_chains);
    let runner = WalkRunner::new(&instance, params);
    let (results, samples) = runner.run(kind)?;
    println!("{} Done.", kind);
    println!("** Total variation distance to the target **");
    println!("  d = {:6.5}", results.total_variation);

    {
        let f = File::create(&prog.output_file)
            .with_context(|| format!("Failed to create yaml output file {}", prog.output_file))?;
        serde_yaml::to_writer(f, &results)
            .context("Failed to write to yaml file.")?;
    }
    if let Some(path) = &prog.sample_output{
        samples.write(path)
            .with_context(|| format!("Failed to write samples to {}", path))?;
    }
    if let Some(path) = &prog.histogram_output{
        write_histogram_csv(path, &instance, &results)
            .with_context(|| format!("Failed to write histogram to {}", path))?;
    }

    let failed = results.num_failed();
    if failed > 0{
        bail!("{} of {} chains stopped early, see {}", failed, results.chains.len(), prog.output_file);
    }
    Ok(results)
}
