use anyhow::Context;
use simple_logger::SimpleLogger;
use structopt::StructOpt;
use gridwalk::results::WalkResults;

#[derive(Debug, StructOpt)]
#[structopt(name = "walk-report", about = "Summarize the visit histogram of a finished walk.")]
struct WalkReport{
    /// Print only the nodes whose frequency deviates from the target by more than this (relative)
    #[structopt(long, default_value="0.0")]
    min_deviation: f64,
    results: String
}

fn main() -> anyhow::Result<()> {
    let prog: WalkReport = StructOpt::from_args();
    SimpleLogger::new().with_level(log::LevelFilter::Warn).init()?;
    let yaml_str = std::fs::read_to_string(&prog.results)
        .with_context(|| format!("Failed to read {}", prog.results))?;
    let results: WalkResults = serde_yaml::from_str(&yaml_str)
        .with_context(|| format!("{} is not a walk results file", prog.results))?;

    println!(" * {} *", results.method);
    println!("nodes: {}  edges: {}  steps: {}  chains: {}",
             results.num_nodes, results.num_edges, results.num_steps, results.chains.len());
    for (i, c) in results.chains.iter().enumerate(){
        print!("chain {}: {} -> {}, {} steps, acceptance {:5.4}",
               i, c.initial_node, c.final_node, c.num_steps, c.acceptance_rate);
        match &c.error{
            Some(e) => println!(" (stopped: {})", e),
            None => println!()
        }
    }

    println!("{:>6} {:>10} {:>10} {:>10} {:>8}", "node", "visits", "freq", "target", "dev");
    for (i, ((&v, &p), &q)) in results.visits.iter()
            .zip(results.frequencies.iter())
            .zip(results.target.iter()).enumerate(){
        let dev = if q > 0.0 { (p - q) / q } else { 0.0 };
        if dev.abs() >= prog.min_deviation{
            println!("{:>6} {:>10} {:>10.5} {:>10.5} {:>+8.3}", i, v, p, q, dev);
        }
    }
    println!("total variation distance: {:6.5}", results.total_variation);

    if let Some(grid) = results.visit_grid(){
        println!("\n ** Visits (row y, column x) **");
        println!("{}", grid);
    }
    Ok(())
}
