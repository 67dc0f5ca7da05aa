use gridwalk::{Prog, run_program};
use structopt::StructOpt;


fn main() -> anyhow::Result<()>{
    let opts: Prog = StructOpt::from_args();
    let result = run_program(opts);
    result.map_err(|e| {
        eprintln!("gridwalk terminated with an error:\n{:#}", &e);
        eprintln!(" * * * * * * ");
        e
    }).map(|x|{
        println!("gridwalk finished successfully");
        eprintln!(" * * * * * * ");
        x
    })
}
