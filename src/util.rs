//! Reading graphs from adjacency-list text files.
//!
//! One entry per line: `i j [w]`. A diagonal entry `i i s` sets the score of node `i`;
//! an off-diagonal entry `i j` adds the undirected edge `{i, j}` (`w` is accepted and ignored).
//! Blank lines and `#` comments are skipped; any other line that does not parse is an error.
use std::collections::BTreeMap;
use std::fs::File;
use std::io;
use std::io::{BufRead, BufReader};
use std::str::FromStr;

use log::debug;
use nom::IResult;
use nom::character::complete::{digit1, multispace0, space0, space1};
use nom::combinator::{all_consuming, map_res, opt};
use nom::number::complete::double;
use nom::sequence::{preceded, terminated, tuple};
use petgraph::prelude::*;
use petgraph::Undirected;
use thiserror::Error;

fn parse_u32(s: &str) -> IResult<&str, u32> {
    map_res(digit1, u32::from_str)(s)
}

pub mod connectivity_list{
    use super::*;

    pub fn parse_line(line: &str) -> Result<(u32, u32, Option<f64>), nom::Err<nom::error::Error<&str>> > {
        let mut parser = all_consuming(terminated(
            tuple((
                preceded(space0, parse_u32),
                preceded(space1, parse_u32),
                opt(preceded(space1, double)))),
            multispace0));
        let (_, (i, j, w)) = parser(line)?;
        return Ok((i, j, w))
    }
}

/// Why an adjacency list was rejected. Line numbers start at 1
#[derive(Debug, Error)]
pub enum AdjacencyListError{
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("line {line}: {message}")]
    Parse{ line: usize, message: String },
    #[error("line {line}: node {node} is listed without a score")]
    MissingScore{ line: usize, node: usize },
    #[error("line {line}: edge ({i}, {j}) is listed more than once")]
    DuplicateEdge{ line: usize, i: usize, j: usize },
}

pub fn read_adjacency_list_from_file(filename: &str) -> Result<Vec<BTreeMap<usize, f64>>, AdjacencyListError> {
    let file = File::open(filename)?;
    read_adjacency_list(file)
}

/// Entry `(i, j)` of the result holds the score when `i == j` and the (unused) edge weight otherwise.
/// Off-diagonal entries are stored in both directions. The first malformed line aborts the read.
pub fn read_adjacency_list<R: io::Read>(input: R) -> Result<Vec<BTreeMap<usize, f64>>, AdjacencyListError>
{
    use connectivity_list::parse_line;
    use std::cmp::max;

    let reader = BufReader::new(input);

    let mut adj_list : Vec<BTreeMap<usize, f64>> = Vec::new();
    for (line_no, line) in reader.lines().enumerate(){
        let line = line?;
        let line_no = line_no + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#'){
            continue;
        }
        let (i, j, w) = parse_line(&line)
            .map_err(|e| AdjacencyListError::Parse{ line: line_no, message: e.to_string() })?;
        let i = i as usize; let j = j as usize;
        let m = max(i,j) + 1; //max number of indices, zero indexed
        if m as u64 >= u32::MAX as u64{
            return Err(AdjacencyListError::Parse{ line: line_no,
                message: format!("node index {} is too large", m - 1) });
        }
        if adj_list.len() < m{
            adj_list.resize(m, Default::default());
        }
        if i == j {
            let s = w.ok_or(AdjacencyListError::MissingScore{ line: line_no, node: i })?;
            if adj_list[i].insert(i, s).is_some(){
                return Err(AdjacencyListError::Parse{ line: line_no,
                    message: format!("the score of node {} is given more than once", i) });
            }
        } else {
            let w = w.unwrap_or(1.0);
            if adj_list[i].insert(j, w).is_some(){
                return Err(AdjacencyListError::DuplicateEdge{ line: line_no, i: i.min(j), j: i.max(j) });
            }
            adj_list[j].insert(i, w);
        }
    };
    debug!("Read an adjacency list of {} nodes", adj_list.len());

    Ok(adj_list)
}

/// Node weights are the scores, `None` for nodes that were never given one
pub fn adj_list_to_graph(adj_list: &[BTreeMap<usize, f64>]) -> Graph<Option<f64>, (), Undirected>{
    use petgraph::prelude::NodeIndex as Nd;
    let n = adj_list.len();
    let mut graph = Graph::new_undirected();
    graph.reserve_nodes(n);
    for _ in 0..n{
        graph.add_node(None);
    }

    for (i, l) in adj_list.iter().enumerate(){
        for (&j, &w) in l.iter(){
            if i == j{
                graph[Nd::new(i)] = Some(w)
            } else if i < j {
                graph.add_edge(Nd::new(i), Nd::new(j), ());
            }
        }
    }

    return graph;
}
