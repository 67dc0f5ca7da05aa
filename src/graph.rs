use std::collections::HashSet;

use log::{debug, warn};
use petgraph::prelude::*;
use petgraph::Undirected;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use gridwalk_core::csr::Adjacency;
use gridwalk_core::traits::Instance;
use gridwalk_core::NodeId;

use crate::score::ScoreSpec;
use crate::util::{adj_list_to_graph, read_adjacency_list_from_file, AdjacencyListError};

/// Lattice coordinate of a grid node
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coord{
    pub x: u32,
    pub y: u32
}

/// Where the walk graph comes from. A file graph carries its own scores
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub enum GraphSpec{
    Grid{
        width: u32,
        height: u32,
        #[serde(default)]
        score: ScoreSpec
    },
    /// Adjacency-list file, see [`crate::util`]
    File{ path: String }
}

impl Default for GraphSpec{
    fn default() -> Self {
        GraphSpec::Grid{ width: 5, height: 5, score: ScoreSpec::default() }
    }
}

#[derive(Debug, Error)]
pub enum GraphValidationError{
    #[error("the graph has no nodes")]
    Empty,
    #[error("grid dimensions must be positive, got {width}x{height}")]
    ZeroDimension{ width: u32, height: u32 },
    #[error("a graph of {0} nodes exceeds the supported size")]
    TooLarge(u64),
    #[error("{scores} scores given for a graph of {nodes} nodes")]
    ScoreCountMismatch{ nodes: usize, scores: usize },
    #[error("node {0} has no score")]
    MissingScore(usize),
    #[error("node {node} has score {score}, scores must be positive and finite")]
    NonPositiveScore{ node: usize, score: f64 },
    #[error("edge ({0}, {1}) references a node outside of a graph of {2} nodes")]
    EdgeOutOfRange(u32, u32, usize),
    #[error("self-loop at node {0}")]
    SelfLoop(usize),
    #[error("edge ({0}, {1}) is listed more than once")]
    DuplicateEdge(usize, usize),
    #[error("{path}:{line}: {message}")]
    Parse{ path: String, line: usize, message: String },
    #[error("failed to read adjacency list {path}")]
    Io{
        path: String,
        #[source]
        source: std::io::Error
    },
}

/// An immutable, validated graph with a positive score on every node.
/// Grid graphs additionally map nodes to lattice coordinates, `index = y * width + x`.
#[derive(Debug, Clone)]
pub struct WalkGraph{
    adj: Adjacency,
    scores: Vec<f64>,
    grid: Option<(u32, u32)>
}

impl WalkGraph{
    /// `width` x `height` grid with edges between axis-aligned neighbors
    pub fn grid(width: u32, height: u32, score: &ScoreSpec) -> Result<Self, GraphValidationError>{
        if width == 0 || height == 0{
            return Err(GraphValidationError::ZeroDimension{ width, height });
        }
        let n = (width as u64) * (height as u64);
        if n >= u32::MAX as u64{
            return Err(GraphValidationError::TooLarge(n));
        }
        let n = n as usize;
        if let ScoreSpec::Explicit(v) = score{
            if v.len() != n{
                return Err(GraphValidationError::ScoreCountMismatch{ nodes: n, scores: v.len() });
            }
        }

        let mut graph: Graph<Option<f64>, (), Undirected> = Graph::with_capacity(n, 2*n);
        for y in 0..height{
            for x in 0..width{
                let idx = (y * width + x) as usize;
                graph.add_node(score.eval(idx, Some(Coord{x, y})));
            }
        }
        for y in 0..height{
            for x in 0..width{
                let q0 = NodeIndex::new((y * width + x) as usize);
                if x + 1 < width{
                    graph.add_edge(q0, NodeIndex::new((y * width + x + 1) as usize), ());
                }
                if y + 1 < height{
                    graph.add_edge(q0, NodeIndex::new(((y + 1) * width + x) as usize), ());
                }
            }
        }
        let mut g = Self::from_petgraph(&graph)?;
        g.grid = Some((width, height));
        return Ok(g);
    }

    /// Arbitrary undirected graph given by its edge list and one score per node
    pub fn from_parts(num_nodes: usize, edges: &[(u32, u32)], scores: &[f64]) -> Result<Self, GraphValidationError>{
        if scores.len() != num_nodes{
            return Err(GraphValidationError::ScoreCountMismatch{ nodes: num_nodes, scores: scores.len() });
        }
        let mut graph: Graph<Option<f64>, (), Undirected> = Graph::with_capacity(num_nodes, edges.len());
        for &s in scores{
            graph.add_node(Some(s));
        }
        for &(i, j) in edges{
            if i as usize >= num_nodes || j as usize >= num_nodes{
                return Err(GraphValidationError::EdgeOutOfRange(i, j, num_nodes));
            }
            graph.add_edge(NodeIndex::new(i as usize), NodeIndex::new(j as usize), ());
        }
        Self::from_petgraph(&graph)
    }

    pub fn from_adjacency_file(path: &str) -> Result<Self, GraphValidationError>{
        let adj_list = read_adjacency_list_from_file(path).map_err(|e| match e{
            AdjacencyListError::Io(source) => GraphValidationError::Io{ path: path.to_string(), source },
            AdjacencyListError::Parse{ line, message } =>
                GraphValidationError::Parse{ path: path.to_string(), line, message },
            AdjacencyListError::MissingScore{ node, .. } => GraphValidationError::MissingScore(node),
            AdjacencyListError::DuplicateEdge{ i, j, .. } => GraphValidationError::DuplicateEdge(i, j),
        })?;
        Self::from_petgraph(&adj_list_to_graph(&adj_list))
    }

    pub fn from_spec(spec: &GraphSpec) -> Result<Self, GraphValidationError>{
        return match spec{
            GraphSpec::Grid{ width, height, score } => Self::grid(*width, *height, score),
            GraphSpec::File{ path } => Self::from_adjacency_file(path)
        };
    }

    /// Validate and freeze a petgraph graph whose node weights are the scores.
    /// Isolated nodes are allowed; disconnected graphs are accepted with a warning.
    pub fn from_petgraph(graph: &Graph<Option<f64>, (), Undirected>) -> Result<Self, GraphValidationError>{
        let n = graph.node_count();
        if n == 0{
            return Err(GraphValidationError::Empty);
        }
        if n as u64 >= u32::MAX as u64{
            return Err(GraphValidationError::TooLarge(n as u64));
        }

        let mut scores = Vec::with_capacity(n);
        for (i, &w) in graph.node_weights().enumerate(){
            let s = w.ok_or(GraphValidationError::MissingScore(i))?;
            if !(s.is_finite() && s > 0.0){
                return Err(GraphValidationError::NonPositiveScore{ node: i, score: s });
            }
            scores.push(s);
        }

        let mut adj_list: Vec<Vec<NodeId>> = vec![Vec::new(); n];
        let mut seen = HashSet::with_capacity(graph.edge_count());
        for e in graph.edge_references(){
            let (a, b) = (e.source().index(), e.target().index());
            if a == b{
                return Err(GraphValidationError::SelfLoop(a));
            }
            let key = if a < b { (a, b) } else { (b, a) };
            if !seen.insert(key){
                return Err(GraphValidationError::DuplicateEdge(key.0, key.1));
            }
            adj_list[a].push(NodeId(b as u32));
            adj_list[b].push(NodeId(a as u32));
        }
        for row in adj_list.iter_mut(){
            row.sort_unstable();
        }

        let components = petgraph::algo::connected_components(graph);
        if components > 1{
            warn!("The graph has {} connected components. Each chain stays in the component it starts in.",
                  components);
        }
        debug!("Graph: {} nodes, {} edges", n, seen.len());

        return Ok(Self{ adj: Adjacency::from_adj_list(&adj_list), scores, grid: None });
    }

    pub fn scores(&self) -> &[f64]{
        &self.scores
    }

    pub fn num_edges(&self) -> usize{
        self.adj.num_entries() / 2
    }

    pub fn adjacency(&self) -> &Adjacency{
        &self.adj
    }

    /// `(width, height)` for grid graphs
    pub fn grid_shape(&self) -> Option<(u32, u32)>{
        self.grid
    }

    pub fn coord(&self, node: NodeId) -> Option<Coord>{
        let (w, h) = self.grid?;
        if node.0 >= w * h{
            return None;
        }
        Some(Coord{ x: node.0 % w, y: node.0 / w })
    }

    pub fn node_at(&self, coord: Coord) -> Option<NodeId>{
        let (w, h) = self.grid?;
        if coord.x >= w || coord.y >= h{
            return None;
        }
        Some(NodeId(coord.y * w + coord.x))
    }
}

impl Instance for WalkGraph{
    type Weight = f64;

    fn size(&self) -> usize {
        self.scores.len()
    }

    fn neighbors(&self, node: NodeId) -> &[NodeId] {
        self.adj.row(node)
    }

    fn score(&self, node: NodeId) -> f64 {
        self.scores[node.index()]
    }
}

#[cfg(test)]
pub(crate) mod tests{
    use std::io::Write;
    use super::*;

    #[test]
    fn test_grid_5x5(){
        let g = WalkGraph::grid(5, 5, &ScoreSpec::default()).unwrap();
        assert_eq!(g.size(), 25);
        assert_eq!(g.num_edges(), 40);
        assert_eq!(g.grid_shape(), Some((5, 5)));

        let corner = g.node_at(Coord{x: 0, y: 0}).unwrap();
        let side = g.node_at(Coord{x: 2, y: 0}).unwrap();
        let center = g.node_at(Coord{x: 2, y: 2}).unwrap();
        assert_eq!(g.degree(corner), 2);
        assert_eq!(g.degree(side), 3);
        assert_eq!(g.degree(center), 4);
        assert_eq!(g.neighbors(center), &[NodeId(7), NodeId(11), NodeId(13), NodeId(17)]);

        for i in 0..25u32{
            let c = g.coord(NodeId(i)).unwrap();
            assert_eq!(g.node_at(c), Some(NodeId(i)));
            assert_eq!(g.score(NodeId(i)), (1 + c.x + c.y) as f64);
        }
        assert_eq!(g.node_at(Coord{x: 5, y: 0}), None);
        assert_eq!(g.coord(NodeId(25)), None);
    }

    #[test]
    fn test_rectangular_grid(){
        let g = WalkGraph::grid(4, 2, &ScoreSpec::Uniform).unwrap();
        assert_eq!(g.size(), 8);
        assert_eq!(g.num_edges(), 3*2 + 4);
        assert_eq!(g.coord(NodeId(5)), Some(Coord{x: 1, y: 1}));
        assert!(g.scores().iter().all(|&s| s == 1.0));
    }

    #[test]
    fn test_single_node_graph_is_valid(){
        let g = WalkGraph::from_parts(1, &[], &[1.0]).unwrap();
        assert_eq!(g.size(), 1);
        assert!(g.neighbors(NodeId(0)).is_empty());
        let g = WalkGraph::grid(1, 1, &ScoreSpec::default()).unwrap();
        assert_eq!(g.degree(NodeId(0)), 0);
    }

    #[test]
    fn test_validation_errors(){
        use GraphValidationError as E;
        assert!(matches!(WalkGraph::grid(0, 3, &ScoreSpec::default()), Err(E::ZeroDimension{..})));
        assert!(matches!(WalkGraph::grid(u32::MAX, 2, &ScoreSpec::Uniform), Err(E::TooLarge(_))));
        assert!(matches!(WalkGraph::grid(2, 2, &ScoreSpec::Explicit(vec![1.0; 5])),
                         Err(E::ScoreCountMismatch{ nodes: 4, scores: 5 })));
        assert!(matches!(WalkGraph::grid(2, 2, &ScoreSpec::Linear{ offset: 0.0, x: 1.0, y: 1.0 }),
                         Err(E::NonPositiveScore{ node: 0, .. })));
        assert!(matches!(WalkGraph::from_parts(0, &[], &[]), Err(E::Empty)));
        assert!(matches!(WalkGraph::from_parts(2, &[(0, 1)], &[1.0, 2.0, 3.0]),
                         Err(E::ScoreCountMismatch{ nodes: 2, scores: 3 })));
        assert!(matches!(WalkGraph::from_parts(2, &[(0, 2)], &[1.0, 2.0]), Err(E::EdgeOutOfRange(0, 2, 2))));
        assert!(matches!(WalkGraph::from_parts(2, &[(1, 1)], &[1.0, 2.0]), Err(E::SelfLoop(1))));
        assert!(matches!(WalkGraph::from_parts(2, &[(0, 1), (1, 0)], &[1.0, 2.0]), Err(E::DuplicateEdge(0, 1))));
        assert!(matches!(WalkGraph::from_parts(2, &[(0, 1)], &[1.0, -2.0]), Err(E::NonPositiveScore{ node: 1, .. })));
        assert!(matches!(WalkGraph::from_parts(2, &[(0, 1)], &[f64::NAN, 2.0]), Err(E::NonPositiveScore{ node: 0, .. })));
        assert!(matches!(WalkGraph::from_parts(2, &[(0, 1)], &[f64::INFINITY, 2.0]), Err(E::NonPositiveScore{ node: 0, .. })));
    }

    #[test]
    fn test_disconnected_graph_is_accepted(){
        let g = WalkGraph::from_parts(4, &[(0, 1), (2, 3)], &[1.0, 1.0, 1.0, 1.0]).unwrap();
        assert_eq!(g.num_edges(), 2);
        assert_eq!(g.grid_shape(), None);
        assert_eq!(g.coord(NodeId(0)), None);
    }

    #[test]
    fn test_from_adjacency_file(){
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "0 0 1.0\n1 1 2.0\n2 2 3.0\n0 1\n1 2\n2 0").unwrap();
        let path = f.path().to_str().unwrap().to_string();
        let g = WalkGraph::from_spec(&GraphSpec::File{ path }).unwrap();
        assert_eq!(g.size(), 3);
        assert_eq!(g.num_edges(), 3);
        assert_eq!(g.scores(), &[1.0, 2.0, 3.0]);
        assert_eq!(g.neighbors(NodeId(0)), &[NodeId(1), NodeId(2)]);

        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "0 0 1.0\n0 1").unwrap();
        let err = WalkGraph::from_adjacency_file(f.path().to_str().unwrap()).unwrap_err();
        assert!(matches!(err, GraphValidationError::MissingScore(1)));

        let err = WalkGraph::from_adjacency_file("/nonexistent/graph.txt").unwrap_err();
        assert!(matches!(err, GraphValidationError::Io{..}));
    }

    fn file_graph(text: &str) -> (tempfile::NamedTempFile, Result<WalkGraph, GraphValidationError>){
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(f, "{}", text).unwrap();
        let g = WalkGraph::from_adjacency_file(f.path().to_str().unwrap());
        (f, g)
    }

    #[test]
    fn test_malformed_adjacency_file_is_rejected(){
        use GraphValidationError as E;
        let scored = "# triangle\n0 0 1.0\n1 1 2.0\n2 2 3.0\n\n0 1\n1 2\n";

        let (f, g) = file_graph(&format!("{}2 -1\n", scored));
        match g{
            Err(E::Parse{ path, line, .. }) => {
                assert_eq!(path, f.path().to_str().unwrap());
                assert_eq!(line, 8);
            }
            other => panic!("expected a parse error, got {:?}", other)
        }
        let (_f, g) = file_graph(&format!("{}0 2x\n", scored));
        assert!(matches!(g, Err(E::Parse{ line: 8, .. })));
        let (_f, g) = file_graph(&format!("{}0 2\n0 1\n", scored));
        assert!(matches!(g, Err(E::DuplicateEdge(0, 1))));
        let (_f, g) = file_graph(&format!("{}0 2\n2 0\n", scored));
        assert!(matches!(g, Err(E::DuplicateEdge(0, 2))));
        let (_f, g) = file_graph(&format!("{}1 1\n", scored));
        assert!(matches!(g, Err(E::MissingScore(1))));
        // an edge to a node that is never scored
        let (_f, g) = file_graph(&format!("{}2 3\n", scored));
        assert!(matches!(g, Err(E::MissingScore(3))));

        let (_f, g) = file_graph(&format!("{}0 2\n", scored));
        assert_eq!(g.unwrap().num_edges(), 3);
    }

    #[test]
    fn test_graph_spec_yaml(){
        let spec: GraphSpec = serde_yaml::from_str("Grid:\n  width: 3\n  height: 2\n").unwrap();
        assert_eq!(spec, GraphSpec::Grid{ width: 3, height: 2, score: ScoreSpec::default() });
        let g = WalkGraph::from_spec(&spec).unwrap();
        assert_eq!(g.size(), 6);

        let spec: GraphSpec = serde_yaml::from_str("File:\n  path: g.txt\n").unwrap();
        assert_eq!(spec, GraphSpec::File{ path: "g.txt".to_string() });
        // file graphs have no coordinates, so a coordinate score cannot be attached
        let r: Result<GraphSpec, _> = serde_yaml::from_str("File:\n  path: g.txt\n  score: Uniform\n");
        assert!(r.is_err());
        let r: Result<GraphSpec, _> = serde_yaml::from_str("Grid:\n  width: 3\n  height: 2\n  scores: Uniform\n");
        assert!(r.is_err());
    }
}
