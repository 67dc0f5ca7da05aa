use serde::{Deserialize, Serialize};

use crate::graph::Coord;

/// Per-node unnormalized weight of the target distribution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ScoreSpec{
    /// `offset + x * coord.x + y * coord.y`. Needs node coordinates
    Linear{ offset: f64, x: f64, y: f64 },
    /// Every node weighs 1
    Uniform,
    /// One score per node, in node order
    Explicit(Vec<f64>)
}

impl Default for ScoreSpec{
    fn default() -> Self {
        ScoreSpec::Linear{ offset: 1.0, x: 1.0, y: 1.0 }
    }
}

impl ScoreSpec{
    /// Score of node `index`, if it can be determined from the available information.
    /// Validation of the value is left to the graph constructor.
    pub fn eval(&self, index: usize, coord: Option<Coord>) -> Option<f64>{
        return match self{
            ScoreSpec::Linear{ offset, x, y } => {
                coord.map(|c| offset + x * (c.x as f64) + y * (c.y as f64))
            }
            ScoreSpec::Uniform => Some(1.0),
            ScoreSpec::Explicit(v) => v.get(index).copied()
        };
    }
}

#[cfg(test)]
mod tests{
    use super::*;

    #[test]
    fn test_default_is_one_plus_x_plus_y(){
        let s = ScoreSpec::default();
        assert_eq!(s.eval(0, Some(Coord{x: 0, y: 0})), Some(1.0));
        assert_eq!(s.eval(7, Some(Coord{x: 3, y: 4})), Some(8.0));
        assert_eq!(s.eval(7, None), None);
    }

    #[test]
    fn test_explicit_and_uniform(){
        let s = ScoreSpec::Explicit(vec![0.5, 2.0]);
        assert_eq!(s.eval(1, None), Some(2.0));
        assert_eq!(s.eval(2, None), None);
        assert_eq!(ScoreSpec::Uniform.eval(42, None), Some(1.0));
    }

    #[test]
    fn test_yaml(){
        let s: ScoreSpec = serde_yaml::from_str("Linear:\n  offset: 2.0\n  x: 0.5\n  y: 0.0\n").unwrap();
        assert_eq!(s, ScoreSpec::Linear{ offset: 2.0, x: 0.5, y: 0.0 });
        let s: ScoreSpec = serde_yaml::from_str("Explicit: [1.0, 2.0, 3.0]").unwrap();
        assert_eq!(s, ScoreSpec::Explicit(vec![1.0, 2.0, 3.0]));
    }
}
