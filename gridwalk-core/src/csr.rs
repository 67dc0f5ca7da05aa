//! Compressed adjacency storage: the neighbors of node `i` are the slice
//! `entries[offsets[i]..offsets[i+1]]`.
use crate::state::NodeId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Adjacency{
    offsets: Vec<usize>,
    entries: Vec<NodeId>
}

impl Adjacency{
    pub fn from_adj_list(adj_vecs: &[Vec<NodeId>]) -> Self
    {
        let mut offsets = Vec::with_capacity(adj_vecs.len() + 1);
        let mut entries = Vec::new();
        offsets.push(0);
        let mut c = 0;
        for e in adj_vecs.iter(){
            c += e.len();
            offsets.push(c);
            entries.extend_from_slice(e);
        }
        entries.shrink_to_fit();
        return Self{ offsets, entries };
    }

    pub fn num_nodes(&self) -> usize{
        self.offsets.len() - 1
    }

    /// Number of directed entries, i.e. twice the number of undirected edges
    pub fn num_entries(&self) -> usize{
        self.entries.len()
    }

    #[inline]
    pub fn row(&self, i: NodeId) -> &[NodeId]{
        let i = i.index();
        &self.entries[self.offsets[i]..self.offsets[i+1]]
    }

    pub fn iter(&self) -> AdjacencyIter{
        return AdjacencyIter{ adj: self, current_row: 0, current_col_idx: 0 };
    }
}

/// Iterates over all `(i, j)` entries row by row, skipping empty rows
pub struct AdjacencyIter<'a>{
    adj: &'a Adjacency,
    current_row: usize,
    current_col_idx: usize,
}

impl<'a> Iterator for AdjacencyIter<'a>{
    type Item = (NodeId, NodeId);

    fn next(&mut self) -> Option<Self::Item> {
        let n_rows = self.adj.num_nodes();
        loop{
            if self.current_row >= n_rows{
                return None;
            }
            if self.current_col_idx >= self.adj.offsets[self.current_row + 1]{
                self.current_row += 1;
            } else {
                break;
            }
        }
        let j = self.adj.entries[self.current_col_idx];
        self.current_col_idx += 1;
        return Some((NodeId(self.current_row as u32), j));
    }
}

#[cfg(test)]
mod tests{
    use super::*;

    #[test]
    fn test_adjacency_rows(){
        let n = |i| NodeId(i);
        let adj_list = vec![
            Vec::new(),
            vec![n(2), n(3)],
            vec![n(1)],
            vec![n(1)],
            Vec::new(),
        ];
        let adj = Adjacency::from_adj_list(&adj_list);
        assert_eq!(adj.num_nodes(), 5);
        assert_eq!(adj.num_entries(), 4);
        assert!(adj.row(n(0)).is_empty());
        assert_eq!(adj.row(n(1)), &[n(2), n(3)]);
        assert!(adj.row(n(4)).is_empty());

        let entries: Vec<_> = adj.iter().collect();
        assert_eq!(entries, vec![(n(1), n(2)), (n(1), n(3)), (n(2), n(1)), (n(3), n(1))]);
    }
}
