// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Candidate adjacency graph and its decomposition into chains
//!
//! `G[i][j]` means candidate `j` may follow candidate `i` in left-to-right
//! text flow. The graph is held sparsely: each node keeps its successors in
//! ascending order, so "first successor" is always the lowest index.

use ndarray::Array2;
use tracing::debug;

use super::error::{DetectionError, Result};

/// Ordered candidate indices forming one hypothesized text line
pub type Chain = Vec<usize>;

/// Sparse directed adjacency graph over candidate boxes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdjacencyGraph {
    successors: Vec<Vec<usize>>,
    in_degree: Vec<usize>,
}

impl AdjacencyGraph {
    /// Build from a list of `(from, to)` edges over `node_count` nodes
    pub fn from_edges(
        node_count: usize,
        edges: impl IntoIterator<Item = (usize, usize)>,
    ) -> Result<Self> {
        let mut successors = vec![Vec::new(); node_count];
        for (from, to) in edges {
            if from >= node_count || to >= node_count {
                return Err(DetectionError::malformed(format!(
                    "edge ({}, {}) out of range for {} nodes",
                    from, to, node_count
                )));
            }
            successors[from].push(to);
        }

        let mut in_degree = vec![0; node_count];
        for list in successors.iter_mut() {
            list.sort_unstable();
            list.dedup();
            for &to in list.iter() {
                in_degree[to] += 1;
            }
        }

        Ok(Self {
            successors,
            in_degree,
        })
    }

    /// Build from a dense square boolean matrix
    pub fn from_matrix(matrix: &Array2<bool>) -> Result<Self> {
        let (rows, cols) = matrix.dim();
        if rows != cols {
            return Err(DetectionError::malformed(format!(
                "adjacency matrix must be square, got {}x{}",
                rows, cols
            )));
        }
        let edges = matrix
            .indexed_iter()
            .filter(|(_, &connected)| connected)
            .map(|((from, to), _)| (from, to));
        Self::from_edges(rows, edges)
    }

    /// Build from nested rows, e.g. a deserialized matrix
    pub fn from_rows(rows: &[Vec<bool>]) -> Result<Self> {
        let n = rows.len();
        if let Some(bad) = rows.iter().position(|row| row.len() != n) {
            return Err(DetectionError::malformed(format!(
                "adjacency row {} has {} entries, expected {}",
                bad,
                rows[bad].len(),
                n
            )));
        }
        let edges = rows.iter().enumerate().flat_map(|(from, row)| {
            row.iter()
                .enumerate()
                .filter(|(_, &connected)| connected)
                .map(move |(to, _)| (from, to))
        });
        Self::from_edges(n, edges)
    }

    pub fn node_count(&self) -> usize {
        self.successors.len()
    }

    pub fn edge_count(&self) -> usize {
        self.successors.iter().map(Vec::len).sum()
    }

    /// Successors of `node` in ascending index order
    pub fn successors(&self, node: usize) -> &[usize] {
        &self.successors[node]
    }

    /// Lowest-index successor of `node`
    pub fn first_successor(&self, node: usize) -> Option<usize> {
        self.successors[node].first().copied()
    }

    pub fn in_degree(&self, node: usize) -> usize {
        self.in_degree[node]
    }

    /// A node with successors but no predecessor starts a chain
    pub fn is_root(&self, node: usize) -> bool {
        self.in_degree[node] == 0 && !self.successors[node].is_empty()
    }

    /// Partition the graph into chains
    ///
    /// Roots are visited in index order; from each root the walk follows the
    /// lowest-index successor until a node has none. A node already owned by
    /// an earlier chain ends the walk, so chains never share nodes. Isolated
    /// nodes belong to no chain.
    ///
    /// # Errors
    /// `PreconditionViolation` when a walk revisits one of its own nodes.
    pub fn decompose(&self) -> Result<Vec<Chain>> {
        let mut owner: Vec<Option<usize>> = vec![None; self.node_count()];
        let mut chains: Vec<Chain> = Vec::new();

        for root in (0..self.node_count()).filter(|&node| self.is_root(node)) {
            let chain_id = chains.len();
            owner[root] = Some(chain_id);
            let mut chain = vec![root];

            let mut current = root;
            while let Some(next) = self.first_successor(current) {
                match owner[next] {
                    Some(id) if id == chain_id => {
                        return Err(DetectionError::PreconditionViolation { root, node: next });
                    }
                    Some(id) => {
                        debug!(
                            "Chain from root {} merges into chain {} at node {}",
                            root, id, next
                        );
                        break;
                    }
                    None => {
                        owner[next] = Some(chain_id);
                        chain.push(next);
                        current = next;
                    }
                }
            }

            chains.push(chain);
        }

        debug!(
            "Decomposed {} nodes / {} edges into {} chains",
            self.node_count(),
            self.edge_count(),
            chains.len()
        );

        Ok(chains)
    }
}
