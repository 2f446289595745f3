// src/correction/surface.rs

//! Planar surface code of distance `d`.
//!
//! The `d x d` lattice alternates data sites (`(i + j)` even) and syndrome
//! sites (`(i + j)` odd). Every syndrome site carries one stabilizer over
//! its neighbouring data qubits: X-type on even rows, Z-type on odd rows.
//! Diagonal syndrome sites share exactly two data qubits, so all
//! generators commute.
//!
//! Encoding is the two-term placeholder `α|0...0> + β|1...1>` over
//! `2d² - 1` physical qubits. Decoding a syndrome into corrections is
//! delegated to a [`SurfaceDecoder`]; the default [`IdentityDecoder`]
//! applies nothing and reports non-trivial syndromes as uncorrectable.

use super::pauli::{PauliKind, StabilizerGenerator};
use super::syndrome::{SyndromeResult, SyndromeTable};
use super::{AppliedCorrection, CodeParameters, Codewords, CorrectionCode};
use crate::core::QuantumError;
use crate::core::constants::limits::MAX_PHYSICAL_QUBITS;
use petgraph::graph::{NodeIndex, UnGraph};
use std::fmt;
use std::sync::Arc;

/// What a lattice site holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SiteRole {
    /// Data qubit with its physical qubit index.
    Data { qubit: usize },
    /// Ancilla site measuring a stabilizer of the given Pauli type.
    Syndrome { stabilizer: PauliKind },
}

/// A lattice site at `(row, col)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Site {
    pub row: usize,
    pub col: usize,
    pub role: SiteRole,
}

/// The lattice graph: sites as nodes, data/syndrome adjacency as edges.
#[derive(Debug, Clone)]
pub struct SurfaceLattice {
    distance: usize,
    graph: UnGraph<Site, ()>,
    syndrome_nodes: Vec<NodeIndex>,
}

impl SurfaceLattice {
    pub fn new(distance: usize) -> Self {
        let mut graph: UnGraph<Site, ()> = UnGraph::new_undirected();
        let mut nodes = Vec::with_capacity(distance * distance);
        let mut syndrome_nodes = Vec::new();

        for row in 0..distance {
            for col in 0..distance {
                let role = if (row + col) % 2 == 0 {
                    SiteRole::Data { qubit: row * distance + col }
                } else {
                    let stabilizer = if row % 2 == 0 { PauliKind::X } else { PauliKind::Z };
                    SiteRole::Syndrome { stabilizer }
                };
                let idx = graph.add_node(Site { row, col, role });
                if matches!(role, SiteRole::Syndrome { .. }) {
                    syndrome_nodes.push(idx);
                }
                nodes.push(idx);
            }
        }

        for &node in &syndrome_nodes {
            let site = graph[node];
            let (r, c) = (site.row as isize, site.col as isize);
            for (dr, dc) in [(-1isize, 0isize), (1, 0), (0, -1), (0, 1)] {
                let (nr, nc) = (r + dr, c + dc);
                if nr < 0 || nc < 0 || nr >= distance as isize || nc >= distance as isize {
                    continue;
                }
                graph.add_edge(node, nodes[nr as usize * distance + nc as usize], ());
            }
        }

        Self { distance, graph, syndrome_nodes }
    }

    pub fn distance(&self) -> usize {
        self.distance
    }

    pub fn graph(&self) -> &UnGraph<Site, ()> {
        &self.graph
    }

    /// Physical indices of all data qubits, ascending.
    pub fn data_qubits(&self) -> Vec<usize> {
        let mut qubits: Vec<usize> = self
            .graph
            .node_weights()
            .filter_map(|s| match s.role {
                SiteRole::Data { qubit } => Some(qubit),
                SiteRole::Syndrome { .. } => None,
            })
            .collect();
        qubits.sort_unstable();
        qubits
    }

    /// Syndrome sites in row-major order, matching the syndrome bit order.
    pub fn syndrome_sites(&self) -> Vec<Site> {
        self.syndrome_nodes.iter().map(|&n| self.graph[n]).collect()
    }

    /// One generator per syndrome site, over its neighbouring data qubits.
    pub fn generators(&self) -> Vec<StabilizerGenerator> {
        self.syndrome_nodes
            .iter()
            .filter_map(|&node| {
                let SiteRole::Syndrome { stabilizer } = self.graph[node].role else {
                    return None;
                };
                let mut support: Vec<usize> = self
                    .graph
                    .neighbors(node)
                    .filter_map(|n| match self.graph[n].role {
                        SiteRole::Data { qubit } => Some(qubit),
                        SiteRole::Syndrome { .. } => None,
                    })
                    .collect();
                support.sort_unstable();
                (!support.is_empty()).then(|| StabilizerGenerator::new(stabilizer, support))
            })
            .collect()
    }
}

/// Turns a surface-code syndrome into corrections.
///
/// Implementations must be thread-safe so one code can serve parallel
/// cycles.
pub trait SurfaceDecoder: fmt::Debug + Send + Sync {
    /// Corrections for `syndrome` on `lattice`. An empty list for a
    /// non-trivial syndrome means the decoder could not resolve it.
    fn decode(
        &self,
        lattice: &SurfaceLattice,
        syndrome: &SyndromeResult,
    ) -> Vec<AppliedCorrection>;

    /// Human-readable name for this decoder.
    fn name(&self) -> &str;
}

/// Applies no correction.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityDecoder;

impl SurfaceDecoder for IdentityDecoder {
    fn decode(
        &self,
        _lattice: &SurfaceLattice,
        _syndrome: &SyndromeResult,
    ) -> Vec<AppliedCorrection> {
        Vec::new()
    }

    fn name(&self) -> &str {
        "identity"
    }
}

#[derive(Debug, Clone)]
pub struct SurfaceCode {
    params: CodeParameters,
    codewords: Codewords,
    lattice: SurfaceLattice,
    decoder: Arc<dyn SurfaceDecoder>,
}

impl SurfaceCode {
    /// Surface code with the identity decoder.
    pub fn new(distance: usize) -> Result<Self, QuantumError> {
        Self::with_decoder(distance, Arc::new(IdentityDecoder))
    }

    /// Surface code with a caller-supplied decoder.
    ///
    /// Fails with `QubitLimitExceeded` when `2d² - 1` exceeds
    /// `MAX_PHYSICAL_QUBITS`, before anything is allocated.
    pub fn with_decoder(
        distance: usize,
        decoder: Arc<dyn SurfaceDecoder>,
    ) -> Result<Self, QuantumError> {
        if distance < 2 {
            return Err(QuantumError::invalid_parameter(format!(
                "surface code distance must be at least 2, got {}",
                distance
            )));
        }
        let code = CorrectionCode::Surface { distance };
        let num_physical_qubits = code.num_physical_qubits();
        if num_physical_qubits > MAX_PHYSICAL_QUBITS {
            return Err(QuantumError::QubitLimitExceeded {
                requested: num_physical_qubits,
                max: MAX_PHYSICAL_QUBITS,
            });
        }
        let lattice = SurfaceLattice::new(distance);
        let generators = lattice.generators();
        let syndrome_table = SyndromeTable::single_qubit(&generators, num_physical_qubits);
        let all: Vec<usize> = (0..num_physical_qubits).collect();
        let last = (1usize << num_physical_qubits) - 1;

        Ok(Self {
            params: CodeParameters {
                code,
                num_physical_qubits,
                distance,
                generators,
                // Placeholder codewords: X on every qubit swaps them, Z on one
                // qubit separates them.
                logical_x: StabilizerGenerator::new(PauliKind::X, all),
                logical_z: StabilizerGenerator::new(PauliKind::Z, vec![0]),
                syndrome_table,
            },
            codewords: Codewords::from_terms(num_physical_qubits, &[(0, 1.0)], &[(last, 1.0)])?,
            lattice,
            decoder,
        })
    }

    pub fn parameters(&self) -> &CodeParameters {
        &self.params
    }

    pub fn lattice(&self) -> &SurfaceLattice {
        &self.lattice
    }

    /// Name of the active decoder.
    pub fn decoder_name(&self) -> &str {
        self.decoder.name()
    }

    pub(crate) fn codewords(&self) -> &Codewords {
        &self.codewords
    }

    /// Corrections from the decoder and whether a non-trivial syndrome was
    /// left unresolved.
    pub(crate) fn corrections(&self, syndrome: &SyndromeResult) -> (Vec<AppliedCorrection>, bool) {
        let applied = self.decoder.decode(&self.lattice, syndrome);
        let uncorrectable = applied.is_empty() && !syndrome.is_trivial();
        (applied, uncorrectable)
    }
}
