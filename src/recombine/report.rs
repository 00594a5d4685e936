//! Per-run diagnostics.
//!
//! The report is informational: counts and percentages are convenient for
//! assertions and logs, but the layout of the [`Display`](std::fmt::Display)
//! output is not a stable format.

use crate::mesh::VolumeMesh;
use crate::recombine::candidate::{Candidate, Pattern};
use crate::recombine::scheduler::Rejection;
use crate::topology::cell_type::CellType;
use std::collections::BTreeMap;
use std::fmt;

/// One accepted macro-element, in acceptance order.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct AcceptedCandidate {
    pub cell_type: CellType,
    pub pattern: Pattern,
    pub quality: f64,
    /// Generation order within its pass.
    pub seq: usize,
}

impl From<&Candidate> for AcceptedCandidate {
    fn from(c: &Candidate) -> Self {
        Self {
            cell_type: c.element.cell_type(),
            pattern: c.pattern,
            quality: c.quality,
            seq: c.seq,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct RecombinationReport {
    pub input_tetrahedra: usize,
    pub input_volume: f64,
    /// Pooled candidates per target type, after deduplication.
    pub candidates: BTreeMap<CellType, usize>,
    pub accepted: Vec<AcceptedCandidate>,
    /// Why attempted candidates were turned down.
    pub rejections: BTreeMap<Rejection, usize>,
    pub pyramids_inserted: usize,
    pub apex_pairs_merged: usize,
    /// Insertions kept although relaxation left a created element non-positive.
    pub relaxations_unconverged: usize,
    pub vertices_added: usize,
    pub boundary_quads_created: usize,
    /// Triangle pairs that tile a macro face but belong to different regions.
    pub boundary_pairs_refused: usize,
    pub element_counts: BTreeMap<CellType, usize>,
    pub volume_by_type: BTreeMap<CellType, f64>,
    pub output_volume: f64,
}

impl RecombinationReport {
    pub(crate) fn record_input(&mut self, mesh: &VolumeMesh) {
        self.input_tetrahedra = mesh.count(CellType::Tetrahedron);
        self.input_volume = mesh.total_volume();
    }

    pub(crate) fn record_rejection(&mut self, rejection: Rejection) {
        *self.rejections.entry(rejection).or_insert(0) += 1;
    }

    /// Fill the per-type counts and volumes from the final mesh.
    pub(crate) fn record_output(&mut self, mesh: &VolumeMesh) {
        self.element_counts.clear();
        self.volume_by_type.clear();
        for e in &mesh.elements {
            let ct = e.cell_type();
            *self.element_counts.entry(ct).or_insert(0) += 1;
            *self.volume_by_type.entry(ct).or_insert(0.0) += mesh.signed_volume(e).abs();
        }
        self.output_volume = self.volume_by_type.values().sum();
    }

    /// Accepted macro-elements of one type, in acceptance order.
    pub fn accepted_of(&self, cell_type: CellType) -> impl Iterator<Item = &AcceptedCandidate> {
        self.accepted.iter().filter(move |a| a.cell_type == cell_type)
    }

    pub fn count(&self, cell_type: CellType) -> usize {
        self.element_counts.get(&cell_type).copied().unwrap_or(0)
    }

    /// Share of the output volume held by `cell_type`, in percent.
    pub fn volume_percent(&self, cell_type: CellType) -> f64 {
        if self.output_volume <= 0.0 {
            return 0.0;
        }
        100.0 * self.volume_by_type.get(&cell_type).copied().unwrap_or(0.0) / self.output_volume
    }

    pub fn rejected(&self, rejection: Rejection) -> usize {
        self.rejections.get(&rejection).copied().unwrap_or(0)
    }
}

const REPORTED_TYPES: [CellType; 4] = [
    CellType::Hexahedron,
    CellType::Prism,
    CellType::Pyramid,
    CellType::Tetrahedron,
];

impl fmt::Display for RecombinationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "input: {} tetrahedra, volume {:.6}",
            self.input_tetrahedra, self.input_volume
        )?;
        for ct in REPORTED_TYPES {
            writeln!(
                f,
                "{:>12}: {:>8} ({:5.1}% volume)",
                ct.name(),
                self.count(ct),
                self.volume_percent(ct)
            )?;
        }
        writeln!(f, "output volume {:.6}", self.output_volume)?;
        if !self.rejections.is_empty() {
            write!(f, "rejected:")?;
            for (r, n) in &self.rejections {
                write!(f, " {r:?}={n}")?;
            }
            writeln!(f)?;
        }
        write!(
            f,
            "pyramids: {} inserted, {} apex pairs, {} unconverged; boundary: {} quads, {} refused",
            self.pyramids_inserted,
            self.apex_pairs_merged,
            self.relaxations_unconverged,
            self.boundary_quads_created,
            self.boundary_pairs_refused
        )
    }
}
