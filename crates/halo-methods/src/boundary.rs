//! Boundary conditions for non-periodic domain faces.

use halo_core::{Axis, Direction, Face};
use halo_field::FieldBlock;
use halo_method::Boundary;

/// Zero-gradient boundary: ghost cells mirror the interior about the face.
#[derive(Clone, Copy, Debug, Default)]
pub struct ReflectingBoundary;

impl Boundary for ReflectingBoundary {
    fn enforce(&self, block: &mut FieldBlock, axis: Axis, face: Face) {
        block.mirror_into_ghosts(Direction::face(axis, face));
    }
}

/// Dirichlet-style boundary: ghost cells hold a fixed value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConstantBoundary(pub f64);

impl Boundary for ConstantBoundary {
    fn enforce(&self, block: &mut FieldBlock, axis: Axis, face: Face) {
        block.fill_ghosts(Direction::face(axis, face), self.0);
    }
}
