//! Ghost-padded field storage for one block.

use halo_core::{Axis, CellCounts, Direction, FieldError};

use crate::region::{FaceRegion, RegionRole};

const F64_BYTES: usize = std::mem::size_of::<f64>();

/// Scalar fields over a block's interior plus ghost layers.
///
/// Each field is a dense `f64` array of padded dimensions
/// `n + 2g` per axis, x fastest. The ghost depth is `g` on every axis
/// with more than one cell and zero on single-cell axes, which never
/// exchange.
///
/// # Examples
///
/// ```
/// use halo_core::{CellCounts, Direction};
/// use halo_field::FieldBlock;
///
/// let cells = CellCounts::new(4, 4, 1).unwrap();
/// let mut a = FieldBlock::new(cells, 1, 1).unwrap();
/// let mut b = FieldBlock::new(cells, 1, 1).unwrap();
/// a.fill_interior(0, 2.5);
///
/// // `a` sends its +x layer; `b` applies it on its -x ghost layer.
/// let east = Direction::new(1, 0, 0).unwrap();
/// let buf = a.pack(east);
/// b.unpack(east.inverse(), &buf).unwrap();
/// assert_eq!(b.get(0, -1, 2, 0), 2.5);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct FieldBlock {
    cells: CellCounts,
    ghost_depth: usize,
    field_count: usize,
    ghosts: [usize; 3],
    padded: [usize; 3],
    data: Vec<f64>,
}

impl FieldBlock {
    /// Allocate zeroed storage for `field_count` fields.
    ///
    /// Returns `Err(FieldError::NoFields)` when `field_count` is zero.
    pub fn new(cells: CellCounts, ghost_depth: usize, field_count: usize) -> Result<Self, FieldError> {
        if field_count == 0 {
            return Err(FieldError::NoFields);
        }
        let ghosts = Axis::ALL.map(|axis| if cells.exchanges(axis) { ghost_depth } else { 0 });
        let n = cells.to_array();
        let padded = [n[0] + 2 * ghosts[0], n[1] + 2 * ghosts[1], n[2] + 2 * ghosts[2]];
        let len = field_count * padded.iter().product::<usize>();
        Ok(Self {
            cells,
            ghost_depth,
            field_count,
            ghosts,
            padded,
            data: vec![0.0; len],
        })
    }

    /// Interior cell counts.
    pub fn cells(&self) -> CellCounts {
        self.cells
    }

    /// Configured ghost depth.
    pub fn ghost_depth(&self) -> usize {
        self.ghost_depth
    }

    /// Effective ghost depth per axis (zero on single-cell axes).
    pub fn ghosts(&self) -> [usize; 3] {
        self.ghosts
    }

    /// Padded array dimensions per axis.
    pub fn padded_dims(&self) -> [usize; 3] {
        self.padded
    }

    /// Number of fields.
    pub fn field_count(&self) -> usize {
        self.field_count
    }

    fn field_len(&self) -> usize {
        self.padded.iter().product()
    }

    fn check_field(&self, field: usize) -> Result<(), FieldError> {
        if field >= self.field_count {
            return Err(FieldError::FieldOutOfRange {
                field,
                field_count: self.field_count,
            });
        }
        Ok(())
    }

    /// Flat offset of `(i, j, k)` within one field's array.
    ///
    /// Coordinates are interior-relative: `0..n` is interior,
    /// `-g..0` and `n..n+g` are ghosts.
    fn offset(&self, i: isize, j: isize, k: isize) -> usize {
        let [gx, gy, gz] = self.ghosts;
        let [px, py, pz] = self.padded;
        let x = (i + gx as isize) as usize;
        let y = (j + gy as isize) as usize;
        let z = (k + gz as isize) as usize;
        debug_assert!(x < px && y < py && z < pz, "cell ({i}, {j}, {k}) outside padded block");
        x + px * (y + py * z)
    }

    /// Whether `(i, j, k)` lies in the padded array.
    pub fn in_bounds(&self, i: isize, j: isize, k: isize) -> bool {
        let check = |v: isize, axis: usize| {
            let g = self.ghosts[axis] as isize;
            let n = self.cells.to_array()[axis] as isize;
            v >= -g && v < n + g
        };
        check(i, 0) && check(j, 1) && check(k, 2)
    }

    /// Value of `field` at `(i, j, k)`.
    ///
    /// # Panics
    ///
    /// Panics if `field` or the coordinate is out of range.
    pub fn get(&self, field: usize, i: isize, j: isize, k: isize) -> f64 {
        assert!(field < self.field_count, "field {field} out of range");
        assert!(self.in_bounds(i, j, k), "cell ({i}, {j}, {k}) out of range");
        self.data[field * self.field_len() + self.offset(i, j, k)]
    }

    /// Set `field` at `(i, j, k)`.
    ///
    /// # Panics
    ///
    /// Panics if `field` or the coordinate is out of range.
    pub fn set(&mut self, field: usize, i: isize, j: isize, k: isize, value: f64) {
        assert!(field < self.field_count, "field {field} out of range");
        assert!(self.in_bounds(i, j, k), "cell ({i}, {j}, {k}) out of range");
        let idx = field * self.field_len() + self.offset(i, j, k);
        self.data[idx] = value;
    }

    /// The full padded array of `field`.
    pub fn field(&self, field: usize) -> Result<&[f64], FieldError> {
        self.check_field(field)?;
        let len = self.field_len();
        Ok(&self.data[field * len..(field + 1) * len])
    }

    /// The full padded array of `field`, mutably.
    pub fn field_mut(&mut self, field: usize) -> Result<&mut [f64], FieldError> {
        self.check_field(field)?;
        let len = self.field_len();
        Ok(&mut self.data[field * len..(field + 1) * len])
    }

    /// Every interior coordinate, x fastest.
    pub fn interior(&self) -> impl Iterator<Item = (isize, isize, isize)> {
        let [nx, ny, nz] = self.cells.to_array().map(|n| n as isize);
        (0..nz).flat_map(move |k| (0..ny).flat_map(move |j| (0..nx).map(move |i| (i, j, k))))
    }

    /// Interior values of `field`, x fastest.
    pub fn interior_values(&self, field: usize) -> Result<Vec<f64>, FieldError> {
        self.check_field(field)?;
        Ok(self
            .interior()
            .map(|(i, j, k)| self.get(field, i, j, k))
            .collect())
    }

    /// Set every interior cell of `field` to `value`.
    pub fn fill_interior(&mut self, field: usize, value: f64) {
        self.fill_interior_with(field, |_, _, _| value);
    }

    /// Set every interior cell of `field` from `f(i, j, k)`.
    pub fn fill_interior_with(&mut self, field: usize, f: impl Fn(isize, isize, isize) -> f64) {
        let coords: Vec<_> = self.interior().collect();
        for (i, j, k) in coords {
            self.set(field, i, j, k, f(i, j, k));
        }
    }

    /// Region of cells for `direction` and `role`.
    pub fn region(&self, direction: Direction, role: RegionRole) -> FaceRegion {
        FaceRegion::new(direction, role, self.cells.to_array(), self.ghosts)
    }

    /// Bytes in a packed buffer for `direction`.
    pub fn packed_len(&self, direction: Direction) -> usize {
        self.region(direction, RegionRole::Interior).cell_count() * self.field_count * F64_BYTES
    }

    /// Serialize the interior layer facing `direction`.
    ///
    /// Layout: fields outermost, then cells x fastest, each value as
    /// little-endian `f64`.
    pub fn pack(&self, direction: Direction) -> Vec<u8> {
        let region = self.region(direction, RegionRole::Interior);
        let mut out = Vec::with_capacity(self.packed_len(direction));
        for field in 0..self.field_count {
            for (i, j, k) in region.iter() {
                out.extend_from_slice(&self.get(field, i, j, k).to_le_bytes());
            }
        }
        out
    }

    /// Write a packed buffer into the ghost layer facing `direction`.
    ///
    /// The receiver passes the inverse of the direction the sender packed,
    /// so that the sender's `+x` interior layer lands in the receiver's
    /// `-x` ghost layer.
    pub fn unpack(&mut self, direction: Direction, buf: &[u8]) -> Result<(), FieldError> {
        let region = self.region(direction, RegionRole::Ghost);
        let expected = region.cell_count() * self.field_count * F64_BYTES;
        if buf.len() != expected {
            return Err(FieldError::BufferLength {
                direction,
                expected,
                actual: buf.len(),
            });
        }
        let mut chunks = buf.chunks_exact(F64_BYTES);
        for field in 0..self.field_count {
            for (i, j, k) in region.iter() {
                if let Some(chunk) = chunks.next() {
                    let mut raw = [0u8; F64_BYTES];
                    raw.copy_from_slice(chunk);
                    self.set(field, i, j, k, f64::from_le_bytes(raw));
                }
            }
        }
        Ok(())
    }

    /// Copy the interior layer facing `direction` onto the ghost layer on
    /// the same side, mirrored about the face.
    ///
    /// Used by reflecting boundary conditions.
    pub fn mirror_into_ghosts(&mut self, direction: Direction) {
        let ghost = self.region(direction, RegionRole::Ghost);
        let n = self.cells.to_array().map(|n| n as isize);
        let cells: Vec<_> = ghost.iter().collect();
        for field in 0..self.field_count {
            for &(i, j, k) in &cells {
                let src = [i, j, k]
                    .into_iter()
                    .zip(n)
                    .map(|(v, n)| if v < 0 { -v - 1 } else if v >= n { 2 * n - v - 1 } else { v })
                    .collect::<Vec<_>>();
                let value = self.get(field, src[0], src[1], src[2]);
                self.set(field, i, j, k, value);
            }
        }
    }

    /// Set every ghost cell facing `direction` to `value`.
    pub fn fill_ghosts(&mut self, direction: Direction, value: f64) {
        let ghost = self.region(direction, RegionRole::Ghost);
        let cells: Vec<_> = ghost.iter().collect();
        for field in 0..self.field_count {
            for &(i, j, k) in &cells {
                self.set(field, i, j, k, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn block(nx: usize, ny: usize, nz: usize, g: usize, f: usize) -> FieldBlock {
        FieldBlock::new(CellCounts::new(nx, ny, nz).unwrap(), g, f).unwrap()
    }

    fn pattern(field: usize, i: isize, j: isize, k: isize) -> f64 {
        field as f64 * 1000.0 + i as f64 * 100.0 + j as f64 * 10.0 + k as f64 + 0.125
    }

    #[test]
    fn rejects_zero_fields() {
        assert_eq!(
            FieldBlock::new(CellCounts::cube(4).unwrap(), 1, 0),
            Err(FieldError::NoFields)
        );
    }

    #[test]
    fn single_cell_axis_has_no_ghosts() {
        let b = block(8, 8, 1, 2, 1);
        assert_eq!(b.ghosts(), [2, 2, 0]);
        assert_eq!(b.padded_dims(), [12, 12, 1]);
        assert!(b.in_bounds(-2, 9, 0));
        assert!(!b.in_bounds(0, 0, -1));
    }

    #[test]
    fn field_slices_are_disjoint() {
        let mut b = block(2, 2, 2, 1, 2);
        b.fill_interior(1, 7.0);
        assert!(b.field(0).unwrap().iter().all(|&v| v == 0.0));
        assert_eq!(b.field(1).unwrap().iter().filter(|&&v| v == 7.0).count(), 8);
        assert!(matches!(b.field(2), Err(FieldError::FieldOutOfRange { .. })));
    }

    #[test]
    fn unpack_rejects_wrong_length() {
        let mut b = block(4, 4, 4, 1, 1);
        let d = Direction::new(1, 0, 0).unwrap();
        let err = b.unpack(d, &[0u8; 3]).unwrap_err();
        assert_eq!(
            err,
            FieldError::BufferLength {
                direction: d,
                expected: 16 * 8,
                actual: 3,
            }
        );
    }

    #[test]
    fn inverse_round_trip_is_bit_exact_for_every_direction() {
        let mut sender = block(5, 4, 3, 2, 2);
        for f in 0..2 {
            sender.fill_interior_with(f, |i, j, k| pattern(f, i, j, k));
        }
        for d in Direction::ALL {
            let mut receiver = block(5, 4, 3, 2, 2);
            let buf = sender.pack(d);
            assert_eq!(buf.len(), sender.packed_len(d));
            receiver.unpack(d.inverse(), &buf).unwrap();

            let src = sender.region(d, RegionRole::Interior);
            let dst = receiver.region(d.inverse(), RegionRole::Ghost);
            for f in 0..2 {
                for (s, r) in src.iter().zip(dst.iter()) {
                    let a = sender.get(f, s.0, s.1, s.2);
                    let b = receiver.get(f, r.0, r.1, r.2);
                    assert_eq!(a.to_bits(), b.to_bits(), "direction {d}");
                }
            }
        }
    }

    #[test]
    fn round_trip_preserves_special_values() {
        let mut sender = block(2, 2, 2, 1, 1);
        let specials = [f64::NAN, -0.0, f64::INFINITY, f64::MIN_POSITIVE / 2.0];
        sender.fill_interior_with(0, |i, j, k| specials[((i + j + k) as usize) % specials.len()]);
        let d = Direction::new(0, 0, 1).unwrap();
        let mut receiver = block(2, 2, 2, 1, 1);
        receiver.unpack(d.inverse(), &sender.pack(d)).unwrap();
        for (i, j) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
            assert_eq!(
                sender.get(0, i, j, 1).to_bits(),
                receiver.get(0, i, j, -1).to_bits()
            );
        }
    }

    #[test]
    fn mirror_reflects_about_face() {
        let mut b = block(4, 1, 1, 2, 1);
        b.fill_interior_with(0, |i, _, _| i as f64);
        b.mirror_into_ghosts(Direction::new(-1, 0, 0).unwrap());
        assert_eq!(b.get(0, -1, 0, 0), 0.0);
        assert_eq!(b.get(0, -2, 0, 0), 1.0);
        b.mirror_into_ghosts(Direction::new(1, 0, 0).unwrap());
        assert_eq!(b.get(0, 4, 0, 0), 3.0);
        assert_eq!(b.get(0, 5, 0, 0), 2.0);
    }

    #[test]
    fn fill_ghosts_leaves_interior() {
        let mut b = block(3, 3, 3, 1, 1);
        b.fill_interior(0, 1.0);
        b.fill_ghosts(Direction::new(0, 1, 0).unwrap(), -4.0);
        assert_eq!(b.get(0, 1, 3, 1), -4.0);
        assert_eq!(b.get(0, 1, 2, 1), 1.0);
        assert_eq!(b.get(0, 1, -1, 1), 0.0);
    }

    proptest! {
        #[test]
        fn packed_len_matches_unpack_expectation(
            nx in 1usize..6, ny in 1usize..6, nz in 1usize..6,
            g in 1usize..3, f in 1usize..3, k in 0usize..26,
        ) {
            prop_assume!(g <= nx && g <= ny && g <= nz);
            let b = block(nx, ny, nz, g, f);
            let d = Direction::ALL[k];
            let buf = b.pack(d);
            let mut other = block(nx, ny, nz, g, f);
            prop_assert!(other.unpack(d.inverse(), &buf).is_ok());
        }
    }
}
