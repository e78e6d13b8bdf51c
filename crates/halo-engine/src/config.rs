//! Domain configuration, validation, and error types.
//!
//! [`DomainConfig`] is the builder input for a [`Domain`](crate::Domain).
//! [`validate()`](DomainConfig::validate) checks structural invariants
//! once, before any actor exists; nothing is re-checked per cycle.

use std::error::Error;
use std::fmt;
use std::time::Duration;

use halo_core::{Axis, BlockExtents, CellCounts, FieldError, Periodicity, RefreshClass, TopologyError};
use halo_field::BlockGeometry;

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected while validating a [`DomainConfig`] or building a
/// domain from it.
#[derive(Debug, PartialEq)]
pub enum ConfigError {
    /// Topology construction failed.
    Topology(TopologyError),
    /// Field storage could not be allocated.
    Field(FieldError),
    /// Ghost depth is zero although some axis exchanges ghosts.
    ZeroGhostDepth,
    /// Ghost depth is larger than the cells it would be copied from.
    GhostDepthExceedsCells {
        /// Configured depth.
        ghost_depth: usize,
        /// Smallest exchanging cell count.
        cells: usize,
    },
    /// No fields configured.
    NoFields,
    /// Domain bounds are not finite or not increasing on some axis.
    InvalidGeometry {
        /// Lower corner.
        lower: [f64; 3],
        /// Upper corner.
        upper: [f64; 3],
    },
    /// `max_cycles` is `Some(0)`.
    ZeroMaxCycles,
    /// Liveness timeout is `Some(Duration::ZERO)`.
    ZeroLivenessTimeout,
    /// A worker thread could not be spawned.
    ThreadSpawnFailed {
        /// Description of which thread failed.
        reason: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Topology(e) => write!(f, "topology: {e}"),
            Self::Field(e) => write!(f, "field: {e}"),
            Self::ZeroGhostDepth => write!(f, "ghost_depth must be at least 1"),
            Self::GhostDepthExceedsCells { ghost_depth, cells } => write!(
                f,
                "ghost_depth {ghost_depth} exceeds the {cells} cells of an exchanging axis"
            ),
            Self::NoFields => write!(f, "field_count must be at least 1"),
            Self::InvalidGeometry { lower, upper } => {
                write!(f, "invalid domain bounds {lower:?} .. {upper:?}")
            }
            Self::ZeroMaxCycles => write!(f, "max_cycles must be at least 1"),
            Self::ZeroLivenessTimeout => write!(f, "liveness_timeout must be non-zero"),
            Self::ThreadSpawnFailed { reason } => write!(f, "thread spawn failed: {reason}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Topology(e) => Some(e),
            Self::Field(e) => Some(e),
            _ => None,
        }
    }
}

impl From<TopologyError> for ConfigError {
    fn from(e: TopologyError) -> Self {
        Self::Topology(e)
    }
}

impl From<FieldError> for ConfigError {
    fn from(e: FieldError) -> Self {
        Self::Field(e)
    }
}

// ── DomainConfig ───────────────────────────────────────────────────

/// Everything needed to build a domain of block actors.
#[derive(Clone, Debug)]
pub struct DomainConfig {
    /// Blocks along each axis.
    pub extents: BlockExtents,
    /// Interior cells per block along each axis.
    pub cells: CellCounts,
    /// Ghost layers on every exchanging axis. Default: 1.
    pub ghost_depth: usize,
    /// Scalar fields per block. Default: 1.
    pub field_count: usize,
    /// Per-axis wraparound. Default: none.
    pub periodicity: Periodicity,
    /// Which neighbor classes exchange ghosts. Default: faces only.
    pub refresh: RefreshClass,
    /// Domain lower corner. Default: origin.
    pub lower: [f64; 3],
    /// Domain upper corner. Default: `[1, 1, 1]`.
    pub upper: [f64; 3],
    /// Fail a block that waits longer than this for any message.
    /// Default: `None` (wait indefinitely).
    pub liveness_timeout: Option<Duration>,
    /// Force a stop vote once this many cycles have been computed.
    /// Default: `None`.
    pub max_cycles: Option<u64>,
}

impl Default for DomainConfig {
    fn default() -> Self {
        Self {
            extents: BlockExtents::single(),
            cells: CellCounts {
                nx: 8,
                ny: 8,
                nz: 8,
            },
            ghost_depth: 1,
            field_count: 1,
            periodicity: Periodicity::none(),
            refresh: RefreshClass::FACE_ONLY,
            lower: [0.0; 3],
            upper: [1.0; 3],
            liveness_timeout: None,
            max_cycles: None,
        }
    }
}

impl DomainConfig {
    /// Config for `extents` blocks of `cells` cells, defaults elsewhere.
    pub fn new(extents: BlockExtents, cells: CellCounts) -> Self {
        Self {
            extents,
            cells,
            ..Self::default()
        }
    }

    /// Physical geometry derived from the bounds.
    pub fn geometry(&self) -> BlockGeometry {
        BlockGeometry::new(self.lower, self.upper, self.extents, self.cells)
    }

    /// Check structural invariants.
    ///
    /// Ghost depth is only constrained on axes that exchange (more than one
    /// cell); a 1-cell axis carries no ghosts at any depth.
    pub fn validate(&self) -> Result<(), ConfigError> {
        // `cells` may have been built as a literal, bypassing `CellCounts::new`.
        let [nx, ny, nz] = self.cells.to_array();
        CellCounts::new(nx, ny, nz)?;
        if self.field_count == 0 {
            return Err(ConfigError::NoFields);
        }
        let exchanging: Vec<usize> = Axis::ALL
            .into_iter()
            .filter(|&a| self.cells.exchanges(a))
            .map(|a| self.cells.get(a))
            .collect();
        if !exchanging.is_empty() && self.ghost_depth == 0 {
            return Err(ConfigError::ZeroGhostDepth);
        }
        if let Some(&min) = exchanging.iter().min() {
            if self.ghost_depth > min {
                return Err(ConfigError::GhostDepthExceedsCells {
                    ghost_depth: self.ghost_depth,
                    cells: min,
                });
            }
        }
        if !self.geometry().is_valid() {
            return Err(ConfigError::InvalidGeometry {
                lower: self.lower,
                upper: self.upper,
            });
        }
        if self.max_cycles == Some(0) {
            return Err(ConfigError::ZeroMaxCycles);
        }
        if self.liveness_timeout == Some(Duration::ZERO) {
            return Err(ConfigError::ZeroLivenessTimeout);
        }
        Ok(())
    }
}
