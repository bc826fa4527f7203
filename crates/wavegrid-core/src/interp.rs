//! Sample reconstruction over lookup tables.
//!
//! Two interpolators cover every engine:
//!
//! - [`SineTable`] - periodic linear interpolation over a 1-D sine table,
//!   used by the additive engine for its partials.
//! - [`trilinear`] - eight-corner interpolation over a 3-D [`LookupTable`],
//!   shared by the waveshaper and wavetable-grid engines.

use crate::phase::TAU;
use crate::table::LookupTable;
use libm::{ceil, floor, fmod, sin};

/// Number of entries in the additive engine's sine table.
pub const SINE_TABLE_SIZE: usize = 4096;

/// Precomputed sine cycle read with linear interpolation.
///
/// Entry `n` holds `sin(2π·n/N)`. Lookups wrap the argument into `[0, 2π)`
/// and interpolate between the floor entry and the next one, wrapping from
/// the last entry back to the first, so the reconstruction is periodic.
///
/// # Example
///
/// ```rust
/// use wavegrid_core::{SineTable, TAU};
///
/// let sine = SineTable::new();
/// assert!((sine.lookup(TAU / 4.0) - 1.0).abs() < 1e-6);
/// assert!((sine.lookup(1.0) - sine.lookup(1.0 + TAU)).abs() < 1e-6);
/// ```
#[derive(Debug, Clone)]
pub struct SineTable {
    table: LookupTable,
    scale: f64,
}

impl Default for SineTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SineTable {
    /// Build the standard [`SINE_TABLE_SIZE`]-entry table.
    pub fn new() -> Self {
        Self::with_size(SINE_TABLE_SIZE)
    }

    /// Build a table with `size` entries (at least 2).
    pub fn with_size(size: usize) -> Self {
        let size = size.max(2);
        let table = LookupTable::from_fn([size, 1, 1], |n, _, _| {
            sin(TAU * n as f64 / size as f64) as f32
        })
        .unwrap_or_else(|_| unreachable!("sine table shape is never empty"));
        Self {
            table,
            scale: size as f64 / TAU,
        }
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Always false; tables hold at least two entries.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Interpolated `sin(x)` for any finite `x`; non-finite input yields 0.
    #[inline]
    pub fn lookup(&self, x: f64) -> f64 {
        if !x.is_finite() {
            return 0.0;
        }
        let mut x = if x.abs() >= 2.0 * TAU { fmod(x, TAU) } else { x };
        while x < 0.0 {
            x += TAU;
        }
        while x >= TAU {
            x -= TAU;
        }

        let n = self.table.len();
        let pos = x * self.scale;
        let integral = floor(pos);
        let fraction = pos - integral;
        let i = (integral as usize) % n;

        let data = self.table.data();
        let lower = f64::from(data[i]);
        let upper = f64::from(data[(i + 1) % n]);
        lower + (upper - lower) * fraction
    }
}

/// Floor index and fractional weight of one clamped coordinate.
///
/// The weight is 0 when floor and ceil coincide, so integer coordinates and
/// the upper table edge never divide by zero.
#[inline]
fn axis_bounds(coord: f64) -> (usize, usize, f64) {
    let lo = floor(coord);
    let hi = ceil(coord);
    let weight = if hi > lo { (coord - lo) / (hi - lo) } else { 0.0 };
    (lo as usize, hi as usize, weight)
}

/// Trilinear interpolation at continuous coordinates `(c0, c1, c2)`.
///
/// Each coordinate is clamped into `[0, shape[d] - 1]` first. The eight
/// surrounding samples are blended along axis 0, then axis 1, then axis 2.
/// At integer coordinates the stored sample is returned exactly.
#[inline]
pub fn trilinear(table: &LookupTable, c0: f64, c1: f64, c2: f64) -> f32 {
    let (p0, p1, pd) = axis_bounds(table.clamp_coord(0, c0));
    let (x0, x1, xd) = axis_bounds(table.clamp_coord(1, c1));
    let (y0, y1, yd) = axis_bounds(table.clamp_coord(2, c2));

    let data = table.data();
    let at = |i0, i1, i2| f64::from(data[table.index(i0, i1, i2)]);

    let c000 = at(p0, x0, y0);
    let c100 = at(p1, x0, y0);
    let c001 = at(p0, x0, y1);
    let c101 = at(p1, x0, y1);
    let c010 = at(p0, x1, y0);
    let c110 = at(p1, x1, y0);
    let c011 = at(p0, x1, y1);
    let c111 = at(p1, x1, y1);

    let c00 = c000 * (1.0 - pd) + c100 * pd;
    let c01 = c001 * (1.0 - pd) + c101 * pd;
    let c10 = c010 * (1.0 - pd) + c110 * pd;
    let c11 = c011 * (1.0 - pd) + c111 * pd;

    let c0 = c00 * (1.0 - xd) + c10 * xd;
    let c1 = c01 * (1.0 - xd) + c11 * xd;

    (c0 * (1.0 - yd) + c1 * yd) as f32
}
