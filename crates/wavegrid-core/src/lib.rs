//! Wavegrid Core - DSP primitives for table-driven synthesis
//!
//! This crate provides the building blocks shared by every wavegrid engine,
//! designed for real-time audio with zero allocation in the audio path.
//!
//! # Core Abstractions
//!
//! ## Oscillator Phase
//!
//! - [`PhaseAccumulator`] - Radian phase that advances per sample and wraps into `[0, 2π)`
//!
//! ## Lookup Tables
//!
//! - [`LookupTable`] - Immutable 3-D sample table with row-major strides
//! - [`SineTable`] - Periodic 1-D sine table with linear interpolation
//! - [`trilinear`] - Eight-corner reconstruction over a [`LookupTable`]
//!
//! ## Parameters
//!
//! Automation lanes arrive either once per block or once per sample:
//!
//! - [`ParamValue`] - `Constant` or `PerSample` lane
//! - [`ParamBlock`] - Index-addressed lanes for one block, with defaults
//! - [`ParamDescriptor`] - Static `{name, default}` declaration
//! - [`LinearSmoothedParam`] - Constant-rate ramps (host-style scheduled ramps)
//!
//! ## Filters
//!
//! - [`Biquad`] - Second-order IIR with RBJ band-pass coefficients
//!
//! ## Utilities
//!
//! - [`midi_to_freq`], [`lerp`], [`finite_or_zero`]
//!
//! # no_std Support
//!
//! This crate is `no_std` compatible. Disable the default `std` feature:
//!
//! ```toml
//! [dependencies]
//! wavegrid-core = { version = "0.1", default-features = false }
//! ```
//!
//! # Example
//!
//! ```rust
//! use wavegrid_core::{LookupTable, trilinear};
//!
//! // 2x2x2 table holding the values 0..8
//! let table = LookupTable::new((0..8).map(|v| v as f32).collect(), [2, 2, 2]).unwrap();
//!
//! // Exact corner
//! assert_eq!(trilinear(&table, 1.0, 0.0, 1.0), table.get(1, 0, 1));
//!
//! // Center of the cube is the mean of all eight corners
//! assert!((trilinear(&table, 0.5, 0.5, 0.5) - 3.5).abs() < 1e-6);
//! ```
//!
//! # Design Principles
//!
//! - **Real-time safe**: No allocations in audio processing paths
//! - **Immutable tables**: Built once, shared through `Arc`, never locked
//! - **Clamp, don't fail**: Out-of-range coordinates are clamped, never an error

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod biquad;
pub mod interp;
pub mod math;
pub mod param;
pub mod phase;
pub mod smooth;
pub mod table;

// Re-export main types at crate root
pub use biquad::{Biquad, bandpass_coefficients};
pub use interp::{SINE_TABLE_SIZE, SineTable, trilinear};
pub use math::{finite_or_zero, lerp, midi_to_freq};
pub use param::{
    ParamBlock, ParamDescriptor, ParamValue, ResolvedParam, default_values, find_param,
};
pub use phase::{PhaseAccumulator, TAU};
pub use smooth::LinearSmoothedParam;
pub use table::{LookupTable, TableError};
