//! Automation lanes: block-rate and sample-rate parameters.
//!
//! A host delivers each engine parameter for a block either as a single
//! value ("block-rate", k-rate) or as one value per sample ("sample-rate",
//! a-rate). Engines never branch on that distinction at their call sites:
//! each lane is resolved once per block into a [`ResolvedParam`] and then
//! read uniformly with [`ResolvedParam::at`].
//!
//! Parameters are addressed by index, in the order of the engine's
//! [`ParamDescriptor`] list. A [`ParamBlock`] carries the lanes the host
//! supplied for one block; lanes it leaves out fall back to the engine's
//! stored value for that parameter.
//!
//! ```rust
//! use wavegrid_core::{ParamBlock, ParamValue};
//!
//! let ramp = [0.0, 0.25, 0.5, 0.75];
//! let lanes = [Some(ParamValue::Constant(0.5)), None, Some(ParamValue::PerSample(&ramp))];
//! let block = ParamBlock::new(&lanes);
//!
//! let x = block.resolve(0, 4, 0.0);
//! let y = block.resolve(1, 4, 0.9);
//! let gain = block.resolve(2, 4, 1.0);
//! assert_eq!(x.at(3), 0.5);
//! assert_eq!(y.at(3), 0.9);
//! assert_eq!(gain.at(3), 0.75);
//! ```

#[cfg(not(feature = "std"))]
use alloc::{borrow::Cow, vec::Vec};
#[cfg(feature = "std")]
use std::borrow::Cow;

/// One parameter lane as supplied by the host for a block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamValue<'a> {
    /// A single value applying to the whole block.
    Constant(f64),
    /// One value per sample.
    ///
    /// Used per sample only when its length equals the block length;
    /// otherwise its first value is broadcast.
    PerSample(&'a [f64]),
}

impl<'a> ParamValue<'a> {
    /// Resolve against a block length, using `fallback` for an empty lane.
    #[inline]
    pub fn resolve(self, block_len: usize, fallback: f64) -> ResolvedParam<'a> {
        match self {
            Self::Constant(v) => ResolvedParam::Constant(v),
            Self::PerSample(values) if values.len() == block_len && block_len > 0 => {
                ResolvedParam::PerSample(values)
            }
            Self::PerSample(values) => {
                ResolvedParam::Constant(values.first().copied().unwrap_or(fallback))
            }
        }
    }
}

/// A lane resolved for one block; `at(n)` is valid for every `n` in the block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResolvedParam<'a> {
    /// Same value at every sample.
    Constant(f64),
    /// One value per sample, length equal to the block.
    PerSample(&'a [f64]),
}

impl ResolvedParam<'_> {
    /// Value at sample `n`.
    #[inline]
    pub fn at(&self, n: usize) -> f64 {
        match self {
            Self::Constant(v) => *v,
            Self::PerSample(values) => values[n],
        }
    }

    /// First value of the block (what a block-rate reader uses).
    #[inline]
    pub fn first(&self) -> f64 {
        self.at(0)
    }
}

/// The lanes a host supplies for one block, indexed by parameter index.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParamBlock<'a> {
    lanes: &'a [Option<ParamValue<'a>>],
}

impl<'a> ParamBlock<'a> {
    /// Wrap a lane slice ordered like the engine's descriptors.
    pub fn new(lanes: &'a [Option<ParamValue<'a>>]) -> Self {
        Self { lanes }
    }

    /// A block that supplies no lanes; every parameter uses its stored value.
    pub const fn empty() -> Self {
        Self { lanes: &[] }
    }

    /// The lane supplied for `index`, if any.
    #[inline]
    pub fn lane(&self, index: usize) -> Option<ParamValue<'a>> {
        self.lanes.get(index).copied().flatten()
    }

    /// Resolve parameter `index` for a block of `block_len` samples.
    ///
    /// `stored` is used when the host supplied no lane (or an empty one).
    #[inline]
    pub fn resolve(&self, index: usize, block_len: usize, stored: f64) -> ResolvedParam<'a> {
        match self.lane(index) {
            Some(value) => value.resolve(block_len, stored),
            None => ResolvedParam::Constant(stored),
        }
    }
}

/// Static declaration of one engine parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamDescriptor {
    /// Stable name used by hosts, patches, and automation lanes.
    pub name: Cow<'static, str>,
    /// Value used until the host or a control message sets one.
    pub default_value: f64,
}

impl ParamDescriptor {
    /// Descriptor with a static name.
    pub const fn new(name: &'static str, default_value: f64) -> Self {
        Self {
            name: Cow::Borrowed(name),
            default_value,
        }
    }

    /// Descriptor with a generated name (e.g. numbered partials).
    pub fn owned(name: impl Into<Cow<'static, str>>, default_value: f64) -> Self {
        Self {
            name: name.into(),
            default_value,
        }
    }
}

/// Index of the descriptor called `name`.
pub fn find_param(descriptors: &[ParamDescriptor], name: &str) -> Option<usize> {
    descriptors.iter().position(|d| d.name == name)
}

/// Default values of a descriptor list, in order.
pub fn default_values(descriptors: &[ParamDescriptor]) -> Vec<f64> {
    descriptors.iter().map(|d| d.default_value).collect()
}
