//! Deep Size Module
//!
//! Estimates the memory footprint of a value by walking everything it owns or
//! points to. Shared and cyclic structures are counted once through a per-call
//! visited set. The result is an approximation: padding and hash-table slack
//! are modelled with fixed constants, not measured.

mod context;
mod impls;

pub use context::{Context, Record, Storage};

use crate::error::SizeError;

// == Public Constants ==
/// Average bytes of unused bucket space per map entry.
///
/// Empirical figure for a hash table with a load factor around 6.5 per
/// 8-slot bucket; tune through [`Overhead`] for other allocators.
pub const DEFAULT_MAP_ENTRY_OVERHEAD: f64 = 10.79;

// == Overhead ==
/// Tunable corrections for allocator and container slack.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Overhead {
    /// Bytes added per entry of a map or set
    pub map_entry: f64,
}

impl Default for Overhead {
    fn default() -> Self {
        Self {
            map_entry: DEFAULT_MAP_ENTRY_OVERHEAD,
        }
    }
}

// == Deep Size ==
/// Reports the estimated memory footprint of a value, recursively.
///
/// The returned size includes the value's own inline width. Implementations
/// for pointer-like types must consult [`Context::visit`] before descending so
/// that shared targets are counted once and cycles terminate.
///
/// Plain records can use [`deep_size_record!`](crate::deep_size_record):
///
/// ```
/// use maxbytes_cache::{deep_size_record, estimate_size};
///
/// struct Point {
///     x: u32,
///     label: String,
/// }
///
/// deep_size_record!(Point { x, label });
///
/// let p = Point { x: 1, label: String::from("origin") };
/// assert!(estimate_size(&p).unwrap() >= std::mem::size_of::<Point>() as u64);
/// ```
pub trait DeepSize {
    fn deep_size(&self, ctx: &mut Context) -> Result<u64, SizeError>;
}

// == Entry Points ==
/// Estimates the size of `value` with the default overhead constants.
pub fn estimate_size<T: DeepSize + ?Sized>(value: &T) -> Result<u64, SizeError> {
    estimate_size_with(value, Overhead::default())
}

/// Estimates the size of `value` with explicit overhead constants.
pub fn estimate_size_with<T: DeepSize + ?Sized>(
    value: &T,
    overhead: Overhead,
) -> Result<u64, SizeError> {
    let mut ctx = Context::new(overhead);
    value.deep_size(&mut ctx)
}

/// Estimates the size of a value whose type is known to be sizable.
///
/// # Panics
/// Panics if the walk reaches an unsupported kind. Only call this for values
/// whose type has already passed [`estimate_size`].
pub fn must_estimate_size<T: DeepSize + ?Sized>(value: &T) -> u64 {
    match estimate_size(value) {
        Ok(size) => size,
        Err(err) => panic!("size estimation of a validated type failed: {}", err),
    }
}

// == Record Macro ==
/// Implements [`DeepSize`] for a record by summing the listed fields and
/// adding the padding correction.
///
/// Every field must be listed; unlisted fields are counted as padding only.
#[macro_export]
macro_rules! deep_size_record {
    ($ty:ty { $($field:tt),* $(,)? }) => {
        impl $crate::DeepSize for $ty {
            fn deep_size(
                &self,
                ctx: &mut $crate::size::Context,
            ) -> ::std::result::Result<u64, $crate::SizeError> {
                ctx.record::<Self>()
                    $(.field(&self.$field)?)*
                    .finish()
            }
        }
    };
}
