//! Sizing Context Module
//!
//! Per-call state of the estimator: the visited-address set and the overhead constants.

use std::collections::HashSet;
use std::marker::PhantomData;
use std::mem;

use crate::error::SizeError;
use crate::size::{DeepSize, Overhead};

// == Storage ==
/// Namespace an address is recorded under in the visited set.
///
/// A `Box<HashMap<..>>` points at the map header, so the pointee and the
/// table share an address. Keeping the namespaces apart lets both be counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Storage {
    /// Pointee of a `Box`, reference, `Rc` or `Arc`
    Target,
    /// Heap data of a `Vec`, `String`, slice or `str`
    Buffer,
    /// Header of a map or set
    Table,
}

// == Context ==
/// State carried through one top-level sizing call.
///
/// Created fresh for each call and dropped when it returns; never shared
/// between calls or caches.
#[derive(Debug, Default)]
pub struct Context {
    visited: HashSet<(usize, Storage)>,
    overhead: Overhead,
}

impl Context {
    // == Constructor ==
    /// Creates an empty context using the given overhead constants.
    pub fn new(overhead: Overhead) -> Self {
        Self {
            visited: HashSet::new(),
            overhead,
        }
    }

    /// Returns the overhead constants in effect.
    pub fn overhead(&self) -> Overhead {
        self.overhead
    }

    // == Visit ==
    /// Records `ptr` under `storage`.
    ///
    /// Returns `true` the first time an address is seen and `false` on every
    /// later visit, in which case the caller must not count the content again.
    pub fn visit<P: ?Sized>(&mut self, ptr: *const P, storage: Storage) -> bool {
        self.visited.insert((ptr.cast::<()>() as usize, storage))
    }

    #[cfg(test)]
    pub(crate) fn visited_len(&self) -> usize {
        self.visited.len()
    }

    // == Table Overhead ==
    /// Estimated bucket slack for a map or set holding `len` entries.
    pub fn table_overhead(&self, len: usize) -> u64 {
        (len as f64 * self.overhead.map_entry) as u64
    }

    // == Record ==
    /// Starts sizing an aggregate of type `S` field by field.
    pub fn record<S>(&mut self) -> Record<'_, S> {
        Record {
            ctx: self,
            total: 0,
            inline: 0,
            _record: PhantomData,
        }
    }
}

// == Record ==
/// Field-by-field accumulator for an aggregate.
///
/// `finish` adds the padding the compiler inserted between fields: the
/// declared width of `S` minus the declared widths of the fields visited.
pub struct Record<'a, S> {
    ctx: &'a mut Context,
    total: u64,
    inline: usize,
    _record: PhantomData<fn(&S)>,
}

impl<'a, S> Record<'a, S> {
    /// Adds the deep size of one field.
    pub fn field<F: DeepSize>(mut self, value: &F) -> Result<Self, SizeError> {
        self.total += value.deep_size(self.ctx)?;
        self.inline += mem::size_of::<F>();
        Ok(self)
    }

    /// Returns the accumulated size plus the padding correction.
    pub fn finish(self) -> Result<u64, SizeError> {
        let padding = mem::size_of::<S>().saturating_sub(self.inline);
        Ok(self.total + padding as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visit_reports_first_visit_only() {
        let mut ctx = Context::default();
        let value = 7u64;

        assert!(ctx.visit(&value as *const u64, Storage::Target));
        assert!(!ctx.visit(&value as *const u64, Storage::Target));
        assert_eq!(ctx.visited_len(), 1);
    }

    #[test]
    fn test_visit_namespaces_are_independent() {
        let mut ctx = Context::default();
        let value = 7u64;

        assert!(ctx.visit(&value as *const u64, Storage::Target));
        assert!(ctx.visit(&value as *const u64, Storage::Table));
        assert_eq!(ctx.visited_len(), 2);
    }

    #[test]
    fn test_table_overhead_truncates() {
        let ctx = Context::new(Overhead { map_entry: 10.79 });
        assert_eq!(ctx.table_overhead(0), 0);
        assert_eq!(ctx.table_overhead(1), 10);
        assert_eq!(ctx.table_overhead(2), 21);
        assert_eq!(ctx.table_overhead(100), 1079);
    }

    #[test]
    fn test_record_adds_padding() {
        #[allow(dead_code)]
        struct Padded {
            a: u8,
            b: u64,
        }

        let mut ctx = Context::default();
        let size = ctx
            .record::<Padded>()
            .field(&1u8)
            .unwrap()
            .field(&2u64)
            .unwrap()
            .finish()
            .unwrap();

        assert_eq!(size, mem::size_of::<Padded>() as u64);
    }
}
