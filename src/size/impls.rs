//! DeepSize implementations for standard library types.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::marker::PhantomData;
use std::mem::{size_of, size_of_val};
use std::rc::{self, Rc};
use std::sync::mpsc::{Receiver, Sender, SyncSender};
use std::sync::{self, Arc};
use std::time::Duration;

use crate::error::{Kind, SizeError};
use crate::size::{Context, DeepSize, Storage};

// == Helpers ==
/// Sizes the target of an owning or borrowing pointer of width `pointer`.
fn indirect<T: DeepSize + ?Sized>(
    target: &T,
    pointer: usize,
    ctx: &mut Context,
) -> Result<u64, SizeError> {
    if size_of_val(target) > 0 && !ctx.visit(target as *const T, Storage::Target) {
        return Ok(pointer as u64);
    }
    Ok(target.deep_size(ctx)? + pointer as u64)
}

/// Like [`indirect`], plus the strong and weak counters on first visit.
fn counted<T: DeepSize + ?Sized>(
    target: &T,
    pointer: usize,
    ctx: &mut Context,
) -> Result<u64, SizeError> {
    if !ctx.visit(target as *const T, Storage::Target) {
        return Ok(pointer as u64);
    }
    let counters = 2 * size_of::<usize>() as u64;
    Ok(target.deep_size(ctx)? + pointer as u64 + counters)
}

fn sum<'a, T, I>(items: I, ctx: &mut Context) -> Result<u64, SizeError>
where
    T: DeepSize + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let mut total = 0;
    for item in items {
        total += item.deep_size(ctx)?;
    }
    Ok(total)
}

fn spare<T>(capacity: usize, len: usize) -> u64 {
    capacity.saturating_sub(len) as u64 * size_of::<T>() as u64
}

// == Scalars ==
macro_rules! inline_only {
    ($(impl<$($gen:ident),*> $ty:ty;)+) => {
        $(
            impl<$($gen),*> DeepSize for $ty {
                fn deep_size(&self, _ctx: &mut Context) -> Result<u64, SizeError> {
                    Ok(size_of::<Self>() as u64)
                }
            }
        )+
    };
}

inline_only! {
    impl<> ();
    impl<> bool;
    impl<> char;
    impl<> u8;
    impl<> u16;
    impl<> u32;
    impl<> u64;
    impl<> u128;
    impl<> usize;
    impl<> i8;
    impl<> i16;
    impl<> i32;
    impl<> i64;
    impl<> i128;
    impl<> isize;
    impl<> f32;
    impl<> f64;
    impl<> Duration;
    impl<T> PhantomData<T>;
    impl<R> fn() -> R;
    impl<A, R> fn(A) -> R;
    impl<A, B, R> fn(A, B) -> R;
    impl<A, B, C, R> fn(A, B, C) -> R;
    impl<T> Sender<T>;
    impl<T> SyncSender<T>;
    impl<T> Receiver<T>;
    impl<T> rc::Weak<T>;
    impl<T> sync::Weak<T>;
}

// == Unsupported ==
macro_rules! unsupported {
    ($kind:expr => $(impl<$($gen:ident),*> $ty:ty;)+) => {
        $(
            impl<$($gen),*> DeepSize for $ty {
                fn deep_size(&self, _ctx: &mut Context) -> Result<u64, SizeError> {
                    Err(SizeError::unsupported::<Self>($kind))
                }
            }
        )+
    };
}

macro_rules! unsupported_closures {
    ($($arg:ident),*) => {
        unsupported! {
            Kind::Func =>
            impl<$($arg,)* R> dyn Fn($($arg),*) -> R;
            impl<$($arg,)* R> dyn Fn($($arg),*) -> R + Send;
            impl<$($arg,)* R> dyn Fn($($arg),*) -> R + Send + Sync;
            impl<$($arg,)* R> dyn FnMut($($arg),*) -> R;
            impl<$($arg,)* R> dyn FnMut($($arg),*) -> R + Send;
        }
    };
}

unsupported_closures!();
unsupported_closures!(A);
unsupported_closures!(A, B);
unsupported_closures!(A, B, C);

unsupported! {
    Kind::Any =>
    impl<> dyn Any;
    impl<> dyn Any + Send;
    impl<> dyn Any + Send + Sync;
}

impl<T: ?Sized> DeepSize for *const T {
    fn deep_size(&self, _ctx: &mut Context) -> Result<u64, SizeError> {
        Err(SizeError::unsupported::<Self>(Kind::RawPtr))
    }
}

impl<T: ?Sized> DeepSize for *mut T {
    fn deep_size(&self, _ctx: &mut Context) -> Result<u64, SizeError> {
        Err(SizeError::unsupported::<Self>(Kind::RawPtr))
    }
}

// == Sequences ==
// A slice shares its buffer namespace with the `Vec` it may borrow from.
impl<T: DeepSize> DeepSize for [T] {
    fn deep_size(&self, ctx: &mut Context) -> Result<u64, SizeError> {
        let backed = !self.is_empty() && size_of::<T>() > 0;
        if backed && !ctx.visit(self.as_ptr(), Storage::Buffer) {
            return Ok(0);
        }
        sum(self, ctx)
    }
}

impl<T: DeepSize, const N: usize> DeepSize for [T; N] {
    fn deep_size(&self, ctx: &mut Context) -> Result<u64, SizeError> {
        sum(self, ctx)
    }
}

impl<T: DeepSize> DeepSize for Vec<T> {
    fn deep_size(&self, ctx: &mut Context) -> Result<u64, SizeError> {
        let header = size_of::<Self>() as u64;
        let allocated = self.capacity() > 0 && size_of::<T>() > 0;
        if allocated && !ctx.visit(self.as_ptr(), Storage::Buffer) {
            return Ok(header);
        }
        let elements = sum(self, ctx)?;
        Ok(elements + spare::<T>(self.capacity(), self.len()) + header)
    }
}

impl<T: DeepSize> DeepSize for VecDeque<T> {
    fn deep_size(&self, ctx: &mut Context) -> Result<u64, SizeError> {
        let elements = sum(self, ctx)?;
        Ok(elements + spare::<T>(self.capacity(), self.len()) + size_of::<Self>() as u64)
    }
}

// == Text ==
impl DeepSize for str {
    fn deep_size(&self, ctx: &mut Context) -> Result<u64, SizeError> {
        if !self.is_empty() && !ctx.visit(self.as_ptr(), Storage::Buffer) {
            return Ok(0);
        }
        Ok(self.len() as u64)
    }
}

impl DeepSize for String {
    fn deep_size(&self, ctx: &mut Context) -> Result<u64, SizeError> {
        let header = size_of::<Self>() as u64;
        if self.capacity() > 0 && !ctx.visit(self.as_ptr(), Storage::Buffer) {
            return Ok(header);
        }
        Ok(self.len() as u64 + header)
    }
}

// == Indirections ==
impl<T: DeepSize + ?Sized> DeepSize for Box<T> {
    fn deep_size(&self, ctx: &mut Context) -> Result<u64, SizeError> {
        indirect(&**self, size_of::<Self>(), ctx)
    }
}

impl<T: DeepSize + ?Sized> DeepSize for &T {
    fn deep_size(&self, ctx: &mut Context) -> Result<u64, SizeError> {
        indirect(*self, size_of::<Self>(), ctx)
    }
}

impl<T: DeepSize + ?Sized> DeepSize for &mut T {
    fn deep_size(&self, ctx: &mut Context) -> Result<u64, SizeError> {
        indirect(&**self, size_of::<Self>(), ctx)
    }
}

impl<T: DeepSize + ?Sized> DeepSize for Rc<T> {
    fn deep_size(&self, ctx: &mut Context) -> Result<u64, SizeError> {
        counted(&**self, size_of::<Self>(), ctx)
    }
}

impl<T: DeepSize + ?Sized> DeepSize for Arc<T> {
    fn deep_size(&self, ctx: &mut Context) -> Result<u64, SizeError> {
        counted(&**self, size_of::<Self>(), ctx)
    }
}

// == Enums ==
impl<T: DeepSize> DeepSize for Option<T> {
    fn deep_size(&self, ctx: &mut Context) -> Result<u64, SizeError> {
        match self {
            Some(value) => ctx.record::<Self>().field(value)?.finish(),
            None => Ok(size_of::<Self>() as u64),
        }
    }
}

impl<T: DeepSize, E: DeepSize> DeepSize for Result<T, E> {
    fn deep_size(&self, ctx: &mut Context) -> Result<u64, SizeError> {
        match self {
            Ok(value) => ctx.record::<Self>().field(value)?.finish(),
            Err(err) => ctx.record::<Self>().field(err)?.finish(),
        }
    }
}

// == Tuples ==
macro_rules! tuple {
    ($($name:ident $idx:tt),+) => {
        impl<$($name: DeepSize),+> DeepSize for ($($name,)+) {
            fn deep_size(&self, ctx: &mut Context) -> Result<u64, SizeError> {
                ctx.record::<Self>()
                    $(.field(&self.$idx)?)+
                    .finish()
            }
        }
    };
}

tuple!(A 0);
tuple!(A 0, B 1);
tuple!(A 0, B 1, C 2);
tuple!(A 0, B 1, C 2, D 3);
tuple!(A 0, B 1, C 2, D 3, E 4);
tuple!(A 0, B 1, C 2, D 3, E 4, F 5);

// == Interior Mutability ==
// A cell that cannot be borrowed without blocking counts as its static width.
impl<T: DeepSize + Copy> DeepSize for Cell<T> {
    fn deep_size(&self, ctx: &mut Context) -> Result<u64, SizeError> {
        ctx.record::<Self>().field(&self.get())?.finish()
    }
}

impl<T: DeepSize> DeepSize for RefCell<T> {
    fn deep_size(&self, ctx: &mut Context) -> Result<u64, SizeError> {
        match self.try_borrow() {
            Ok(value) => ctx.record::<Self>().field(&*value)?.finish(),
            Err(_) => Ok(size_of::<Self>() as u64),
        }
    }
}

impl<T: DeepSize> DeepSize for sync::Mutex<T> {
    fn deep_size(&self, ctx: &mut Context) -> Result<u64, SizeError> {
        match self.try_lock() {
            Ok(value) => ctx.record::<Self>().field(&*value)?.finish(),
            Err(_) => Ok(size_of::<Self>() as u64),
        }
    }
}

impl<T: DeepSize> DeepSize for sync::RwLock<T> {
    fn deep_size(&self, ctx: &mut Context) -> Result<u64, SizeError> {
        match self.try_read() {
            Ok(value) => ctx.record::<Self>().field(&*value)?.finish(),
            Err(_) => Ok(size_of::<Self>() as u64),
        }
    }
}

impl<T: DeepSize> DeepSize for parking_lot::Mutex<T> {
    fn deep_size(&self, ctx: &mut Context) -> Result<u64, SizeError> {
        match self.try_lock() {
            Some(value) => ctx.record::<Self>().field(&*value)?.finish(),
            None => Ok(size_of::<Self>() as u64),
        }
    }
}

impl<T: DeepSize> DeepSize for parking_lot::RwLock<T> {
    fn deep_size(&self, ctx: &mut Context) -> Result<u64, SizeError> {
        match self.try_read() {
            Some(value) => ctx.record::<Self>().field(&*value)?.finish(),
            None => Ok(size_of::<Self>() as u64),
        }
    }
}

// == Maps ==
macro_rules! table {
    (map $ty:ident <K, V $(, $s:ident)?>) => {
        impl<K: DeepSize, V: DeepSize $(, $s)?> DeepSize for $ty<K, V $(, $s)?> {
            fn deep_size(&self, ctx: &mut Context) -> Result<u64, SizeError> {
                if !ctx.visit(self as *const Self, Storage::Table) {
                    return Ok(0);
                }
                let mut total = 0;
                for (key, value) in self {
                    total += key.deep_size(ctx)? + value.deep_size(ctx)?;
                }
                Ok(total + size_of::<Self>() as u64 + ctx.table_overhead(self.len()))
            }
        }
    };
    (set $ty:ident <K $(, $s:ident)?>) => {
        impl<K: DeepSize $(, $s)?> DeepSize for $ty<K $(, $s)?> {
            fn deep_size(&self, ctx: &mut Context) -> Result<u64, SizeError> {
                if !ctx.visit(self as *const Self, Storage::Table) {
                    return Ok(0);
                }
                let total = sum(self, ctx)?;
                Ok(total + size_of::<Self>() as u64 + ctx.table_overhead(self.len()))
            }
        }
    };
}

table!(map HashMap<K, V, S>);
table!(map BTreeMap<K, V>);
table!(set HashSet<K, S>);
table!(set BTreeSet<K>);
