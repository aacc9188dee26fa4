//! Abstraction layer for parallel iteration.
//!
//! With the `parallel` feature enabled this re-exports Rayon's iterator
//! traits; without it, serial fallbacks mimic the same API, so the reduction
//! code is written once. Callers fan out with `into_par_iter()` and merge the
//! per-chunk results serially, a shape both backends support.

#[cfg(feature = "parallel")]
pub use rayon::prelude::{IntoParallelIterator, ParallelIterator};

#[cfg(not(feature = "parallel"))]
pub use self::fallback::*;

#[cfg(not(feature = "parallel"))]
mod fallback {
    pub use std::iter::Iterator as ParallelIterator;

    /// Shim trait to allow `into_par_iter()` on types that implement `IntoIterator`.
    pub trait IntoParallelIterator {
        type Item;
        type Iter: Iterator<Item = Self::Item>;
        fn into_par_iter(self) -> Self::Iter;
    }

    impl<I: IntoIterator> IntoParallelIterator for I {
        type Item = I::Item;
        type Iter = I::IntoIter;
        fn into_par_iter(self) -> Self::Iter {
            self.into_iter()
        }
    }
}
