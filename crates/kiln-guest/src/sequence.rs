//! The `fibArray` sequence.
//!
//! Shared verbatim with the wasm guest fixtures, so it must stay free of
//! workspace imports and compile under both the 2021 and 2024 editions.

use std::fmt;

/// Longest array a 32-bit guest could address: its `i32` elements must fit
/// in 4 GiB of linear memory.
pub const MAX_LEN: usize = (u32::MAX / 4) as usize;

/// Why no `fibArray` result exists for a given length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FibArrayError {
    /// `n <= 0`: the array has no last element.
    Empty,
    /// The array does not fit in memory.
    TooLong,
}

impl FibArrayError {
    pub fn reason(self) -> &'static str {
        match self {
            FibArrayError::Empty => "array length must be positive",
            FibArrayError::TooLong => "array does not fit in memory",
        }
    }
}

impl fmt::Display for FibArrayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.reason())
    }
}

/// Fill an `n`-element array left to right and return its last element.
///
/// The array starts `1, 1` rather than `0, 1`: `arr[0]` is 1, not 0, so
/// that `fib_array(1) == 1` and `fib_array(2) == 1`. From index 2 on,
/// `arr[i] = arr[i-1] + arr[i-2]`. Addition wraps like wasm `i32.add`, so
/// `fib_array(47)` and beyond are reduced modulo 2^32.
///
/// The array is allocated fallibly. Lengths beyond [`MAX_LEN`], or that the
/// allocator refuses, yield [`FibArrayError::TooLong`] instead of aborting.
pub fn fib_array(n: i32) -> Result<i32, FibArrayError> {
    if n <= 0 {
        return Err(FibArrayError::Empty);
    }

    let len = n as usize;
    if len > MAX_LEN {
        return Err(FibArrayError::TooLong);
    }
    let mut arr: Vec<i32> = Vec::new();
    arr.try_reserve_exact(len)
        .map_err(|_| FibArrayError::TooLong)?;

    for i in 0..len {
        let term = if i < 2 {
            1
        } else {
            arr[i - 1].wrapping_add(arr[i - 2])
        };
        arr.push(term);
    }

    arr.last().copied().ok_or(FibArrayError::Empty)
}
