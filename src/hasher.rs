//! Hashing: native 32-bit key hashes, the high-bit spreading step, and
//! bucket index masking.
//!
//! A table hashes in two stages. A `NativeHash` strategy maps a key to a
//! 32-bit hash code; `spread` then folds the upper 16 bits into the lower
//! 16 so that `index_for`, which only consumes the low bits, still sees
//! entropy from the whole code.

use crate::error::KeyHashError;
use core::hash::{BuildHasher, BuildHasherDefault, Hash};
use std::collections::hash_map::DefaultHasher;

/// Folds the high half of `h` into the low half: `h ^ (h >>> 16)`.
#[inline]
pub fn spread(h: i32) -> i32 {
    h ^ ((h as u32) >> 16) as i32
}

/// Bucket index for `hash` in a table of `capacity` buckets.
///
/// `capacity` must be a power of two; the mask is then equivalent to
/// `hash mod capacity` on the unsigned hash.
#[inline]
pub fn index_for(hash: i32, capacity: usize) -> usize {
    debug_assert!(capacity.is_power_of_two());
    (hash as u32 as usize) & (capacity - 1)
}

/// Strategy that computes a key's native 32-bit hash code.
pub trait NativeHash<K: ?Sized> {
    fn native_hash(&self, key: &K) -> Result<i32, KeyHashError>;
}

/// Deterministic 32-bit hash codes in the classic managed-runtime layout:
/// strings hash their UTF-16 units with multiplier 31, integers hash to
/// themselves, 64-bit values fold their halves.
pub trait JavaHashCode {
    fn java_hash_code(&self) -> i32;
}

impl JavaHashCode for str {
    fn java_hash_code(&self) -> i32 {
        self.encode_utf16()
            .fold(0i32, |h, unit| h.wrapping_mul(31).wrapping_add(unit as i32))
    }
}

impl JavaHashCode for String {
    fn java_hash_code(&self) -> i32 {
        self.as_str().java_hash_code()
    }
}

impl<T: JavaHashCode + ?Sized> JavaHashCode for &T {
    fn java_hash_code(&self) -> i32 {
        (**self).java_hash_code()
    }
}

impl<T: JavaHashCode + ?Sized> JavaHashCode for Box<T> {
    fn java_hash_code(&self) -> i32 {
        (**self).java_hash_code()
    }
}

/// An absent key hashes to 0.
impl<T: JavaHashCode> JavaHashCode for Option<T> {
    fn java_hash_code(&self) -> i32 {
        self.as_ref().map_or(0, JavaHashCode::java_hash_code)
    }
}

macro_rules! widen_hash_code {
    ($($t:ty),*) => {
        $(impl JavaHashCode for $t {
            #[inline]
            fn java_hash_code(&self) -> i32 {
                *self as i32
            }
        })*
    };
}

macro_rules! fold_hash_code {
    ($($t:ty),*) => {
        $(impl JavaHashCode for $t {
            #[inline]
            fn java_hash_code(&self) -> i32 {
                let v = *self as u64;
                (v ^ (v >> 32)) as i32
            }
        })*
    };
}

widen_hash_code!(i8, i16, i32, u8, u16, u32);
fold_hash_code!(i64, u64, isize, usize);

impl JavaHashCode for bool {
    fn java_hash_code(&self) -> i32 {
        if *self {
            1231
        } else {
            1237
        }
    }
}

impl JavaHashCode for char {
    fn java_hash_code(&self) -> i32 {
        *self as u32 as i32
    }
}

/// Default strategy: uses the key's `JavaHashCode`. Never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct JavaHash;

impl<K: JavaHashCode + ?Sized> NativeHash<K> for JavaHash {
    #[inline]
    fn native_hash(&self, key: &K) -> Result<i32, KeyHashError> {
        Ok(key.java_hash_code())
    }
}

/// Adapts any `BuildHasher` by folding its 64-bit output to 32 bits.
///
/// The default builder has fixed keys, so hashes are stable across tables
/// and runs.
#[derive(Debug, Clone, Default)]
pub struct StdHash<S = BuildHasherDefault<DefaultHasher>> {
    builder: S,
}

impl StdHash {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<S: BuildHasher> StdHash<S> {
    pub fn with_builder(builder: S) -> Self {
        Self { builder }
    }
}

impl<K: Hash + ?Sized, S: BuildHasher> NativeHash<K> for StdHash<S> {
    fn native_hash(&self, key: &K) -> Result<i32, KeyHashError> {
        let h = self.builder.hash_one(key);
        Ok((h ^ (h >> 32)) as i32)
    }
}

/// Wraps a fallible closure as a hashing strategy.
#[derive(Clone, Copy)]
pub struct FnHash<F>(pub F);

impl<F> core::fmt::Debug for FnHash<F> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("FnHash")
    }
}

impl<K: ?Sized, F> NativeHash<K> for FnHash<F>
where
    F: Fn(&K) -> Result<i32, KeyHashError>,
{
    fn native_hash(&self, key: &K) -> Result<i32, KeyHashError> {
        (self.0)(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_hash_codes_match_reference_values() {
        assert_eq!("".java_hash_code(), 0);
        assert_eq!("0".java_hash_code(), 48);
        assert_eq!("11".java_hash_code(), 1568);
        assert_eq!("16".java_hash_code(), 1573);
        assert_eq!("hello".java_hash_code(), 99162322);
        // Overflow wraps instead of panicking.
        assert_eq!(
            "polygenelubricants".java_hash_code(),
            i32::MIN,
            "well-known string whose hash code is MIN_VALUE"
        );
    }

    #[test]
    fn string_hash_uses_utf16_units() {
        // U+1F600 encodes as the surrogate pair D83D DE00.
        let expected = 0xD83Di32.wrapping_mul(31).wrapping_add(0xDE00);
        assert_eq!("\u{1F600}".java_hash_code(), expected);
    }

    #[test]
    fn scalar_hash_codes() {
        assert_eq!(42i32.java_hash_code(), 42);
        assert_eq!((-1i32).java_hash_code(), -1);
        assert_eq!((1i64 << 32).java_hash_code(), 1);
        assert_eq!(true.java_hash_code(), 1231);
        assert_eq!(false.java_hash_code(), 1237);
        assert_eq!('a'.java_hash_code(), 97);
    }

    #[test]
    fn absent_key_hashes_to_zero() {
        let none: Option<String> = None;
        assert_eq!(none.java_hash_code(), 0);
        assert_eq!(spread(none.java_hash_code()), 0);
        assert_eq!(Some("0".to_string()).java_hash_code(), 48);
    }

    #[test]
    fn spread_mixes_high_bits_into_low_bits() {
        assert_eq!(spread(48), 48);
        assert_eq!(spread(0x0001_0000), 0x0001_0001);
        assert_eq!(spread(-1), (-1i32) ^ 0xFFFF);
        // Two codes differing only in the high half land in different buckets.
        let a = 0x0001_0000;
        let b = 0x0002_0000;
        assert_eq!(index_for(a, 16), index_for(b, 16));
        assert_ne!(index_for(spread(a), 16), index_for(spread(b), 16));
    }

    #[test]
    fn index_is_low_bits_of_unsigned_hash() {
        assert_eq!(index_for(1568, 16), 0);
        assert_eq!(index_for(1568, 32), 0);
        assert_eq!(index_for(48, 32), 16);
        assert_eq!(index_for(-1, 16), 15);
        for h in [0, 1, 17, 1573, -7, i32::MAX, i32::MIN] {
            assert_eq!(index_for(h, 64), (h as u32 % 64) as usize);
        }
    }

    #[test]
    fn std_hash_is_deterministic() {
        let a = StdHash::new();
        let b: StdHash = StdHash::default();
        assert_eq!(a.native_hash("key").unwrap(), b.native_hash("key").unwrap());
    }

    #[test]
    fn fn_hash_propagates_failure() {
        let h = FnHash(|k: &i32| {
            if *k < 0 {
                Err(KeyHashError::new("negative"))
            } else {
                Ok(*k)
            }
        });
        assert_eq!(h.native_hash(&3), Ok(3));
        assert_eq!(h.native_hash(&-3).unwrap_err().reason(), "negative");
    }
}
