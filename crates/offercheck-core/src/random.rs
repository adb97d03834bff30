//! Random test input selection.
//!
//! Every function takes its generator explicitly in the `_with` form; the
//! plain form uses the thread-local generator. Not cryptographically secure.

use crate::{Error, Result};
use rand::Rng;

/// Random index in `[0, length)`
pub fn random_index(length: i64) -> Result<usize> {
    random_index_with(&mut rand::thread_rng(), length)
}

pub fn random_index_with<R: Rng + ?Sized>(rng: &mut R, length: i64) -> Result<usize> {
    if length <= 0 {
        return Err(Error::InvalidArgument(format!(
            "length must be positive, got {}",
            length
        )));
    }

    let length = usize::try_from(length)
        .map_err(|_| Error::InvalidArgument(format!("length {} does not fit in usize", length)))?;

    Ok(rng.gen_range(0..length))
}

/// Random integer in `[min, max]`, both bounds included
pub fn random_in_range(min: i64, max: i64) -> Result<i64> {
    random_in_range_with(&mut rand::thread_rng(), min, max)
}

pub fn random_in_range_with<R: Rng + ?Sized>(rng: &mut R, min: i64, max: i64) -> Result<i64> {
    if min > max {
        return Err(Error::InvalidArgument(format!(
            "range minimum {} is greater than maximum {}",
            min, max
        )));
    }

    Ok(rng.gen_range(min..=max))
}

/// Random element of a non-empty slice
pub fn random_item<T>(items: &[T]) -> Result<&T> {
    random_item_with(&mut rand::thread_rng(), items)
}

pub fn random_item_with<'a, R: Rng + ?Sized, T>(rng: &mut R, items: &'a [T]) -> Result<&'a T> {
    let length = i64::try_from(items.len())
        .map_err(|_| Error::InvalidArgument("slice too large".to_string()))?;
    let index = random_index_with(rng, length)?;

    items
        .get(index)
        .ok_or_else(|| Error::InvalidArgument(format!("index {} out of bounds", index)))
}

pub fn random_boolean() -> bool {
    random_boolean_with(&mut rand::thread_rng())
}

pub fn random_boolean_with<R: Rng + ?Sized>(rng: &mut R) -> bool {
    rng.gen_bool(0.5)
}
