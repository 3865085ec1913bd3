use crate::EncodeError;

pub(crate) const fn div_ceil(lhs: usize, rhs: usize) -> usize {
    let d = lhs / rhs;
    let r = lhs % rhs;
    if r > 0 && rhs > 0 {
        d + 1
    } else {
        d
    }
}

/// Empty buffer with room for exactly `capacity` bytes, or an allocation error.
pub(crate) fn try_buffer(capacity: usize) -> Result<Vec<u8>, EncodeError> {
    let mut buffer = Vec::new();
    buffer
        .try_reserve_exact(capacity)
        .map_err(|_| EncodeError::AllocationFailure { bytes: capacity })?;
    Ok(buffer)
}
