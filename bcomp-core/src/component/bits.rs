//! Bit-field arithmetic shared by every node.
//!
//! Shifts by 64 or more are defined here as selecting or inserting nothing,
//! so callers never have to guard their offsets.

/// Mask with the low `width` bits set.
pub const fn mask(width: u32) -> u64 {
    if width >= u64::BITS {
        u64::MAX
    } else {
        (1u64 << width) - 1
    }
}

/// Bits of `value` starting at `startbit`, reduced to `mask`.
pub const fn extract(value: u64, startbit: u32, mask: u64) -> u64 {
    if startbit >= u64::BITS {
        0
    } else {
        (value >> startbit) & mask
    }
}

/// `current` with the field `submask << startbit` replaced by `value`.
///
/// Bits of `value` outside `submask` are ignored, as are field bits that
/// would land above bit 63.
pub const fn insert(current: u64, value: u64, startbit: u32, submask: u64) -> u64 {
    if startbit >= u64::BITS {
        return current;
    }
    let field = submask << startbit;
    (current & !field) | (((value & submask) << startbit) & field)
}

/// Smallest width able to hold `value` (at least one bit).
pub const fn width_of(value: u64) -> u32 {
    let bits = u64::BITS - value.leading_zeros();
    if bits == 0 {
        1
    } else {
        bits
    }
}
