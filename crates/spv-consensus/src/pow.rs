//! Proof of work targets and their compact encoding.
//!
//! This module defines the Target and CompactTarget types used for representing
//! difficulty targets in Bitcoin-derived block headers.
//!
//! A Target is a 256-bit value that represents the difficulty threshold for mining
//! a block. The lower the target, the higher the difficulty. CompactTarget is the
//! packed 32-bit "nBits" representation of this target stored in block headers:
//! the top byte is the byte length of the value, bit 23 is a sign flag and the
//! low 23 bits hold the most significant bytes of the value.
//!
use std::fmt;

use primitive_types::{U256, U512};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Sign flag of the compact encoding.
const SIGN_BIT: u32 = 0x0080_0000;
/// Mantissa bits of the compact encoding, sign flag excluded.
const MANTISSA_MASK: u32 = 0x007f_ffff;

/// Errors produced when a compact target cannot be turned into a [`Target`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Error)]
pub enum CompactTargetError {
    /// The sign flag is set on a non-zero mantissa.
    #[error("compact target {0} encodes a negative value")]
    Negative(CompactTarget),
    /// The decoded magnitude does not fit in 256 bits.
    #[error("compact target {0} does not fit in 256 bits")]
    Overflow(CompactTarget),
}

/// Represents a target value expressed as an unsigned 256-bit integer.
///
/// This struct provides a type-safe wrapper around `U256` (unsigned 256-bit integer)
/// to represent target values. A block header hash, read as a little-endian number,
/// must be strictly below the target for the header to carry valid proof of work.
///
/// # Example
///
/// ```ignore
/// use spv_consensus::pow::{Target, CompactTarget};
///
/// let target = Target::from_hex("00000000ffff0000000000000000000000000000000000000000000000000000").unwrap();
///
/// // Convert to compact format used in block headers
/// let compact = target.to_compact();
/// assert_eq!(compact, CompactTarget::new(0x1d00ffff));
///
/// // Convert back to verify the round-trip
/// assert_eq!(Target::from_compact(compact), Ok(target));
/// ```
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Target(U256);

impl Target {
    /// The zero target. No hash can satisfy it.
    pub const ZERO: Target = Target(U256::zero());

    /// The largest representable target.
    pub const MAX: Target = Target(U256::MAX);

    /// Creates a new Target instance with the specified U256 value.
    ///
    /// # Arguments
    ///
    /// * `target` - A U256 value representing the target to be stored
    ///
    /// # Example
    ///
    /// ```ignore
    /// use primitive_types::U256;
    /// use spv_consensus::pow::Target;
    ///
    /// let target = Target::new(U256::from(100));
    /// assert_eq!(target.as_u256(), U256::from(100));
    /// ```
    pub const fn new(target: U256) -> Self {
        Target(target)
    }

    /// Creates a new `Target` from a hexadecimal string representation.
    ///
    /// # Arguments
    ///
    /// * `hex` - A hexadecimal string representation of the 256-bit target value
    ///
    /// # Returns
    ///
    /// A new `Target` instance, or `None` if the string is not valid hex or
    /// exceeds 256 bits
    pub fn from_hex(hex: &str) -> Option<Self> {
        U256::from_str_radix(hex, 16).ok().map(Target)
    }

    /// Creates a Target from 32 big-endian bytes.
    pub fn from_bytes(bytes: &[u8; 32]) -> Self {
        Self(U256::from_big_endian(bytes))
    }

    /// Reads a raw hash (internal byte order) as a number.
    ///
    /// Block hashes are stored little-endian, so the displayed hex string of a
    /// block hash is the big-endian rendering of the value returned here.
    pub fn from_le_bytes(bytes: &[u8; 32]) -> Self {
        Self(U256::from_little_endian(bytes))
    }

    /// Creates a new instance of `Target` with a zero-valued underlying `U256` integer.
    pub const fn zero() -> Self {
        Target::ZERO
    }

    /// Returns the underlying 256-bit value.
    pub const fn as_u256(self) -> U256 {
        self.0
    }

    /// Returns `true` when the target is zero.
    pub const fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    /// Calculates the difficulty of the current target relative to a maximum attainable target.
    ///
    /// This function computes the mining difficulty by dividing the maximum attainable target
    /// by the current target.
    ///
    /// # Arguments
    /// * `max_attainable_target` - The maximum target value that can be achieved (the
    ///   network's minimum-difficulty ceiling)
    ///
    /// # Returns
    /// * `Some(u128)` - The calculated difficulty as a 128-bit unsigned integer
    /// * `None` - When the current target is zero
    ///
    /// # Notes
    /// - Caps the result at `u128::MAX` when the calculated difficulty exceeds u128 bounds
    pub fn difficulty(self, max_attainable_target: Target) -> Option<u128> {
        let diff = max_attainable_target.0.checked_div(self.0)?;
        if diff > U256::from(u128::MAX) {
            Some(u128::MAX)
        } else {
            Some(diff.as_u128())
        }
    }

    /// Converts the difficulty value to a floating-point representation.
    ///
    /// Unlike [`Target::difficulty`] this keeps the fractional part, so a
    /// target slightly easier than the maximum still reports a value below 1.
    ///
    /// # Returns
    ///
    /// * `Some(f64)` - The difficulty value as a floating-point number
    /// * `None` - If the current target is zero
    #[allow(clippy::arithmetic_side_effects, reason = "Float division cannot panic")]
    pub fn difficulty_float(self, max_attainable_target: Target) -> Option<f64> {
        if self.0.is_zero() {
            return None;
        }
        Some(max_attainable_target.0.to_f64_lossy() / self.0.to_f64_lossy())
    }

    /// Converts the target into the expected number of hashes needed to meet it.
    ///
    /// Computes `2^256 / (target + 1)` without leaving 256-bit arithmetic, using
    /// the identity `2^256 / (x + 1) == (!x / (x + 1)) + 1`. A zero target would
    /// need `2^256`, which does not fit, so it saturates at `U256::MAX`.
    pub fn to_work(self) -> Work {
        if self.0.is_zero() {
            return Work::new(U256::MAX);
        }

        // target == U256::MAX has exactly one unit of work
        let Some(increment) = self.0.checked_add(U256::one()) else {
            return Work::new(U256::one());
        };

        #[allow(
            clippy::arithmetic_side_effects,
            reason = "increment is non-zero and the quotient is below U256::MAX"
        )]
        let work = (!self.0 / increment) + U256::one();
        Work::new(work)
    }

    /// Scales the target by `numerator / denominator`, truncating.
    ///
    /// The product is formed in 512 bits so no intermediate is lost. A result
    /// that does not fit in 256 bits, or a zero denominator, saturates at
    /// [`Target::MAX`]; callers clamp to their network ceiling afterwards.
    pub fn scale(self, numerator: u64, denominator: u64) -> Target {
        let product = U512::from(self.0).saturating_mul(U512::from(numerator));
        product
            .checked_div(U512::from(denominator))
            .and_then(|quotient| U256::try_from(quotient).ok())
            .map_or(Target::MAX, Target)
    }

    /// Decodes a compact target.
    ///
    /// # Errors
    ///
    /// * [`CompactTargetError::Negative`] - the sign flag is set on a non-zero mantissa
    /// * [`CompactTargetError::Overflow`] - the value needs more than 256 bits
    pub fn from_compact(compact: CompactTarget) -> Result<Self, CompactTargetError> {
        let decoded = compact.decode()?;
        if decoded.is_negative() {
            return Err(CompactTargetError::Negative(compact));
        }
        Ok(decoded.magnitude())
    }

    /// Encodes the target in compact form.
    ///
    /// The leading three significant bytes become the mantissa. When the first of
    /// them has its high bit set, a zero byte is prepended so the value is not read
    /// back as negative, which costs one byte of precision.
    pub fn to_compact(self) -> CompactTarget {
        SignedTarget::positive(self).to_compact()
    }
}

impl From<U256> for Target {
    fn from(value: U256) -> Self {
        Target(value)
    }
}

impl fmt::LowerHex for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

/// A target together with the sign carried by the compact encoding.
///
/// Valid headers never carry negative targets, but the encoding can express them
/// and decoding must not silently drop the sign.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SignedTarget {
    negative: bool,
    magnitude: Target,
}

impl SignedTarget {
    /// A non-negative value.
    pub const fn positive(magnitude: Target) -> Self {
        SignedTarget {
            negative: false,
            magnitude,
        }
    }

    /// The negation of `magnitude`. Negative zero is zero.
    pub const fn negative(magnitude: Target) -> Self {
        SignedTarget {
            negative: !magnitude.is_zero(),
            magnitude,
        }
    }

    pub const fn is_negative(self) -> bool {
        self.negative
    }

    pub const fn magnitude(self) -> Target {
        self.magnitude
    }

    /// Encodes the value, setting the sign flag when it is negative.
    #[allow(
        clippy::arithmetic_side_effects,
        clippy::cast_possible_truncation,
        reason = "size is at most 33 and every shift is below 256 bits"
    )]
    pub fn to_compact(self) -> CompactTarget {
        let value = self.magnitude.0;
        if value.is_zero() {
            return CompactTarget(0);
        }

        // Number of bytes in the minimal big-endian serialization
        let mut size = value.bits().div_ceil(8) as u32;

        let mut mantissa = if size <= 3 {
            // Left-pad small values so the mantissa always spans three bytes
            value.low_u32() << (8 * (3 - size))
        } else {
            (value >> (8 * (size - 3))).low_u32()
        } & 0x00ff_ffff;

        // A set high bit would read back as the sign flag
        if mantissa & SIGN_BIT != 0 {
            mantissa >>= 8;
            size += 1;
        }

        let mut compact = (size << 24) | mantissa;
        if self.negative {
            compact |= SIGN_BIT;
        }
        CompactTarget(compact)
    }
}

/// The 32-bit compact ("nBits") encoding of a target.
///
/// Ordering compares the raw 32-bit values. For targets that share an exponent
/// this matches numeric ordering, and several retarget rules clamp against the
/// network ceiling by comparing the raw encodings exactly this way.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CompactTarget(u32);

impl CompactTarget {
    pub const fn new(bits: u32) -> Self {
        CompactTarget(bits)
    }

    /// Returns the raw consensus value.
    pub const fn to_consensus(self) -> u32 {
        self.0
    }

    /// Byte length of the encoded value.
    pub const fn exponent(self) -> u32 {
        self.0 >> 24
    }

    /// The 23-bit mantissa, sign flag excluded.
    pub const fn mantissa(self) -> u32 {
        self.0 & MANTISSA_MASK
    }

    /// Returns `true` when the sign flag is set on a non-zero mantissa.
    pub const fn is_negative(self) -> bool {
        self.0 & SIGN_BIT != 0 && self.mantissa() != 0
    }

    /// Decodes to a signed value: `mantissa * 256^(exponent - 3)`.
    ///
    /// Exponents of three or less shift the mantissa right instead, so only the
    /// leading bytes of the mantissa survive.
    ///
    /// # Errors
    ///
    /// [`CompactTargetError::Overflow`] when the value needs more than 256 bits.
    #[allow(
        clippy::arithmetic_side_effects,
        reason = "exponent is at most 255 and the shift is range checked"
    )]
    pub fn decode(self) -> Result<SignedTarget, CompactTargetError> {
        let exponent = self.exponent();
        let mantissa = self.mantissa();

        if mantissa == 0 {
            return Ok(SignedTarget::positive(Target::ZERO));
        }

        let magnitude = if exponent <= 3 {
            U256::from(mantissa >> (8 * (3 - exponent)))
        } else {
            let shift = 8 * (exponent - 3);
            let significant_bits = u32::BITS - mantissa.leading_zeros();
            if significant_bits + shift > 256 {
                return Err(CompactTargetError::Overflow(self));
            }
            U256::from(mantissa) << shift
        };

        let magnitude = Target(magnitude);
        if self.0 & SIGN_BIT != 0 {
            Ok(SignedTarget::negative(magnitude))
        } else {
            Ok(SignedTarget::positive(magnitude))
        }
    }

    /// Builds a compact value straight from a raw hash in internal (little-endian)
    /// byte order, as used for genesis-style "maximum target" constants.
    ///
    /// Zero bytes at the high end are dropped, keeping at least three bytes. The
    /// result decodes to the same magnitude as [`Target::to_compact`] would give,
    /// though values under three bytes keep a wider exponent.
    #[allow(
        clippy::arithmetic_side_effects,
        clippy::cast_possible_truncation,
        reason = "at most 33 bytes are packed"
    )]
    pub fn from_le_hash(hash: &[u8; 32]) -> Self {
        let significant = hash
            .iter()
            .rposition(|byte| *byte != 0)
            .map_or(0, |index| index + 1)
            .max(3);

        let mut be_bytes: Vec<u8> = hash.iter().take(significant).rev().copied().collect();
        if be_bytes.iter().all(|byte| *byte == 0) {
            return CompactTarget(0);
        }
        if be_bytes.first().is_some_and(|byte| byte & 0x80 != 0) {
            be_bytes.insert(0, 0);
        }

        let mantissa = be_bytes
            .iter()
            .take(3)
            .fold(0u32, |acc, byte| (acc << 8) | u32::from(*byte));

        CompactTarget(((be_bytes.len() as u32) << 24) | mantissa)
    }
}

impl From<u32> for CompactTarget {
    fn from(bits: u32) -> Self {
        CompactTarget(bits)
    }
}

impl From<bitcoin::CompactTarget> for CompactTarget {
    fn from(bits: bitcoin::CompactTarget) -> Self {
        CompactTarget(bits.to_consensus())
    }
}

impl From<CompactTarget> for bitcoin::CompactTarget {
    fn from(bits: CompactTarget) -> Self {
        bitcoin::CompactTarget::from_consensus(bits.0)
    }
}

impl fmt::Display for CompactTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010x}", self.0)
    }
}

impl fmt::LowerHex for CompactTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

/// Expected number of hashes behind a block, `2^256 / (target + 1)`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Work(U256);

impl Work {
    pub const fn new(work: U256) -> Self {
        Work(work)
    }

    pub const fn as_u256(self) -> U256 {
        self.0
    }
}
