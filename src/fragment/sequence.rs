//! Wrapping 14-bit fragment sequence numbers.
//!
//! Provides [`FragmentSequence`], the per-sender fragment stream cursor. The
//! value space is `0..=16383` and all arithmetic wraps within it, so adjacency
//! holds across the `16383 -> 0` boundary.

use derive_more::Display;

/// Position of a fragment within its sender's fragment stream.
///
/// Construction masks the input to 14 bits, mirroring how the value is
/// packed into the header.
///
/// # Examples
///
/// ```
/// use fraglink::fragment::FragmentSequence;
/// let last = FragmentSequence::new(FragmentSequence::MAX);
/// assert_eq!(last.next(), FragmentSequence::zero());
/// assert_eq!(FragmentSequence::zero().previous(), last);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Display)]
#[display("{_0}")]
pub struct FragmentSequence(u16);

impl FragmentSequence {
    /// Mask selecting the sequence bits of the header word.
    pub const MASK: u16 = 0x3FFF;

    /// Largest representable sequence number.
    pub const MAX: u16 = Self::MASK;

    /// Construct a sequence number, discarding bits above the 14-bit range.
    #[must_use]
    pub const fn new(value: u16) -> Self { Self(value & Self::MASK) }

    /// Return the first sequence number.
    #[must_use]
    pub const fn zero() -> Self { Self(0) }

    /// Return the underlying numeric value.
    #[must_use]
    pub const fn get(self) -> u16 { self.0 }

    /// The following sequence number, wrapping after [`Self::MAX`].
    #[must_use]
    pub const fn next(self) -> Self { Self::new(self.0.wrapping_add(1)) }

    /// The preceding sequence number, wrapping before zero.
    #[must_use]
    pub const fn previous(self) -> Self { Self::new(self.0.wrapping_sub(1)) }

    /// Advance by `count` positions, wrapping within the 14-bit range.
    #[must_use]
    pub const fn advance(self, count: usize) -> Self {
        #[expect(
            clippy::cast_possible_truncation,
            reason = "only the low 14 bits survive masking"
        )]
        let step = (count % (Self::MASK as usize + 1)) as u16;
        Self::new(self.0.wrapping_add(step))
    }
}

impl From<FragmentSequence> for u16 {
    fn from(value: FragmentSequence) -> Self { value.0 }
}
