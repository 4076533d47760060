use derive_more::{Display, From, Into};

/// Tag shared by every fragment of one logical stream of messages.
///
/// A sender stamps all of its fragments with the same identifier; the
/// receiver only ever links fragments whose identifiers match.
///
/// # Examples
///
/// ```
/// use fraglink::fragment::MessageId;
/// let id = MessageId::new(42);
/// assert_eq!(id.get(), 42);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Display, From, Into)]
#[display("{_0}")]
pub struct MessageId(u16);

impl MessageId {
    /// Create a new identifier.
    #[must_use]
    pub const fn new(value: u16) -> Self { Self(value) }

    /// Return the inner numeric identifier.
    #[must_use]
    pub const fn get(self) -> u16 { self.0 }
}
