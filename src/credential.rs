//! Door credential: a short, bounded password.
//!
//! Stored as a fixed-capacity [`heapless::Vec`] so a malicious or broken
//! peer can never overrun the buffer.  On the wire and in the byte store
//! the credential is followed by a terminator; every comparison walks the
//! data **and** that terminator, so `"123"` never matches `"12345"`.

use core::convert::Infallible;
use core::fmt;

use heapless::Vec;

use crate::protocol::{STORE_TERMINATOR, WIRE_TERMINATOR};

/// Maximum number of password characters.
pub const MAX_CREDENTIAL_LEN: usize = 5;

/// Bytes a credential occupies in the store (data + terminator).
pub const STORED_CREDENTIAL_LEN: usize = MAX_CREDENTIAL_LEN + 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialError {
    /// More than [`MAX_CREDENTIAL_LEN`] characters.
    TooLong,
    /// A byte outside printable ASCII, or a terminator value.
    InvalidByte(u8),
}

impl fmt::Display for CredentialError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooLong => write!(f, "credential longer than {} bytes", MAX_CREDENTIAL_LEN),
            Self::InvalidByte(b) => write!(f, "invalid credential byte 0x{:02X}", b),
        }
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    bytes: Vec<u8, MAX_CREDENTIAL_LEN>,
}

impl Credential {
    pub fn new(data: &[u8]) -> Result<Self, CredentialError> {
        if let Some(&bad) = data.iter().find(|&&b| !is_credential_byte(b)) {
            return Err(CredentialError::InvalidByte(bad));
        }
        let bytes = Vec::from_slice(data).map_err(|()| CredentialError::TooLong)?;
        Ok(Self { bytes })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Byte at `offset`, or the store terminator past the end.
    pub fn byte_at(&self, offset: usize) -> u8 {
        self.bytes.get(offset).copied().unwrap_or(STORE_TERMINATOR)
    }

    /// The credential as laid out in the byte store.
    pub fn terminated_bytes(&self) -> impl Iterator<Item = u8> + '_ {
        self.bytes
            .iter()
            .copied()
            .chain(core::iter::once(STORE_TERMINATOR))
    }

    /// Compare against a byte source addressed by offset, stopping at the
    /// first mismatch or once the terminators line up.
    ///
    /// `stored` is called lazily, so a mismatch at offset 0 costs one read.
    pub fn matches_with<E>(
        &self,
        mut stored: impl FnMut(usize) -> Result<u8, E>,
    ) -> Result<bool, E> {
        for (offset, expected) in self.terminated_bytes().enumerate() {
            if stored(offset)? != expected {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Compare two live credentials with the same walk used against storage.
    pub fn matches(&self, other: &Credential) -> bool {
        let Ok(matched) = self.matches_with(|offset| Ok::<u8, Infallible>(other.byte_at(offset)));
        matched
    }
}

// Never print the secret itself.
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("len", &self.bytes.len())
            .finish_non_exhaustive()
    }
}

fn is_credential_byte(b: u8) -> bool {
    (0x20..=0x7E).contains(&b) && b != WIRE_TERMINATOR
}
