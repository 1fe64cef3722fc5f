//! Inbound commands from the HMI unit.
//!
//! After the password frame the peer sends one command byte.  Only two
//! values carry meaning; anything else is kept as [`PeerCommand::Unknown`]
//! so the service can log it instead of silently dropping it.

/// Command byte requesting the door sequence.
pub const OPEN_DOOR: u8 = b'+';
/// Command byte requesting a credential change.
pub const CHANGE_CREDENTIAL: u8 = b'-';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeerCommand {
    /// Run unlock → hold open → lock.
    OpenDoor,
    /// Leave verification and register a new credential.
    ChangeCredential,
    Unknown(u8),
}

impl PeerCommand {
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            OPEN_DOOR => Self::OpenDoor,
            CHANGE_CREDENTIAL => Self::ChangeCredential,
            other => Self::Unknown(other),
        }
    }

    pub fn byte(self) -> u8 {
        match self {
            Self::OpenDoor => OPEN_DOOR,
            Self::ChangeCredential => CHANGE_CREDENTIAL,
            Self::Unknown(b) => b,
        }
    }
}
