//! Motosm error types.

use crate::message::ResultType;
use motosm_wire::WireError;
use std::net::SocketAddr;

/// A motosm error.
#[derive(Debug)]
pub enum Error {
    /// A socket operation failed.
    Io(std::io::Error),
    /// An item could not be encoded or decoded.
    Wire(WireError),
    /// A frame declared more bytes than were available.
    ShortFrame {
        /// Bytes required to complete the frame.
        needed: usize,
        /// Bytes available.
        got: usize,
    },
    /// There were not enough bytes to decode the prefix and header, or the prefix declared
    /// less than a header's worth of payload.
    InvalidHeader {
        /// Bytes available.
        got: usize,
    },
    /// An "Ex" body declared a group count outside `1..=MOT_MAX_GR`.
    InvalidGroupCount {
        /// The declared count.
        count: i32,
    },
    /// The controller refused the TCP connection.
    ConnectionRefused {
        /// The address that refused the connection.
        addr: SocketAddr,
    },
    /// Something timed out.
    Timeout,
    /// The controller reported it is not ready for motion, so the trajectory point was not
    /// sent.
    NotReady,
    /// The controller replied with a non-success result.
    RemoteFailure {
        /// High level result code from the reply.
        result: ResultType,
        /// Detailed subcode from the reply, `0` when unused.
        subcode: i32,
    },
    /// A control group definition is internally inconsistent.
    InvalidGroupDefinition {
        /// What is wrong with it.
        reason: &'static str,
    },
    /// The state subscriber did not receive the initial set of feedback messages in time.
    InitialFeedbackTimeout,
    /// A real-time command echoed the wrong message id; the session is terminated.
    EchoMismatch {
        /// The id of the state packet that was sent.
        sent: i32,
        /// The id the command echoed.
        received: i32,
    },
}

impl std::error::Error for Error {}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::Io(e) => write!(f, "io: {}", e),
            Error::Wire(e) => write!(f, "wire encode/decode error: {}", e),
            Error::ShortFrame { needed, got } => {
                write!(f, "short frame: need {} bytes, got {}", needed, got)
            }
            Error::InvalidHeader { got } => {
                write!(f, "not enough bytes for a message header: got {}", got)
            }
            Error::InvalidGroupCount { count } => {
                write!(f, "group count {} is outside 1..=4", count)
            }
            Error::ConnectionRefused { addr } => write!(
                f,
                "connection to {} refused; check that controller alarms are reset and that this \
                 host is on the controller subnet",
                addr
            ),
            Error::Timeout => f.write_str("timeout"),
            Error::NotReady => f.write_str("controller is not ready for motion"),
            Error::RemoteFailure { result, subcode } => {
                write!(f, "controller replied {:?} (subcode {})", result, subcode)
            }
            Error::InvalidGroupDefinition { reason } => {
                write!(f, "invalid control group definition: {}", reason)
            }
            Error::InitialFeedbackTimeout => {
                f.write_str("timed out waiting for initial feedback and status messages")
            }
            Error::EchoMismatch { sent, received } => write!(
                f,
                "real-time command echoed message id {}, expected {}",
                received, sent
            ),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<WireError> for Error {
    fn from(e: WireError) -> Self {
        match e {
            WireError::BufferTooShort { expected, got } => Self::ShortFrame {
                needed: expected,
                got,
            },
            other => Self::Wire(other),
        }
    }
}
