//! Per-call cancellation context.
//!
//! A call counts as cancelled when the server has begun shutting down or
//! when the deadline the caller sent in `grpc-timeout` has already passed.

use std::fmt;
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;
use tonic::metadata::MetadataMap;

/// Header carrying the caller's deadline.
const GRPC_TIMEOUT_HEADER: &str = "grpc-timeout";

/// The `grpc-timeout` value allows at most 8 digits.
const MAX_TIMEOUT_DIGITS: usize = 8;

/// Why a call was cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cancellation {
    Shutdown,
    DeadlineExceeded,
}

impl fmt::Display for Cancellation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cancellation::Shutdown => write!(f, "server is shutting down"),
            Cancellation::DeadlineExceeded => write!(f, "call deadline exceeded"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CallContext {
    shutdown: CancellationToken,
    deadline: Option<Instant>,
}

impl CallContext {
    pub fn new(shutdown: CancellationToken) -> Self {
        Self {
            shutdown,
            deadline: None,
        }
    }

    /// Build a context from request metadata. An unparsable `grpc-timeout`
    /// is treated as no deadline.
    pub fn from_metadata(metadata: &MetadataMap, shutdown: &CancellationToken) -> Self {
        let deadline = metadata
            .get(GRPC_TIMEOUT_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_grpc_timeout)
            .and_then(|timeout| Instant::now().checked_add(timeout));

        Self {
            shutdown: shutdown.clone(),
            deadline,
        }
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Returns the reason if the call is already cancelled.
    pub fn cancelled(&self) -> Option<Cancellation> {
        if self.shutdown.is_cancelled() {
            return Some(Cancellation::Shutdown);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(Cancellation::DeadlineExceeded),
            _ => None,
        }
    }
}

/// Parse a `grpc-timeout` header value: 1-8 digits followed by a unit
/// (`H`, `M`, `S`, `m`, `u`, `n`).
pub fn parse_grpc_timeout(value: &str) -> Option<Duration> {
    if value.len() < 2 || !value.is_ascii() {
        return None;
    }
    let (digits, unit) = value.split_at(value.len() - 1);
    if digits.len() > MAX_TIMEOUT_DIGITS || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let amount: u64 = digits.parse().ok()?;

    let timeout = match unit {
        "H" => Duration::from_secs(amount * 60 * 60),
        "M" => Duration::from_secs(amount * 60),
        "S" => Duration::from_secs(amount),
        "m" => Duration::from_millis(amount),
        "u" => Duration::from_micros(amount),
        "n" => Duration::from_nanos(amount),
        _ => return None,
    };
    Some(timeout)
}
