use core::fmt;

use crate::types::Side;

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Left => write!(f, "left"),
            Side::Right => write!(f, "right"),
        }
    }
}

/// Fail-fast faults raised only by the producer-side engine. These indicate
/// impossible physics (a constants bug), not a player-supplied fault, so the
/// producer is allowed to panic on them where the validator never would.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineFault {
    ZeroVelocity,
    NonPositiveInterval,
    NonPositiveBounceLimit,
}

impl fmt::Display for EngineFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroVelocity => write!(f, "ball horizontal velocity is zero"),
            Self::NonPositiveInterval => write!(f, "time to next paddle plane is not positive"),
            Self::NonPositiveBounceLimit => write!(f, "bounce limit is not positive"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for EngineFault {}

/// Structured rejection reason produced by the validator. `Display` renders
/// the exact one-line, machine-parseable message surfaced in
/// `ValidateLogOutput::reason`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ValidateError {
    WrongVersion { found: u32 },
    NoEvents,
    MalformedEventsLength { len: usize },
    TooManyEvents { len: usize, max: usize },
    CommitmentCountMismatch { events: usize, commitments: usize },
    InvalidSeedLength { side: Side, len: usize },
    DuplicateSeeds,
    WeakSeed { side: Side, nonzero: usize },
    InvalidEventValue { index: usize },
    CommitmentMismatch { index: usize },
    InvalidKinematics { index: usize },
    PaddleTooFast { index: usize, side: Side, delta: i64, limit: i64 },
    PaddleOutOfBounds { index: usize, side: Side, y: i64 },
    TrailingEventsAfterWin { index: usize, total: usize },
    InvalidFinalScore { left: u32, right: u32 },
}

impl fmt::Display for ValidateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WrongVersion { found } => write!(f, "unsupported log version: {found}"),
            Self::NoEvents => write!(f, "No events provided"),
            Self::MalformedEventsLength { len } => {
                write!(f, "Malformed events length: {len} (must be even)")
            }
            Self::TooManyEvents { len, max } => {
                write!(f, "too many events: {len} exceeds cap of {max}")
            }
            Self::CommitmentCountMismatch { events, commitments } => write!(
                f,
                "commitment count mismatch: {events} events, {commitments} commitments"
            ),
            Self::InvalidSeedLength { side, len } => {
                write!(f, "{side} seed has invalid length: {len} bytes (want 32)")
            }
            Self::DuplicateSeeds => {
                write!(f, "Players must use unique commitment seeds")
            }
            Self::WeakSeed { side, nonzero } => write!(
                f,
                "{side} seed has insufficient entropy: only {nonzero} nonzero bytes"
            ),
            Self::InvalidEventValue { index } => {
                write!(f, "event value at index {index} is not a valid integer")
            }
            Self::CommitmentMismatch { index } => {
                write!(f, "Commitment verification failed at index {index}")
            }
            Self::InvalidKinematics { index } => {
                write!(f, "invalid kinematics computing event {index}")
            }
            Self::PaddleTooFast { index, side, delta, limit } => write!(
                f,
                "Paddle moved too fast {{\"index\":{index},\"side\":\"{side}\",\"delta\":{delta},\"limit\":{limit}}}"
            ),
            Self::PaddleOutOfBounds { index, side, y } => write!(
                f,
                "Paddle out of bounds {{\"index\":{index},\"side\":\"{side}\",\"y\":{y}}}"
            ),
            Self::TrailingEventsAfterWin { index, total } => write!(
                f,
                "Events logged after match end {{\"index\":{index},\"total\":{total}}}"
            ),
            Self::InvalidFinalScore { left, right } => {
                write!(f, "Invalid final score: left={left}, right={right}")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ValidateError {}
