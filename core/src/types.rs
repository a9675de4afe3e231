//! Wire-facing and in-memory data model shared by producer, validator, and
//! the guest/host boundary.

use alloc::string::String;
use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

use crate::fixed_point::Fix;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn opponent(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

/// Per-rally kinematic snapshot. Created at each serve, mutated only at
/// paddle-plane events, discarded at terminal score.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FixState {
    pub t0: Fix,
    pub x: Fix,
    pub y: Fix,
    pub vx: Fix,
    pub vy: Fix,
    pub speed: Fix,
    pub left_y: Fix,
    pub right_y: Fix,
    pub dir: i64,
}

/// A linear ramp of a paddle toward a target, queryable analytically for any
/// `t >= t0`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PaddleMotion {
    pub y0: Fix,
    pub t0: Fix,
    pub target: Fix,
}

/// The on-disk / on-wire log of an entire match.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CompactLog {
    pub v: u32,
    pub game_id: u32,
    pub events: Vec<String>,
    pub commitments: Vec<String>,
    pub player_left_seed: String,
    pub player_right_seed: String,
}

/// The guest's input: a full `CompactLog`, with events already decoded from
/// their decimal-string wire form into signed 64-bit Q16.16 integers. The
/// guest needs the commitments and seeds too, since commitment verification
/// (invariant 7) is part of the validated contract, not a host-side
/// pre-check.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValidateLogInput {
    pub game_id: u32,
    pub events: Vec<i64>,
    pub commitments: Vec<String>,
    pub player_left_seed: String,
    pub player_right_seed: String,
}

/// The guest's committed output.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValidateLogOutput {
    pub fair: bool,
    pub reason: Option<String>,
    pub left_score: u32,
    pub right_score: u32,
    pub events_len: u32,
    pub log_hash_sha256: [u8; 32],
}
