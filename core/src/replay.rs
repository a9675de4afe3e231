//! Deterministic playback driver. Replay never mutates a log; it exposes the
//! same state transitions the validator computes, frame by frame, so a
//! caller (e.g. a renderer) can step through a finished match.

use alloc::vec::Vec;

use crate::constants::{FIX_SHIFT, HEIGHT, INITIAL_SERVE_DIRECTION, POINTS_TO_WIN};
use crate::engine;
use crate::fixed_point::Fix;
use crate::types::{CompactLog, Side};

fn q(v: i64) -> Fix {
    v << FIX_SHIFT
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReplayStep {
    pub event_index: usize,
    pub left_y: Fix,
    pub right_y: Fix,
    pub ball_y_at_hit: Fix,
    pub hit: bool,
    pub left_score: u32,
    pub right_score: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReplayOutcome {
    pub steps: Vec<ReplayStep>,
    pub left_score: u32,
    pub right_score: u32,
}

/// Plays a log back step by step. Assumes the log is already known to be
/// well-formed (run `validate_log` first); `events` must have even length
/// and parse as integers, or this function stops early with whatever it
/// managed to decode.
pub fn replay(log: &CompactLog) -> ReplayOutcome {
    let events: Vec<Fix> = log
        .events
        .iter()
        .filter_map(|s| s.parse::<i64>().ok())
        .collect();

    let mut steps = Vec::new();
    let mut dir = INITIAL_SERVE_DIRECTION;
    let mut left_y = q(HEIGHT) / 2;
    let mut right_y = q(HEIGHT) / 2;
    let mut left_score: u32 = 0;
    let mut right_score: u32 = 0;
    let mut processed = 0usize;

    while processed + 1 < events.len() {
        let k = processed as u32;
        let state = engine::serve(k, log.game_id, dir, left_y, right_y);
        let dt = match engine::time_to_paddle(&state) {
            Ok(dt) => dt,
            Err(_) => break,
        };
        let ball_y = engine::ball_y_at(&state, dt);
        let t_hit = state.t0 + dt;

        let logged_left = events[processed];
        let logged_right = events[processed + 1];
        let receiver_y = if engine::receiver_side(dir) == Side::Left {
            logged_left
        } else {
            logged_right
        };
        let hit = engine::is_hit(receiver_y, ball_y);

        left_y = logged_left;
        right_y = logged_right;

        if hit {
            if let Ok(next) = engine::bounce(&state, receiver_y, ball_y, t_hit) {
                dir = next.dir;
            } else {
                break;
            }
        } else {
            match engine::receiver_side(dir) {
                Side::Left => right_score += 1,
                Side::Right => left_score += 1,
            }
            // Next serve travels toward whoever just scored, i.e. the
            // receiver side flips.
            dir = -dir;
        }

        steps.push(ReplayStep {
            event_index: processed / 2,
            left_y,
            right_y,
            ball_y_at_hit: ball_y,
            hit,
            left_score,
            right_score,
        });

        processed += 2;
    }

    ReplayOutcome { steps, left_score, right_score }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commitment::to_hex;
    use crate::log::produce_log;

    fn seed(byte: u8) -> [u8; 32] {
        [byte; 32]
    }

    #[test]
    fn replay_agrees_with_producer_scores() {
        let log = produce_log(5, seed(0x01), seed(0x02), |_i, _s, _dt| q(HEIGHT) / 2);
        let outcome = replay(&log);
        assert_eq!(outcome.steps.len(), log.events.len() / 2);
        assert!(outcome.left_score == POINTS_TO_WIN || outcome.right_score == POINTS_TO_WIN);
    }

    #[test]
    fn replay_of_empty_log_is_empty() {
        let log = CompactLog {
            v: 1,
            game_id: 0,
            events: Vec::new(),
            commitments: Vec::new(),
            player_left_seed: to_hex(&[0u8; 32]),
            player_right_seed: to_hex(&[0xffu8; 32]),
        };
        let outcome = replay(&log);
        assert!(outcome.steps.is_empty());
    }
}
