//! Log validator: re-simulates a logged match and checks every invariant
//! that binds the log to a legitimate, fair game.

use alloc::string::{String, ToString};
use alloc::vec::Vec;

use crate::commitment::{compute_commitment, from_hex, to_hex};
use crate::constants::{
    FIX_SHIFT, HEIGHT, INITIAL_SERVE_DIRECTION, MAX_EVENTS, PADDLE_HEIGHT, PADDLE_MAX_SPEED,
    POINTS_TO_WIN,
};
use crate::engine;
use crate::error::ValidateError;
use crate::fixed_point::{self, Fix};
use crate::types::{CompactLog, Side};

fn q(v: i64) -> Fix {
    v << FIX_SHIFT
}

pub struct ValidationResult {
    pub fair: bool,
    pub reason: Option<ValidateError>,
    pub left_score: u32,
    pub right_score: u32,
}

fn fail(reason: ValidateError) -> ValidationResult {
    ValidationResult {
        fair: false,
        reason: Some(reason),
        left_score: 0,
        right_score: 0,
    }
}

fn nonzero_byte_count(bytes: &[u8]) -> usize {
    bytes.iter().filter(|b| **b != 0).count()
}

fn parse_seed(hex: &str, side: Side) -> Result<[u8; 32], ValidateError> {
    let bytes = from_hex(hex).ok_or(ValidateError::InvalidSeedLength { side, len: hex.len() / 2 })?;
    if bytes.len() != 32 {
        return Err(ValidateError::InvalidSeedLength { side, len: bytes.len() });
    }
    let nonzero = nonzero_byte_count(&bytes);
    if nonzero < 4 {
        return Err(ValidateError::WeakSeed { side, nonzero });
    }
    let mut out = [0u8; 32];
    out.copy_from_slice(&bytes);
    Ok(out)
}

fn parse_event(s: &str, index: usize) -> Result<Fix, ValidateError> {
    s.parse::<i64>()
        .map_err(|_| ValidateError::InvalidEventValue { index })
}

/// Replays `log` from scratch and checks every invariant in order. Never
/// panics; any failure is folded into the returned `ValidationResult`.
pub fn validate_log(log: &CompactLog) -> ValidationResult {
    if log.v != 1 {
        return fail(ValidateError::WrongVersion { found: log.v });
    }
    if log.events.is_empty() {
        return fail(ValidateError::NoEvents);
    }
    if log.events.len() % 2 != 0 {
        return fail(ValidateError::MalformedEventsLength { len: log.events.len() });
    }
    if log.events.len() > MAX_EVENTS {
        return fail(ValidateError::TooManyEvents { len: log.events.len(), max: MAX_EVENTS });
    }
    if log.commitments.len() != log.events.len() {
        return fail(ValidateError::CommitmentCountMismatch {
            events: log.events.len(),
            commitments: log.commitments.len(),
        });
    }

    let left_seed = match parse_seed(&log.player_left_seed, Side::Left) {
        Ok(s) => s,
        Err(e) => return fail(e),
    };
    let right_seed = match parse_seed(&log.player_right_seed, Side::Right) {
        Ok(s) => s,
        Err(e) => return fail(e),
    };
    if left_seed == right_seed {
        return fail(ValidateError::DuplicateSeeds);
    }

    let mut events: Vec<Fix> = Vec::with_capacity(log.events.len());
    for (i, s) in log.events.iter().enumerate() {
        match parse_event(s, i) {
            Ok(v) => events.push(v),
            Err(e) => return fail(e),
        }
    }

    for (i, commitment_hex) in log.commitments.iter().enumerate() {
        let seed = if i % 2 == 0 { &left_seed } else { &right_seed };
        let expected = compute_commitment(seed, i as u32, events[i]);
        let expected_hex = to_hex(&expected);
        if &expected_hex != commitment_hex {
            return fail(ValidateError::CommitmentMismatch { index: i });
        }
    }

    let game_id = log.game_id;
    let mut dir = INITIAL_SERVE_DIRECTION;
    let mut left_y = q(HEIGHT) / 2;
    let mut right_y = q(HEIGHT) / 2;
    let mut left_score: u32 = 0;
    let mut right_score: u32 = 0;
    let mut processed: usize = 0;
    // Index (in `processed` units) at which a side first reached
    // `POINTS_TO_WIN`. Every logged event is still replayed and checked after
    // this point — a forger who knows both plaintext seeds can always
    // recompute valid commitments for appended garbage, so the only way to
    // catch events logged after the match should have ended is to notice
    // that they exist at all.
    let mut win_at: Option<usize> = None;

    while processed < events.len() {
        let k = processed as u32;
        let state = engine::serve(k, game_id, dir, left_y, right_y);
        let dt = match engine::time_to_paddle(&state) {
            Ok(dt) => dt,
            Err(_) => return fail(ValidateError::InvalidKinematics { index: processed }),
        };
        let ball_y = engine::ball_y_at(&state, dt);
        let t_hit = state.t0 + dt;

        let logged_left = events[processed];
        let logged_right = events[processed + 1];

        let left_delta = fixed_point::abs(logged_left - left_y);
        let left_limit = fixed_point::mul(q(PADDLE_MAX_SPEED), dt);
        if left_delta > left_limit {
            return fail(ValidateError::PaddleTooFast {
                index: processed,
                side: Side::Left,
                delta: left_delta,
                limit: left_limit,
            });
        }
        let right_delta = fixed_point::abs(logged_right - right_y);
        if right_delta > left_limit {
            return fail(ValidateError::PaddleTooFast {
                index: processed + 1,
                side: Side::Right,
                delta: right_delta,
                limit: left_limit,
            });
        }

        let half = q(PADDLE_HEIGHT) / 2;
        let clamped_left = fixed_point::clamp_paddle_y(logged_left, half, q(HEIGHT));
        if clamped_left != logged_left {
            return fail(ValidateError::PaddleOutOfBounds {
                index: processed,
                side: Side::Left,
                y: logged_left,
            });
        }
        let clamped_right = fixed_point::clamp_paddle_y(logged_right, half, q(HEIGHT));
        if clamped_right != logged_right {
            return fail(ValidateError::PaddleOutOfBounds {
                index: processed + 1,
                side: Side::Right,
                y: logged_right,
            });
        }

        let receiver_y = if engine::receiver_side(dir) == Side::Left {
            logged_left
        } else {
            logged_right
        };
        let hit = engine::is_hit(receiver_y, ball_y);

        left_y = logged_left;
        right_y = logged_right;
        processed += 2;

        if hit {
            match engine::bounce(&state, receiver_y, ball_y, t_hit) {
                Ok(next) => dir = next.dir,
                Err(_) => return fail(ValidateError::InvalidKinematics { index: processed }),
            }
        } else {
            match engine::receiver_side(dir) {
                Side::Left => right_score += 1,
                Side::Right => left_score += 1,
            }
            if win_at.is_none() && (left_score >= POINTS_TO_WIN || right_score >= POINTS_TO_WIN) {
                win_at = Some(processed);
            }
            // Next serve travels toward whoever just scored, i.e. the
            // receiver side flips. The loop keeps replaying (and checking)
            // every remaining logged index even after a win is recorded.
            dir = -dir;
        }
    }

    if let Some(index) = win_at {
        if index != events.len() {
            return fail(ValidateError::TrailingEventsAfterWin { index, total: events.len() });
        }
    }

    let one_winner = (left_score == POINTS_TO_WIN) ^ (right_score == POINTS_TO_WIN);
    let neither_exceeds = left_score <= POINTS_TO_WIN && right_score <= POINTS_TO_WIN;
    let not_tied = left_score != right_score;
    if !one_winner || !neither_exceeds || !not_tied {
        return fail(ValidateError::InvalidFinalScore { left: left_score, right: right_score });
    }

    ValidationResult {
        fair: true,
        reason: None,
        left_score,
        right_score,
    }
}

/// Human-readable reason string, matching `ValidateLogOutput::reason`.
pub fn reason_string(result: &ValidationResult) -> Option<String> {
    result.reason.as_ref().map(|e| e.to_string())
}
