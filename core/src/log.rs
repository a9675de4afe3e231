//! Log producer: drives the engine forward and commits every logged paddle
//! position as it is recorded.

use alloc::string::{String, ToString};
use alloc::vec::Vec;

use crate::commitment::{compute_commitment, to_hex};
use crate::constants::{HEIGHT, INITIAL_SERVE_DIRECTION, MAX_EVENTS, POINTS_TO_WIN};
use crate::engine;
use crate::fixed_point::Fix;
use crate::types::{CompactLog, FixState, Side};

fn q(v: i64) -> Fix {
    v << crate::constants::FIX_SHIFT
}

/// Drives one full match to completion, producing a `CompactLog`. `planner`
/// supplies the predicted intercept y for the receiving paddle at each
/// event; a single-process producer typically predicts it directly from the
/// engine's own analytic position, while a peer-mode producer may instead
/// substitute the opponent's most recently revealed position.
pub fn produce_log<F>(
    game_id: u32,
    player_left_seed: [u8; 32],
    player_right_seed: [u8; 32],
    mut predict_intercept: F,
) -> CompactLog
where
    F: FnMut(u32, &FixState, Fix) -> Fix,
{
    let mut events: Vec<String> = Vec::new();
    let mut commitments: Vec<String> = Vec::new();
    let mut left_score: u32 = 0;
    let mut right_score: u32 = 0;
    let mut dir = INITIAL_SERVE_DIRECTION;
    let mut left_y = q(HEIGHT) / 2;
    let mut right_y = q(HEIGHT) / 2;

    loop {
        if left_score == POINTS_TO_WIN || right_score == POINTS_TO_WIN {
            break;
        }
        if events.len() >= MAX_EVENTS {
            break;
        }

        let k = events.len() as u32;
        let state = engine::serve(k, game_id, dir, left_y, right_y);
        let dt = match engine::time_to_paddle(&state) {
            Ok(dt) => dt,
            Err(_fault) => break,
        };
        let ball_y = engine::ball_y_at(&state, dt);
        let predicted = predict_intercept(k, &state, dt);
        let (left_motion, right_motion) =
            engine::plan_targets(k, game_id, dir, predicted, state.t0, left_y, right_y);
        let t_hit = state.t0 + dt;
        let logged_left = engine::paddle_y_at(&left_motion, t_hit);
        let logged_right = engine::paddle_y_at(&right_motion, t_hit);

        let event_index = events.len() as u32;
        append_event(
            &mut events,
            &mut commitments,
            event_index,
            logged_left,
            &player_left_seed,
        );
        if events.len() >= MAX_EVENTS {
            break;
        }
        append_event(
            &mut events,
            &mut commitments,
            event_index + 1,
            logged_right,
            &player_right_seed,
        );

        left_y = logged_left;
        right_y = logged_right;

        let receiver_y = if engine::receiver_side(dir) == Side::Left {
            logged_left
        } else {
            logged_right
        };
        let hit = engine::is_hit(receiver_y, ball_y);
        if hit {
            match engine::bounce(&state, receiver_y, ball_y, t_hit) {
                Ok(next) => {
                    dir = next.dir;
                }
                Err(_fault) => break,
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
    }

    CompactLog {
        v: 1,
        game_id,
        events,
        commitments,
        player_left_seed: to_hex(&player_left_seed),
        player_right_seed: to_hex(&player_right_seed),
    }
}

fn append_event(
    events: &mut Vec<String>,
    commitments: &mut Vec<String>,
    index: u32,
    y: Fix,
    seed: &[u8; 32],
) {
    events.push(y.to_string());
    let c = compute_commitment(seed, index, y);
    commitments.push(to_hex(&c));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seed(byte: u8) -> [u8; 32] {
        [byte; 32]
    }

    #[test]
    fn produces_a_terminating_log_with_commitments() {
        let log = produce_log(7, seed(0x11), seed(0x22), |_idx, _state, dt| {
            // naive predictor: stay put, let plan_targets aim for center offset only
            let _ = dt;
            q(HEIGHT) / 2
        });
        assert_eq!(log.v, 1);
        assert_eq!(log.events.len() % 2, 0);
        assert_eq!(log.events.len(), log.commitments.len());
        assert!(log.events.len() <= MAX_EVENTS);
        assert!(!log.events.is_empty());
    }

    #[test]
    fn respects_max_events_cap() {
        let log = produce_log(1, seed(0x01), seed(0x02), |_idx, _state, _dt| q(HEIGHT) / 2);
        assert!(log.events.len() <= MAX_EVENTS);
    }
}
