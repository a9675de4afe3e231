//! Event-driven kinematic engine. Motion between paddle-plane events is
//! analytic, not simulated tick-by-tick: a serve fixes a `FixState`, and each
//! step jumps directly to the next crossing of a paddle's x-plane.

use crate::constants::{
    ANGLE_RANGE, BALL_RADIUS, FIX_SHIFT, HEIGHT, MAX_BOUNCE_ANGLE_DEG, PADDLE_HEIGHT,
    PADDLE_MARGIN, PADDLE_MAX_SPEED, PADDLE_WIDTH, SERVE_ANGLE_MULTIPLIER, SERVE_SPEED,
    SPEED_INCREMENT, WIDTH,
};
use crate::cordic::{cordic_sin_cos, deg_q16_to_rad_q16, deg_to_rad_q16};
use crate::error::EngineFault;
use crate::fixed_point::{self, Fix};
use crate::rng;
use crate::types::{FixState, PaddleMotion, Side};

fn q(v: i64) -> Fix {
    v << FIX_SHIFT
}

pub const HALF_HEIGHT_Q16: Fix = q(PADDLE_HEIGHT) / 2;
pub const Y_MIN_Q16: Fix = q(BALL_RADIUS);
pub const Y_MAX_Q16: Fix = q(HEIGHT) - q(BALL_RADIUS);

/// Euclidean remainder on plain (non-fixed-point) i64 values, used for the
/// serve-angle computation which operates on whole degrees.
fn rem_euclid_i64(a: i64, n: i64) -> i64 {
    let r = a % n;
    if r < 0 {
        r + n
    } else {
        r
    }
}

/// Computes the deterministic serve angle in whole degrees for serve index
/// `k` (`k = events.length` at the moment of serve, per the convention
/// adopted by both producer and validator).
pub fn serve_angle_deg(k: u32, game_id: u32) -> i64 {
    // `k + game_id` wraps as a 32-bit signed value before it enters the
    // modulo; only the addition wraps, matching the original source's
    // 32-bit entropy term.
    let entropy = (k.wrapping_add(game_id) as i32) as i64;
    let raw = rem_euclid_i64(entropy.wrapping_mul(SERVE_ANGLE_MULTIPLIER), ANGLE_RANGE);
    raw - MAX_BOUNCE_ANGLE_DEG
}

/// Builds the initial `FixState` for serve index `k`, with the ball
/// launched toward `dir` (`-1` = toward left paddle, `+1` = toward right).
pub fn serve(k: u32, game_id: u32, dir: i64, left_y: Fix, right_y: Fix) -> FixState {
    let angle_deg = serve_angle_deg(k, game_id);
    let rad = deg_to_rad_q16(angle_deg);
    let sc = cordic_sin_cos(rad);
    let vx = fixed_point::mul(q(SERVE_SPEED), sc.cos) * dir;
    let vy = fixed_point::mul(q(SERVE_SPEED), sc.sin);
    FixState {
        t0: 0,
        x: q(WIDTH) / 2,
        y: q(HEIGHT) / 2,
        vx,
        vy,
        speed: q(SERVE_SPEED),
        left_y,
        right_y,
        dir,
    }
}

fn target_x_for(dir: i64) -> Fix {
    if dir < 0 {
        q(PADDLE_MARGIN + PADDLE_WIDTH + BALL_RADIUS)
    } else {
        q(WIDTH) - q(PADDLE_MARGIN + PADDLE_WIDTH + BALL_RADIUS)
    }
}

/// Time (Q16.16 seconds) until the ball crosses the receiving paddle's
/// x-plane. `Err` when `vx == 0` (impossible in well-formed play) or the
/// target is already behind the ball (non-positive interval).
pub fn time_to_paddle(s: &FixState) -> Result<Fix, EngineFault> {
    if s.vx == 0 {
        return Err(EngineFault::ZeroVelocity);
    }
    let target_x = target_x_for(s.dir);
    let dt = fixed_point::div(target_x - s.x, s.vx);
    if dt <= 0 {
        return Err(EngineFault::NonPositiveInterval);
    }
    Ok(dt)
}

/// Ball's y position at the upcoming paddle-plane crossing.
pub fn ball_y_at(s: &FixState, dt: Fix) -> Fix {
    fixed_point::reflect1d(s.y, s.vy, dt, Y_MIN_Q16, Y_MAX_Q16)
}

/// Paddle position at time `t`, analytically advanced from `m` at
/// `PADDLE_MAX_SPEED`, clamped to the playfield.
pub fn paddle_y_at(m: &PaddleMotion, t: Fix) -> Fix {
    let dt = if t > m.t0 { t - m.t0 } else { 0 };
    let delta = m.target - m.y0;
    let max_travel = fixed_point::mul(q(PADDLE_MAX_SPEED), dt);
    let travel = fixed_point::min(fixed_point::abs(delta), max_travel);
    let signed = if delta < 0 { -travel } else { travel };
    let y = m.y0 + signed;
    fixed_point::clamp_paddle_y(y, HALF_HEIGHT_Q16, q(HEIGHT))
}

/// Plans the receiver's paddle target for the upcoming event: the predicted
/// intercept offset by a deterministic aim perturbation, while the
/// non-receiver's target is the board center.
pub fn plan_targets(
    event_index: u32,
    game_id: u32,
    dir: i64,
    predicted_y: Fix,
    t0: Fix,
    left_y: Fix,
    right_y: Fix,
) -> (PaddleMotion, PaddleMotion) {
    let center = q(HEIGHT) / 2;
    let offset_px = rng::aim_offset(event_index, game_id, PADDLE_HEIGHT / 2);
    let receiver_target = fixed_point::clamp_paddle_y(
        predicted_y + q(offset_px),
        HALF_HEIGHT_Q16,
        q(HEIGHT),
    );
    if dir < 0 {
        (
            PaddleMotion { y0: left_y, t0, target: receiver_target },
            PaddleMotion { y0: right_y, t0, target: center },
        )
    } else {
        (
            PaddleMotion { y0: left_y, t0, target: center },
            PaddleMotion { y0: right_y, t0, target: receiver_target },
        )
    }
}

/// `true` if the receiving paddle, positioned at `paddle_y`, reaches the
/// ball at `ball_y`.
pub fn is_hit(paddle_y: Fix, ball_y: Fix) -> bool {
    fixed_point::abs(paddle_y - ball_y) <= HALF_HEIGHT_Q16 + q(BALL_RADIUS)
}

/// Applies the post-bounce velocity transform. `limit` must be positive; the
/// producer may treat a non-positive limit as an `EngineFault`, since it
/// indicates a constants bug, not a reachable game state.
pub fn bounce(s: &FixState, paddle_y: Fix, ball_y: Fix, t_hit: Fix) -> Result<FixState, EngineFault> {
    let limit = HALF_HEIGHT_Q16 + q(BALL_RADIUS);
    if limit <= 0 {
        return Err(EngineFault::NonPositiveBounceLimit);
    }
    let offset = fixed_point::clamp(ball_y - paddle_y, -limit, limit);
    let norm = fixed_point::div(offset, limit);
    let angle_q16 = fixed_point::clamp(
        fixed_point::mul(norm, q(MAX_BOUNCE_ANGLE_DEG)),
        -q(MAX_BOUNCE_ANGLE_DEG),
        q(MAX_BOUNCE_ANGLE_DEG),
    );
    let rad = deg_q16_to_rad_q16(angle_q16);
    let sc = cordic_sin_cos(rad);
    let new_speed = s.speed + q(SPEED_INCREMENT);
    let new_dir = -s.dir;
    let vx = fixed_point::mul(new_speed, sc.cos) * new_dir;
    let vy = fixed_point::mul(new_speed, sc.sin);
    Ok(FixState {
        t0: t_hit,
        x: target_x_for(s.dir),
        y: ball_y,
        vx,
        vy,
        speed: new_speed,
        left_y: s.left_y,
        right_y: s.right_y,
        dir: new_dir,
    })
}

/// The receiving side for the current direction of travel: the ball travels
/// toward `Left` when `dir < 0`.
pub fn receiver_side(dir: i64) -> Side {
    if dir < 0 {
        Side::Left
    } else {
        Side::Right
    }
}
