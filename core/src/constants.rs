//! Domain constants shared by the producer, the validator, and the guest.
//!
//! Every value here is part of the consensus: changing one without changing
//! it identically everywhere else breaks commitment verification for any log
//! produced before the change.

/// Q16.16 scale factor (2^16).
pub const FIX_SHIFT: u32 = 16;
pub const FIX_ONE: i64 = 1 << FIX_SHIFT;

pub const WIDTH: i64 = 800;
pub const HEIGHT: i64 = 480;
pub const PADDLE_HEIGHT: i64 = 80;
pub const PADDLE_WIDTH: i64 = 10;
pub const PADDLE_MARGIN: i64 = 16;
pub const BALL_RADIUS: i64 = 6;
pub const PADDLE_MAX_SPEED: i64 = 200;
pub const SERVE_SPEED: i64 = 500;
pub const SPEED_INCREMENT: i64 = 50;
pub const MAX_BOUNCE_ANGLE_DEG: i64 = 60;
pub const ANGLE_RANGE: i64 = 121;
pub const SERVE_ANGLE_MULTIPLIER: i64 = 37;
pub const POINTS_TO_WIN: u32 = 3;
pub const INITIAL_SERVE_DIRECTION: i64 = 1;
pub const MAX_EVENTS: usize = 10_000;

/// atan(2^-i) for i in 0..8, Q16.16.
pub const ATAN_Q16: [i64; 8] = [51472, 30386, 16055, 8150, 4091, 2047, 1024, 512];
/// CORDIC gain constant, Q16.16 (~0.6072529).
pub const K_Q16: i64 = 39797;
/// Pi, Q16.16.
pub const PI_Q16: i64 = 205887;

/// Q16.16 helper: WIDTH/HEIGHT/etc. converted to fixed-point.
pub const fn to_q16(v: i64) -> i64 {
    v << FIX_SHIFT
}

pub const PADDLE_HALF_Q16: i64 = to_q16(PADDLE_HEIGHT) / 2;
pub const HEIGHT_Q16: i64 = to_q16(HEIGHT);
pub const WIDTH_Q16: i64 = to_q16(WIDTH);
