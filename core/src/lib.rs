#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod commitment;
pub mod constants;
pub mod cordic;
pub mod engine;
pub mod error;
pub mod fixed_point;
pub mod guest_io;
pub mod log;
pub mod replay;
pub mod rng;
pub mod types;
pub mod validator;

pub use error::{EngineFault, ValidateError};
pub use guest_io::{log_hash_sha256, to_validate_log_input, validate_log_for_guest};
pub use types::{CompactLog, FixState, PaddleMotion, Side, ValidateLogInput, ValidateLogOutput};
pub use validator::{validate_log, ValidationResult};
