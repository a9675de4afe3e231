#![no_main]
#![no_std]

extern crate alloc;

use pong_zk_core::{validate_log_for_guest, ValidateLogInput};
use risc0_zkvm::guest::env;

risc0_zkvm::guest::entry!(main);

fn main() {
    let input: ValidateLogInput = env::read();

    let output = validate_log_for_guest(&input);

    env::commit(&output);
}
