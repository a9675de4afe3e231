//! Guest/host boundary: the contracts the zero-knowledge guest reads and
//! commits, plus the domain-separated log hash used to bind a proof to a
//! specific match without re-embedding the whole log in the journal.

use alloc::string::ToString;
use alloc::vec::Vec;
use sha2::{Digest, Sha256};

use crate::types::{CompactLog, ValidateLogInput, ValidateLogOutput};
use crate::validator::{reason_string, validate_log};

const LOG_HASH_DOMAIN: &[u8] = b"PONGLOGv1";

/// `SHA-256(b"PONGLOGv1" || LE32(game_id) || for each y in events: LE64(y))`.
pub fn log_hash_sha256(game_id: u32, events: &[i64]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(LOG_HASH_DOMAIN);
    hasher.update(game_id.to_le_bytes());
    for y in events {
        hasher.update(y.to_le_bytes());
    }
    let digest = hasher.finalize();
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest);
    out
}

/// Converts a wire-form `CompactLog` into the guest's input contract,
/// parsing each decimal event string into its signed 64-bit Q16.16 value.
pub fn to_validate_log_input(log: &CompactLog) -> Option<ValidateLogInput> {
    let mut events = Vec::with_capacity(log.events.len());
    for s in &log.events {
        events.push(s.parse::<i64>().ok()?);
    }
    Some(ValidateLogInput {
        game_id: log.game_id,
        events,
        commitments: log.commitments.clone(),
        player_left_seed: log.player_left_seed.clone(),
        player_right_seed: log.player_right_seed.clone(),
    })
}

fn to_compact_log(input: &ValidateLogInput) -> CompactLog {
    CompactLog {
        v: 1,
        game_id: input.game_id,
        events: input.events.iter().map(|e| e.to_string()).collect(),
        commitments: input.commitments.clone(),
        player_left_seed: input.player_left_seed.clone(),
        player_right_seed: input.player_right_seed.clone(),
    }
}

/// Full guest entry point: validates a `ValidateLogInput` (commitments
/// included) and emits the journal the guest commits via `env::commit`.
pub fn validate_log_for_guest(input: &ValidateLogInput) -> ValidateLogOutput {
    let log_hash_sha256 = log_hash_sha256(input.game_id, &input.events);
    let log = to_compact_log(input);
    let result = validate_log(&log);
    ValidateLogOutput {
        fair: result.fair,
        reason: reason_string(&result),
        left_score: result.left_score,
        right_score: result.right_score,
        events_len: input.events.len() as u32,
        log_hash_sha256,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_hash_depends_on_game_id_and_events() {
        let a = log_hash_sha256(1, &[10, 20]);
        let b = log_hash_sha256(2, &[10, 20]);
        let c = log_hash_sha256(1, &[10, 21]);
        assert_ne!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn log_hash_is_deterministic() {
        assert_eq!(log_hash_sha256(7, &[1, 2, 3]), log_hash_sha256(7, &[1, 2, 3]));
    }

    #[test]
    fn validate_log_for_guest_rejects_empty_events() {
        let input = ValidateLogInput {
            game_id: 1,
            events: Vec::new(),
            commitments: Vec::new(),
            player_left_seed: "00".repeat(32),
            player_right_seed: "ff".repeat(32),
        };
        let out = validate_log_for_guest(&input);
        assert!(!out.fair);
        assert_eq!(out.reason.as_deref(), Some("No events provided"));
    }
}
