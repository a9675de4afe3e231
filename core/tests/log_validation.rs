//! Integration tests driving the producer, validator and guest boundary
//! together through full matches and the serialized on-disk log format.

use pong_zk_core::{
    commitment::{compute_commitment, from_hex, to_hex as commitment_to_hex},
    constants::MAX_EVENTS,
    guest_io::{log_hash_sha256, to_validate_log_input, validate_log_for_guest},
    log::produce_log,
    validator::{reason_string, validate_log},
    CompactLog,
};

fn seed(byte: u8) -> [u8; 32] {
    [byte; 32]
}

fn sample_log(game_id: u32) -> CompactLog {
    produce_log(game_id, seed(0x11), seed(0x22), |_idx, _state, _dt| {
        15_728_640 // HEIGHT/2 (240) in Q16.16, a naive "stay centered" predictor
    })
}

#[test]
fn empty_log_json_is_rejected_with_no_events_reason() {
    let json = format!(
        r#"{{"v":1,"game_id":0,"events":[],"commitments":[],"player_left_seed":"{}","player_right_seed":"{}"}}"#,
        "00".repeat(32),
        "ff".repeat(32)
    );
    let log: CompactLog = serde_json::from_str(&json).expect("log should parse as JSON");
    let result = validate_log(&log);
    assert!(!result.fair);
    assert_eq!(reason_string(&result).unwrap(), "No events provided");
}

#[test]
fn odd_length_events_are_rejected() {
    let mut log = sample_log(1);
    log.events.truncate(1);
    log.commitments.truncate(1);
    let result = validate_log(&log);
    assert!(!result.fair);
    assert!(reason_string(&result).unwrap().contains("Malformed"));
}

#[test]
fn a_full_match_round_trips_through_json_and_validates_fair() {
    let log = sample_log(2024);

    let json = serde_json::to_string(&log).expect("log should serialize");
    let reparsed: CompactLog = serde_json::from_str(&json).expect("log should reparse");
    assert_eq!(reparsed, log, "log must round-trip through its wire form unchanged");

    let result = validate_log(&reparsed);
    assert!(result.fair, "reason: {:?}", reason_string(&result));
    assert!(
        result.left_score == 3 || result.right_score == 3,
        "winner must reach exactly POINTS_TO_WIN"
    );
    assert!(result.left_score <= 3 && result.right_score <= 3);
    assert_ne!(result.left_score, result.right_score, "no ties allowed");
}

#[test]
fn tampering_any_commitment_byte_is_caught_at_its_index() {
    let mut log = sample_log(55);
    assert!(log.commitments.len() > 7, "need enough events for this probe");
    let mut raw = hex_decode(&log.commitments[7]);
    raw[0] ^= 0x01;
    log.commitments[7] = hex_encode(&raw);

    let result = validate_log(&log);
    assert!(!result.fair);
    assert_eq!(
        reason_string(&result).unwrap(),
        "Commitment verification failed at index 7"
    );
}

#[test]
fn guest_output_commits_to_a_hash_that_depends_only_on_game_id_and_events() {
    let log = sample_log(777);
    let input = to_validate_log_input(&log).expect("events parse as integers");
    let output = validate_log_for_guest(&input);

    assert!(output.fair, "reason: {:?}", output.reason);
    assert_eq!(output.events_len as usize, log.events.len());

    let events: Vec<i64> = log.events.iter().map(|s| s.parse().unwrap()).collect();
    let expected_hash = log_hash_sha256(log.game_id, &events);
    assert_eq!(output.log_hash_sha256, expected_hash);

    // Changing the seeds (but not game_id/events) must not move the hash.
    let mut other_seeds = log.clone();
    other_seeds.player_left_seed = "aa".repeat(32);
    other_seeds.player_right_seed = "bb".repeat(32);
    let other_input = to_validate_log_input(&other_seeds).unwrap();
    let other_output = validate_log_for_guest(&other_input);
    assert_eq!(other_output.log_hash_sha256, output.log_hash_sha256);
}

#[test]
fn duplicate_seeds_are_rejected_even_in_an_otherwise_valid_match() {
    let mut log = sample_log(3);
    log.player_right_seed = log.player_left_seed.clone();
    let result = validate_log(&log);
    assert!(!result.fair);
    assert_eq!(
        reason_string(&result).unwrap(),
        "Players must use unique commitment seeds"
    );
}

#[test]
fn trailing_events_appended_after_a_win_are_rejected() {
    let mut log = sample_log(88);
    let result = validate_log(&log);
    assert!(result.fair, "reason: {:?}", reason_string(&result));
    let win_index = log.events.len();

    let left_seed = from_hex(&log.player_left_seed).unwrap();
    let right_seed = from_hex(&log.player_right_seed).unwrap();

    // A forger who holds both plaintext seeds can always recompute valid
    // commitments for arbitrary appended garbage.
    let forged_left: i64 = 999_999;
    let forged_right: i64 = -999_999;
    log.events.push(forged_left.to_string());
    log.commitments.push(commitment_to_hex(&compute_commitment(
        &left_seed,
        win_index as u32,
        forged_left,
    )));
    log.events.push(forged_right.to_string());
    log.commitments.push(commitment_to_hex(&compute_commitment(
        &right_seed,
        win_index as u32 + 1,
        forged_right,
    )));

    let result = validate_log(&log);
    assert!(!result.fair, "trailing events after a win must be rejected");
    assert_eq!(
        reason_string(&result).unwrap(),
        format!(
            "Events logged after match end {{\"index\":{},\"total\":{}}}",
            win_index,
            win_index + 2
        )
    );
}

#[test]
fn exactly_max_events_is_not_rejected_for_length_alone() {
    let placeholder_event = "0".to_string();
    let placeholder_commitment = "00".repeat(32);
    let log = CompactLog {
        v: 1,
        game_id: 1,
        events: vec![placeholder_event.clone(); MAX_EVENTS],
        commitments: vec![placeholder_commitment.clone(); MAX_EVENTS],
        player_left_seed: "11".repeat(32),
        player_right_seed: "22".repeat(32),
    };
    let result = validate_log(&log);
    assert!(!result.fair, "placeholder events cannot pass commitment checks");
    let reason = reason_string(&result).unwrap();
    assert!(
        !reason.contains("too many events"),
        "a log of exactly MAX_EVENTS must not be rejected for its length: {reason}"
    );

    let over_cap_events = vec![placeholder_event; MAX_EVENTS + 2];
    let over_cap_commitments = vec![placeholder_commitment; MAX_EVENTS + 2];
    let over_cap_log = CompactLog {
        v: 1,
        game_id: 1,
        events: over_cap_events,
        commitments: over_cap_commitments,
        player_left_seed: "11".repeat(32),
        player_right_seed: "22".repeat(32),
    };
    let over_cap_result = validate_log(&over_cap_log);
    assert!(!over_cap_result.fair);
    assert!(reason_string(&over_cap_result)
        .unwrap()
        .contains(&format!("exceeds cap of {MAX_EVENTS}")));
}

#[test]
fn exactly_four_nonzero_seed_bytes_is_accepted_not_rejected_as_weak() {
    let mut weak_left = [0u8; 32];
    weak_left[0] = 1;
    weak_left[1] = 1;
    weak_left[2] = 1;
    weak_left[3] = 1; // exactly 4 nonzero bytes, 28 zero bytes
    let strong_right = [0xffu8; 32];

    let log = produce_log(9001, weak_left, strong_right, |_idx, _state, _dt| {
        15_728_640
    });
    let result = validate_log(&log);
    assert!(
        result.fair,
        "a seed with exactly 4 nonzero bytes must be accepted: {:?}",
        reason_string(&result)
    );
}

fn hex_decode(s: &str) -> Vec<u8> {
    (0..s.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&s[i..i + 2], 16).unwrap())
        .collect()
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
