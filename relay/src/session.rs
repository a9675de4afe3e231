//! Pure, synchronous relay session state machine. Holds no I/O of its own;
//! `transport::run_session` feeds it JSON lines and writes back whatever it
//! emits. Kept separate from the transport so the protocol logic is fully
//! unit-testable without a runtime.

use core::fmt;

use pong_zk_core::CompactLog;

use crate::protocol::{RelayMessage, Role};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RelayFault {
    RoleConflict,
    EventIndexMismatch { expected: u32, found: u32 },
    PayloadTooLarge { len: usize, max: usize },
    PeerDisconnected { role: Role },
    UnexpectedMessage,
}

impl fmt::Display for RelayFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RoleConflict => write!(f, "session already has two peers"),
            Self::EventIndexMismatch { expected, found } => write!(
                f,
                "event index mismatch: expected {expected}, peer sent {found}"
            ),
            Self::PayloadTooLarge { len, max } => {
                write!(f, "payload too large: {len} bytes (max {max})")
            }
            Self::PeerDisconnected { role } => {
                let side = match role {
                    Role::Left => "left",
                    Role::Right => "right",
                };
                write!(f, "{side} peer disconnected before match end")
            }
            Self::UnexpectedMessage => write!(f, "message not valid in current session state"),
        }
    }
}

#[derive(Clone, Debug, Default)]
struct PendingEvent {
    event_index: u32,
    left: Option<String>,
    right: Option<String>,
}

/// A match session hosting at most two peers. `left` joins first and gets
/// even commitment indices; `right` joins second and gets odd ones.
pub struct RelaySession {
    game_id: u32,
    left_joined: bool,
    right_joined: bool,
    left_ready: bool,
    right_ready: bool,
    events: Vec<String>,
    left_commitments: Vec<String>,
    right_commitments: Vec<String>,
    left_seed: Option<String>,
    right_seed: Option<String>,
    pending: Option<PendingEvent>,
    ended: bool,
}

impl RelaySession {
    pub fn new(game_id: u32) -> Self {
        Self {
            game_id,
            left_joined: false,
            right_joined: false,
            left_ready: false,
            right_ready: false,
            events: Vec::new(),
            left_commitments: Vec::new(),
            right_commitments: Vec::new(),
            left_seed: None,
            right_seed: None,
            pending: None,
            ended: false,
        }
    }

    /// Assigns `left` to the first caller and `right` to the second;
    /// subsequent calls fault.
    pub fn join(&mut self) -> Result<Role, RelayFault> {
        if !self.left_joined {
            self.left_joined = true;
            Ok(Role::Left)
        } else if !self.right_joined {
            self.right_joined = true;
            Ok(Role::Right)
        } else {
            Err(RelayFault::RoleConflict)
        }
    }

    fn both_joined(&self) -> bool {
        self.left_joined && self.right_joined
    }

    fn both_ready(&self) -> bool {
        self.left_ready && self.right_ready
    }

    /// Processes one message from `role`, returning the messages the relay
    /// should send in response (to either or both peers, per message kind).
    pub fn on_message(
        &mut self,
        role: Role,
        msg: RelayMessage,
    ) -> Result<Vec<RelayMessage>, RelayFault> {
        match msg {
            RelayMessage::PlayerReady { role: msg_role } => {
                if msg_role != role {
                    return Err(RelayFault::RoleConflict);
                }
                match role {
                    Role::Left => self.left_ready = true,
                    Role::Right => self.right_ready = true,
                }
                let mut out = Vec::new();
                if self.both_joined() && self.both_ready() {
                    out.push(RelayMessage::GameReady { game_id: self.game_id });
                }
                Ok(out)
            }
            RelayMessage::PaddlePosition { role: msg_role, event_index, paddle_y, commitment } => {
                if msg_role != role {
                    return Err(RelayFault::RoleConflict);
                }
                self.record_commitment(role, commitment);
                self.assemble(role, event_index, paddle_y.clone())?;
                Ok(vec![RelayMessage::OpponentPaddle { event_index, paddle_y }])
            }
            RelayMessage::PlayerLog { role: msg_role, seed } => {
                if msg_role != role {
                    return Err(RelayFault::RoleConflict);
                }
                match role {
                    Role::Left => self.left_seed = Some(seed),
                    Role::Right => self.right_seed = Some(seed),
                }
                if let Some(log) = self.try_finalize() {
                    self.ended = true;
                    Ok(vec![RelayMessage::GameEnd { log }])
                } else {
                    Ok(Vec::new())
                }
            }
            _ => Err(RelayFault::UnexpectedMessage),
        }
    }

    fn record_commitment(&mut self, role: Role, commitment: String) {
        match role {
            Role::Left => self.left_commitments.push(commitment),
            Role::Right => self.right_commitments.push(commitment),
        }
    }

    fn assemble(&mut self, role: Role, event_index: u32, paddle_y: String) -> Result<(), RelayFault> {
        match self.pending.take() {
            None => {
                let mut pending = PendingEvent { event_index, ..Default::default() };
                match role {
                    Role::Left => pending.left = Some(paddle_y),
                    Role::Right => pending.right = Some(paddle_y),
                }
                self.pending = Some(pending);
                Ok(())
            }
            Some(mut pending) => {
                if pending.event_index != event_index {
                    // Restore so a retried/late message can still be diagnosed.
                    self.pending = Some(pending);
                    return Err(RelayFault::EventIndexMismatch {
                        expected: self.pending.as_ref().unwrap().event_index,
                        found: event_index,
                    });
                }
                match role {
                    Role::Left => pending.left = Some(paddle_y),
                    Role::Right => pending.right = Some(paddle_y),
                }
                if let (Some(left), Some(right)) = (pending.left.clone(), pending.right.clone()) {
                    self.events.push(left);
                    self.events.push(right);
                    self.pending = None;
                } else {
                    self.pending = Some(pending);
                }
                Ok(())
            }
        }
    }

    fn try_finalize(&self) -> Option<CompactLog> {
        let left_seed = self.left_seed.clone()?;
        let right_seed = self.right_seed.clone()?;
        if self.left_commitments.len() != self.right_commitments.len() {
            return None;
        }
        let mut commitments = Vec::with_capacity(self.events.len());
        for i in 0..self.left_commitments.len() {
            commitments.push(self.left_commitments[i].clone());
            commitments.push(self.right_commitments[i].clone());
        }
        Some(CompactLog {
            v: 1,
            game_id: self.game_id,
            events: self.events.clone(),
            commitments,
            player_left_seed: left_seed,
            player_right_seed: right_seed,
        })
    }

    pub fn is_ended(&self) -> bool {
        self.ended
    }

    pub fn game_id(&self) -> u32 {
        self.game_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_and_second_join_get_distinct_roles() {
        let mut session = RelaySession::new(1);
        assert_eq!(session.join().unwrap(), Role::Left);
        assert_eq!(session.join().unwrap(), Role::Right);
        assert_eq!(session.join().unwrap_err(), RelayFault::RoleConflict);
    }

    #[test]
    fn both_ready_triggers_game_ready() {
        let mut session = RelaySession::new(5);
        session.join().unwrap();
        session.join().unwrap();
        let out = session
            .on_message(Role::Left, RelayMessage::PlayerReady { role: Role::Left })
            .unwrap();
        assert!(out.is_empty());
        let out = session
            .on_message(Role::Right, RelayMessage::PlayerReady { role: Role::Right })
            .unwrap();
        assert_eq!(out, vec![RelayMessage::GameReady { game_id: 5 }]);
    }

    #[test]
    fn out_of_order_halves_assemble_into_one_event() {
        let mut session = RelaySession::new(1);
        session.join().unwrap();
        session.join().unwrap();
        session
            .on_message(
                Role::Right,
                RelayMessage::PaddlePosition {
                    role: Role::Right,
                    event_index: 0,
                    paddle_y: "200".into(),
                    commitment: "cc".repeat(32),
                },
            )
            .unwrap();
        session
            .on_message(
                Role::Left,
                RelayMessage::PaddlePosition {
                    role: Role::Left,
                    event_index: 0,
                    paddle_y: "100".into(),
                    commitment: "bb".repeat(32),
                },
            )
            .unwrap();
        assert_eq!(session.events, vec!["100".to_string(), "200".to_string()]);
    }

    #[test]
    fn mismatched_event_index_faults() {
        let mut session = RelaySession::new(1);
        session.join().unwrap();
        session.join().unwrap();
        session
            .on_message(
                Role::Left,
                RelayMessage::PaddlePosition {
                    role: Role::Left,
                    event_index: 0,
                    paddle_y: "100".into(),
                    commitment: "aa".repeat(32),
                },
            )
            .unwrap();
        let err = session
            .on_message(
                Role::Right,
                RelayMessage::PaddlePosition {
                    role: Role::Right,
                    event_index: 1,
                    paddle_y: "200".into(),
                    commitment: "bb".repeat(32),
                },
            )
            .unwrap_err();
        assert_eq!(err, RelayFault::EventIndexMismatch { expected: 0, found: 1 });
    }

    #[test]
    fn end_of_match_interleaves_commitments_by_global_index() {
        let mut session = RelaySession::new(9);
        session.join().unwrap();
        session.join().unwrap();
        for i in 0..2u32 {
            session
                .on_message(
                    Role::Left,
                    RelayMessage::PaddlePosition {
                        role: Role::Left,
                        event_index: i,
                        paddle_y: format!("{i}00"),
                        commitment: format!("{i}l").repeat(16),
                    },
                )
                .unwrap();
            session
                .on_message(
                    Role::Right,
                    RelayMessage::PaddlePosition {
                        role: Role::Right,
                        event_index: i,
                        paddle_y: format!("{i}01"),
                        commitment: format!("{i}r").repeat(16),
                    },
                )
                .unwrap();
        }
        session
            .on_message(Role::Left, RelayMessage::PlayerLog { role: Role::Left, seed: "ab".repeat(32) })
            .unwrap();
        let out = session
            .on_message(Role::Right, RelayMessage::PlayerLog { role: Role::Right, seed: "cd".repeat(32) })
            .unwrap();
        assert_eq!(out.len(), 1);
        match &out[0] {
            RelayMessage::GameEnd { log } => {
                assert_eq!(log.events.len(), 4);
                assert_eq!(log.commitments.len(), 4);
                assert!(log.commitments[0].starts_with("0l"));
                assert!(log.commitments[1].starts_with("0r"));
            }
            other => panic!("expected GameEnd, got {other:?}"),
        }
        assert!(session.is_ended());
    }
}
