//! Line-delimited JSON message envelope exchanged between the two peers of a
//! match and the relay that assembles their authoritative event stream.

use pong_zk_core::CompactLog;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Left,
    Right,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RelayMessage {
    GameStart { game_id: u32, role: Role },
    OpponentConnected,
    PlayerReady { role: Role },
    GameReady { game_id: u32 },
    PaddlePosition { role: Role, event_index: u32, paddle_y: String, commitment: String },
    OpponentPaddle { event_index: u32, paddle_y: String },
    PlayerLog { role: Role, seed: String },
    GameEnd { log: CompactLog },
    OpponentDisconnected,
}

impl RelayMessage {
    pub fn to_line(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_line(line: &str) -> serde_json::Result<Self> {
        serde_json::from_str(line)
    }
}
