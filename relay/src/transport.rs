//! Thin async loop around `RelaySession`. Reads newline-delimited JSON
//! messages from both peers' WebSocket streams, feeds them to the state
//! machine, and routes whatever it emits to the right side(s). Carries no
//! game logic of its own; all of that lives in `session::RelaySession`.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::WebSocketStream;
use tracing::{info, warn};

use crate::protocol::{RelayMessage, Role};
use crate::session::{RelayFault, RelaySession};

/// Maximum accepted message size, enforced before JSON parsing.
pub const MAX_MESSAGE_BYTES: usize = 64 * 1024;

type Socket = WebSocketStream<TcpStream>;

async fn read_line(
    socket: &mut Socket,
    role: Role,
    peer_timeout: Option<Duration>,
) -> Result<Option<String>, RelayFault> {
    let next = match peer_timeout {
        Some(d) => match timeout(d, socket.next()).await {
            Ok(msg) => msg,
            Err(_) => {
                warn!(?role, "peer read timed out");
                return Err(RelayFault::PeerDisconnected { role });
            }
        },
        None => socket.next().await,
    };

    let Some(frame) = next else { return Ok(None) };
    let frame = frame.map_err(|_| RelayFault::PeerDisconnected { role })?;
    match frame {
        Message::Text(t) => {
            if t.len() > MAX_MESSAGE_BYTES {
                return Err(RelayFault::PayloadTooLarge { len: t.len(), max: MAX_MESSAGE_BYTES });
            }
            Ok(Some(t))
        }
        Message::Close(_) => Ok(None),
        _ => Ok(Some(String::new())),
    }
}

async fn send_line(socket: &mut Socket, msg: &RelayMessage, role: Role) -> Result<(), RelayFault> {
    let line = msg.to_line().expect("relay message always serializes");
    socket
        .send(Message::Text(line))
        .await
        .map_err(|_| RelayFault::PeerDisconnected { role })
}

/// Whether an outbound `RelayMessage` goes back to the peer that triggered
/// it, to the opponent, or to both.
fn route(msg: &RelayMessage) -> Audience {
    match msg {
        RelayMessage::OpponentPaddle { .. } => Audience::Other,
        RelayMessage::GameReady { .. } | RelayMessage::GameEnd { .. } => Audience::Both,
        _ => Audience::Sender,
    }
}

enum Audience {
    Sender,
    Other,
    Both,
}

/// Performs the join handshake: assigns roles, tells each peer its `role`
/// and `game_id` via `game_start`, then tells both `opponent_connected` now
/// that the second peer has arrived. Both sockets must already be accepted
/// WebSocket connections for the same match.
async fn handshake(
    session: &mut RelaySession,
    left: &mut Socket,
    right: &mut Socket,
) -> Result<(), RelayFault> {
    let game_id = session.game_id();
    let left_role = session.join()?;
    let right_role = session.join()?;
    send_line(left, &RelayMessage::GameStart { game_id, role: left_role }, left_role).await?;
    send_line(right, &RelayMessage::GameStart { game_id, role: right_role }, right_role).await?;
    send_line(left, &RelayMessage::OpponentConnected, left_role).await?;
    send_line(right, &RelayMessage::OpponentConnected, right_role).await?;
    Ok(())
}

/// Drives a full two-peer session to completion: performs the join
/// handshake, then reads whichever socket has a message ready, applies it
/// to `session`, and routes the result. Returns once the session ends or
/// either peer disconnects; on disconnect the surviving peer is notified
/// with `opponent_disconnected` on a best-effort basis before the fault is
/// returned.
pub async fn run_session(
    session: &mut RelaySession,
    left: &mut Socket,
    right: &mut Socket,
    peer_timeout: Option<Duration>,
) -> Result<(), RelayFault> {
    handshake(session, left, right).await?;
    match drive(session, left, right, peer_timeout).await {
        Ok(()) => Ok(()),
        Err(fault) => {
            if let RelayFault::PeerDisconnected { role } = fault {
                let survivor = match opponent(role) {
                    Role::Left => &mut *left,
                    Role::Right => &mut *right,
                };
                let _ = send_line(survivor, &RelayMessage::OpponentDisconnected, opponent(role)).await;
            }
            Err(fault)
        }
    }
}

async fn drive(
    session: &mut RelaySession,
    left: &mut Socket,
    right: &mut Socket,
    peer_timeout: Option<Duration>,
) -> Result<(), RelayFault> {
    loop {
        let (role, line) = tokio::select! {
            l = read_line(left, Role::Left, peer_timeout) => (Role::Left, l?),
            r = read_line(right, Role::Right, peer_timeout) => (Role::Right, r?),
        };

        let Some(text) = line else {
            return Err(RelayFault::PeerDisconnected { role });
        };
        if text.is_empty() {
            continue;
        }

        let msg = match RelayMessage::from_line(&text) {
            Ok(m) => m,
            Err(_) => continue,
        };

        let outbound = session.on_message(role, msg)?;
        for reply in &outbound {
            match route(reply) {
                Audience::Sender => {
                    let sock = match role {
                        Role::Left => &mut *left,
                        Role::Right => &mut *right,
                    };
                    send_line(sock, reply, role).await?;
                }
                Audience::Other => {
                    let other = opponent(role);
                    let sock = match other {
                        Role::Left => &mut *left,
                        Role::Right => &mut *right,
                    };
                    send_line(sock, reply, other).await?;
                }
                Audience::Both => {
                    send_line(&mut *left, reply, Role::Left).await?;
                    send_line(&mut *right, reply, Role::Right).await?;
                }
            }
        }

        if session.is_ended() {
            info!("match ended, closing session loop");
            return Ok(());
        }
    }
}

fn opponent(role: Role) -> Role {
    match role {
        Role::Left => Role::Right,
        Role::Right => Role::Left,
    }
}
