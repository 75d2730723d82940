use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Opaque token keying this client's entity inside every server snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Messages sent from client to server
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub enum ClientMessage {
    Join { uuid: Identity },
    MovePaddle { paddle_position: f32 },
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct BallState {
    pub x: f32,
    pub y: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vx: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vy: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius: Option<f32>,
}

impl BallState {
    pub fn at(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            vx: None,
            vy: None,
            radius: None,
        }
    }
}

/// Flat player object as it appears on the wire. Deployments send either the
/// track position, the placed geometry, or both.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct PaddleFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paddle_position: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paddle_x: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paddle_y: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paddle_width: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paddle_rot: Option<f32>,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("player descriptor needs paddle_position or paddle_x/paddle_y/paddle_rot")]
pub struct MissingPaddleFields;

/// Per-player paddle descriptor. `Placed` is preferred whenever the server
/// echoes full geometry.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(try_from = "PaddleFields", into = "PaddleFields")]
pub enum PaddleDescriptor {
    Track {
        position: f32,
    },
    Placed {
        x: f32,
        y: f32,
        width: Option<f32>,
        rotation: f32,
    },
}

impl PaddleDescriptor {
    fn numbers(&self) -> Vec<(&'static str, f32)> {
        match *self {
            PaddleDescriptor::Track { position } => vec![("paddle_position", position)],
            PaddleDescriptor::Placed {
                x,
                y,
                width,
                rotation,
            } => {
                let mut numbers = vec![("paddle_x", x), ("paddle_y", y), ("paddle_rot", rotation)];
                if let Some(width) = width {
                    numbers.push(("paddle_width", width));
                }
                numbers
            }
        }
    }
}

impl TryFrom<PaddleFields> for PaddleDescriptor {
    type Error = MissingPaddleFields;

    fn try_from(fields: PaddleFields) -> Result<Self, Self::Error> {
        match (fields.paddle_x, fields.paddle_y, fields.paddle_rot) {
            (Some(x), Some(y), Some(rotation)) => Ok(PaddleDescriptor::Placed {
                x,
                y,
                width: fields.paddle_width,
                rotation,
            }),
            _ => fields
                .paddle_position
                .map(|position| PaddleDescriptor::Track { position })
                .ok_or(MissingPaddleFields),
        }
    }
}

impl From<PaddleDescriptor> for PaddleFields {
    fn from(descriptor: PaddleDescriptor) -> Self {
        match descriptor {
            PaddleDescriptor::Track { position } => PaddleFields {
                paddle_position: Some(position),
                ..PaddleFields::default()
            },
            PaddleDescriptor::Placed {
                x,
                y,
                width,
                rotation,
            } => PaddleFields {
                paddle_position: None,
                paddle_x: Some(x),
                paddle_y: Some(y),
                paddle_width: width,
                paddle_rot: Some(rotation),
            },
        }
    }
}

/// One complete world description pushed by the server.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct WorldSnapshot {
    pub ball: BallState,
    pub players: BTreeMap<Identity, PaddleDescriptor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arena_radius: Option<f32>,
}

impl WorldSnapshot {
    fn ensure_finite(&self) -> Result<(), DecodeFailure> {
        let mut numbers = vec![
            ("ball.x".to_string(), self.ball.x),
            ("ball.y".to_string(), self.ball.y),
        ];
        for (name, value) in [
            ("ball.vx", self.ball.vx),
            ("ball.vy", self.ball.vy),
            ("ball.radius", self.ball.radius),
            ("arena_radius", self.arena_radius),
        ] {
            if let Some(value) = value {
                numbers.push((name.to_string(), value));
            }
        }
        for (identity, paddle) in &self.players {
            for (name, value) in paddle.numbers() {
                numbers.push((format!("players.{identity}.{name}"), value));
            }
        }

        match numbers.into_iter().find(|(_, value)| !value.is_finite()) {
            Some((field, _)) => Err(DecodeFailure::NonFinite { field }),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Error)]
pub enum DecodeFailure {
    #[error("malformed payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error("non-finite number in {field}")]
    NonFinite { field: String },
}

pub fn encode_join(identity: &Identity) -> Result<String, serde_json::Error> {
    serde_json::to_string(&ClientMessage::Join {
        uuid: identity.clone(),
    })
}

pub fn encode_control_update(paddle_position: f32) -> Result<String, serde_json::Error> {
    serde_json::to_string(&ClientMessage::MovePaddle { paddle_position })
}

/// Parses one inbound payload. Pure: the same input always yields the same
/// snapshot or the same failure.
pub fn decode_snapshot(raw: &str) -> Result<WorldSnapshot, DecodeFailure> {
    let snapshot: WorldSnapshot = serde_json::from_str(raw)?;
    snapshot.ensure_finite()?;
    Ok(snapshot)
}

/// Server-side view of an outbound client message.
pub fn decode_client_message(raw: &str) -> Result<ClientMessage, DecodeFailure> {
    let message: ClientMessage = serde_json::from_str(raw)?;
    if let ClientMessage::MovePaddle { paddle_position } = message {
        if !paddle_position.is_finite() {
            return Err(DecodeFailure::NonFinite {
                field: "paddle_position".to_string(),
            });
        }
    }
    Ok(message)
}
