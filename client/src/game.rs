use crate::network::OutboundSink;
use crate::projection::{DisplayBall, DisplayPaddle, Projector};
use log::{debug, info, warn};
use pong_shared::{
    decode_snapshot, encode_control_update, DecodeFailure, Identity, PaddleDescriptor,
    WorldSnapshot,
};

#[derive(Debug, Clone, PartialEq)]
pub struct OtherPlayer {
    pub identity: Identity,
    pub paddle: DisplayPaddle,
}

/// Everything the renderer needs for one frame, in display units relative to
/// the arena center.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderState {
    pub display_radius: f32,
    pub scale: f32,
    pub control_value: f32,
    pub own_paddle: DisplayPaddle,
    /// False until a snapshot containing our identity has been received.
    pub own_entity_present: bool,
    pub other_players: Vec<OtherPlayer>,
    pub ball: Option<DisplayBall>,
}

/// Holds the locally owned control value and the latest server snapshot as
/// separate fields; they only meet inside [`StateSynchronizer::current_view`].
pub struct StateSynchronizer {
    identity: Identity,
    control_value: f32,
    snapshot: Option<WorldSnapshot>,
    projector: Projector,
}

impl StateSynchronizer {
    pub fn new(identity: Identity, projector: Projector) -> Self {
        Self {
            identity,
            control_value: 0.0,
            snapshot: None,
            projector,
        }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn control_value(&self) -> f32 {
        self.control_value
    }

    /// Adds `delta` to the control value and sends the result once. A failed
    /// send is dropped; the next update supersedes it.
    pub fn apply_local_delta<S: OutboundSink + ?Sized>(&mut self, delta: f32, sink: &mut S) -> f32 {
        if !delta.is_finite() {
            warn!("Ignoring non-finite paddle delta {}", delta);
            return self.control_value;
        }

        self.control_value += delta;

        match encode_control_update(self.control_value) {
            Ok(payload) => {
                if let Err(e) = sink.send_raw(payload) {
                    debug!("Dropping paddle update {:.3}: {}", self.control_value, e);
                }
            }
            Err(e) => warn!("Failed to encode paddle update: {}", e),
        }

        self.control_value
    }

    /// Replaces the stored snapshot wholesale. A failed decode leaves the
    /// previous snapshot in place. Returns whether anything was applied.
    pub fn apply_snapshot(&mut self, snapshot: Result<WorldSnapshot, DecodeFailure>) -> bool {
        let snapshot = match snapshot {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!("Discarding game state from server: {}", e);
                return false;
            }
        };

        let was_present = self.own_entry().is_some();
        let is_present = snapshot.players.contains_key(&self.identity);
        if is_present != was_present || self.snapshot.is_none() {
            if is_present {
                info!("Player {} is in the arena", self.identity);
            } else {
                info!("Player {} missing from game state", self.identity);
            }
        }

        if !matches!(snapshot.arena_radius, Some(radius) if radius > 0.0) {
            debug!(
                "Game state has unusable arena radius {:?}, using unit scale",
                snapshot.arena_radius
            );
        }

        self.snapshot = Some(snapshot);
        true
    }

    pub fn receive_payload(&mut self, raw: &str) -> bool {
        self.apply_snapshot(decode_snapshot(raw))
    }

    fn own_entry(&self) -> Option<&PaddleDescriptor> {
        self.snapshot
            .as_ref()
            .and_then(|snapshot| snapshot.players.get(&self.identity))
    }

    pub fn current_view(&self) -> RenderState {
        let scale = self
            .projector
            .scale(self.snapshot.as_ref().and_then(|snapshot| snapshot.arena_radius));

        let own_entry = self.own_entry();
        let mut own_paddle = self.projector.place_on_track(self.control_value);
        if let Some(PaddleDescriptor::Placed {
            width: Some(width), ..
        }) = own_entry
        {
            own_paddle.length = width * scale;
        }

        let (other_players, ball) = match &self.snapshot {
            Some(snapshot) => {
                let others = snapshot
                    .players
                    .iter()
                    .filter(|(identity, _)| **identity != self.identity)
                    .map(|(identity, descriptor)| OtherPlayer {
                        identity: identity.clone(),
                        paddle: self.projector.project_paddle(descriptor, scale),
                    })
                    .collect();
                (others, Some(self.projector.project_ball(&snapshot.ball, scale)))
            }
            None => (Vec::new(), None),
        };

        RenderState {
            display_radius: self.projector.display_radius,
            scale,
            control_value: self.control_value,
            own_paddle,
            own_entity_present: own_entry.is_some(),
            other_players,
            ball,
        }
    }
}
