//! Arena-unit to display-unit projection
//!
//! The server picks the arena radius per session; everything drawn is scaled
//! by `display_radius / arena_radius` so the arena always occupies the same
//! screen area. Angles are scale-invariant and pass through untouched.

use pong_shared::{BallState, PaddleDescriptor};
use std::f32::consts::PI;

pub const DEFAULT_PADDLE_LENGTH: f32 = 100.0;
pub const DEFAULT_PADDLE_THICKNESS: f32 = 20.0;
pub const DEFAULT_BALL_RADIUS: f32 = 10.0;

/// Offset from the arena center, in display units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayPoint {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayPaddle {
    pub center: DisplayPoint,
    /// Radians; the long side is perpendicular to this direction.
    pub rotation: f32,
    pub length: f32,
    pub thickness: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayBall {
    pub center: DisplayPoint,
    pub radius: f32,
}

/// Linear map from a paddle position domain onto an arc of the arena edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcTrack {
    pub min_position: f32,
    pub max_position: f32,
    pub min_angle: f32,
    pub max_angle: f32,
}

impl Default for ArcTrack {
    /// Positions -5..5 sweep the left side of the arena, 135° to 225°.
    fn default() -> Self {
        Self {
            min_position: -5.0,
            max_position: 5.0,
            min_angle: 3.0 * PI / 4.0,
            max_angle: 5.0 * PI / 4.0,
        }
    }
}

impl ArcTrack {
    pub fn is_degenerate(&self) -> bool {
        let bounds = [
            self.min_position,
            self.max_position,
            self.min_angle,
            self.max_angle,
        ];
        bounds.iter().any(|value| !value.is_finite()) || self.min_position == self.max_position
    }

    /// Positions outside the domain are clamped to its ends.
    pub fn angle_for(&self, position: f32) -> f32 {
        if self.is_degenerate() || !position.is_finite() {
            return self.min_angle;
        }

        let low = self.min_position.min(self.max_position);
        let high = self.min_position.max(self.max_position);
        let t = (position.clamp(low, high) - self.min_position)
            / (self.max_position - self.min_position);

        self.min_angle + t * (self.max_angle - self.min_angle)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Projector {
    pub display_radius: f32,
    pub track: ArcTrack,
    pub paddle_length: f32,
    pub paddle_thickness: f32,
    pub ball_radius: f32,
}

impl Projector {
    pub fn new(display_radius: f32, track: ArcTrack) -> Self {
        Self {
            display_radius,
            track,
            paddle_length: DEFAULT_PADDLE_LENGTH,
            paddle_thickness: DEFAULT_PADDLE_THICKNESS,
            ball_radius: DEFAULT_BALL_RADIUS,
        }
    }

    /// Display units per arena unit. A zero, negative, non-finite or absent
    /// arena radius falls back to 1.
    pub fn scale(&self, arena_radius: Option<f32>) -> f32 {
        match arena_radius {
            Some(radius) if radius.is_finite() && radius > 0.0 => {
                let scale = self.display_radius / radius;
                if scale.is_finite() && scale > 0.0 {
                    scale
                } else {
                    1.0
                }
            }
            _ => 1.0,
        }
    }

    pub fn project_point(&self, x: f32, y: f32, scale: f32) -> DisplayPoint {
        DisplayPoint {
            x: x * scale,
            y: y * scale,
        }
    }

    /// Places a paddle on the arena edge from its track position.
    pub fn place_on_track(&self, position: f32) -> DisplayPaddle {
        let angle = self.track.angle_for(position);

        DisplayPaddle {
            center: DisplayPoint {
                x: self.display_radius * angle.cos(),
                y: self.display_radius * angle.sin(),
            },
            rotation: angle,
            length: self.paddle_length,
            thickness: self.paddle_thickness,
        }
    }

    pub fn project_paddle(&self, descriptor: &PaddleDescriptor, scale: f32) -> DisplayPaddle {
        match *descriptor {
            PaddleDescriptor::Track { position } => self.place_on_track(position),
            PaddleDescriptor::Placed {
                x,
                y,
                width,
                rotation,
            } => DisplayPaddle {
                center: self.project_point(x, y, scale),
                rotation,
                length: width.map_or(self.paddle_length, |width| width * scale),
                thickness: self.paddle_thickness,
            },
        }
    }

    pub fn project_ball(&self, ball: &BallState, scale: f32) -> DisplayBall {
        DisplayBall {
            center: self.project_point(ball.x, ball.y, scale),
            radius: ball
                .radius
                .map_or(self.ball_radius, |radius| radius * scale),
        }
    }
}

impl Default for Projector {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_DISPLAY_RADIUS, ArcTrack::default())
    }
}
