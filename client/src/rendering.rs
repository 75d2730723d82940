use crate::game::RenderState;
use crate::projection::{DisplayPaddle, DisplayPoint};
use macroquad::prelude::*;

#[derive(Debug, Clone)]
pub struct HudConfig {
    pub connected: bool,
    pub control_value: f32,
    pub own_entity_present: bool,
    pub player_count: usize,
}

impl HudConfig {
    pub fn from_view(view: &RenderState, connected: bool) -> Self {
        Self {
            connected,
            control_value: view.control_value,
            own_entity_present: view.own_entity_present,
            player_count: view.other_players.len() + usize::from(view.own_entity_present),
        }
    }
}

pub struct Renderer {
    arena_color: Color,
    own_color: Color,
    other_color: Color,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            arena_color: Color::from_rgba(34, 34, 34, 255),
            own_color: GREEN,
            other_color: Color::from_rgba(255, 68, 68, 255),
        }
    }

    pub fn render(&mut self, view: &RenderState, connected: bool) {
        clear_background(Color::from_rgba(26, 26, 26, 255));

        let origin = DisplayPoint {
            x: screen_width() / 2.0,
            y: screen_height() / 2.0,
        };

        self.draw_arena(origin, view.display_radius);

        for other in &view.other_players {
            self.draw_paddle(origin, &other.paddle, self.other_color);
        }
        self.draw_paddle(origin, &view.own_paddle, self.own_color);

        if let Some(ball) = view.ball {
            draw_circle(
                origin.x + ball.center.x,
                origin.y + ball.center.y,
                ball.radius,
                WHITE,
            );
        }

        self.draw_ui(HudConfig::from_view(view, connected));
    }

    fn draw_arena(&mut self, origin: DisplayPoint, radius: f32) {
        draw_circle(origin.x, origin.y, radius, self.arena_color);
        draw_circle_lines(origin.x, origin.y, radius, 2.0, WHITE);
    }

    fn draw_paddle(&mut self, origin: DisplayPoint, paddle: &DisplayPaddle, color: Color) {
        draw_rectangle_ex(
            origin.x + paddle.center.x,
            origin.y + paddle.center.y,
            paddle.thickness,
            paddle.length,
            DrawRectangleParams {
                offset: vec2(0.5, 0.5),
                rotation: paddle.rotation,
                color,
            },
        );
    }

    fn draw_ui(&mut self, config: HudConfig) {
        let y_start = 10.0;

        let connection_color = if config.connected { GREEN } else { RED };
        draw_rectangle(10.0, y_start, 8.0, 8.0, connection_color);
        draw_text("CON", 20.0, y_start + 8.0, 12.0, WHITE);

        let joined_color = if config.own_entity_present {
            GREEN
        } else {
            Color::from_rgba(136, 136, 136, 255)
        };
        draw_rectangle(10.0, y_start + 15.0, 8.0, 8.0, joined_color);
        draw_text("IN ARENA", 20.0, y_start + 23.0, 12.0, WHITE);

        let paddle_text = format!("paddle {:+.2}", config.control_value);
        draw_text(&paddle_text, 10.0, y_start + 40.0, 12.0, WHITE);

        let player_text = format!("{} players", config.player_count);
        draw_text(&player_text, 10.0, y_start + 55.0, 12.0, WHITE);
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}
