//! # Arena Pong Client Library
//!
//! This library is the client side of a multiplayer paddle game played inside a
//! circular arena. The server owns every rule: ball physics, collisions,
//! scoring and admission. The client samples the keyboard, keeps this player's
//! paddle position, relays it to the server, and turns the world snapshots the
//! server pushes back into numbers a renderer can draw.
//!
//! ## Architecture Overview
//!
//! ### Self-Authoritative Paddle
//! The local paddle position (the control value) is changed only by local
//! input. It is updated immediately and transmitted, and no snapshot from the
//! server ever overwrites it, even though snapshots carry this player's entry
//! for the benefit of everyone else.
//!
//! ### Snapshot Replacement
//! Every valid snapshot replaces the previous one wholesale. Snapshots that
//! fail to decode are logged and dropped; the last good snapshot stays on
//! screen. There is no interpolation between snapshots.
//!
//! ### Fixed-Scale Projection
//! Arena size is chosen by the server per session. Positions are scaled by
//! `display_radius / arena_radius` on every read so the arena always has the
//! same on-screen size.
//!
//! ## Module Organization
//!
//! ### Input Module (`input`)
//! - Held-key tracking from raw press/release events
//! - Fixed-period sampling tick, independent of the event rate
//! - Key bindings that reduce the held set to a paddle delta
//!
//! ### Game Module (`game`)
//! - Control value and latest snapshot kept as separate fields
//! - Optimistic local updates forwarded to the outbound sink
//! - Merged `RenderState` computed on demand
//!
//! ### Projection Module (`projection`)
//! - Arena-unit to display-unit scaling with a safe fallback
//! - Arc placement of a paddle from its track position
//! - Cartesian placement from server-echoed paddle geometry
//!
//! ### Session Module (`session`)
//! - One join announcement per transport connection
//! - `GameClient`, the single-timeline owner of all client state
//!
//! ### Network Module (`network`)
//! - `OutboundSink` seam between the core and the transport
//! - WebSocket transport task with reconnect and backoff
//!
//! ### Rendering Module (`rendering`)
//! - macroquad drawing of the arena, paddles, ball and a small HUD
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use pong_client::config::ClientConfig;
//! use pong_client::input::{KeyEvent, PaddleBindings};
//! use pong_client::network::{ChannelSink, TransportEvent};
//! use pong_client::session::GameClient;
//! use pong_shared::Identity;
//! use std::time::Instant;
//! use tokio::sync::mpsc;
//!
//! let config = ClientConfig::default();
//! let (outbound_tx, _outbound_rx) = mpsc::unbounded_channel();
//! let bindings = PaddleBindings::symmetric(&['w'], &['s'], config.paddle_speed);
//! let mut client = GameClient::new(
//!     Identity::new("player-1"),
//!     &config,
//!     bindings,
//!     ChannelSink::new(outbound_tx),
//! );
//!
//! client.start(Instant::now());
//! client.handle_transport_event(TransportEvent::Ready { connection: 1 });
//! client.handle_key(KeyEvent::Pressed('w'));
//!
//! loop {
//!     client.poll_tick(Instant::now());
//!     let view = client.current_view();
//!     // draw `view`
//! #   break;
//! }
//! ```

pub mod config;
pub mod game;
pub mod input;
pub mod network;
pub mod projection;
pub mod rendering;
pub mod session;
