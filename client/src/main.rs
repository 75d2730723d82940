use clap::Parser;
use log::{error, info};
use macroquad::prelude::*;
use pong_client::config::{ClientConfig, ReconnectPolicy};
use pong_client::input::{KeyEvent, PaddleBindings};
use pong_client::network::{ChannelSink, Transport};
use pong_client::projection::ArcTrack;
use pong_client::rendering::Renderer;
use pong_client::session::GameClient;
use pong_shared::Identity;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// WebSocket URL of the game server
    #[arg(short = 's', long, default_value = pong_client::config::DEFAULT_SERVER_URL)]
    server: String,

    /// Input sampling period in milliseconds
    #[arg(short = 'i', long, default_value = "100")]
    interval_ms: u64,

    /// Arena radius on screen, in pixels
    #[arg(short = 'r', long, default_value = "150")]
    display_radius: f32,

    /// Paddle speed in track units per second
    #[arg(short = 'p', long, default_value = "10", allow_negative_numbers = true)]
    paddle_speed: f32,

    /// First reconnect delay in milliseconds
    #[arg(long, default_value = "250")]
    reconnect_initial_ms: u64,

    /// Longest reconnect delay in milliseconds
    #[arg(long, default_value = "5000")]
    reconnect_max_ms: u64,
}

impl Args {
    fn into_config(self) -> ClientConfig {
        ClientConfig {
            server_url: self.server,
            sample_interval: Duration::from_millis(self.interval_ms),
            paddle_speed: self.paddle_speed,
            display_radius: self.display_radius,
            track: ArcTrack::default(),
            reconnect: ReconnectPolicy {
                initial: Duration::from_millis(self.reconnect_initial_ms),
                max: Duration::from_millis(self.reconnect_max_ms),
            },
        }
    }
}

fn window_conf() -> Conf {
    Conf {
        window_title: "Arena Pong".to_string(),
        window_width: 800,
        window_height: 600,
        ..Default::default()
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let config = Args::parse().into_config();
    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        return;
    }

    let identity = Identity::new(Uuid::new_v4().to_string());
    info!("Connecting to: {}", config.server_url);
    info!("Controls: W/Up and S/Down move the paddle, Esc quits");

    let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
    let (event_tx, mut event_rx) = mpsc::unbounded_channel();

    let transport = Transport::new(
        config.server_url.clone(),
        config.reconnect,
        outbound_rx,
        event_tx,
    );
    std::thread::spawn(move || match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime.block_on(transport.run()),
        Err(e) => error!("Failed to start network runtime: {}", e),
    });

    let bindings = PaddleBindings::symmetric(
        &[KeyCode::W, KeyCode::Up],
        &[KeyCode::S, KeyCode::Down],
        config.paddle_speed,
    );
    let mut client = GameClient::new(identity, &config, bindings, ChannelSink::new(outbound_tx));
    let mut renderer = Renderer::new();

    info!("Starting client {}", client.identity());
    client.start(Instant::now());

    loop {
        while let Ok(event) = event_rx.try_recv() {
            client.handle_transport_event(event);
        }

        for key in get_keys_pressed() {
            client.handle_key(KeyEvent::Pressed(key));
        }
        for key in get_keys_released() {
            client.handle_key(KeyEvent::Released(key));
        }

        client.poll_tick(Instant::now());

        renderer.render(&client.current_view(), client.is_connected());

        if is_key_pressed(KeyCode::Escape) {
            break;
        }

        next_frame().await;
    }

    client.stop();
    info!("Client stopped");
}
