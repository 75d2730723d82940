//! Session handshake and the single-timeline client that ties the core together

use crate::config::ClientConfig;
use crate::game::{RenderState, StateSynchronizer};
use crate::input::{InputSampler, KeyEvent, PaddleBindings};
use crate::network::{OutboundSink, TransportEvent};
use crate::projection::Projector;
use log::{debug, info, warn};
use pong_shared::{encode_join, Identity};
use std::hash::Hash;
use std::time::Instant;

/// Announces our identity once per transport connection. Fire-and-forget:
/// a dropped announcement is not retried.
#[derive(Debug)]
pub struct Handshake {
    identity: Identity,
    announced_on: Option<u64>,
}

impl Handshake {
    pub fn new(identity: Identity) -> Self {
        Self {
            identity,
            announced_on: None,
        }
    }

    /// Returns whether a join was attempted for this ready signal.
    pub fn on_ready<S: OutboundSink + ?Sized>(&mut self, connection: u64, sink: &mut S) -> bool {
        if self.announced_on == Some(connection) {
            debug!("Connection {} already announced", connection);
            return false;
        }
        self.announced_on = Some(connection);

        match encode_join(&self.identity) {
            Ok(payload) => match sink.send_raw(payload) {
                Ok(()) => info!("Joining as {}", self.identity),
                Err(e) => warn!("Join for {} was not sent: {}", self.identity, e),
            },
            Err(e) => warn!("Failed to encode join: {}", e),
        }

        true
    }
}

/// Owns every piece of client state. All methods run on the same loop, so
/// key handling, sampling ticks and inbound payloads never interleave.
pub struct GameClient<K, S> {
    sampler: InputSampler<K>,
    bindings: PaddleBindings<K>,
    handshake: Handshake,
    state: StateSynchronizer,
    sink: S,
    connected: bool,
}

impl<K: Eq + Hash + Copy, S: OutboundSink> GameClient<K, S> {
    pub fn new(identity: Identity, config: &ClientConfig, bindings: PaddleBindings<K>, sink: S) -> Self {
        let projector = Projector::new(config.display_radius, config.track);

        Self {
            sampler: InputSampler::new(config.sample_interval),
            bindings,
            handshake: Handshake::new(identity.clone()),
            state: StateSynchronizer::new(identity, projector),
            sink,
            connected: false,
        }
    }

    pub fn start(&mut self, now: Instant) {
        self.sampler.start(now);
    }

    pub fn stop(&mut self) {
        self.sampler.stop();
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn identity(&self) -> &Identity {
        self.state.identity()
    }

    pub fn control_value(&self) -> f32 {
        self.state.control_value()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn handle_transport_event(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::Ready { connection } => {
                self.sink.connection_opened(connection);
                self.connected = true;
                self.handshake.on_ready(connection, &mut self.sink);
            }
            TransportEvent::Payload(raw) => {
                self.state.receive_payload(&raw);
            }
            TransportEvent::Closed => {
                self.sink.connection_closed();
                self.connected = false;
            }
        }
    }

    pub fn handle_key(&mut self, event: KeyEvent<K>) {
        self.sampler.handle_key(event);
    }

    /// Runs the sampling tick if one is due. Returns the delta applied, if
    /// any; ticks whose keys cancel out send nothing.
    pub fn poll_tick(&mut self, now: Instant) -> Option<f32> {
        let period = self.sampler.period();
        let bindings = &self.bindings;
        let delta = self.sampler.poll(now, |held| bindings.delta(held, period))?;

        if delta == 0.0 {
            return None;
        }

        self.state.apply_local_delta(delta, &mut self.sink);
        Some(delta)
    }

    pub fn current_view(&self) -> RenderState {
        self.state.current_view()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::TransmissionFailure;
    use assert_approx_eq::assert_approx_eq;
    use pong_shared::{decode_client_message, ClientMessage};
    use std::time::Duration;

    #[derive(Default)]
    struct RecordingSink {
        connection: Option<u64>,
        sent: Vec<String>,
    }

    impl OutboundSink for RecordingSink {
        fn send_raw(&mut self, payload: String) -> Result<(), TransmissionFailure> {
            if self.connection.is_none() {
                return Err(TransmissionFailure::NotReady);
            }
            self.sent.push(payload);
            Ok(())
        }

        fn connection_opened(&mut self, connection: u64) {
            self.connection = Some(connection);
        }

        fn connection_closed(&mut self) {
            self.connection = None;
        }
    }

    fn client() -> GameClient<char, RecordingSink> {
        let bindings = PaddleBindings::symmetric(&['w'], &['s'], 10.0);
        GameClient::new(
            Identity::new("A"),
            &ClientConfig::default(),
            bindings,
            RecordingSink::default(),
        )
    }

    fn messages(client: &GameClient<char, RecordingSink>) -> Vec<ClientMessage> {
        client
            .sink()
            .sent
            .iter()
            .map(|payload| decode_client_message(payload).unwrap())
            .collect()
    }

    #[test]
    fn test_handshake_once_per_connection() {
        let mut sink = RecordingSink::default();
        sink.connection_opened(1);
        let mut handshake = Handshake::new(Identity::new("A"));

        assert!(handshake.on_ready(1, &mut sink));
        assert!(!handshake.on_ready(1, &mut sink));
        assert_eq!(sink.sent, vec![r#"{"Join":{"uuid":"A"}}"#.to_string()]);

        assert!(handshake.on_ready(2, &mut sink));
        assert_eq!(sink.sent.len(), 2);
    }

    #[test]
    fn test_dropped_join_is_not_retried() {
        let mut sink = RecordingSink::default();
        let mut handshake = Handshake::new(Identity::new("A"));

        assert!(handshake.on_ready(1, &mut sink));
        sink.connection_opened(1);
        assert!(!handshake.on_ready(1, &mut sink));
        assert!(sink.sent.is_empty());
    }

    #[test]
    fn test_join_precedes_paddle_updates() {
        let start = Instant::now();
        let mut client = client();
        client.start(start);
        client.handle_key(KeyEvent::Pressed('w'));

        // tick before the transport is ready: applied locally, nothing sent
        assert!(client.poll_tick(start + Duration::from_millis(100)).is_some());
        assert!(client.sink().sent.is_empty());

        client.handle_transport_event(TransportEvent::Ready { connection: 1 });
        client.poll_tick(start + Duration::from_millis(200));

        let sent = messages(&client);
        assert_eq!(sent.len(), 2);
        assert_eq!(
            sent[0],
            ClientMessage::Join {
                uuid: Identity::new("A")
            }
        );
        match sent[1] {
            ClientMessage::MovePaddle { paddle_position } => {
                assert_approx_eq!(paddle_position, 2.0)
            }
            ref other => panic!("Expected MovePaddle, got {:?}", other),
        }
    }

    #[test]
    fn test_one_message_per_nonzero_tick() {
        let start = Instant::now();
        let mut client = client();
        client.start(start);
        client.handle_transport_event(TransportEvent::Ready { connection: 1 });

        client.handle_key(KeyEvent::Pressed('w'));
        for step in 1..=3u32 {
            client.poll_tick(start + Duration::from_millis(100) * step);
        }

        client.handle_key(KeyEvent::Pressed('s'));
        assert_eq!(client.poll_tick(start + Duration::from_millis(400)), None);

        client.handle_key(KeyEvent::Released('w'));
        client.poll_tick(start + Duration::from_millis(500));

        let sent = messages(&client);
        // join + three increases + one decrease
        assert_eq!(sent.len(), 5);
        assert_approx_eq!(client.control_value(), 2.0, 1e-5);
    }

    #[test]
    fn test_closed_transport_drops_updates() {
        let start = Instant::now();
        let mut client = client();
        client.start(start);
        client.handle_transport_event(TransportEvent::Ready { connection: 1 });
        client.handle_transport_event(TransportEvent::Closed);
        assert!(!client.is_connected());

        client.handle_key(KeyEvent::Pressed('s'));
        client.poll_tick(start + Duration::from_millis(100));

        assert_eq!(client.sink().sent.len(), 1);
        assert_approx_eq!(client.control_value(), -1.0);
    }

    #[test]
    fn test_reconnect_announces_again() {
        let mut client = client();
        client.handle_transport_event(TransportEvent::Ready { connection: 1 });
        client.handle_transport_event(TransportEvent::Closed);
        client.handle_transport_event(TransportEvent::Ready { connection: 2 });

        let joins = messages(&client)
            .into_iter()
            .filter(|message| matches!(message, ClientMessage::Join { .. }))
            .count();
        assert_eq!(joins, 2);
    }

    #[test]
    fn test_payload_events_reach_view() {
        let mut client = client();
        let payload = r#"{"ball": {"x": 1.0, "y": 1.0}, "players": {"A": {"paddle_position": 0.0}, "B": {"paddle_position": 1.0}}}"#;
        client.handle_transport_event(TransportEvent::Payload(payload.to_string()));

        let view = client.current_view();
        assert_eq!(view.other_players.len(), 1);
        assert!(view.own_entity_present);
    }

    #[test]
    fn test_stopped_client_ignores_keys_and_ticks() {
        let start = Instant::now();
        let mut client = client();
        client.start(start);
        client.handle_transport_event(TransportEvent::Ready { connection: 1 });
        client.stop();

        client.handle_key(KeyEvent::Pressed('w'));
        assert_eq!(client.poll_tick(start + Duration::from_secs(1)), None);
        assert_eq!(client.control_value(), 0.0);
    }
}
