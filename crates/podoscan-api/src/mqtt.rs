//! Publish-only MQTT link to the clinic's sensing device.
//!
//! The broker connection is created on first use and then kept for the
//! lifetime of the link. A background task drives the `rumqttc` event loop,
//! logs connect / reconnect / error transitions, and retries after a fixed
//! reconnect period. Publishes are fire-and-forget (QoS 0, not retained).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use rumqttc::{AsyncClient, ConnectionError, Event, EventLoop, MqttOptions, Packet, QoS, Transport};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::Error;

const DEFAULT_BROKER_URL: &str = "ws://localhost:9001";
const DEFAULT_REQUEST_CAPACITY: usize = 32;
const CONNECT_POLL: Duration = Duration::from_millis(50);

// ── MqttConfig ───────────────────────────────────────────────────────

/// Broker connection settings.
#[derive(Debug, Clone)]
pub struct MqttConfig {
    /// `ws://`, `wss://`, `mqtt://` (or `tcp://`) and `mqtts://` are accepted.
    pub url: String,
    pub client_id: String,
    pub keep_alive: Duration,
    /// Pause between a connection error and the next attempt.
    pub reconnect_period: Duration,
    /// Outgoing request queue depth.
    pub capacity: usize,
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_BROKER_URL.to_owned(),
            client_id: random_client_id(),
            keep_alive: Duration::from_secs(30),
            reconnect_period: Duration::from_secs(2),
            capacity: DEFAULT_REQUEST_CAPACITY,
        }
    }
}

fn random_client_id() -> String {
    let suffix: String = uuid::Uuid::new_v4().simple().to_string().chars().take(8).collect();
    format!("podoscan-{suffix}")
}

impl MqttConfig {
    /// Translate the broker URL into `rumqttc` options.
    pub fn options(&self) -> Result<MqttOptions, Error> {
        let url = Url::parse(&self.url)?;
        let host = url
            .host_str()
            .ok_or_else(|| Error::Mqtt(format!("broker URL has no host: {}", self.url)))?
            .to_owned();

        let mut options = match url.scheme() {
            "ws" | "wss" => {
                let port = url.port_or_known_default().unwrap_or(80);
                // rumqttc dials the full URL for websocket transports.
                let mut opts = MqttOptions::new(&self.client_id, self.url.as_str(), port);
                if url.scheme() == "wss" {
                    opts.set_transport(Transport::wss_with_default_config());
                } else {
                    opts.set_transport(Transport::Ws);
                }
                opts
            }
            "mqtt" | "tcp" => MqttOptions::new(&self.client_id, host, url.port().unwrap_or(1883)),
            "mqtts" | "ssl" => {
                let mut opts = MqttOptions::new(&self.client_id, host, url.port().unwrap_or(8883));
                opts.set_transport(Transport::tls_with_default_config());
                opts
            }
            other => {
                return Err(Error::Mqtt(format!("unsupported broker scheme: {other}")));
            }
        };

        options.set_keep_alive(self.keep_alive);
        options.set_clean_session(true);
        Ok(options)
    }
}

// ── MqttLink ─────────────────────────────────────────────────────────

/// Lazily connected MQTT publisher.
///
/// Cheap to share behind an `Arc`; every publish reuses the same client
/// while its event loop task is alive. A task lost with its runtime is
/// replaced on the next use.
pub struct MqttLink {
    config: MqttConfig,
    driver: Mutex<Option<Driver>>,
    connected: Arc<AtomicBool>,
    cancel: CancellationToken,
}

impl MqttLink {
    pub fn new(config: MqttConfig) -> Self {
        Self {
            config,
            driver: Mutex::new(None),
            connected: Arc::new(AtomicBool::new(false)),
            cancel: CancellationToken::new(),
        }
    }

    pub fn config(&self) -> &MqttConfig {
        &self.config
    }

    /// Whether the broker has acknowledged the current connection.
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    /// Establish the connection without publishing anything.
    pub fn warm_up(&self) -> Result<(), Error> {
        self.client().map(|_| ())
    }

    /// Open the connection if needed and wait up to `timeout` for the
    /// broker's acknowledgement.
    pub async fn wait_connected(&self, timeout: Duration) -> Result<bool, Error> {
        self.warm_up()?;
        let deadline = tokio::time::Instant::now() + timeout;
        while !self.is_connected() {
            if tokio::time::Instant::now() >= deadline {
                return Ok(false);
            }
            tokio::time::sleep(CONNECT_POLL).await;
        }
        Ok(true)
    }

    /// Queue one message. Returns once the request is enqueued; delivery is
    /// not confirmed.
    pub fn publish(&self, topic: &str, payload: &str) -> Result<(), Error> {
        let client = self.client()?;
        debug!(topic, payload, "publishing");
        client
            .try_publish(topic, QoS::AtMostOnce, false, payload.as_bytes().to_vec())
            .map_err(|e| Error::Mqtt(e.to_string()))
    }

    /// Stop the background event loop. Not needed for normal operation.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    fn client(&self) -> Result<AsyncClient, Error> {
        if self.cancel.is_cancelled() {
            return Err(Error::Mqtt("MQTT link has been shut down".into()));
        }

        let mut slot = self.driver.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(driver) = slot.as_ref() {
            if !driver.task.is_finished() {
                return Ok(driver.client.clone());
            }
            warn!(url = %self.config.url, "MQTT event loop is gone, reopening the connection");
            self.connected.store(false, Ordering::Release);
        }

        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|_| Error::Mqtt("no tokio runtime to drive the MQTT connection".into()))?;
        let options = self.config.options()?;
        let (client, eventloop) = AsyncClient::new(options, self.config.capacity);

        info!(url = %self.config.url, client_id = %self.config.client_id, "opening MQTT connection");
        let task = runtime.spawn(drive(
            eventloop,
            Arc::clone(&self.connected),
            self.config.reconnect_period,
            self.cancel.clone(),
        ));

        *slot = Some(Driver {
            client: client.clone(),
            task,
        });
        Ok(client)
    }
}

/// Client handle paired with the task polling its event loop.
struct Driver {
    client: AsyncClient,
    task: JoinHandle<()>,
}

impl Drop for MqttLink {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

// ── Background event loop ────────────────────────────────────────────

async fn drive(
    mut eventloop: EventLoop,
    connected: Arc<AtomicBool>,
    reconnect_period: Duration,
    cancel: CancellationToken,
) {
    let mut ever_connected = false;

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            event = eventloop.poll() => match event {
                Ok(Event::Incoming(Packet::ConnAck(ack))) => {
                    connected.store(true, Ordering::Release);
                    if ever_connected {
                        info!(code = ?ack.code, "MQTT reconnected");
                    } else {
                        info!(code = ?ack.code, "MQTT connected");
                    }
                    ever_connected = true;
                }
                Ok(_) => {}
                Err(ConnectionError::RequestsDone) => {
                    debug!("MQTT client dropped, stopping event loop");
                    break;
                }
                Err(e) => {
                    let was_connected = connected.swap(false, Ordering::AcqRel);
                    if was_connected {
                        warn!(error = %e, "MQTT connection lost, reconnecting");
                    } else {
                        warn!(error = %e, "MQTT connection error");
                    }

                    tokio::select! {
                        biased;
                        () = cancel.cancelled() => break,
                        () = tokio::time::sleep(reconnect_period) => {}
                    }
                }
            }
        }
    }

    connected.store(false, Ordering::Release);
}
