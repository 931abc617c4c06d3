// ── Device control ──
//
// Two fire-and-forget commands for the clinic's acquisition unit, published
// over MQTT. Failures are logged and never surfaced to the caller.

use std::sync::{Arc, OnceLock};

use podoscan_api::{MqttConfig, MqttLink};
use strum::{Display, EnumString};
use tracing::{debug, warn};

/// Indicator LED topic. Payload `"1"` (on) or `"0"` (off).
pub const LED_TOPIC: &str = "devices/esp/led";
/// Servo actuator topic. Payload is an [`ActuatorDirection`] token.
pub const SERVO_TOPIC: &str = "devices/esp/servo";

/// Direction token understood by the device firmware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
pub enum ActuatorDirection {
    #[strum(to_string = "adelante", serialize = "forward")]
    Forward,
    #[strum(to_string = "atras", serialize = "backward", serialize = "back")]
    Backward,
}

/// Raw message sink. Implemented by [`MqttLink`]; tests substitute a recorder.
pub trait Publisher: Send + Sync + 'static {
    fn publish(&self, topic: &str, payload: &str) -> Result<(), podoscan_api::Error>;
}

impl Publisher for MqttLink {
    fn publish(&self, topic: &str, payload: &str) -> Result<(), podoscan_api::Error> {
        MqttLink::publish(self, topic, payload)
    }
}

/// What a caller can ask of the device.
pub trait DeviceControl {
    fn set_indicator(&self, on: bool);
    fn move_actuator(&self, direction: ActuatorDirection);
}

/// Publishes device commands through a shared [`Publisher`].
pub struct DeviceController<P: Publisher = MqttLink> {
    publisher: Arc<P>,
}

impl<P: Publisher> Clone for DeviceController<P> {
    fn clone(&self) -> Self {
        Self {
            publisher: Arc::clone(&self.publisher),
        }
    }
}

impl<P: Publisher> DeviceController<P> {
    pub fn new(publisher: Arc<P>) -> Self {
        Self { publisher }
    }

    pub fn publisher(&self) -> &Arc<P> {
        &self.publisher
    }

    fn send(&self, topic: &str, payload: &str) {
        match self.publisher.publish(topic, payload) {
            Ok(()) => debug!(topic, payload, "device command sent"),
            Err(e) => warn!(topic, payload, error = %e, "device command not sent"),
        }
    }
}

impl<P: Publisher> DeviceControl for DeviceController<P> {
    fn set_indicator(&self, on: bool) {
        self.send(LED_TOPIC, if on { "1" } else { "0" });
    }

    fn move_actuator(&self, direction: ActuatorDirection) {
        self.send(SERVO_TOPIC, &direction.to_string());
    }
}

static SHARED_LINK: OnceLock<Arc<MqttLink>> = OnceLock::new();

/// Process-wide device controller.
///
/// The broker connection is created on the first call and reused for the
/// rest of the process; later calls ignore their `config`.
pub fn shared(config: &MqttConfig) -> DeviceController<MqttLink> {
    let link = SHARED_LINK.get_or_init(|| Arc::new(MqttLink::new(config.clone())));
    DeviceController::new(Arc::clone(link))
}
