//! Acquisition unit control: indicator LED and actuator.

use std::time::Duration;

use podoscan_core::{ActuatorDirection, Clinic, DeviceControl};

use crate::cli::{DeviceArgs, DeviceCommand, GlobalOpts, LedState, ServoDirection};
use crate::error::CliError;

use super::util;

/// Time left for the event loop to hand queued messages to the broker
/// before the process exits.
const FLUSH_GRACE: Duration = Duration::from_millis(300);

impl From<ServoDirection> for ActuatorDirection {
    fn from(direction: ServoDirection) -> Self {
        match direction {
            ServoDirection::Forward => Self::Forward,
            ServoDirection::Backward => Self::Backward,
        }
    }
}

pub async fn handle(clinic: &Clinic, args: DeviceArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let control = clinic.device_control();
    let link = control.publisher();

    let connected = link
        .wait_connected(Duration::from_secs(global.timeout))
        .await
        .map_err(podoscan_core::CoreError::from)?;
    if !connected {
        return Err(CliError::Device {
            message: format!("no answer from {} within {}s", link.config().url, global.timeout),
        });
    }

    let summary = match args.command {
        DeviceCommand::Led { state } => {
            let on = matches!(state, LedState::On);
            control.set_indicator(on);
            format!("Indicator {}", if on { "on" } else { "off" })
        }
        DeviceCommand::Servo { direction } => {
            let direction = ActuatorDirection::from(direction);
            control.move_actuator(direction);
            format!("Actuator moved ({direction})")
        }
    };

    tokio::time::sleep(FLUSH_GRACE).await;
    util::status(global, &format!("✓ {summary}"));
    Ok(())
}
