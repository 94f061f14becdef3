//! Cross-feature compatibility checks.
//!
//! Run once on a validated configuration, before the composition engine
//! emits anything.

use crate::config::{BoardConfig, BoardFootprint};
use crate::core::SkimibowiError;
use crate::mcu::McuFamily;

/// Reject feature selections the chosen hardware cannot support.
pub fn check_compatibility(config: &BoardConfig) -> Result<(), SkimibowiError> {
    let profile = config.profile();

    if config.toggles.icsp_header && profile.icsp.is_none() {
        return Err(unsupported(
            "icsp_header",
            format!("{} does not expose in-circuit serial programming pins", config.mcu),
        ));
    }

    if config.toggles.flash_button && profile.boot_pin.is_none() {
        return Err(unsupported(
            "flash_button",
            format!("{} has no boot-mode strap pin", config.mcu),
        ));
    }

    if config.toggles.lora && profile.spi.is_none() {
        return Err(unsupported(
            "lora",
            format!("{} has no SPI pins for the radio", config.mcu),
        ));
    }

    if config.battery_manager.is_some() && !config.has_battery() {
        return Err(unsupported(
            "battery_manager",
            "a charge manager needs a battery power source".to_string(),
        ));
    }

    if config.board == Some(BoardFootprint::ArduinoNano) && profile.family != McuFamily::Avr {
        return Err(unsupported(
            "board",
            format!("{} only carries an AVR microcontroller, not {}", BoardFootprint::ArduinoNano, config.mcu),
        ));
    }

    Ok(())
}

fn unsupported(feature: &str, reason: String) -> SkimibowiError {
    tracing::debug!("Rejecting {}: {}", feature, reason);
    SkimibowiError::UnsupportedCombination {
        feature: feature.to_string(),
        reason,
    }
}
