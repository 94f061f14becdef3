//! Board configuration model.
//!
//! The wizard hands over a loosely-typed option record ([`RawConfig`]).
//! [`validate`] turns it into a [`BoardConfig`] in which every option a
//! selected feature depends on is present and well-typed, applying the
//! documented defaults on the way. Nothing downstream of validation ever
//! looks at the raw record again.

pub mod compat;
pub mod options;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::mcu::McuProfile;
pub use compat::check_compatibility;
pub use options::*;

/// Default footprint bound to the `R()` helper of the generated program.
pub const DEFAULT_RESISTOR_FOOTPRINT: &str = "Resistor_SMD:R_1206_3216Metric";
/// Default footprint bound to the `C()` helper of the generated program.
pub const DEFAULT_CAPACITOR_FOOTPRINT: &str = "Capacitor_SMD:C_1206_3216Metric";

const NO_BATTERY: &str = "No battery";
const NONE: &str = "None";

/// Errors raised while validating a configuration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value {value:?} for {field} (expected one of: {expected})")]
    InvalidValue {
        field: String,
        value: String,
        expected: String,
    },

    #[error("Malformed field {field}: {reason}")]
    Malformed { field: String, reason: String },
}

impl ConfigError {
    /// Configuration key the error refers to, if any.
    pub fn field(&self) -> Option<&str> {
        match self {
            ConfigError::Parse(_) => None,
            ConfigError::MissingField(field) => Some(field.as_str()),
            ConfigError::InvalidValue { field, .. } | ConfigError::Malformed { field, .. } => {
                Some(field.as_str())
            }
        }
    }
}

/// Option record as collected by the wizard.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfig {
    pub mcu: Option<String>,
    pub mcu_footprint: Option<String>,
    pub mcurail: Option<String>,
    pub powersource: Option<String>,
    pub powersource_footprint: Option<String>,
    pub battery_manager: Option<String>,
    #[serde(default)]
    pub regulator: bool,
    pub regulator_data: Option<RawRegulator>,
    #[serde(default)]
    pub reset: bool,
    #[serde(default)]
    pub reset_button: bool,
    #[serde(default)]
    pub flash_button: bool,
    #[serde(default)]
    pub power_led: bool,
    #[serde(default)]
    pub ds18b20: bool,
    #[serde(default)]
    pub ds18b20u: bool,
    #[serde(default)]
    pub onewire_connector: bool,
    #[serde(default)]
    pub current_monitor: bool,
    #[serde(default)]
    pub icsp_header: bool,
    #[serde(default)]
    pub ftdi_header: bool,
    #[serde(default)]
    pub fuse: bool,
    #[serde(default)]
    pub power_switch: bool,
    #[serde(default)]
    pub lora: bool,
    pub usb_connector: Option<String>,
    pub usb_connector_footprint: Option<RawUsbConnector>,
    pub usb_serial: Option<String>,
    pub board: Option<String>,
    pub resistor_footprint: Option<String>,
    pub capacitor_footprint: Option<String>,
}

impl RawConfig {
    /// Parse a JSON option record.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))
    }
}

/// `regulator_data` record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawRegulator {
    pub module: Option<String>,
    pub part: Option<String>,
    pub footprint: Option<String>,
    pub output: Option<String>,
    #[serde(default)]
    pub enable_pin: bool,
}

/// `usb_connector_footprint` record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawUsbConnector {
    pub part: Option<String>,
    pub footprint: Option<String>,
}

/// Validated, normalized configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoardConfig {
    pub mcu: Microcontroller,
    pub mcu_footprint: String,
    pub mcu_rail: SupplyRail,
    pub power_source: Option<PowerSource>,
    pub battery_manager: Option<BatteryManager>,
    pub regulator: Option<RegulatorData>,
    pub toggles: Toggles,
    pub usb_connector: Option<UsbConnector>,
    pub usb_serial: Option<UsbSerialBridge>,
    pub board: Option<BoardFootprint>,
    pub passives: PassiveFootprints,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PowerSource {
    pub kind: PowerSourceKind,
    pub footprint: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegulatorData {
    pub module: String,
    pub part: String,
    pub footprint: String,
    pub output: SupplyRail,
    pub enable_pin: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UsbConnector {
    pub kind: UsbConnectorKind,
    pub part: String,
    pub footprint: String,
}

/// Footprints bound to the passive helpers of the generated program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PassiveFootprints {
    pub resistor: String,
    pub capacitor: String,
}

impl Default for PassiveFootprints {
    fn default() -> Self {
        Self {
            resistor: DEFAULT_RESISTOR_FOOTPRINT.to_string(),
            capacitor: DEFAULT_CAPACITOR_FOOTPRINT.to_string(),
        }
    }
}

/// Boolean feature toggles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Toggles {
    pub reset_line: bool,
    pub reset_button: bool,
    pub flash_button: bool,
    pub power_led: bool,
    pub ds18b20: bool,
    pub ds18b20u: bool,
    pub onewire_connector: bool,
    pub current_monitor: bool,
    pub icsp_header: bool,
    pub ftdi_header: bool,
    pub fuse: bool,
    pub power_switch: bool,
    pub lora: bool,
}

impl BoardConfig {
    /// Pin table of the selected microcontroller.
    pub fn profile(&self) -> &'static McuProfile {
        self.mcu.profile()
    }

    /// Net name of the microcontroller supply rail.
    pub fn rail(&self) -> &'static str {
        self.mcu_rail.net_name()
    }

    pub fn has_battery(&self) -> bool {
        self.power_source.is_some()
    }

    /// The two-wire bus is created for the current monitor and for board
    /// footprints, which break SDA/SCL out to their headers.
    pub fn needs_i2c_bus(&self) -> bool {
        self.toggles.current_monitor || self.board.is_some()
    }

    pub fn needs_onewire_bus(&self) -> bool {
        self.toggles.ds18b20 || self.toggles.ds18b20u || self.toggles.onewire_connector
    }
}

/// Validate a raw option record.
///
/// Fails on the first missing or malformed option; no partial
/// configuration is ever returned.
pub fn validate(raw: &RawConfig) -> Result<BoardConfig, ConfigError> {
    let mcu: Microcontroller =
        parse_as(Microcontroller::FIELD, required(&raw.mcu, Microcontroller::FIELD)?)?;
    let mcu_footprint = optional_text(&raw.mcu_footprint, "mcu_footprint")?
        .unwrap_or_else(|| mcu.profile().default_footprint.to_string());
    let mcu_rail: SupplyRail =
        parse_as(SupplyRail::FIELD, required(&raw.mcurail, SupplyRail::FIELD)?)?;

    let power_kind =
        selection::<PowerSourceKind>(&raw.powersource, PowerSourceKind::FIELD, NO_BATTERY)?;
    let power_source = match power_kind {
        Some(kind) => Some(PowerSource {
            kind,
            footprint: optional_text(&raw.powersource_footprint, "powersource_footprint")?
                .unwrap_or_else(|| kind.default_footprint().to_string()),
        }),
        None => None,
    };

    let battery_manager =
        selection::<BatteryManager>(&raw.battery_manager, BatteryManager::FIELD, NONE)?;

    let regulator = if raw.regulator {
        let data = raw
            .regulator_data
            .as_ref()
            .ok_or_else(|| ConfigError::MissingField("regulator_data".to_string()))?;
        Some(validate_regulator(data)?)
    } else {
        if raw.regulator_data.is_some() {
            tracing::warn!("regulator_data given but regulator is not selected; ignoring it");
        }
        None
    };

    let usb_serial = selection::<UsbSerialBridge>(&raw.usb_serial, UsbSerialBridge::FIELD, NONE)?;
    let mut usb_kind =
        selection::<UsbConnectorKind>(&raw.usb_connector, UsbConnectorKind::FIELD, NONE)?;
    if usb_kind.is_none() && usb_serial.is_some() {
        tracing::warn!(
            "usb_serial selected without usb_connector; defaulting to {}",
            UsbConnectorKind::MicroB
        );
        usb_kind = Some(UsbConnectorKind::MicroB);
    }
    let usb_connector = match usb_kind {
        Some(kind) => Some(validate_usb_connector(kind, raw.usb_connector_footprint.as_ref())?),
        None => {
            if raw.usb_connector_footprint.is_some() {
                tracing::warn!("usb_connector_footprint given without a USB connector; ignoring it");
            }
            None
        }
    };

    let board = selection::<BoardFootprint>(&raw.board, BoardFootprint::FIELD, NONE)?;

    let passives = PassiveFootprints {
        resistor: optional_text(&raw.resistor_footprint, "resistor_footprint")?
            .unwrap_or_else(|| DEFAULT_RESISTOR_FOOTPRINT.to_string()),
        capacitor: optional_text(&raw.capacitor_footprint, "capacitor_footprint")?
            .unwrap_or_else(|| DEFAULT_CAPACITOR_FOOTPRINT.to_string()),
    };

    // The reset button and the bridge's auto-reset circuit both hang off the
    // reset net, so either one pulls in the reset line.
    let toggles = Toggles {
        reset_line: raw.reset || raw.reset_button || usb_serial.is_some(),
        reset_button: raw.reset_button,
        flash_button: raw.flash_button,
        power_led: raw.power_led,
        ds18b20: raw.ds18b20,
        ds18b20u: raw.ds18b20u,
        onewire_connector: raw.onewire_connector,
        current_monitor: raw.current_monitor,
        icsp_header: raw.icsp_header,
        ftdi_header: raw.ftdi_header,
        fuse: raw.fuse,
        power_switch: raw.power_switch,
        lora: raw.lora,
    };

    Ok(BoardConfig {
        mcu,
        mcu_footprint,
        mcu_rail,
        power_source,
        battery_manager,
        regulator,
        toggles,
        usb_connector,
        usb_serial,
        board,
        passives,
    })
}

fn validate_regulator(data: &RawRegulator) -> Result<RegulatorData, ConfigError> {
    Ok(RegulatorData {
        module: required(&data.module, "regulator_data.module")?.to_string(),
        part: required(&data.part, "regulator_data.part")?.to_string(),
        footprint: required(&data.footprint, "regulator_data.footprint")?.to_string(),
        output: parse_as("regulator_data.output", required(&data.output, "regulator_data.output")?)?,
        enable_pin: data.enable_pin,
    })
}

fn validate_usb_connector(
    kind: UsbConnectorKind,
    record: Option<&RawUsbConnector>,
) -> Result<UsbConnector, ConfigError> {
    match record {
        Some(record) => Ok(UsbConnector {
            kind,
            part: required(&record.part, "usb_connector_footprint.part")?.to_string(),
            footprint: required(&record.footprint, "usb_connector_footprint.footprint")?
                .to_string(),
        }),
        None => Ok(UsbConnector {
            kind,
            part: kind.default_part().to_string(),
            footprint: kind.default_footprint().to_string(),
        }),
    }
}

fn required<'a>(value: &'a Option<String>, field: &str) -> Result<&'a str, ConfigError> {
    match value.as_deref() {
        None => Err(ConfigError::MissingField(field.to_string())),
        Some(text) => non_empty(text, field),
    }
}

fn optional_text(value: &Option<String>, field: &str) -> Result<Option<String>, ConfigError> {
    value
        .as_deref()
        .map(|text| non_empty(text, field).map(str::to_string))
        .transpose()
}

fn non_empty<'a>(text: &'a str, field: &str) -> Result<&'a str, ConfigError> {
    if text.trim().is_empty() {
        Err(ConfigError::Malformed {
            field: field.to_string(),
            reason: "must not be empty".to_string(),
        })
    } else {
        Ok(text)
    }
}

/// Optional enum selection where `none_text` (or an absent key) means "not selected".
fn selection<T>(value: &Option<String>, field: &str, none_text: &str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr<Err = ConfigError>,
{
    match value.as_deref() {
        None => Ok(None),
        Some(text) if text == none_text => Ok(None),
        Some(text) => parse_as(field, text).map(Some),
    }
}

/// Parse an enum value, reporting errors against `field`.
fn parse_as<T>(field: &str, text: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr<Err = ConfigError>,
{
    text.parse::<T>().map_err(|e| match e {
        ConfigError::InvalidValue { value, expected, .. } => ConfigError::InvalidValue {
            field: field.to_string(),
            value,
            expected,
        },
        other => other,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn esp12e() -> RawConfig {
        RawConfig {
            mcu: Some("ESP-12E".to_string()),
            mcurail: Some("+3V3".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults_applied() {
        let config = validate(&esp12e()).expect("minimal config should validate");
        assert_eq!(config.mcu_footprint, "RF_Module:ESP-12E");
        assert_eq!(config.passives, PassiveFootprints::default());
        assert!(config.power_source.is_none());
        assert!(config.regulator.is_none());
        assert_eq!(config.toggles, Toggles::default());
    }

    #[test]
    fn test_missing_mcu() {
        let raw = RawConfig {
            mcurail: Some("+3V3".to_string()),
            ..Default::default()
        };
        assert_eq!(validate(&raw), Err(ConfigError::MissingField("mcu".to_string())));
    }

    #[test]
    fn test_empty_footprint_is_malformed() {
        let raw = RawConfig {
            mcu_footprint: Some("  ".to_string()),
            ..esp12e()
        };
        let err = validate(&raw).unwrap_err();
        assert_eq!(err.field(), Some("mcu_footprint"));
    }

    #[test]
    fn test_regulator_requires_record() {
        let raw = RawConfig {
            regulator: true,
            ..esp12e()
        };
        assert_eq!(
            validate(&raw),
            Err(ConfigError::MissingField("regulator_data".to_string()))
        );
    }

    #[test]
    fn test_incomplete_regulator_record() {
        let raw = RawConfig {
            regulator: true,
            regulator_data: Some(RawRegulator {
                module: Some("Regulator_Linear".to_string()),
                part: Some("AP2112K-3.3".to_string()),
                footprint: None,
                output: Some("+3V3".to_string()),
                enable_pin: true,
            }),
            ..esp12e()
        };
        assert_eq!(
            validate(&raw),
            Err(ConfigError::MissingField("regulator_data.footprint".to_string()))
        );
    }

    #[test]
    fn test_regulator_output_field_in_error() {
        let raw = RawConfig {
            regulator: true,
            regulator_data: Some(RawRegulator {
                module: Some("Regulator_Linear".to_string()),
                part: Some("AP2112K-3.3".to_string()),
                footprint: Some("Package_TO_SOT_SMD:SOT-23-5".to_string()),
                output: Some("+12V".to_string()),
                enable_pin: false,
            }),
            ..esp12e()
        };
        let err = validate(&raw).unwrap_err();
        assert_eq!(err.field(), Some("regulator_data.output"));
    }

    #[test]
    fn test_none_selections() {
        let raw = RawConfig {
            powersource: Some("No battery".to_string()),
            battery_manager: Some("None".to_string()),
            usb_connector: Some("None".to_string()),
            usb_serial: Some("None".to_string()),
            board: Some("None".to_string()),
            ..esp12e()
        };
        let config = validate(&raw).unwrap();
        assert!(config.power_source.is_none());
        assert!(config.battery_manager.is_none());
        assert!(config.usb_connector.is_none());
        assert!(config.usb_serial.is_none());
        assert!(config.board.is_none());
    }

    #[test]
    fn test_bridge_implies_connector_and_reset_line() {
        let raw = RawConfig {
            usb_serial: Some("CP2104".to_string()),
            ..esp12e()
        };
        let config = validate(&raw).unwrap();
        let connector = config.usb_connector.expect("connector should be defaulted");
        assert_eq!(connector.kind, UsbConnectorKind::MicroB);
        assert_eq!(connector.part, "USB_B_Micro");
        assert!(config.toggles.reset_line);
    }

    #[test]
    fn test_reset_button_implies_reset_line() {
        let raw = RawConfig {
            reset_button: true,
            ..esp12e()
        };
        assert!(validate(&raw).unwrap().toggles.reset_line);
    }

    #[test]
    fn test_incomplete_usb_record() {
        let raw = RawConfig {
            usb_connector: Some("USB Mini-B".to_string()),
            usb_connector_footprint: Some(RawUsbConnector {
                part: Some("USB_B_Mini".to_string()),
                footprint: None,
            }),
            ..esp12e()
        };
        assert_eq!(
            validate(&raw),
            Err(ConfigError::MissingField("usb_connector_footprint.footprint".to_string()))
        );
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = RawConfig::from_json(r#"{"mcu": "ESP-12E", "mcurail": "+3V3", "wifi": true}"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Parse(ref msg) if msg.contains("wifi")));
    }

    #[test]
    fn test_json_roundtrip_of_toggles() {
        let raw = RawConfig::from_json(
            r#"{"mcu": "ATmega328P-AU", "mcurail": "+5V", "icsp_header": true, "fuse": true}"#,
        )
        .unwrap();
        let config = validate(&raw).unwrap();
        assert!(config.toggles.icsp_header);
        assert!(config.toggles.fuse);
        assert!(!config.toggles.lora);
    }
}
