//! Power fragments: source, charger, regulator, series elements, the power
//! path and the power LED.

use super::{not_configured, FragmentWriter, PartSpec, LED_FOOTPRINT};
use crate::config::BoardConfig;
use crate::core::SkimibowiError;
use crate::nets::{GND, SCL, SDA, VBATT, VBUS};
use crate::parts::{
    BATTERY, BATTERY_MANAGER, CHARGE_LED, CURRENT_MONITOR, FUSE, POWER_LED, POWER_SWITCH,
    REGULATOR, SHUNT,
};
use crate::power_path::{self, PowerPathElement, PowerPathFlags};

const FUSE_FOOTPRINT: &str = "Fuse:Fuse_1812_4532Metric";
const POWER_SWITCH_FOOTPRINT: &str = "Button_Switch_SMD:SW_SPDT_PCM12";
const CURRENT_MONITOR_FOOTPRINT: &str = "Package_SO:SOIC-8_3.9x4.9mm_P1.27mm";
const SHUNT_FOOTPRINT: &str = "Resistor_SMD:R_2512_6332Metric";

/// Battery, coin cell or battery connector between `+VBatt` and `GND`.
pub fn power_source(config: &BoardConfig, w: &mut FragmentWriter<'_>) -> Result<(), SkimibowiError> {
    let source = config
        .power_source
        .as_ref()
        .ok_or_else(|| not_configured(w, "power source"))?;
    let (positive, negative) = source.kind.terminals();

    w.part(
        BATTERY,
        PartSpec::new(source.kind.library(), source.kind.part(), &source.footprint),
    );
    w.tie(BATTERY, positive, VBATT);
    w.tie(BATTERY, negative, GND);
    Ok(())
}

/// Single-cell charger fed from the USB rail.
pub fn battery_manager(config: &BoardConfig, w: &mut FragmentWriter<'_>) -> Result<(), SkimibowiError> {
    let manager = config
        .battery_manager
        .ok_or_else(|| not_configured(w, "battery manager"))?;

    w.part(
        BATTERY_MANAGER,
        PartSpec::new(manager.library(), manager.part(), manager.footprint()),
    );
    w.tie(BATTERY_MANAGER, "VDD", VBUS);
    w.tie(BATTERY_MANAGER, "VBAT", VBATT);
    w.tie(BATTERY_MANAGER, "VSS", GND);

    let gnd = w.net(GND);
    let prog = w.resistor("2k");
    let pin = w.pin(BATTERY_MANAGER, "PROG");
    w.chain([gnd, prog, pin]);

    w.part(CHARGE_LED, PartSpec::new("Device", "LED", LED_FOOTPRINT));
    let stat = w.pin(BATTERY_MANAGER, "STAT");
    let limit = w.resistor("1k");
    let led = w.part_ref(CHARGE_LED);
    let bus = w.net(VBUS);
    w.chain([stat, limit, led, bus]);

    let battery = w.net(VBATT);
    let bulk = w.capacitor("10uF");
    let gnd = w.net(GND);
    w.chain([battery, bulk, gnd]);
    Ok(())
}

/// Linear regulator from the power path onto the selected output rail.
/// Its input is wired by the power path.
pub fn regulator(config: &BoardConfig, w: &mut FragmentWriter<'_>) -> Result<(), SkimibowiError> {
    let data = config
        .regulator
        .as_ref()
        .ok_or_else(|| not_configured(w, "regulator_data"))?;

    w.part(
        REGULATOR,
        PartSpec::new(&data.module, &data.part, &data.footprint).with_value(&data.part),
    );
    w.tie(REGULATOR, "VO", data.output.net_name());
    w.tie(REGULATOR, "GND", GND);

    if data.enable_pin {
        let enable = w.pin(REGULATOR, "EN");
        let pull_up = w.resistor("10k");
        let input = w.pin(REGULATOR, "VI");
        w.chain([enable, pull_up, input]);
    }

    for pin in ["VI", "VO"] {
        let gnd = w.net(GND);
        let cap = w.capacitor("10uF");
        let pin = w.pin(REGULATOR, pin);
        w.chain([gnd, cap, pin]);
    }
    Ok(())
}

pub fn fuse(_config: &BoardConfig, w: &mut FragmentWriter<'_>) -> Result<(), SkimibowiError> {
    w.part(FUSE, PartSpec::new("Device", "Fuse", FUSE_FOOTPRINT));
    Ok(())
}

pub fn power_switch(_config: &BoardConfig, w: &mut FragmentWriter<'_>) -> Result<(), SkimibowiError> {
    w.part(POWER_SWITCH, PartSpec::new("Switch", "SW_SPST", POWER_SWITCH_FOOTPRINT));
    Ok(())
}

/// INA219 on the I2C bus. The shunt itself is a power-path element.
pub fn current_monitor(config: &BoardConfig, w: &mut FragmentWriter<'_>) -> Result<(), SkimibowiError> {
    w.part(
        CURRENT_MONITOR,
        PartSpec::new("Analog_ADC", "INA219AxD", CURRENT_MONITOR_FOOTPRINT),
    );
    w.part(
        SHUNT,
        PartSpec::new("Device", "R", SHUNT_FOOTPRINT).with_value("0R1"),
    );

    let sense_pos = w.pin(CURRENT_MONITOR, "IN+");
    let shunt_hi = w.pin(SHUNT, "1");
    w.connect(sense_pos, shunt_hi);
    let sense_neg = w.pin(CURRENT_MONITOR, "IN-");
    let shunt_lo = w.pin(SHUNT, "2");
    w.connect(sense_neg, shunt_lo);

    w.tie(CURRENT_MONITOR, "VS", config.rail());
    w.tie(CURRENT_MONITOR, "GND", GND);
    w.tie(CURRENT_MONITOR, "SDA", SDA);
    w.tie(CURRENT_MONITOR, "SCL", SCL);
    // Address 0x40
    w.tie(CURRENT_MONITOR, "A0", GND);
    w.tie(CURRENT_MONITOR, "A1", GND);

    let gnd = w.net(GND);
    let decoupling = w.capacitor("100nF");
    let supply = w.pin(CURRENT_MONITOR, "VS");
    w.chain([gnd, decoupling, supply]);
    Ok(())
}

/// Single chained statement linking the engaged power-path elements.
pub fn power_path(config: &BoardConfig, w: &mut FragmentWriter<'_>) -> Result<(), SkimibowiError> {
    let chain = power_path::resolve(&PowerPathFlags::from_config(config))
        .ok_or_else(|| not_configured(w, "power path with two or more elements"))?;

    let expressions: Vec<String> = chain
        .elements()
        .iter()
        .map(|element| match element {
            PowerPathElement::RegulatorInput => w.pin(REGULATOR, "VI"),
            PowerPathElement::CurrentShunt => w.part_ref(SHUNT),
            PowerPathElement::PowerSwitch => w.part_ref(POWER_SWITCH),
            PowerPathElement::Fuse => w.part_ref(FUSE),
            PowerPathElement::Battery => w.net(VBATT),
            PowerPathElement::BusRail => w.net(VBUS),
        })
        .collect();
    w.chain(expressions);
    Ok(())
}

/// Supply rail through a current-limiting resistor and an LED to ground.
pub fn power_led(config: &BoardConfig, w: &mut FragmentWriter<'_>) -> Result<(), SkimibowiError> {
    w.part(POWER_LED, PartSpec::new("Device", "LED", LED_FOOTPRINT));
    let rail = w.net(config.rail());
    let limit = w.resistor("1k");
    let led = w.part_ref(POWER_LED);
    let gnd = w.net(GND);
    w.chain([rail, limit, led, gnd]);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Fragment;
    use crate::config::{validate, RawConfig};
    use crate::nets::NetNamespace;
    use crate::parts::PartRegistry;

    fn config(json: &str) -> BoardConfig {
        validate(&RawConfig::from_json(json).unwrap()).unwrap()
    }

    fn build(
        config: &BoardConfig,
        nets: &mut NetNamespace,
        parts: &PartRegistry,
        builder: super::super::Builder,
    ) -> Result<Fragment, SkimibowiError> {
        let mut w = FragmentWriter::new("test", nets, parts);
        builder(config, &mut w)?;
        w.finish()
    }

    #[test]
    fn test_power_path_statement() {
        let cfg = config(
            r#"{"mcu": "ESP-12E", "mcurail": "+3V3", "powersource": "Battery",
                "regulator": true, "fuse": true, "current_monitor": true,
                "regulator_data": {"module": "Regulator_Linear", "part": "AP2112K-3.3",
                                   "footprint": "Package_TO_SOT_SMD:SOT-23-5", "output": "+3V3"}}"#,
        );
        let mut nets = NetNamespace::new();
        nets.resolve(VBATT);
        let mut parts = PartRegistry::new();
        for name in [BATTERY, REGULATOR, FUSE, CURRENT_MONITOR, SHUNT] {
            parts.declare(name);
        }
        let fragment = build(&cfg, &mut nets, &parts, power_path).unwrap();
        assert_eq!(fragment.text, "\nREGULATOR['VI'] & SHUNT & FUSE & NETS['+VBatt']\n");
    }

    #[test]
    fn test_power_path_needs_declared_elements() {
        let cfg = config(r#"{"mcu": "ESP-12E", "mcurail": "+3V3", "powersource": "Battery", "fuse": true}"#);
        let mut nets = NetNamespace::new();
        let parts = PartRegistry::new();
        let err = build(&cfg, &mut nets, &parts, power_path).unwrap_err();
        assert!(matches!(err, SkimibowiError::InternalConsistency { .. }));
    }

    #[test]
    fn test_regulator_enable_pull_up() {
        let cfg = config(
            r#"{"mcu": "ESP-12E", "mcurail": "+3V3", "regulator": true,
                "regulator_data": {"module": "Regulator_Linear", "part": "AP2112K-3.3",
                                   "footprint": "Package_TO_SOT_SMD:SOT-23-5", "output": "+3V3",
                                   "enable_pin": true}}"#,
        );
        let mut nets = NetNamespace::new();
        let parts = PartRegistry::new();
        let fragment = build(&cfg, &mut nets, &parts, regulator).unwrap();
        assert!(fragment.text.contains("value='AP2112K-3.3'"));
        assert!(fragment.text.contains("REGULATOR['EN'] & R('10k') & REGULATOR['VI']"));
        assert!(fragment.text.contains("NETS['GND'] & C('10uF') & REGULATOR['VO']"));
    }

    #[test]
    fn test_regulator_without_record_is_internal_error() {
        let cfg = config(r#"{"mcu": "ESP-12E", "mcurail": "+3V3"}"#);
        let mut nets = NetNamespace::new();
        let parts = PartRegistry::new();
        assert!(build(&cfg, &mut nets, &parts, regulator).is_err());
    }

    #[test]
    fn test_jst_connector_uses_numbered_pins() {
        let cfg = config(r#"{"mcu": "ESP-12E", "mcurail": "+VBatt", "powersource": "JST PH connector"}"#);
        let mut nets = NetNamespace::new();
        let parts = PartRegistry::new();
        let fragment = build(&cfg, &mut nets, &parts, power_source).unwrap();
        assert!(fragment.text.contains("BATTERY[1] += NETS['+VBatt']"));
        assert!(fragment.text.contains("BATTERY[2] += NETS['GND']"));
    }

    #[test]
    fn test_battery_manager_charges_from_bus() {
        let cfg = config(
            r#"{"mcu": "ESP-12E", "mcurail": "+3V3", "powersource": "Battery", "battery_manager": "MCP73831"}"#,
        );
        let mut nets = NetNamespace::new();
        let parts = PartRegistry::new();
        let fragment = build(&cfg, &mut nets, &parts, battery_manager).unwrap();
        assert_eq!(fragment.declared_parts, vec![BATTERY_MANAGER, CHARGE_LED]);
        assert!(fragment
            .text
            .contains("BATTERYMANAGER['STAT'] & R('1k') & CHARGE_LED & NETS['+VBus']"));
    }

    #[test]
    fn test_power_led_on_rail() {
        let cfg = config(r#"{"mcu": "ESP-12E", "mcurail": "+3V3", "power_led": true}"#);
        let mut nets = NetNamespace::new();
        nets.resolve("+3V3");
        nets.resolve(GND);
        let parts = PartRegistry::new();
        let fragment = build(&cfg, &mut nets, &parts, power_led).unwrap();
        assert_eq!(
            fragment.text,
            "\nPOWER_LED = Part('Device', 'LED', footprint='LED_SMD:LED_1206_3216Metric')\n\
             NETS['+3V3'] & R('1k') & POWER_LED & NETS['GND']\n"
        );
    }
}
