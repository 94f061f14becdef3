//! Reset, programming and communication interfaces.

use super::{not_configured, FragmentWriter, PartSpec, PUSH_BUTTON_FOOTPRINT};
use crate::config::{BoardConfig, UsbSerialBridge};
use crate::core::SkimibowiError;
use crate::mcu::McuFamily;
use crate::nets::{DTR, GND, RST, RTS, RX, TX, USB_DM, USB_DP, VBUS};
use crate::parts::{
    AUTORESET_Q1, AUTORESET_Q2, FLASH_BUTTON, FTDI_HEADER, ICSP_HEADER, LORA, MCU, RESET_BUTTON,
    USB_CONN, USB_UART,
};

const TRANSISTOR_FOOTPRINT: &str = "Package_TO_SOT_SMD:SOT-23";
const HEADER_1X06_FOOTPRINT: &str = "Connector_PinHeader_2.54mm:PinHeader_1x06_P2.54mm_Vertical";
const HEADER_2X03_FOOTPRINT: &str = "Connector_PinHeader_2.54mm:PinHeader_2x03_P2.54mm_Vertical";

/// Joins the family's reset pins onto the `RST` net.
pub fn reset_line(config: &BoardConfig, w: &mut FragmentWriter<'_>) -> Result<(), SkimibowiError> {
    let profile = config.profile();
    for pin in profile.reset_pins {
        w.tie(MCU, pin, RST);
    }
    if profile.reset_pull_up {
        let rst = w.net(RST);
        let pull_up = w.resistor("10k");
        let rail = w.net(config.rail());
        w.chain([rst, pull_up, rail]);
    }
    Ok(())
}

pub fn reset_button(_config: &BoardConfig, w: &mut FragmentWriter<'_>) -> Result<(), SkimibowiError> {
    w.part(RESET_BUTTON, PartSpec::new("Switch", "SW_Push", PUSH_BUTTON_FOOTPRINT));
    w.tie(RESET_BUTTON, "1", RST);
    w.tie(RESET_BUTTON, "2", GND);
    Ok(())
}

/// Pulls the boot pin low to enter the serial bootloader.
pub fn flash_button(config: &BoardConfig, w: &mut FragmentWriter<'_>) -> Result<(), SkimibowiError> {
    let boot = config
        .profile()
        .boot_pin
        .ok_or_else(|| not_configured(w, "boot pin"))?;
    w.part(FLASH_BUTTON, PartSpec::new("Switch", "SW_Push", PUSH_BUTTON_FOOTPRINT));
    let switch = w.pin(FLASH_BUTTON, "1");
    let pin = w.pin(MCU, boot);
    w.connect(switch, pin);
    w.tie(FLASH_BUTTON, "2", GND);
    Ok(())
}

pub fn usb_connector(config: &BoardConfig, w: &mut FragmentWriter<'_>) -> Result<(), SkimibowiError> {
    let connector = config
        .usb_connector
        .as_ref()
        .ok_or_else(|| not_configured(w, "USB connector"))?;
    w.part(USB_CONN, PartSpec::new("Connector", &connector.part, &connector.footprint));
    w.tie(USB_CONN, "VBUS", VBUS);
    w.tie(USB_CONN, "GND", GND);
    w.tie(USB_CONN, "D-", USB_DM);
    w.tie(USB_CONN, "D+", USB_DP);
    Ok(())
}

/// USB to UART bridge between the connector data lines and the
/// microcontroller's serial nets.
pub fn usb_serial(config: &BoardConfig, w: &mut FragmentWriter<'_>) -> Result<(), SkimibowiError> {
    let bridge = config
        .usb_serial
        .ok_or_else(|| not_configured(w, "USB serial bridge"))?;
    let rail = config.rail();

    w.part(USB_UART, PartSpec::new("Interface_USB", bridge.part(), bridge.footprint()));
    match bridge {
        UsbSerialBridge::Ft231xs => {
            w.tie(USB_UART, "VCC", VBUS);
            w.tie(USB_UART, "VCCIO", rail);
            w.tie(USB_UART, "GND", GND);
            w.tie(USB_UART, "TXD", RX);
            w.tie(USB_UART, "RXD", TX);
            w.tie(USB_UART, "USBDM", USB_DM);
            w.tie(USB_UART, "USBDP", USB_DP);
            w.tie(USB_UART, "DTR", DTR);
            w.tie(USB_UART, "RTS", RTS);

            let gnd = w.net(GND);
            let cap = w.capacitor("100nF");
            let out = w.pin(USB_UART, "3V3OUT");
            w.chain([gnd, cap, out]);
        }
        UsbSerialBridge::Cp2104 => {
            for pin in ["VIO", "VDD", "REGIN"] {
                w.tie(USB_UART, pin, rail);
            }
            let gnd = w.net(GND);
            let cap = w.capacitor("10uF");
            let vdd = w.pin(USB_UART, "VDD");
            w.chain([gnd, cap, vdd]);

            w.tie(USB_UART, "GND", GND);
            w.tie(USB_UART, "VBUS", VBUS);
            w.tie(USB_UART, "D+", USB_DP);
            w.tie(USB_UART, "D-", USB_DM);
            series(w, USB_UART, "TXD", "470", RX);
            series(w, USB_UART, "RXD", "470", TX);
            w.tie(USB_UART, "DTR", DTR);
            w.tie(USB_UART, "RTS", RTS);

            // OTP programming supply
            let vpp = w.pin(USB_UART, "VPP");
            let cap = w.capacitor("4.7uF");
            let gnd = w.net(GND);
            w.chain([vpp, cap, gnd]);

            series(w, USB_UART, "RST", "4k7", rail);
        }
    }
    Ok(())
}

/// DTR/RTS driven reset. ESP modules get the usual two-transistor circuit
/// that also drives the boot pin; AVR gets a DTR coupling capacitor.
pub fn auto_reset(config: &BoardConfig, w: &mut FragmentWriter<'_>) -> Result<(), SkimibowiError> {
    let profile = config.profile();

    if profile.family == McuFamily::Avr {
        let dtr = w.net(DTR);
        let cap = w.capacitor("100nF");
        let rst = w.net(RST);
        w.chain([dtr, cap, rst]);
        return Ok(());
    }

    let boot = profile
        .boot_pin
        .ok_or_else(|| not_configured(w, "boot pin"))?;

    for name in [AUTORESET_Q1, AUTORESET_Q2] {
        w.part(
            name,
            PartSpec::new("Device", "Q_NPN_BEC", TRANSISTOR_FOOTPRINT).with_value("mmbt2222"),
        );
    }
    series(w, AUTORESET_Q1, "B", "10k", DTR);
    series(w, AUTORESET_Q2, "B", "10k", RTS);
    w.tie(AUTORESET_Q2, "E", DTR);
    w.tie(AUTORESET_Q1, "E", RTS);
    w.tie(AUTORESET_Q1, "C", RST);
    let collector = w.pin(AUTORESET_Q2, "C");
    let pin = w.pin(MCU, boot);
    w.connect(collector, pin);
    Ok(())
}

/// 6-pin header for an external USB-serial programmer cable.
pub fn ftdi_header(config: &BoardConfig, w: &mut FragmentWriter<'_>) -> Result<(), SkimibowiError> {
    w.part(
        FTDI_HEADER,
        PartSpec::new("Connector", "Conn_01x06_Female", HEADER_1X06_FOOTPRINT),
    );
    w.tie(FTDI_HEADER, "1", GND);
    let pin = w.pin(FTDI_HEADER, "2");
    let nc = w.nc();
    w.connect(pin, nc);
    w.tie(FTDI_HEADER, "3", config.rail());
    // Cable TXD drives the microcontroller receive line
    w.tie(FTDI_HEADER, "4", RX);
    w.tie(FTDI_HEADER, "5", TX);
    let pin = w.pin(FTDI_HEADER, "6");
    let nc = w.nc();
    w.connect(pin, nc);
    Ok(())
}

/// Standard 2x3 AVR in-circuit programming header.
pub fn icsp_header(config: &BoardConfig, w: &mut FragmentWriter<'_>) -> Result<(), SkimibowiError> {
    let icsp = config
        .profile()
        .icsp
        .ok_or_else(|| not_configured(w, "ICSP pins"))?;

    w.part(
        ICSP_HEADER,
        PartSpec::new("Connector_Generic", "Conn_02x03_Odd_Even", HEADER_2X03_FOOTPRINT),
    );
    to_mcu(w, ICSP_HEADER, "1", icsp.miso);
    w.tie(ICSP_HEADER, "2", config.rail());
    to_mcu(w, ICSP_HEADER, "3", icsp.sck);
    to_mcu(w, ICSP_HEADER, "4", icsp.mosi);
    to_mcu(w, ICSP_HEADER, "5", icsp.reset);
    w.tie(ICSP_HEADER, "6", GND);
    Ok(())
}

/// RFM95W LoRa radio on the family's SPI pins.
pub fn lora(config: &BoardConfig, w: &mut FragmentWriter<'_>) -> Result<(), SkimibowiError> {
    let spi = config
        .profile()
        .spi
        .ok_or_else(|| not_configured(w, "SPI pins"))?;

    w.part(
        LORA,
        PartSpec::new("RF_Module", "RFM95W-868S2", "RF_Module:HOPERF_RFM9XW_SMD"),
    );
    w.tie(LORA, "3.3V", config.rail());
    w.tie(LORA, "GND", GND);
    to_mcu(w, LORA, "SCK", spi.sck);
    to_mcu(w, LORA, "MISO", spi.miso);
    to_mcu(w, LORA, "MOSI", spi.mosi);
    to_mcu(w, LORA, "NSS", spi.cs);
    match spi.irq {
        Some(irq) => to_mcu(w, LORA, "DIO0", irq),
        None => {
            let pin = w.pin(LORA, "DIO0");
            let nc = w.nc();
            w.connect(pin, nc);
        }
    }

    let gnd = w.net(GND);
    let cap = w.capacitor("100nF");
    let supply = w.pin(LORA, "3.3V");
    w.chain([gnd, cap, supply]);
    Ok(())
}

/// `PART['pin'] & R('value') & NETS['net']`
fn series(w: &mut FragmentWriter<'_>, part: &str, pin: &str, value: &str, net: &str) {
    let pin = w.pin(part, pin);
    let resistor = w.resistor(value);
    let net = w.net(net);
    w.chain([pin, resistor, net]);
}

fn to_mcu(w: &mut FragmentWriter<'_>, part: &str, pin: &str, mcu_pin: &str) {
    let lhs = w.pin(part, pin);
    let rhs = w.pin(MCU, mcu_pin);
    w.connect(lhs, rhs);
}
