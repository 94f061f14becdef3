//! Feather example: build a configuration in code and print the program.

use skimibowi::config::RawRegulator;
use skimibowi::prelude::*;

fn main() -> Result<(), SkimibowiError> {
    let raw = RawConfig {
        mcu: Some("ESP-12E".to_string()),
        mcurail: Some("+3V3".to_string()),
        powersource: Some("JST PH connector".to_string()),
        battery_manager: Some("MCP73831".to_string()),
        regulator: true,
        regulator_data: Some(RawRegulator {
            module: Some("Regulator_Linear".to_string()),
            part: Some("AP2112K-3.3".to_string()),
            footprint: Some("Package_TO_SOT_SMD:SOT-23-5".to_string()),
            output: Some("+3V3".to_string()),
            enable_pin: true,
        }),
        reset_button: true,
        usb_serial: Some("CP2104".to_string()),
        board: Some("Adafruit Feather".to_string()),
        ..Default::default()
    };

    let options = GenerationOptions {
        section_comments: true,
    };
    let result = SkimibowiCore::generate(&raw, options)?;

    eprintln!(
        "{} fragments, {} parts, {} nets",
        result.stats.fragments, result.stats.parts, result.stats.nets
    );
    for feature in result.features() {
        eprintln!("  - {}", feature);
    }
    print!("{}", result.program);

    Ok(())
}
