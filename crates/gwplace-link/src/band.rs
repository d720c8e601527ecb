//! LoRaWAN regional frequency bands.

use serde::{Deserialize, Serialize};

/// Speed of light in vacuum (m/s).
pub const SPEED_OF_LIGHT_M_S: f64 = 299_792_458.0;

/// Regional band plan used to derive the carrier wavelength.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Band {
    /// US 902-928 MHz.
    #[default]
    Us915,
    /// EU 863-870 MHz.
    Eu868,
    /// Australia 915-928 MHz.
    Au915,
    /// Asia 915-928 MHz, 923 MHz center.
    As923,
}

impl Band {
    /// Nominal carrier frequency in Hz.
    pub fn frequency_hz(&self) -> f64 {
        match self {
            Band::Us915 | Band::Au915 => 915.0e6,
            Band::Eu868 => 868.0e6,
            Band::As923 => 923.0e6,
        }
    }

    /// Carrier wavelength in meters (`c / f`).
    pub fn wavelength_m(&self) -> f64 {
        SPEED_OF_LIGHT_M_S / self.frequency_hz()
    }
}

impl std::fmt::Display for Band {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Band::Us915 => "US915",
            Band::Eu868 => "EU868",
            Band::Au915 => "AU915",
            Band::As923 => "AS923",
        };
        f.write_str(name)
    }
}
