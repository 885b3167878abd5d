//! Sustainable Web Design energy model.
//!
//! Bytes are turned into energy with a fixed intensity per gigabyte, the
//! energy is split across the four segments of the delivery chain, and each
//! segment is multiplied by the grid carbon intensity. Green hosting only
//! zeroes the data-center segment.

use crate::config::TrackerConfig;
use crate::models::GreenScore;

/// Energy used per gigabyte transferred (kWh/GB)
pub const ENERGY_PER_GB_KWH: f64 = 0.81;

/// Share of bytes re-transferred on a returning visit
pub const CACHE_RATIO: f64 = 0.02;

/// Global average grid intensity (g CO₂/kWh)
pub const DEFAULT_GRID_INTENSITY: f64 = 442.0;

pub const DATA_CENTER_SEGMENT: f64 = 0.15;
pub const NETWORK_SEGMENT: f64 = 0.14;
pub const USER_DEVICE_SEGMENT: f64 = 0.52;
pub const PRODUCTION_SEGMENT: f64 = 0.19;

const BYTES_PER_GB: f64 = 1024.0 * 1024.0 * 1024.0;

// Inclusive upper bounds in grams
const GRADE_A_MAX: f64 = 0.20;
const GRADE_B_MAX: f64 = 0.50;
const GRADE_C_MAX: f64 = 1.00;
const GRADE_D_MAX: f64 = 2.00;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CarbonCalculator {
    green_hosting: bool,
    grid_intensity: f64,
}

impl Default for CarbonCalculator {
    fn default() -> Self {
        Self::new(false, DEFAULT_GRID_INTENSITY)
    }
}

impl CarbonCalculator {
    pub fn new(green_hosting: bool, grid_intensity: f64) -> Self {
        Self {
            green_hosting,
            grid_intensity,
        }
    }

    pub fn from_config(config: &TrackerConfig) -> Self {
        Self::new(config.green_hosting, config.grid_intensity)
    }

    pub fn green_hosting(&self) -> bool {
        self.green_hosting
    }

    pub fn grid_intensity(&self) -> f64 {
        self.grid_intensity
    }

    /// Grams of CO₂ for transferring `transfer_size_bytes` on a single page view
    pub fn co2_grams(&self, transfer_size_bytes: f64, returning_visit: bool) -> f64 {
        if transfer_size_bytes <= 0.0 || transfer_size_bytes.is_nan() {
            return 0.0;
        }

        let effective_bytes = if returning_visit {
            transfer_size_bytes * CACHE_RATIO
        } else {
            transfer_size_bytes
        };

        let energy_kwh = effective_bytes / BYTES_PER_GB * ENERGY_PER_GB_KWH;

        self.segment_co2(energy_kwh, DATA_CENTER_SEGMENT, true)
            + self.segment_co2(energy_kwh, NETWORK_SEGMENT, false)
            + self.segment_co2(energy_kwh, USER_DEVICE_SEGMENT, false)
            + self.segment_co2(energy_kwh, PRODUCTION_SEGMENT, false)
    }

    /// First-visit emissions for one asset category
    pub fn category_co2_grams(&self, transfer_size_bytes: f64) -> f64 {
        self.co2_grams(transfer_size_bytes, false)
    }

    pub fn green_score(&self, co2_grams: f64) -> GreenScore {
        green_score(co2_grams)
    }

    fn segment_co2(&self, energy_kwh: f64, share: f64, is_data_center: bool) -> f64 {
        let intensity = if is_data_center && self.green_hosting {
            0.0
        } else {
            self.grid_intensity
        };
        energy_kwh * share * intensity
    }
}

/// Maps grams of CO₂ to a grade; a boundary value belongs to the better grade
pub fn green_score(co2_grams: f64) -> GreenScore {
    if co2_grams <= GRADE_A_MAX {
        GreenScore::A
    } else if co2_grams <= GRADE_B_MAX {
        GreenScore::B
    } else if co2_grams <= GRADE_C_MAX {
        GreenScore::C
    } else if co2_grams <= GRADE_D_MAX {
        GreenScore::D
    } else {
        GreenScore::F
    }
}
