// Threshold bands for every monitored metric
//
// Lower bounds are inclusive and upper bounds exclusive unless a band says
// otherwise. Ordering is checked at compile time.

// Fuel level (%)
pub const FUEL_CRITICAL_BELOW: f64 = 20.0;
pub const FUEL_FAIR_FROM: f64 = 40.0;
pub const FUEL_OPTIMAL_FROM: f64 = 60.0;
pub const FUEL_HIGH_FROM: f64 = 95.0;

// Engine oil level (%)
pub const OIL_URGENT_BELOW: f64 = 15.0;
pub const OIL_CRITICAL_BELOW: f64 = 30.0;
pub const OIL_FAIR_FROM: f64 = 50.0;
pub const OIL_OPTIMAL_FROM: f64 = 70.0;
pub const OIL_HIGH_FROM: f64 = 95.0;

const _: () = assert!(OIL_URGENT_BELOW < OIL_CRITICAL_BELOW);

// Battery voltage (V)
pub const VOLTAGE_CRITICAL_BELOW: f64 = 12.0;
pub const VOLTAGE_FAIR_FROM: f64 = 12.5;
pub const VOLTAGE_OPTIMAL_FROM: f64 = 13.0;
pub const VOLTAGE_HIGH_FROM: f64 = 14.5;

/// Below this the battery gets a "check soon" service item even though no
/// alert fires.
pub const VOLTAGE_SERVICE_CHECK_BELOW: f64 = 12.4;

const _: () = assert!(VOLTAGE_CRITICAL_BELOW < VOLTAGE_SERVICE_CHECK_BELOW);
const _: () = assert!(VOLTAGE_SERVICE_CHECK_BELOW < VOLTAGE_FAIR_FROM);

// Coolant / water reservoir level (%)
pub const COOLANT_CRITICAL_BELOW: f64 = 30.0;
pub const COOLANT_FAIR_FROM: f64 = 50.0;
pub const COOLANT_OPTIMAL_FROM: f64 = 70.0;
pub const COOLANT_HIGH_FROM: f64 = 95.0;

// Engine temperature (°C)
pub const TEMP_FREEZING_BELOW: f64 = 0.0;
pub const TEMP_NORMAL_FROM: f64 = 70.0;
/// Overheating starts strictly above this value.
pub const TEMP_OVERHEAT_ABOVE: f64 = 90.0;
/// Cooling system check strictly above this value.
pub const TEMP_SERVICE_CHECK_ABOVE: f64 = 80.0;

const _: () = assert!(TEMP_FREEZING_BELOW < TEMP_NORMAL_FROM);
const _: () = assert!(TEMP_NORMAL_FROM < TEMP_SERVICE_CHECK_ABOVE);
const _: () = assert!(TEMP_SERVICE_CHECK_ABOVE < TEMP_OVERHEAT_ABOVE);

// Cabin humidity (%)
pub const HUMIDITY_DRY_BELOW: f64 = 20.0;
pub const HUMIDITY_HUMID_ABOVE: f64 = 80.0;

const _: () = assert!(HUMIDITY_DRY_BELOW < HUMIDITY_HUMID_ABOVE);

// Vibration magnitude, max(|x|, |y|, |z|)
pub const VIBRATION_MODERATE_ABOVE: f64 = 30.0;
pub const VIBRATION_HIGH_ABOVE: f64 = 50.0;

/// More high-vibration samples than this in the buffer requires an engine
/// mount inspection.
pub const SUSTAINED_VIBRATION_REQUIRED_COUNT: usize = 10;
/// More high-vibration samples than this recommends a vibration check.
pub const SUSTAINED_VIBRATION_RECOMMENDED_COUNT: usize = 5;

const _: () = assert!(VIBRATION_MODERATE_ABOVE < VIBRATION_HIGH_ABOVE);
const _: () = assert!(SUSTAINED_VIBRATION_RECOMMENDED_COUNT < SUSTAINED_VIBRATION_REQUIRED_COUNT);

/// Five-band shape shared by fuel, oil, coolant and voltage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    CriticalLow,
    Low,
    Fair,
    Optimal,
    High,
}

impl Level {
    pub const ALL: [Level; 5] = [
        Level::CriticalLow,
        Level::Low,
        Level::Fair,
        Level::Optimal,
        Level::High,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelThresholds {
    pub critical_below: f64,
    pub fair_from: f64,
    pub optimal_from: f64,
    pub high_from: f64,
}

impl LevelThresholds {
    pub const fn new(critical_below: f64, fair_from: f64, optimal_from: f64, high_from: f64) -> Self {
        assert!(critical_below < fair_from);
        assert!(fair_from < optimal_from);
        assert!(optimal_from < high_from);
        Self {
            critical_below,
            fair_from,
            optimal_from,
            high_from,
        }
    }

    pub fn classify(&self, value: f64) -> Level {
        if value < self.critical_below {
            Level::CriticalLow
        } else if value < self.fair_from {
            Level::Low
        } else if value < self.optimal_from {
            Level::Fair
        } else if value < self.high_from {
            Level::Optimal
        } else {
            Level::High
        }
    }

    pub fn contains(&self, level: Level, value: f64) -> bool {
        match level {
            Level::CriticalLow => value < self.critical_below,
            Level::Low => value >= self.critical_below && value < self.fair_from,
            Level::Fair => value >= self.fair_from && value < self.optimal_from,
            Level::Optimal => value >= self.optimal_from && value < self.high_from,
            Level::High => value >= self.high_from,
        }
    }
}

pub const FUEL: LevelThresholds =
    LevelThresholds::new(FUEL_CRITICAL_BELOW, FUEL_FAIR_FROM, FUEL_OPTIMAL_FROM, FUEL_HIGH_FROM);
pub const OIL: LevelThresholds =
    LevelThresholds::new(OIL_CRITICAL_BELOW, OIL_FAIR_FROM, OIL_OPTIMAL_FROM, OIL_HIGH_FROM);
pub const COOLANT: LevelThresholds = LevelThresholds::new(
    COOLANT_CRITICAL_BELOW,
    COOLANT_FAIR_FROM,
    COOLANT_OPTIMAL_FROM,
    COOLANT_HIGH_FROM,
);
pub const VOLTAGE: LevelThresholds = LevelThresholds::new(
    VOLTAGE_CRITICAL_BELOW,
    VOLTAGE_FAIR_FROM,
    VOLTAGE_OPTIMAL_FROM,
    VOLTAGE_HIGH_FROM,
);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemperatureBand {
    Freezing,
    WarmingUp,
    /// Inclusive of the overheat boundary.
    Normal,
    Overheating,
}

impl TemperatureBand {
    pub const ALL: [TemperatureBand; 4] = [
        TemperatureBand::Freezing,
        TemperatureBand::WarmingUp,
        TemperatureBand::Normal,
        TemperatureBand::Overheating,
    ];

    pub fn classify(celsius: f64) -> Self {
        if celsius < TEMP_FREEZING_BELOW {
            TemperatureBand::Freezing
        } else if celsius < TEMP_NORMAL_FROM {
            TemperatureBand::WarmingUp
        } else if celsius <= TEMP_OVERHEAT_ABOVE {
            TemperatureBand::Normal
        } else {
            TemperatureBand::Overheating
        }
    }

    pub fn contains(self, celsius: f64) -> bool {
        match self {
            TemperatureBand::Freezing => celsius < TEMP_FREEZING_BELOW,
            TemperatureBand::WarmingUp => (TEMP_FREEZING_BELOW..TEMP_NORMAL_FROM).contains(&celsius),
            TemperatureBand::Normal => (TEMP_NORMAL_FROM..=TEMP_OVERHEAT_ABOVE).contains(&celsius),
            TemperatureBand::Overheating => celsius > TEMP_OVERHEAT_ABOVE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HumidityBand {
    Dry,
    Comfortable,
    Humid,
}

impl HumidityBand {
    pub const ALL: [HumidityBand; 3] = [HumidityBand::Dry, HumidityBand::Comfortable, HumidityBand::Humid];

    pub fn classify(percent: f64) -> Self {
        if percent < HUMIDITY_DRY_BELOW {
            HumidityBand::Dry
        } else if percent > HUMIDITY_HUMID_ABOVE {
            HumidityBand::Humid
        } else {
            HumidityBand::Comfortable
        }
    }

    pub fn contains(self, percent: f64) -> bool {
        match self {
            HumidityBand::Dry => percent < HUMIDITY_DRY_BELOW,
            HumidityBand::Comfortable => (HUMIDITY_DRY_BELOW..=HUMIDITY_HUMID_ABOVE).contains(&percent),
            HumidityBand::Humid => percent > HUMIDITY_HUMID_ABOVE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VibrationBand {
    Normal,
    Moderate,
    High,
}

impl VibrationBand {
    pub const ALL: [VibrationBand; 3] = [VibrationBand::Normal, VibrationBand::Moderate, VibrationBand::High];

    /// Magnitudes are absolute values, so negative input never occurs in
    /// practice; it classifies as `Normal`.
    pub fn classify(magnitude: f64) -> Self {
        if magnitude > VIBRATION_HIGH_ABOVE {
            VibrationBand::High
        } else if magnitude > VIBRATION_MODERATE_ABOVE {
            VibrationBand::Moderate
        } else {
            VibrationBand::Normal
        }
    }

    pub fn contains(self, magnitude: f64) -> bool {
        match self {
            VibrationBand::Normal => magnitude <= VIBRATION_MODERATE_ABOVE,
            VibrationBand::Moderate => {
                magnitude > VIBRATION_MODERATE_ABOVE && magnitude <= VIBRATION_HIGH_ABOVE
            }
            VibrationBand::High => magnitude > VIBRATION_HIGH_ABOVE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Dense sweep over [from, to] in 0.01 steps, plus the exact boundaries.
    fn sweep(from: f64, to: f64, boundaries: &[f64]) -> Vec<f64> {
        let steps = ((to - from) * 100.0).round() as i64;
        let mut values: Vec<f64> = (0..=steps).map(|i| from + i as f64 / 100.0).collect();
        values.extend_from_slice(boundaries);
        values
    }

    fn assert_level_partition(thresholds: LevelThresholds, from: f64, to: f64) {
        let boundaries = [
            thresholds.critical_below,
            thresholds.fair_from,
            thresholds.optimal_from,
            thresholds.high_from,
        ];
        for value in sweep(from, to, &boundaries) {
            let matching: Vec<Level> = Level::ALL
                .into_iter()
                .filter(|level| thresholds.contains(*level, value))
                .collect();
            assert_eq!(matching.len(), 1, "value {} matched {:?}", value, matching);
            assert_eq!(matching[0], thresholds.classify(value), "value {}", value);
        }
    }

    #[test]
    fn test_percentage_levels_partition_domain() {
        assert_level_partition(FUEL, 0.0, 100.0);
        assert_level_partition(OIL, 0.0, 100.0);
        assert_level_partition(COOLANT, 0.0, 100.0);
    }

    #[test]
    fn test_voltage_levels_partition_domain() {
        assert_level_partition(VOLTAGE, 0.0, 20.0);
    }

    #[test]
    fn test_temperature_bands_partition_domain() {
        for value in sweep(-40.0, 150.0, &[TEMP_FREEZING_BELOW, TEMP_NORMAL_FROM, TEMP_OVERHEAT_ABOVE]) {
            let matching: Vec<_> = TemperatureBand::ALL
                .into_iter()
                .filter(|band| band.contains(value))
                .collect();
            assert_eq!(matching.len(), 1, "value {} matched {:?}", value, matching);
            assert_eq!(matching[0], TemperatureBand::classify(value));
        }
    }

    #[test]
    fn test_humidity_bands_partition_domain() {
        for value in sweep(0.0, 100.0, &[HUMIDITY_DRY_BELOW, HUMIDITY_HUMID_ABOVE]) {
            let matching: Vec<_> = HumidityBand::ALL
                .into_iter()
                .filter(|band| band.contains(value))
                .collect();
            assert_eq!(matching.len(), 1, "value {} matched {:?}", value, matching);
            assert_eq!(matching[0], HumidityBand::classify(value));
        }
    }

    #[test]
    fn test_vibration_bands_partition_domain() {
        for value in sweep(0.0, 200.0, &[VIBRATION_MODERATE_ABOVE, VIBRATION_HIGH_ABOVE]) {
            let matching: Vec<_> = VibrationBand::ALL
                .into_iter()
                .filter(|band| band.contains(value))
                .collect();
            assert_eq!(matching.len(), 1, "value {} matched {:?}", value, matching);
            assert_eq!(matching[0], VibrationBand::classify(value));
        }
    }

    #[test]
    fn test_boundaries() {
        assert_eq!(FUEL.classify(19.99), Level::CriticalLow);
        assert_eq!(FUEL.classify(20.0), Level::Low);
        assert_eq!(FUEL.classify(95.0), Level::High);
        assert_eq!(VOLTAGE.classify(14.49), Level::Optimal);
        assert_eq!(VOLTAGE.classify(14.5), Level::High);
        assert_eq!(TemperatureBand::classify(90.0), TemperatureBand::Normal);
        assert_eq!(TemperatureBand::classify(90.01), TemperatureBand::Overheating);
        assert_eq!(HumidityBand::classify(80.0), HumidityBand::Comfortable);
        assert_eq!(VibrationBand::classify(30.0), VibrationBand::Normal);
        assert_eq!(VibrationBand::classify(50.0), VibrationBand::Moderate);
    }
}
