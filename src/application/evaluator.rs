// Telemetry health evaluator - Threshold rules over the latest snapshot
//
// `evaluate` is a pure function: the same snapshot and history always
// produce the same result. Absent metrics are skipped entirely.
use crate::domain::health::{
    Alert, ColorTag, EvaluationResult, PRIORITY_RECOMMENDED, PRIORITY_ROUTINE, PRIORITY_SOON,
    PRIORITY_URGENT, ServiceRecommendation, ServiceStatus, Severity, Suggestion,
};
use crate::domain::telemetry::{TelemetrySnapshot, Vibration};
use crate::domain::thresholds::{
    self, HumidityBand, Level, TemperatureBand, VibrationBand,
};
use crate::domain::vibration::VibrationHistory;

const HEALTHY_TIPS: [&str; 5] = [
    "Overall Vehicle Health: EXCELLENT! All systems are operating within optimal parameters.",
    "Preventive Maintenance: Schedule regular service every 10,000 km or 6 months for continued reliability.",
    "Driving Tips: Smooth acceleration and gentle braking can extend vehicle lifespan by up to 20%.",
    "Regular Inspection Schedule: Check tire pressure weekly, all fluids monthly, and air/oil filters quarterly.",
    "Eco-Friendly Tip: Maintaining proper tire pressure improves fuel efficiency by 3-5%.",
];

#[derive(Default)]
struct Findings {
    alerts: Vec<Alert>,
    suggestions: Vec<Suggestion>,
    recommendations: Vec<ServiceRecommendation>,
}

impl Findings {
    fn alert(&mut self, severity: Severity, message: String) {
        self.alerts.push(Alert::new(message, severity));
    }

    fn suggest(&mut self, message: String) {
        self.suggestions.push(Suggestion::new(message));
    }

    fn recommend(&mut self, recommendation: ServiceRecommendation) {
        self.recommendations.push(recommendation);
    }
}

/// Evaluate one snapshot against the rule table and the vibration history.
///
/// The history is read only; callers append the snapshot's own sample first.
pub fn evaluate(snapshot: &TelemetrySnapshot, history: &VibrationHistory) -> EvaluationResult {
    let mut findings = Findings::default();

    if let Some(fuel) = snapshot.fuel_percent {
        assess_fuel(fuel, &mut findings);
    }
    if let Some(oil) = snapshot.oil_percent {
        assess_oil(oil, &mut findings);
    }
    if let Some(volt) = snapshot.voltage_v {
        assess_voltage(volt, &mut findings);
    }
    if let Some(temp) = snapshot.temperature_c {
        assess_temperature(temp, &mut findings);
    }
    if let Some(humidity) = snapshot.humidity_percent {
        assess_humidity(humidity, &mut findings);
    }
    if let Some(coolant) = snapshot.coolant_percent {
        assess_coolant(coolant, &mut findings);
    }
    if let Some(vibration) = snapshot.vibration {
        assess_vibration(&vibration, &mut findings);
    }
    if let Some(recommendation) = sustained_vibration(history) {
        findings.recommend(recommendation);
    }

    if findings.alerts.is_empty() {
        findings
            .suggestions
            .extend(HEALTHY_TIPS.iter().map(|tip| Suggestion::new(*tip)));
    }

    if findings.recommendations.is_empty() {
        findings.recommendations = fallback_recommendations();
    }
    // Vec::sort_by_key is stable, so equal priorities keep rule order.
    findings.recommendations.sort_by_key(|r| r.priority);

    EvaluationResult {
        alerts: findings.alerts,
        suggestions: findings.suggestions,
        service_recommendations: findings.recommendations,
    }
}

/// Multi-sample rule: how many buffered samples exceed the high-vibration
/// threshold.
pub fn sustained_vibration(history: &VibrationHistory) -> Option<ServiceRecommendation> {
    let high_count = history.count_above(thresholds::VIBRATION_HIGH_ABOVE);

    if high_count > thresholds::SUSTAINED_VIBRATION_REQUIRED_COUNT {
        Some(ServiceRecommendation::new(
            "Engine Mount Inspection",
            ServiceStatus::Required,
            "High vibration detected for extended period".to_string(),
            "Check engine mounts, suspension, and wheel alignment. Prolonged vibration can damage components.",
            PRIORITY_URGENT,
            ColorTag::Amber,
        ))
    } else if high_count > thresholds::SUSTAINED_VIBRATION_RECOMMENDED_COUNT {
        Some(ServiceRecommendation::new(
            "Vibration Check",
            ServiceStatus::Recommended,
            "Moderate vibration levels detected".to_string(),
            "Inspect tire balance and pressure. Check suspension system.",
            PRIORITY_RECOMMENDED,
            ColorTag::Blue,
        ))
    } else {
        None
    }
}

fn fallback_recommendations() -> Vec<ServiceRecommendation> {
    vec![
        ServiceRecommendation::new(
            "All Systems OK",
            ServiceStatus::Healthy,
            "All parameters within normal range".to_string(),
            "Continue regular maintenance schedule. Next service recommended at 10,000 km.",
            PRIORITY_ROUTINE,
            ColorTag::Green,
        ),
        ServiceRecommendation::new(
            "Routine Maintenance",
            ServiceStatus::Scheduled,
            "Preventive maintenance".to_string(),
            "Schedule regular service: Check all fluids, filters, brakes, and tire pressure.",
            PRIORITY_ROUTINE,
            ColorTag::Gray,
        ),
    ]
}

fn assess_fuel(fuel: f64, out: &mut Findings) {
    match thresholds::FUEL.classify(fuel) {
        Level::CriticalLow => {
            out.alert(Severity::Critical, format!("Low Fuel: {}% - Refuel immediately", fuel));
            out.suggest(format!(
                "Fuel level is critically low at {}%. Locate the nearest fuel station and refuel as soon as possible to avoid running out.",
                fuel
            ));
            out.recommend(ServiceRecommendation::new(
                "Fuel System Check",
                ServiceStatus::Required,
                format!("Fuel Level: {}% (Low)", fuel),
                "Refuel immediately. Consider checking fuel system efficiency.",
                PRIORITY_URGENT,
                ColorTag::Amber,
            ));
        }
        Level::Low => out.suggest(format!(
            "Fuel Health: {}% - Consider refueling soon for optimal range and peace of mind.",
            fuel
        )),
        Level::Fair => out.suggest(format!(
            "Fuel Health: {}% - Good level. Monitor consumption patterns for better fuel economy.",
            fuel
        )),
        Level::Optimal => out.suggest(format!(
            "Fuel Health: {}% - Excellent! Maintain smooth driving habits for best efficiency.",
            fuel
        )),
        Level::High => {
            out.alert(
                Severity::Warning,
                format!("High Fuel: {}% - Tank nearly full, avoid overfilling", fuel),
            );
            out.suggest(format!(
                "Fuel level is very high at {}%. Avoid topping off to prevent spillage and fuel system issues.",
                fuel
            ));
            out.recommend(ServiceRecommendation::new(
                "Fuel Level Advisory",
                ServiceStatus::Recommended,
                format!("Fuel Level: {}% (Full)", fuel),
                "Avoid topping off the tank. Check the fuel cap seal and evaporative system if spillage occurs.",
                PRIORITY_RECOMMENDED,
                ColorTag::Blue,
            ));
        }
    }
}

fn assess_oil(oil: f64, out: &mut Findings) {
    match thresholds::OIL.classify(oil) {
        Level::CriticalLow => {
            let urgent = oil < thresholds::OIL_URGENT_BELOW;
            let severity = if urgent { Severity::Urgent } else { Severity::Critical };
            out.alert(severity, format!("Low Oil: {}% - Check oil level immediately", oil));
            out.suggest(format!(
                "Oil level is critically low at {}%. Schedule an oil change or top up oil level immediately to prevent engine damage.",
                oil
            ));
            out.recommend(ServiceRecommendation::new(
                "Engine Oil Change",
                if urgent { ServiceStatus::Urgent } else { ServiceStatus::Required },
                format!("Oil Level: {}%", oil),
                "Schedule an engine oil change immediately. Low oil can cause engine damage.",
                PRIORITY_URGENT,
                if urgent { ColorTag::Red } else { ColorTag::Amber },
            ));
        }
        Level::Low => {
            out.suggest(format!(
                "Oil Health: {}% - Consider scheduling an oil change within next 1000-2000 km.",
                oil
            ));
            out.recommend(ServiceRecommendation::new(
                "Engine Oil Check",
                ServiceStatus::Recommended,
                format!("Oil Level: {}%", oil),
                "Consider scheduling an oil change within next 1000-2000 km.",
                PRIORITY_RECOMMENDED,
                ColorTag::Blue,
            ));
        }
        Level::Fair => out.suggest(format!(
            "Oil Health: {}% - Good condition. Check oil quality and color during next service.",
            oil
        )),
        Level::Optimal => out.suggest(format!(
            "Oil Health: {}% - Excellent! Fresh oil ensures engine longevity and performance.",
            oil
        )),
        Level::High => {
            out.alert(
                Severity::Warning,
                format!("High Oil Level: {}% - Oil level too high", oil),
            );
            out.suggest(format!(
                "Oil level is abnormally high at {}%. This may indicate overfilling or contamination. Have it checked by a mechanic.",
                oil
            ));
            out.recommend(ServiceRecommendation::new(
                "Oil Level Correction",
                ServiceStatus::Soon,
                format!("Oil Level: {}% (Overfilled)", oil),
                "Have the oil level adjusted and check for fuel or coolant contamination.",
                PRIORITY_SOON,
                ColorTag::Amber,
            ));
        }
    }
}

fn assess_voltage(volt: f64, out: &mut Findings) {
    match thresholds::VOLTAGE.classify(volt) {
        Level::CriticalLow => {
            out.alert(
                Severity::Critical,
                format!("Low Battery Voltage: {}V - Battery may need charging", volt),
            );
            out.suggest(format!(
                "Battery voltage is critically low at {}V. Check battery health and charging system. Battery may need replacement.",
                volt
            ));
            out.recommend(ServiceRecommendation::new(
                "Battery Replacement",
                ServiceStatus::Urgent,
                format!("Voltage: {}V (Critical)", volt),
                "Battery voltage critically low. Replace battery immediately to avoid starting issues.",
                PRIORITY_URGENT,
                ColorTag::Red,
            ));
        }
        Level::Low => {
            out.suggest(format!(
                "Battery Health: {}V - Adequate charge. Check battery terminals for corrosion and clean if needed.",
                volt
            ));
            if volt < thresholds::VOLTAGE_SERVICE_CHECK_BELOW {
                out.recommend(ServiceRecommendation::new(
                    "Battery Check",
                    ServiceStatus::Soon,
                    format!("Voltage: {}V (Low)", volt),
                    "Battery health declining. Check battery terminals, charging system, and consider replacement.",
                    PRIORITY_SOON,
                    ColorTag::Amber,
                ));
            }
        }
        Level::Fair => out.suggest(format!(
            "Battery Health: {}V - Good condition. Battery and charging system functioning normally.",
            volt
        )),
        Level::Optimal => out.suggest(format!(
            "Battery Health: {}V - Excellent! Alternator charging system working perfectly.",
            volt
        )),
        Level::High => {
            out.alert(
                Severity::Warning,
                format!("High Battery Voltage: {}V - Charging system issue", volt),
            );
            out.suggest(format!(
                "Battery voltage is too high at {}V. This may indicate alternator overcharging. Have the charging system inspected immediately.",
                volt
            ));
            out.recommend(ServiceRecommendation::new(
                "Charging System Inspection",
                ServiceStatus::Urgent,
                format!("Voltage: {}V (Overcharging)", volt),
                "Have the alternator and voltage regulator inspected immediately.",
                PRIORITY_URGENT,
                ColorTag::Red,
            ));
        }
    }
}

fn assess_temperature(temp: f64, out: &mut Findings) {
    match TemperatureBand::classify(temp) {
        TemperatureBand::Freezing => {
            out.alert(
                Severity::Warning,
                format!("Very Low Temperature: {}°C - Engine extremely cold", temp),
            );
            out.suggest(format!(
                "Engine temperature is extremely low at {}°C. Allow engine to warm up properly before driving. Check thermostat if issue persists.",
                temp
            ));
            out.recommend(ServiceRecommendation::new(
                "Thermostat Check",
                ServiceStatus::Recommended,
                format!("Temperature: {}°C (Cold)", temp),
                "Let the engine warm up before driving. Have the thermostat checked if it stays cold.",
                PRIORITY_RECOMMENDED,
                ColorTag::Blue,
            ));
        }
        TemperatureBand::WarmingUp => out.suggest(format!(
            "Temperature Health: {}°C - Engine warming up. Avoid high RPMs until engine reaches optimal temperature.",
            temp
        )),
        TemperatureBand::Normal => {
            out.suggest(format!(
                "Temperature Health: {}°C - Normal operating range. Ensure coolant level is topped up regularly.",
                temp
            ));
            if temp > thresholds::TEMP_SERVICE_CHECK_ABOVE {
                out.recommend(ServiceRecommendation::new(
                    "Cooling System Check",
                    ServiceStatus::Recommended,
                    format!("Temperature: {}°C (Warm)", temp),
                    "Monitor engine temperature. Check coolant level and thermostat.",
                    PRIORITY_RECOMMENDED,
                    ColorTag::Blue,
                ));
            }
        }
        TemperatureBand::Overheating => {
            out.alert(
                Severity::Critical,
                format!("High Temperature: {}°C - Engine overheating", temp),
            );
            out.suggest(format!(
                "Engine temperature is dangerously high at {}°C. Stop vehicle safely immediately, let engine cool down, and check coolant level. Do not continue driving.",
                temp
            ));
            out.recommend(ServiceRecommendation::new(
                "Cooling System Service",
                ServiceStatus::Urgent,
                format!("Temperature: {}°C (High)", temp),
                "Engine overheating! Check coolant level, radiator, and water pump immediately.",
                PRIORITY_URGENT,
                ColorTag::Red,
            ));
        }
    }
}

fn assess_humidity(humidity: f64, out: &mut Findings) {
    match HumidityBand::classify(humidity) {
        HumidityBand::Dry => {
            out.alert(
                Severity::Critical,
                format!("Low Humidity: {}% - Very dry conditions", humidity),
            );
            out.suggest(format!(
                "Humidity is very low at {}%. This can affect cabin comfort and increase static electricity. Consider using cabin moisture control.",
                humidity
            ));
            out.recommend(ServiceRecommendation::new(
                "Cabin Climate Check",
                ServiceStatus::Recommended,
                format!("Humidity: {}% (Dry)", humidity),
                "Check the cabin air filter and climate control settings.",
                PRIORITY_RECOMMENDED,
                ColorTag::Blue,
            ));
        }
        HumidityBand::Comfortable => {}
        HumidityBand::Humid => {
            out.alert(
                Severity::Critical,
                format!("High Humidity: {}% - Very humid conditions", humidity),
            );
            out.suggest(format!(
                "Humidity is very high at {}%. Use AC dehumidifier mode to prevent window fogging and improve comfort. Check for water leaks.",
                humidity
            ));
            out.recommend(ServiceRecommendation::new(
                "Water Leak Inspection",
                ServiceStatus::Recommended,
                format!("Humidity: {}% (Humid)", humidity),
                "Inspect door seals, sunroof drains and the AC drain line for water leaks.",
                PRIORITY_RECOMMENDED,
                ColorTag::Blue,
            ));
        }
    }
}

fn assess_coolant(coolant: f64, out: &mut Findings) {
    match thresholds::COOLANT.classify(coolant) {
        Level::CriticalLow => {
            out.alert(
                Severity::Critical,
                format!("Low Water Level: {}% - Check coolant immediately", coolant),
            );
            out.suggest(format!(
                "Coolant/Water level is critically low at {}%. Top up with appropriate coolant mixture immediately to prevent overheating.",
                coolant
            ));
            out.recommend(ServiceRecommendation::new(
                "Coolant Top-Up",
                ServiceStatus::Required,
                format!("Coolant Level: {}% (Low)", coolant),
                "Top up the coolant reservoir and inspect hoses and radiator for leaks.",
                PRIORITY_URGENT,
                ColorTag::Amber,
            ));
        }
        Level::Low => out.suggest(format!(
            "Coolant Health: {}% - Consider topping up coolant reservoir to prevent future issues.",
            coolant
        )),
        Level::Fair => out.suggest(format!(
            "Coolant Health: {}% - Good level. Inspect hoses and check for any leaks during next service.",
            coolant
        )),
        Level::Optimal => out.suggest(format!(
            "Coolant Health: {}% - Excellent! Cooling system is well maintained and optimal.",
            coolant
        )),
        Level::High => {
            out.alert(
                Severity::Warning,
                format!("High Water Level: {}% - Coolant overfilled", coolant),
            );
            out.suggest(format!(
                "Coolant level is too high at {}%. Overfilling can cause pressure buildup. Have it checked and adjusted to proper level.",
                coolant
            ));
            out.recommend(ServiceRecommendation::new(
                "Coolant Level Adjustment",
                ServiceStatus::Soon,
                format!("Coolant Level: {}% (Overfilled)", coolant),
                "Have the coolant drained to the proper level to avoid pressure buildup.",
                PRIORITY_SOON,
                ColorTag::Amber,
            ));
        }
    }
}

fn assess_vibration(vibration: &Vibration, out: &mut Findings) {
    let Some(magnitude) = vibration.magnitude() else {
        return;
    };
    let axes = format!(
        "X: {}, Y: {}, Z: {}",
        vibration.x.map(f64::abs).unwrap_or(0.0),
        vibration.y.map(f64::abs).unwrap_or(0.0),
        vibration.z.map(f64::abs).unwrap_or(0.0),
    );

    match VibrationBand::classify(magnitude) {
        VibrationBand::High => {
            out.alert(
                Severity::Critical,
                "High Vibration Detected - Check vehicle balance".to_string(),
            );
            out.suggest(format!(
                "Abnormal vibration detected ({}). Check wheel alignment, tire pressure, and suspension system immediately.",
                axes
            ));
            out.recommend(ServiceRecommendation::new(
                "Wheel Balance & Suspension Check",
                ServiceStatus::Soon,
                format!("Vibration: {} (High)", magnitude),
                "Check wheel alignment, tire pressure, and suspension system.",
                PRIORITY_SOON,
                ColorTag::Amber,
            ));
        }
        VibrationBand::Moderate => out.suggest(format!(
            "Vibration Health: Moderate levels ({}). Check tire pressure and balance for smoother ride.",
            axes
        )),
        VibrationBand::Normal => out.suggest(format!(
            "Vibration Health: Normal levels ({}). Vehicle running smoothly - excellent!",
            axes
        )),
    }
}
