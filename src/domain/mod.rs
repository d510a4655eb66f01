// Domain layer - Plain data and threshold bands
pub mod health;
pub mod session;
pub mod telemetry;
pub mod thresholds;
pub mod vehicle;
pub mod vibration;
