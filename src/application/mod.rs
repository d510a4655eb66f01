// Application layer - Use cases and collaborator traits
pub mod evaluator;
pub mod identity;
pub mod monitoring_service;
pub mod profile_store;
pub mod report;
pub mod telemetry_source;
