//! API endpoint handlers.
//!
//! Each module corresponds to a back-office screen or feature.
//! Handlers reuse the domain modules and hold the dataset lock only
//! while copying out what they need.

pub mod appointments;
pub mod assistant;
pub mod calendar;
pub mod catalog;
pub mod dashboard;
pub mod finance;
pub mod health;
pub mod notifications;
pub mod patients;
pub mod preferences;
pub mod relay;
