//! Clinic records. Flat view-model data with string foreign keys.

pub mod analytics;
pub mod appointment;
pub mod clinic;
pub mod doctor;
pub mod enums;
pub mod notification;
pub mod patient;
pub mod procedure;
pub mod tooth;
pub mod transaction;
pub mod treatment;

pub use analytics::*;
pub use appointment::*;
pub use clinic::*;
pub use doctor::*;
pub use enums::*;
pub use notification::*;
pub use patient::*;
pub use procedure::*;
pub use tooth::*;
pub use transaction::*;
pub use treatment::*;
