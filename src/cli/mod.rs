pub mod availability;
pub mod calculate;
pub mod setup;
pub mod ui;
