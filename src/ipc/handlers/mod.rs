pub mod assets;
pub mod attendance;
pub mod auth;
pub mod backup;
pub mod core;
pub mod dashboard;
pub mod fees;
pub mod requests;
pub mod rooms;
pub mod settings;
pub mod students;
