pub mod auth_controller;
pub mod health_controller;
pub mod photo_controller;
pub mod settings_controller;
