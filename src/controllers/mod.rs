pub mod home_controller;
pub mod market_controller;
pub mod alerts_controller;
pub mod watches_controller;
pub mod notifications_controller;
pub mod calculations_controller;
pub mod settings_controller;
pub mod realtime_controller;
