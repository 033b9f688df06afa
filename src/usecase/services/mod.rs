pub mod edit_service;
pub mod save_service;
