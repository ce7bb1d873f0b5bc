pub mod like_service;
pub mod listing_service;
pub mod profile_service;
