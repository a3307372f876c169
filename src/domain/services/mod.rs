pub mod auth_service;
pub mod geo;
pub mod verification_service;
