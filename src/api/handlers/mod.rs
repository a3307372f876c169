pub mod auth;
pub mod candidate;
pub mod dashboard;
pub mod health;
pub mod invite;
pub mod submission;
