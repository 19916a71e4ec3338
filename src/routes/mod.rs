pub mod health;
pub mod plan;
pub mod saved;
pub mod upload;
