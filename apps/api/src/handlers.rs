pub mod bootstrap;
pub mod claims;
pub mod directory;
pub mod health;
pub mod import;
