pub mod admin;
pub mod analytics;
pub mod collection;
pub mod document;
pub mod message;
pub mod settings;
