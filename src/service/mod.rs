pub mod chat_service;
pub mod error;
pub mod search_service;
