pub mod alerts;
pub mod chatbot;
pub mod predict;
pub mod system;
