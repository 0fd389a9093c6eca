//! Input processing module
//! Handles file detection, text extraction, job scraping, and input management

pub mod file_detector;
pub mod manager;
pub mod scraper;
pub mod text_extractor;

pub use manager::{InputManager, JobSource};
