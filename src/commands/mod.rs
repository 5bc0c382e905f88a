pub mod db;
pub mod report;
pub mod scoring;
pub mod settings;
