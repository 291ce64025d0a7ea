pub mod analytics;
pub mod cli;
pub mod config;
pub mod controller;
pub mod storage;
pub mod submit;
pub mod survey;
pub mod util;
