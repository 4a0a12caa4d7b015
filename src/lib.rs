// Library surface for the binary and for headless integration tests.
pub mod app_dirs;
pub mod catalog;
pub mod config;
pub mod dashboard;
pub mod devices;
pub mod identity;
pub mod logging;
pub mod progress;
pub mod runtime;
pub mod scoring;
pub mod scripts;
pub mod session;
pub mod timer;
pub mod ui;
pub mod util;
