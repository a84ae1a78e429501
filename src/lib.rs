pub mod commands;
pub mod device;
pub mod doctor;
pub mod error;
pub mod fs_utils;
pub mod logging;
pub mod paths;
pub mod platform;
pub mod profiles;
pub mod state;
pub mod store;
pub mod switch;
pub mod ui;

#[cfg(test)]
pub mod test_utils;
