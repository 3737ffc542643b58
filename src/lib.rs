//! Host side of the camera's FTP upload path: configuration, logging,
//! command dispatch and operator status text.

pub mod commands;
pub mod config;
pub mod logging;
pub mod status;
