pub mod beans;
pub mod client;
pub mod connections;
pub mod errors;
pub mod utils;

pub use beans::{AdbCommand, DeviceState, ForwardItem, RemoteFileEntry};
pub use client::{AdbClient, AdbDevice};
pub use connections::{AdbSocketConfig, AdbTransport, SyncTransport};
pub use errors::{AdbError, AdbResult, Warnings};
