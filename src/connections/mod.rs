pub(crate) mod adb_socket_config;
pub(crate) mod adb_transport;
pub(crate) mod sync_transport;

pub use adb_socket_config::{
    AdbSocketConfig, DEFAULT_ADB_DAEMON_PORT, DEFAULT_ADB_SERVER_PORT, DEFAULT_PUSH_FILE_MODE,
    DEFAULT_READ_TIMEOUT,
};
pub use adb_transport::AdbTransport;
pub use sync_transport::{SyncTransport, SYNC_MAX_CHUNK_SIZE};

use crate::errors::{AdbError, AdbResult};
use std::io::{Read, Write};

/// 循环写出全部字节。
/// 零字节写视为连接已断开。
pub(crate) fn send_all<W: Write>(writer: &mut W, data: &[u8]) -> AdbResult<()> {
    let mut sent = 0;
    while sent < data.len() {
        let n = writer.write(&data[sent..])?;
        if n == 0 {
            return Err(AdbError::ConnectionBroken);
        }
        sent += n;
    }
    Ok(())
}

/// 循环读满 n 字节。
/// 读满之前对端关闭视为连接已断开。
pub(crate) fn read_exact_bytes<R: Read>(reader: &mut R, n: usize) -> AdbResult<Vec<u8>> {
    let mut buf = vec![0u8; n];
    let mut filled = 0;
    while filled < n {
        let read = reader.read(&mut buf[filled..])?;
        if read == 0 {
            return Err(AdbError::ConnectionBroken);
        }
        filled += read;
    }
    Ok(buf)
}
