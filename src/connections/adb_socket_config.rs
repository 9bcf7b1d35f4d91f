use log::debug;
use std::net::TcpStream;
use std::time::Duration;

/// adb server 默认监听端口
pub const DEFAULT_ADB_SERVER_PORT: u16 = 5037;
/// 设备端 adbd 在 TCP 模式下的默认端口
pub const DEFAULT_ADB_DAEMON_PORT: u16 = 5555;
/// 单次 socket 读的默认超时
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(60);
/// push 时远端文件的默认权限位
pub const DEFAULT_PUSH_FILE_MODE: u32 = 0o664;

const DEFAULT_ADB_HOST: &str = "localhost";

///
/// Adb Socket相关配置
/// host: adb server 主机, 默认值 localhost
/// port: adb server 端口, 默认值 5037
/// read_timeout: 单次读超时, 默认值 60s
#[derive(Clone, Debug)]
pub struct AdbSocketConfig {
    pub host: String,
    pub port: u16,
    pub read_timeout: Duration,
}

///
/// AdbSocketConfig 默认配置
impl Default for AdbSocketConfig {
    fn default() -> Self {
        AdbSocketConfig {
            host: DEFAULT_ADB_HOST.to_string(),
            port: DEFAULT_ADB_SERVER_PORT,
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }
}

impl AdbSocketConfig {
    /// 指定主机与端口的配置, 读超时取默认值。
    pub fn new<T: Into<String>>(host: T, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }

    ///
    /// 设置单次读超时
    pub fn with_read_timeout(mut self, read_timeout: Duration) -> Self {
        self.read_timeout = read_timeout;
        self
    }

    /// 连接到 adb server 并在 socket 上应用读超时。
    ///
    /// # 返回值
    /// 返回已配置好的 `TcpStream`, 无法建连时返回错误。
    pub fn connect(&self) -> crate::errors::AdbResult<TcpStream> {
        let stream = TcpStream::connect((self.host.as_str(), self.port))?;
        stream.set_read_timeout(Some(self.read_timeout))?;
        debug!("connected to adb server at {}:{}", self.host, self.port);
        Ok(stream)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AdbSocketConfig::default();
        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, DEFAULT_ADB_SERVER_PORT);
        assert_eq!(config.read_timeout, DEFAULT_READ_TIMEOUT);
    }

    #[test]
    fn test_with_read_timeout() {
        let config =
            AdbSocketConfig::new("127.0.0.1", 5038).with_read_timeout(Duration::from_secs(5));
        assert_eq!(config.port, 5038);
        assert_eq!(config.read_timeout, Duration::from_secs(5));
    }
}
