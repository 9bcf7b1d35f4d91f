use crate::connections::sync_transport::SyncTransport;
use crate::connections::{read_exact_bytes, send_all, AdbSocketConfig};
use crate::errors::{AdbError, AdbResult};
use log::debug;
use std::io::{self, Read};
use std::net::TcpStream;

const OKAY: &str = "OKAY";
const FAIL: &str = "FAIL";

/// 长度前缀只有 4 位十六进制
const MAX_COMMAND_LENGTH: usize = 0xffff;

/// 与 adb server 的一条封帧连接。
///
/// 出向命令为 `%04x` 长度前缀加命令本体; 入向先读 4 字节状态
/// (`OKAY`/`FAIL`), 部分命令再跟一个十六进制长度前缀的负载。
/// 每个操作独占一条连接, 用完即关; 通过 [`AdbTransport::into_sync`]
/// 升级后本句柄被消耗, 此后帧协议在该 socket 上不再有效。
#[derive(Debug)]
pub struct AdbTransport {
    stream: TcpStream,
}

impl AdbTransport {
    /// 按配置建立到 adb server 的连接。
    pub fn connect(config: &AdbSocketConfig) -> AdbResult<Self> {
        let stream = config.connect()?;
        Ok(Self { stream })
    }

    /// 发送一条命令。
    ///
    /// # 参数
    /// - `command`: 命令字符串, 字节数不能超过 0xffff。
    pub fn send(&mut self, command: &str) -> AdbResult<()> {
        if command.len() > MAX_COMMAND_LENGTH {
            return Err(AdbError::protocol(format!(
                "command too long: {} bytes",
                command.len()
            )));
        }
        debug!("send command: {:?}", command);
        let msg = encode_command(command);
        send_all(&mut self.stream, &msg)
    }

    /// 读取 4 字节状态并校验。
    ///
    /// # 返回值
    /// - `OKAY` 返回 `Ok(())`;
    /// - `FAIL` 读取后随的错误文本并返回 `CommandFailed`;
    /// - 其余任何字节视为协议错误。
    pub fn verify_response(&mut self) -> AdbResult<()> {
        let status = self.read_string(4)?;
        debug!("response status: {:?}", status);
        match status.as_str() {
            OKAY => Ok(()),
            FAIL => {
                let message = self.unpack_string()?;
                Err(AdbError::command_failed(message))
            }
            other => Err(AdbError::protocol(format!(
                "unexpected status: {:?}",
                other
            ))),
        }
    }

    /// 读取恰好 n 字节。
    pub fn read_bytes(&mut self, n: usize) -> AdbResult<Vec<u8>> {
        read_exact_bytes(&mut self.stream, n)
    }

    /// 读取恰好 n 字节并转为字符串。
    pub fn read_string(&mut self, n: usize) -> AdbResult<String> {
        let raw = self.read_bytes(n)?;
        Ok(String::from_utf8_lossy(&raw).into_owned())
    }

    /// 读取一个十六进制长度前缀的负载。
    pub fn unpack_bytes(&mut self) -> AdbResult<Vec<u8>> {
        let length = self.read_string(4)?;
        let size = usize::from_str_radix(&length, 16)
            .map_err(|_| AdbError::protocol(format!("invalid hex length: {:?}", length)))?;
        self.read_bytes(size)
    }

    /// 读取一个十六进制长度前缀的负载并转为字符串。
    pub fn unpack_string(&mut self) -> AdbResult<String> {
        let raw = self.unpack_bytes()?;
        Ok(String::from_utf8_lossy(&raw).into_owned())
    }

    /// 读取至对端关闭。
    pub fn read_bytes_all(&mut self) -> AdbResult<Vec<u8>> {
        let mut content = Vec::new();
        self.stream.read_to_end(&mut content)?;
        Ok(content)
    }

    /// 读取至对端关闭并转为字符串。
    pub fn read_string_all(&mut self) -> AdbResult<String> {
        let raw = self.read_bytes_all()?;
        Ok(String::from_utf8_lossy(&raw).into_owned())
    }

    /// 发送 `sync:` 升级为 SYNC 子协议。
    /// 升级后本句柄被消耗, socket 的所有权转移给返回的 [`SyncTransport`]。
    pub fn into_sync(mut self) -> AdbResult<SyncTransport> {
        self.send("sync:")?;
        self.verify_response()?;
        Ok(SyncTransport::new(self.stream))
    }

    /// 交出底层 socket 的所有权, 用于把字节流移交给调用方的场景。
    pub fn into_stream(self) -> TcpStream {
        self.stream
    }
}

/// `%04x` 长度前缀编码。
fn encode_command(command: &str) -> Vec<u8> {
    let cmd_bytes = command.as_bytes();
    let length = format!("{:04x}", cmd_bytes.len());
    let mut data = Vec::with_capacity(length.len() + cmd_bytes.len());
    data.extend_from_slice(length.as_bytes());
    data.extend_from_slice(cmd_bytes);
    data
}

impl Read for AdbTransport {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.stream.read(buf)
    }
}
