use crate::beans::RemoteFileEntry;
use crate::connections::{read_exact_bytes, send_all};
use crate::errors::{AdbError, AdbResult};
use log::debug;
use std::io::{Read, Write};
use std::net::TcpStream;

/// 单个 DATA 数据块的上限
pub const SYNC_MAX_CHUNK_SIZE: usize = 64 * 1024;

const DATA: &str = "DATA";
const DONE: &str = "DONE";
const DENT: &str = "DENT";
const OKAY: &str = "OKAY";
const FAIL: &str = "FAIL";

/// `sync:` 升级后的文件传输通道。
///
/// 帧格式固定为 8 字节头 (4 字节 ASCII 标签 + 小端 u32), 后随可选负载。
/// 由 [`crate::AdbTransport::into_sync`] 构造, 接管 socket 的所有权,
/// 关闭即关闭连接。
#[derive(Debug)]
pub struct SyncTransport {
    stream: TcpStream,
}

impl SyncTransport {
    pub(crate) fn new(stream: TcpStream) -> Self {
        Self { stream }
    }

    /// 发送一个带字符串负载的帧, 长度字段取负载字节数。
    ///
    /// # 参数
    /// - `tag`: 4 字节标签, 如 `LIST`/`SEND`/`RECV`。
    /// - `data`: 负载, 如远端路径。
    pub fn send(&mut self, tag: &str, data: &str) -> AdbResult<()> {
        debug!("send sync frame: {} {:?}", tag, data);
        let msg = frame(tag, data.len() as u32, data.as_bytes())?;
        send_all(&mut self.stream, &msg)
    }

    /// 发送一个 DATA 数据块。
    pub fn send_chunk(&mut self, chunk: &[u8]) -> AdbResult<()> {
        let msg = frame(DATA, chunk.len() as u32, chunk)?;
        send_all(&mut self.stream, &msg)
    }

    /// 发送一个仅含 8 字节头的状态帧, 如 `DONE` + mtime。
    pub fn send_status(&mut self, tag: &str, n: u32) -> AdbResult<()> {
        debug!("send sync status: {} {}", tag, n);
        let msg = frame(tag, n, &[])?;
        send_all(&mut self.stream, &msg)
    }

    /// 把 source 切成不超过 64 KiB 的 DATA 块依次发送, 读到 EOF 为止。
    pub fn send_stream<R: Read>(&mut self, source: &mut R) -> AdbResult<()> {
        let mut buf = vec![0u8; SYNC_MAX_CHUNK_SIZE];
        loop {
            let n = source.read(&mut buf)?;
            if n == 0 {
                return Ok(());
            }
            self.send_chunk(&buf[..n])?;
        }
    }

    /// 读取传输结束状态。
    /// 无论成败, 头部 u32 指示的消息体都会被消费掉。
    pub fn verify_status(&mut self) -> AdbResult<()> {
        let status = self.read_string(4)?;
        let length = self.read_u32()?;
        let message = self.read_string(length as usize)?;
        match status.as_str() {
            OKAY => Ok(()),
            FAIL => Err(AdbError::command_failed(message)),
            other => Err(AdbError::protocol(format!(
                "unknown sync status: {:?}",
                other
            ))),
        }
    }

    /// 读取一个 LIST 目录项。
    ///
    /// # 返回值
    /// - `DENT` 帧返回 `Some(entry)`;
    /// - `DONE` 帧表示序列结束, 返回 `None`;
    /// - `FAIL` 帧返回服务端错误, 其他标签视为协议错误。
    pub fn read_dir_entry(&mut self) -> AdbResult<Option<RemoteFileEntry>> {
        let status = self.read_string(4)?;
        match status.as_str() {
            DONE => {
                // DONE 头剩余的 u32 一并消费掉
                let _ = self.read_u32()?;
                Ok(None)
            }
            DENT => {
                let mode = self.read_u32()?;
                let size = self.read_u32()?;
                let mtime = self.read_u32()?;
                let name_length = self.read_u32()?;
                let name = self.read_string(name_length as usize)?;
                Ok(Some(RemoteFileEntry {
                    name,
                    mode,
                    size,
                    mtime,
                }))
            }
            FAIL => {
                let length = self.read_u32()?;
                let message = self.read_string(length as usize)?;
                Err(AdbError::command_failed(message))
            }
            other => Err(AdbError::protocol(format!(
                "unknown dir entry tag: {:?}",
                other
            ))),
        }
    }

    /// 把 DATA 数据块依次拷贝到 dest, 直到读到 DONE。
    pub fn read_stream<W: Write>(&mut self, dest: &mut W) -> AdbResult<()> {
        loop {
            let status = self.read_string(4)?;
            let length = self.read_u32()?;
            match status.as_str() {
                DATA => {
                    let chunk = self.read_bytes(length as usize)?;
                    dest.write_all(&chunk)?;
                }
                DONE => return Ok(()),
                FAIL => {
                    let message = self.read_string(length as usize)?;
                    return Err(AdbError::command_failed(message));
                }
                other => {
                    return Err(AdbError::protocol(format!(
                        "unknown chunk tag: {:?}",
                        other
                    )))
                }
            }
        }
    }

    fn read_bytes(&mut self, n: usize) -> AdbResult<Vec<u8>> {
        read_exact_bytes(&mut self.stream, n)
    }

    fn read_string(&mut self, n: usize) -> AdbResult<String> {
        let raw = self.read_bytes(n)?;
        Ok(String::from_utf8_lossy(&raw).into_owned())
    }

    fn read_u32(&mut self) -> AdbResult<u32> {
        let raw = self.read_bytes(4)?;
        Ok(u32::from_le_bytes(raw[..4].try_into().unwrap()))
    }
}

/// 组装 8 字节帧头 + 负载。标签必须恰好 4 字节。
fn frame(tag: &str, value: u32, payload: &[u8]) -> AdbResult<Vec<u8>> {
    if tag.len() != 4 {
        return Err(AdbError::protocol("sync commands must have length 4"));
    }
    let mut msg = Vec::with_capacity(8 + payload.len());
    msg.extend_from_slice(tag.as_bytes());
    msg.extend_from_slice(&value.to_le_bytes());
    msg.extend_from_slice(payload);
    Ok(msg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_header_is_eight_bytes() {
        let msg = frame("DONE", 0, &[]).unwrap();
        assert_eq!(msg.len(), 8);
        assert_eq!(&msg[..4], b"DONE");
        assert_eq!(&msg[4..], [0, 0, 0, 0]);
    }

    #[test]
    fn test_frame_value_is_little_endian() {
        let msg = frame("DONE", 0x654b_7a80, &[]).unwrap();
        assert_eq!(&msg[4..], [0x80, 0x7a, 0x4b, 0x65]);
    }

    #[test]
    fn test_frame_with_payload() {
        let msg = frame("SEND", 17, b"/sdcard/x.txt,436").unwrap();
        assert_eq!(&msg[..4], b"SEND");
        assert_eq!(&msg[4..8], [17, 0, 0, 0]);
        assert_eq!(&msg[8..], b"/sdcard/x.txt,436");
    }

    #[test]
    fn test_frame_rejects_bad_tag() {
        let err = frame("NOPE!", 0, &[]).unwrap_err();
        assert!(matches!(err, AdbError::Protocol { .. }));
    }
}
