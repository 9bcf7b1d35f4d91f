//! 回放录制字节的内存 mock adb server。
//!
//! 库的每个操作都使用一条独立连接, 所以 mock 按顺序接受既定数量的
//! 连接, 每条交给一个处理闭包。收到的命令通过 channel 上报, 由测试
//! 主线程断言, 避免断言失败淹没在 server 线程里。

#![allow(dead_code)]

use rsadb::{AdbClient, AdbSocketConfig};
use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::mpsc::Sender;
use std::thread::{self, JoinHandle};

pub type ConnHandler = Box<dyn FnOnce(TcpStream) + Send>;

/// 测试辅助函数: 安装日志订阅器, 重复调用无副作用。
pub fn setup_test_environment() {
    rsadb::utils::init_logger();
}

pub struct MockAdbServer {
    pub addr: SocketAddr,
    handle: Option<JoinHandle<()>>,
}

impl MockAdbServer {
    /// 依次接受 handlers.len() 条连接, 每条交给对应的处理闭包。
    pub fn spawn(handlers: Vec<ConnHandler>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = thread::spawn(move || {
            for handler in handlers {
                let (stream, _) = listener.accept().unwrap();
                handler(stream);
            }
        });
        MockAdbServer {
            addr,
            handle: Some(handle),
        }
    }

    /// 等待全部连接处理完毕; server 线程内的 panic 在这里冒出来。
    pub fn join(mut self) {
        if let Some(handle) = self.handle.take() {
            handle.join().unwrap();
        }
    }
}

/// 连接 mock server 的客户端。构造探测连接由调用方在脚本里补上
/// ([`probe`] 通常是第一个 handler)。
pub fn connect_client(addr: SocketAddr) -> AdbClient {
    AdbClient::with_config(AdbSocketConfig::new(addr.ip().to_string(), addr.port())).unwrap()
}

/// 接受后立即关闭, 对应 AdbClient 构造时的探测连接。
pub fn probe() -> ConnHandler {
    Box::new(|_stream| {})
}

/// 读取一条封帧命令, 上报后写回 reply 并关闭连接。
pub fn framed_exchange(reply: Vec<u8>, record: Sender<String>) -> ConnHandler {
    Box::new(move |mut stream| {
        let command = read_framed_command(&mut stream);
        record.send(command).unwrap();
        stream.write_all(&reply).unwrap();
    })
}

/// 读取一条封帧命令并上报, 不回包直接关闭 (host:kill 的行为)。
pub fn framed_sink(record: Sender<String>) -> ConnHandler {
    Box::new(move |mut stream| {
        let command = read_framed_command(&mut stream);
        record.send(command).unwrap();
    })
}

/// 设备作用域交换: 先应答 host:transport:<serial>, 再应答一条服务命令。
pub fn device_exchange(service_reply: Vec<u8>, record: Sender<String>) -> ConnHandler {
    Box::new(move |mut stream| {
        let transport_cmd = read_framed_command(&mut stream);
        record.send(transport_cmd).unwrap();
        stream.write_all(b"OKAY").unwrap();

        let service_cmd = read_framed_command(&mut stream);
        record.send(service_cmd).unwrap();
        stream.write_all(&service_reply).unwrap();
    })
}

/// 读取一条 `%04x` 长度前缀的命令。
pub fn read_framed_command(stream: &mut TcpStream) -> String {
    let mut len_buf = [0u8; 4];
    stream.read_exact(&mut len_buf).unwrap();
    let len = usize::from_str_radix(std::str::from_utf8(&len_buf).unwrap(), 16).unwrap();
    let mut cmd = vec![0u8; len];
    stream.read_exact(&mut cmd).unwrap();
    String::from_utf8(cmd).unwrap()
}

/// 读取一个 8 字节 SYNC 帧头。
pub fn read_sync_header(stream: &mut TcpStream) -> (String, u32) {
    let mut tag = [0u8; 4];
    stream.read_exact(&mut tag).unwrap();
    let mut value = [0u8; 4];
    stream.read_exact(&mut value).unwrap();
    (
        String::from_utf8(tag.to_vec()).unwrap(),
        u32::from_le_bytes(value),
    )
}

pub fn read_payload(stream: &mut TcpStream, len: u32) -> Vec<u8> {
    let mut payload = vec![0u8; len as usize];
    stream.read_exact(&mut payload).unwrap();
    payload
}

/// `OKAY` + `%04x` 长度前缀负载。
pub fn okay_with_payload(payload: &str) -> Vec<u8> {
    let mut reply = b"OKAY".to_vec();
    reply.extend_from_slice(format!("{:04x}", payload.len()).as_bytes());
    reply.extend_from_slice(payload.as_bytes());
    reply
}

/// 纯状态 `OKAY`。
pub fn okay() -> Vec<u8> {
    b"OKAY".to_vec()
}

/// `FAIL` + 长度前缀错误文本。
pub fn fail_with_message(message: &str) -> Vec<u8> {
    let mut reply = b"FAIL".to_vec();
    reply.extend_from_slice(format!("{:04x}", message.len()).as_bytes());
    reply.extend_from_slice(message.as_bytes());
    reply
}

/// 8 字节 SYNC 帧 (+ 可选负载)。
pub fn sync_frame(tag: &str, value: u32, payload: &[u8]) -> Vec<u8> {
    let mut frame = tag.as_bytes().to_vec();
    frame.extend_from_slice(&value.to_le_bytes());
    frame.extend_from_slice(payload);
    frame
}

/// LIST 应答里的一个 DENT 帧。
pub fn dent_frame(mode: u32, size: u32, mtime: u32, name: &str) -> Vec<u8> {
    let mut frame = b"DENT".to_vec();
    for value in [mode, size, mtime, name.len() as u32] {
        frame.extend_from_slice(&value.to_le_bytes());
    }
    frame.extend_from_slice(name.as_bytes());
    frame
}
