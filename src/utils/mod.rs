use crate::errors::AdbResult;
use std::net::TcpListener;
use tracing::Level;

/// 初始化日志订阅器, 供测试与示例使用。重复调用是幂等的。
pub fn init_logger() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_target(true)
        .with_thread_names(true)
        .try_init();
}

/// 向内核要一个空闲的本地端口。
pub fn get_free_port() -> AdbResult<u16> {
    let socket = TcpListener::bind("127.0.0.1:0")?;
    Ok(socket.local_addr()?.port())
}
