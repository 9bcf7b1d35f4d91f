use crate::beans::{AdbCommand, DeviceState, ForwardItem, RemoteFileEntry};
use crate::client::adb_client::AdbClient;
use crate::connections::{
    AdbTransport, SyncTransport, DEFAULT_ADB_DAEMON_PORT, DEFAULT_PUSH_FILE_MODE,
};
use crate::errors::{AdbError, AdbResult};
use crate::utils::get_free_port;
use log::debug;
use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};
use std::net::Shutdown;
use std::path::Path;
use std::sync::mpsc::Receiver;
use std::thread;
use std::time::{SystemTime, UNIX_EPOCH};

/// 一台以序列号标识的设备。
///
/// 由 [`AdbClient::list`] 枚举产生或 [`AdbClient::device`] 直接构造。
/// 属性在构造后不可变, 句柄可自由克隆与跨线程共享; 每个操作都会
/// 新建自己的连接, 设备作用域的操作先通过 `host:transport:<serial>`
/// 把连接升级到设备。
#[derive(Debug, Clone)]
pub struct AdbDevice {
    serial: String,
    attrs: HashMap<String, String>,
    client: AdbClient,
}

impl AdbDevice {
    /// 仅凭序列号构造, 属性为空。
    pub fn new(serial: &str, client: AdbClient) -> Self {
        Self::with_attrs(serial, HashMap::new(), client)
    }

    pub(crate) fn with_attrs(
        serial: &str,
        attrs: HashMap<String, String>,
        client: AdbClient,
    ) -> Self {
        Self {
            serial: serial.to_string(),
            attrs,
            client,
        }
    }

    pub fn serial(&self) -> &str {
        &self.serial
    }

    /// 枚举时服务端给出的全部属性。
    pub fn device_info(&self) -> &HashMap<String, String> {
        &self.attrs
    }

    pub fn has_attribute(&self, key: &str) -> bool {
        self.attrs.contains_key(key)
    }

    fn attr(&self, key: &str) -> AdbResult<&str> {
        self.attrs
            .get(key)
            .map(String::as_str)
            .ok_or_else(|| AdbError::attribute_missing(key))
    }

    pub fn product(&self) -> AdbResult<&str> {
        self.attr("product")
    }

    pub fn model(&self) -> AdbResult<&str> {
        self.attr("model")
    }

    pub fn usb(&self) -> AdbResult<&str> {
        self.attr("usb")
    }

    pub fn transport_id(&self) -> AdbResult<&str> {
        self.attr("transport_id")
    }

    /// usb 属性非空即认为是 USB 连接的设备。
    pub fn is_usb(&self) -> AdbResult<bool> {
        Ok(!self.usb()?.is_empty())
    }

    /// 查询设备当前状态。
    pub fn state(&self) -> AdbResult<DeviceState> {
        let resp = self.host_serial_command("get-state")?;
        Ok(DeviceState::from_response(&resp))
    }

    /// 查询设备在 server 侧的路径。
    pub fn device_path(&self) -> AdbResult<String> {
        self.host_serial_command("get-devpath")
    }

    /// host-serial 命令: 面向指定设备但不升级连接。
    fn host_serial_command(&self, command: &str) -> AdbResult<String> {
        self.client
            .execute_command(&format!("host-serial:{}:{}", self.serial, command))
    }

    /// 建立 `tcp:<local>` 到设备侧 `tcp:<remote>` 的端口转发。
    pub fn forward(&self, local: u16, remote: u16, no_rebind: bool) -> AdbResult<()> {
        let spec = format!("tcp:{};tcp:{}", local, remote);
        let command = if no_rebind {
            format!("host-serial:{}:forward:norebind:{}", self.serial, spec)
        } else {
            format!("host-serial:{}:forward:{}", self.serial, spec)
        };
        self.client.execute_command_without_response(&command)
    }

    /// 全局转发表中属于本设备的规则。
    pub fn forward_list(&self) -> AdbResult<Vec<ForwardItem>> {
        let all = self.client.forward_list()?;
        Ok(all
            .into_iter()
            .filter(|item| item.serial == self.serial)
            .collect())
    }

    /// 移除 `tcp:<local>` 的转发规则。
    pub fn forward_kill(&self, local: u16) -> AdbResult<()> {
        self.client.execute_command_without_response(&format!(
            "host-serial:{}:killforward:tcp:{}",
            self.serial, local
        ))
    }

    /// 为远端端口找一个本地转发: 已存在的 `tcp:` 规则直接复用,
    /// 否则向内核要一个空闲端口并新建规则。
    ///
    /// # 返回值
    /// 转发到该远端端口的本地端口号。
    pub fn forward_remote_port(&self, remote: u16) -> AdbResult<u16> {
        let remote_spec = format!("tcp:{}", remote);
        for item in self.forward_list()? {
            if item.remote != remote_spec {
                continue;
            }
            if let Some(port) = item.local.strip_prefix("tcp:") {
                if let Ok(port) = port.parse::<u16>() {
                    return Ok(port);
                }
            }
        }
        let local = get_free_port()?;
        self.forward(local, remote, false)?;
        Ok(local)
    }

    /// 打开一条新连接并升级为设备传输。
    /// 升级后下一条服务命令将由设备侧 adbd 解释。
    fn create_device_transport(&self) -> AdbResult<AdbTransport> {
        let mut tp = AdbTransport::connect(self.client.config())?;
        tp.send(&format!("host:transport:{}", self.serial))?;
        tp.verify_response()?;
        Ok(tp)
    }

    /// 发送 `shell:<command>` 并交出连接。
    ///
    /// 校验 OKAY 之后 socket 上就是 shell 的输出字节流, 连接的所有权
    /// 转移给返回值, 由调用方负责读取与关闭。
    pub fn shell_stream<T: Into<AdbCommand>>(&self, command: T) -> AdbResult<AdbTransport> {
        let command = command.into();
        if command.is_blank() {
            return Err(AdbError::EmptyCommand);
        }
        let mut tp = self.create_device_transport()?;
        tp.send(&format!("shell:{}", command.get_command()))?;
        tp.verify_response()?;
        Ok(tp)
    }

    /// 执行 shell 命令, 读取全部输出直到流结束。
    pub fn run_shell_command<T: Into<AdbCommand>>(&self, command: T) -> AdbResult<String> {
        let mut tp = self.shell_stream(command)?;
        tp.read_string_all()
    }

    /// `tcpip:<port>` 让设备端 adbd 监听 TCP, 端口取默认值 5555。
    pub fn enable_adb_over_tcp(&self) -> AdbResult<()> {
        self.enable_adb_over_tcp_port(DEFAULT_ADB_DAEMON_PORT)
    }

    /// `tcpip:<port>` 让设备端 adbd 监听指定 TCP 端口。
    /// server 随后可能重启设备侧连接, 本库不做重连。
    pub fn enable_adb_over_tcp_port(&self, port: u16) -> AdbResult<()> {
        let mut tp = self.create_device_transport()?;
        tp.send(&format!("tcpip:{}", port))?;
        tp.verify_response()?;
        Ok(())
    }

    /// 列出远端目录, 按服务端给出的顺序返回目录项。
    pub fn list(&self, remote_path: &str) -> AdbResult<Vec<RemoteFileEntry>> {
        let mut sync = self.create_sync_transport()?;
        sync.send("LIST", remote_path)?;
        let mut entries = vec![];
        while let Some(entry) = sync.read_dir_entry()? {
            entries.push(entry);
        }
        Ok(entries)
    }

    /// 上传字节流到远端路径。
    ///
    /// # 参数
    /// - `source`: 数据来源, 按不超过 64 KiB 的块发送。
    /// - `mtime`: 远端落盘后的修改时间。
    /// - `mode`: 远端文件权限位。
    pub fn push<R: Read>(
        &self,
        source: &mut R,
        remote_path: &str,
        mtime: SystemTime,
        mode: u32,
    ) -> AdbResult<()> {
        let mut sync = self.create_sync_transport()?;
        sync.send("SEND", &format!("{},{}", remote_path, mode))?;
        sync.send_stream(source)?;
        let seconds = mtime
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as u32)
            .unwrap_or(0);
        sync.send_status("DONE", seconds)?;
        sync.verify_status()
    }

    /// 上传文件。未指定 mtime 时取文件自身的修改时间,
    /// 权限位取默认值 0o664。
    pub fn push_file(
        &self,
        file: &mut File,
        remote_path: &str,
        mtime: Option<SystemTime>,
    ) -> AdbResult<()> {
        let mtime = match mtime {
            Some(t) => t,
            None => file.metadata()?.modified()?,
        };
        self.push(file, remote_path, mtime, DEFAULT_PUSH_FILE_MODE)
    }

    /// 下载远端文件, 把数据块依次写入 dest。
    pub fn pull<W: Write>(&self, remote_path: &str, dest: &mut W) -> AdbResult<()> {
        let mut sync = self.create_sync_transport()?;
        sync.send("RECV", remote_path)?;
        sync.read_stream(dest)
    }

    fn create_sync_transport(&self) -> AdbResult<SyncTransport> {
        let tp = self.create_device_transport()?;
        tp.into_sync()
    }

    /// `shell:logcat` 持续拷贝日志到 dst, 直到 stop 发出信号。
    ///
    /// 取消是协作式的: 后台拷贝阻塞在 socket 读上, 信号到达后关闭
    /// socket, 拷贝在下一次读边界观察到错误并退出, 随后本调用返回。
    /// 发送端被丢弃同样视为取消, 避免调用被永久挂起。
    pub fn logcat<W: Write + Send>(&self, dst: &mut W, stop: Receiver<()>) -> AdbResult<()> {
        let mut tp = self.create_device_transport()?;
        tp.send("shell:logcat")?;
        tp.verify_response()?;

        let stream = tp.into_stream();
        let mut reader = stream.try_clone()?;
        thread::scope(|scope| {
            let copier = scope.spawn(move || {
                let _ = io::copy(&mut reader, dst);
            });
            let _ = stop.recv();
            debug!("logcat stop signal received, closing socket");
            let _ = stream.shutdown(Shutdown::Both);
            let _ = copier.join();
        });
        Ok(())
    }

    /// logcat 追加写入指定文件。
    pub fn logcat_to_file<P: AsRef<Path>>(&self, path: P, stop: Receiver<()>) -> AdbResult<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        self.logcat(&mut file, stop)
    }

    /// 清空设备端日志缓冲。
    pub fn logcat_clear(&self) -> AdbResult<()> {
        let _ = self.run_shell_command("logcat -c")?;
        Ok(())
    }
}
