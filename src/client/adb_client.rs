use crate::beans::ForwardItem;
use crate::client::adb_device::AdbDevice;
use crate::connections::{
    AdbSocketConfig, AdbTransport, DEFAULT_ADB_DAEMON_PORT, DEFAULT_ADB_SERVER_PORT,
};
use crate::errors::{AdbError, AdbResult, Warnings};
use log::warn;
use std::collections::HashMap;

/// 与 adb server 通信的客户端。
///
/// 构造时做一次探测连接验证 server 可达; 之后每个操作各自建立并关闭
/// 一条连接, 没有连接池。构造完成后不再持有可变状态, 可自由克隆与
/// 跨线程共享; server 之后宕掉只会让下一次调用报 IO 错误, 客户端
/// 本身不会失效。
#[derive(Debug, Clone)]
pub struct AdbClient {
    config: AdbSocketConfig,
}

impl AdbClient {
    /// 连接默认的 localhost:5037。
    pub fn new() -> AdbResult<Self> {
        Self::with_config(AdbSocketConfig::default())
    }

    /// 指定主机, 端口取默认值 5037。
    pub fn with_host<T: Into<String>>(host: T) -> AdbResult<Self> {
        Self::with_config(AdbSocketConfig::new(host, DEFAULT_ADB_SERVER_PORT))
    }

    /// 指定主机与端口。
    pub fn with_host_and_port<T: Into<String>>(host: T, port: u16) -> AdbResult<Self> {
        Self::with_config(AdbSocketConfig::new(host, port))
    }

    /// 使用完整配置构造, 并以一次探测连接验证 server 可达。
    pub fn with_config(config: AdbSocketConfig) -> AdbResult<Self> {
        let probe = AdbTransport::connect(&config)?;
        drop(probe);
        Ok(Self { config })
    }

    pub fn config(&self) -> &AdbSocketConfig {
        &self.config
    }

    /// 获取 adb server 的版本号。
    ///
    /// # 返回值
    /// `host:version` 负载按十六进制解析后的版本号;
    /// 负载不是合法十六进制时返回协议错误。
    pub fn version(&self) -> AdbResult<u32> {
        let resp = self.execute_command("host:version")?;
        u32::from_str_radix(&resp, 16)
            .map_err(|_| AdbError::protocol(format!("invalid version payload: {:?}", resp)))
    }

    /// 列出所有已连接设备的序列号。
    /// 每个非空行取第一个以空白分隔的字段, 空行静默跳过。
    pub fn serial_list(&self) -> AdbResult<Vec<String>> {
        let resp = self.execute_command("host:devices")?;
        let mut serials = vec![];
        for line in resp.lines() {
            if let Some(serial) = line.split_whitespace().next() {
                serials.push(serial.to_string());
            }
        }
        Ok(serials)
    }

    /// `host:devices-l` 枚举所有设备及其属性。
    ///
    /// 格式异常的行被累积为警告而不中断枚举; 返回值是部分结果与
    /// 警告的组合, 二者并存。
    ///
    /// # 返回值
    /// `(devices, warnings)`: 解析成功的设备列表, 以及若有警告时的
    /// [`Warnings`] 集合。
    pub fn list(&self) -> AdbResult<(Vec<AdbDevice>, Option<Warnings>)> {
        let resp = self.execute_command("host:devices-l")?;
        let mut devices = vec![];
        let mut warnings = vec![];
        'lines: for raw in resp.lines() {
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }

            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() < 5 {
                warn!("skipping invalid devices-l line: {:?}", line);
                warnings.push(format!("invalid line: {:?}", line));
                continue;
            }

            let mut attrs = HashMap::new();
            for field in &fields[2..] {
                // 第一个冒号分割 key:value
                match field.split_once(':') {
                    Some((key, value)) => {
                        attrs.insert(key.to_string(), value.to_string());
                    }
                    None => {
                        warn!("skipping invalid devices-l line: {:?}", line);
                        warnings.push(format!("invalid line: {:?}", line));
                        continue 'lines;
                    }
                }
            }
            devices.push(AdbDevice::with_attrs(fields[0], attrs, self.clone()));
        }

        let warnings = if warnings.is_empty() {
            None
        } else {
            Some(Warnings(warnings))
        };
        Ok((devices, warnings))
    }

    /// 查询全局端口转发表。
    pub fn forward_list(&self) -> AdbResult<Vec<ForwardItem>> {
        let resp = self.execute_command("host:list-forward")?;
        let mut items = vec![];
        for raw in resp.lines() {
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() < 3 {
                warn!("skipping invalid list-forward line: {:?}", line);
                continue;
            }
            items.push(ForwardItem::new(fields[0], fields[1], fields[2]));
        }
        Ok(items)
    }

    /// 移除全部转发规则。
    pub fn forward_kill_all(&self) -> AdbResult<()> {
        self.execute_command_without_response("host:killforward-all")
    }

    /// 连接一台 TCP 模式的设备, 端口取默认值 5555。
    pub fn connect_host(&self, ip: &str) -> AdbResult<()> {
        self.connect_host_port(ip, DEFAULT_ADB_DAEMON_PORT)
    }

    /// 连接一台 TCP 模式的设备。
    /// 响应文本以 `connected to` 或 `already connected to` 开头才算成功。
    pub fn connect_host_port(&self, ip: &str, port: u16) -> AdbResult<()> {
        let resp = self.execute_command(&format!("host:connect:{}:{}", ip, port))?;
        if resp.starts_with("connected to") || resp.starts_with("already connected to") {
            Ok(())
        } else {
            Err(AdbError::command_failed(resp))
        }
    }

    /// 断开一台 TCP 设备, 端口取默认值 5555。
    pub fn disconnect_host(&self, ip: &str) -> AdbResult<()> {
        self.disconnect(&format!("{}:{}", ip, DEFAULT_ADB_DAEMON_PORT))
    }

    /// 断开一台 TCP 设备。
    pub fn disconnect_host_port(&self, ip: &str, port: u16) -> AdbResult<()> {
        self.disconnect(&format!("{}:{}", ip, port))
    }

    /// 断开所有 TCP 设备。
    pub fn disconnect_all(&self) -> AdbResult<()> {
        let resp = self.execute_command("host:disconnect:")?;
        if resp.starts_with("disconnected everything") {
            Ok(())
        } else {
            Err(AdbError::command_failed(resp))
        }
    }

    fn disconnect(&self, host_port: &str) -> AdbResult<()> {
        let resp = self.execute_command(&format!("host:disconnect:{}", host_port))?;
        if resp.starts_with("disconnected") {
            Ok(())
        } else {
            Err(AdbError::command_failed(resp))
        }
    }

    /// 关闭 adb server。
    /// server 收到 `host:kill` 后立即退出, 不回包, 因此只发不读。
    pub fn kill_server(&self) -> AdbResult<()> {
        let mut tp = AdbTransport::connect(&self.config)?;
        tp.send("host:kill")?;
        Ok(())
    }

    /// 按序列号构造设备句柄, 不经过枚举, 属性为空。
    pub fn device(&self, serial: &str) -> AdbDevice {
        AdbDevice::new(serial, self.clone())
    }

    /// 打开一条新连接, 执行单次请求并读取负载。
    pub(crate) fn execute_command(&self, command: &str) -> AdbResult<String> {
        let mut tp = AdbTransport::connect(&self.config)?;
        tp.send(command)?;
        tp.verify_response()?;
        tp.unpack_string()
    }

    /// 打开一条新连接, 执行单次请求, 仅校验状态。
    pub(crate) fn execute_command_without_response(&self, command: &str) -> AdbResult<()> {
        let mut tp = AdbTransport::connect(&self.config)?;
        tp.send(command)?;
        tp.verify_response()?;
        Ok(())
    }
}
