/// get-state 查询得到的设备状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceState {
    Unknown,      // 服务端返回了无法识别的状态
    Online,       // 正常在线
    Offline,      // 已枚举但不可用
    Disconnected, // 空负载, 设备已断开
}

impl DeviceState {
    /// 解析 `host-serial:<serial>:get-state` 的响应负载。
    /// 未识别的文本一律映射为 `Unknown`。
    pub fn from_response(resp: &str) -> Self {
        match resp {
            "" => DeviceState::Disconnected,
            "offline" => DeviceState::Offline,
            "device" => DeviceState::Online,
            _ => DeviceState::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceState::Unknown => "unknown",
            DeviceState::Online => "online",
            DeviceState::Offline => "offline",
            DeviceState::Disconnected => "disconnected",
        }
    }
}
