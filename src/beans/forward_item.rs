/// 服务端维护的一条端口转发规则。
/// local/remote 均为 `<scheme>:<value>` 形式, 如 `tcp:5555`。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardItem {
    pub serial: String,
    pub local: String,
    pub remote: String,
}

impl ForwardItem {
    pub fn new<T>(serial: T, local: T, remote: T) -> ForwardItem
    where
        T: ToString,
    {
        ForwardItem {
            serial: serial.to_string(),
            local: local.to_string(),
            remote: remote.to_string(),
        }
    }
}
