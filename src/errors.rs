use thiserror::Error;

/// ADB操作中可能出现的错误类型
#[derive(Error, Debug)]
pub enum AdbError {
    /// socket 建连、读写或超时失败
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// 读或写尚未完成时对端返回了零字节
    #[error("socket connection broken")]
    ConnectionBroken,

    /// 协议级错误: 非法状态字节、长度字段或未知的 SYNC 标签
    #[error("protocol error: {message}")]
    Protocol { message: String },

    /// 服务端返回 FAIL, 携带其给出的错误文本
    #[error("command failed: {message}")]
    CommandFailed { message: String },

    /// 设备缺少被访问的属性
    #[error("does not have attribute: {key}")]
    AttributeMissing { key: String },

    /// shell 命令去除空白后为空
    #[error("shell command cannot be empty")]
    EmptyCommand,

    /// devices-l 枚举时累积的非致命解析警告
    #[error(transparent)]
    Warnings(#[from] Warnings),
}

/// 专门用于结果类型的别名
pub type AdbResult<T> = Result<T, AdbError>;

/// `AdbClient::list` 累积的解析警告集合。
/// 它与部分枚举结果并存, 而不是替代结果。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("warnings: {}", .0.join(", "))]
pub struct Warnings(pub Vec<String>);

impl AdbError {
    /// 创建协议错误
    pub fn protocol<S: Into<String>>(message: S) -> Self {
        AdbError::Protocol {
            message: message.into(),
        }
    }

    /// 创建命令执行失败错误
    pub fn command_failed<S: Into<String>>(message: S) -> Self {
        AdbError::CommandFailed {
            message: message.into(),
        }
    }

    /// 创建属性缺失错误
    pub fn attribute_missing<S: Into<String>>(key: S) -> Self {
        AdbError::AttributeMissing { key: key.into() }
    }

    /// 检查是否为可重试的错误
    pub fn is_retryable(&self) -> bool {
        matches!(self, AdbError::Io(_) | AdbError::ConnectionBroken)
    }

    /// 获取错误的简短描述
    pub fn error_code(&self) -> &'static str {
        match self {
            AdbError::Io(_) => "IO_ERROR",
            AdbError::ConnectionBroken => "CONNECTION_BROKEN",
            AdbError::Protocol { .. } => "PROTOCOL_ERROR",
            AdbError::CommandFailed { .. } => "COMMAND_FAILED",
            AdbError::AttributeMissing { .. } => "ATTRIBUTE_MISSING",
            AdbError::EmptyCommand => "EMPTY_COMMAND",
            AdbError::Warnings(_) => "WARNINGS",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_error() {
        let err = AdbError::protocol("unexpected status: \"WHAT\"");
        assert_eq!(err.error_code(), "PROTOCOL_ERROR");
        assert!(!err.is_retryable());
        assert_eq!(
            format!("{}", err),
            "protocol error: unexpected status: \"WHAT\""
        );
    }

    #[test]
    fn test_command_failed() {
        let err = AdbError::command_failed("device 'x' not found");
        assert_eq!(err.error_code(), "COMMAND_FAILED");
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_connection_broken_is_retryable() {
        assert!(AdbError::ConnectionBroken.is_retryable());
    }

    #[test]
    fn test_attribute_missing_display() {
        let err = AdbError::attribute_missing("usb");
        assert_eq!(format!("{}", err), "does not have attribute: usb");
    }

    #[test]
    fn test_warnings_display() {
        let warnings = Warnings(vec![
            "invalid line: \"bad\"".to_string(),
            "invalid line: \"worse\"".to_string(),
        ]);
        assert_eq!(
            format!("{}", warnings),
            "warnings: invalid line: \"bad\", invalid line: \"worse\""
        );

        let err: AdbError = warnings.into();
        assert_eq!(err.error_code(), "WARNINGS");
    }
}
