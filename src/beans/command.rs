/// shell 命令表示, 支持单个字符串或多个参数
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdbCommand {
    /// 单个命令字符串
    Single(String),
    /// 多个命令参数
    Multiple(Vec<String>),
}

impl AdbCommand {
    /// 创建单个命令
    pub fn single<S: Into<String>>(cmd: S) -> Self {
        AdbCommand::Single(cmd.into())
    }

    /// 创建多参数命令
    pub fn multiple<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        AdbCommand::Multiple(args.into_iter().map(|s| s.into()).collect())
    }

    /// 获取完整的命令字符串, 多个参数以单个空格连接
    pub fn get_command(&self) -> String {
        match self {
            AdbCommand::Single(s) => s.clone(),
            AdbCommand::Multiple(parts) => parts.join(" "),
        }
    }

    /// 去除空白后是否为空命令
    pub fn is_blank(&self) -> bool {
        self.get_command().trim().is_empty()
    }
}

// From trait 实现
impl From<String> for AdbCommand {
    fn from(s: String) -> Self {
        AdbCommand::Single(s)
    }
}

impl From<&str> for AdbCommand {
    fn from(s: &str) -> Self {
        AdbCommand::Single(s.to_string())
    }
}

impl From<Vec<String>> for AdbCommand {
    fn from(args: Vec<String>) -> Self {
        AdbCommand::Multiple(args)
    }
}

impl From<Vec<&str>> for AdbCommand {
    fn from(args: Vec<&str>) -> Self {
        AdbCommand::Multiple(args.into_iter().map(String::from).collect())
    }
}

impl<const N: usize> From<[&str; N]> for AdbCommand {
    fn from(args: [&str; N]) -> Self {
        AdbCommand::Multiple(args.into_iter().map(String::from).collect())
    }
}

impl<const N: usize> From<&[&str; N]> for AdbCommand {
    fn from(args: &[&str; N]) -> Self {
        AdbCommand::Multiple(args.iter().map(|&s| String::from(s)).collect())
    }
}

impl From<&[&str]> for AdbCommand {
    fn from(args: &[&str]) -> Self {
        AdbCommand::Multiple(args.iter().map(|&s| String::from(s)).collect())
    }
}
