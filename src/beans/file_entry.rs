use chrono::{DateTime, Utc};

/// mode 字段中的目录位
const DIR_BIT: u32 = 1 << 14;

/// LIST 返回的一条远端目录项
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFileEntry {
    pub name: String,
    pub mode: u32,
    /// SYNC 协议只携带 32 位长度, 超过 4 GiB 的文件按截断值报告
    pub size: u32,
    /// unix 秒
    pub mtime: u32,
}

impl RemoteFileEntry {
    /// 是否为目录
    pub fn is_dir(&self) -> bool {
        self.mode & DIR_BIT != 0
    }

    /// mtime 的 DateTime 视图
    pub fn modified(&self) -> Option<DateTime<Utc>> {
        DateTime::<Utc>::from_timestamp(self.mtime as i64, 0)
    }
}
