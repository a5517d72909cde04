//! 相册备份错误类型定义

use common::FetchError;

/// 相册备份的错误类型
#[derive(Debug)]
pub enum AlbumError {
    /// 输入的相册地址无效
    Input(String),
    /// 网络请求错误（传输失败或非 2xx 状态码）
    Fetch(FetchError),
    /// 列表页结构无法识别
    Parse(String),
    /// 详情页中找不到原图
    Resolution(String),
    /// 翻页链接成环或超出页数上限
    PaginationLoop(String),
    /// 本地文件读写错误
    Io(std::io::Error),
}

impl std::fmt::Display for AlbumError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Input(msg) => write!(f, "无效的相册地址: {}", msg),
            Self::Fetch(e) => write!(f, "{}", e),
            Self::Parse(msg) => write!(f, "解析页面失败: {}", msg),
            Self::Resolution(msg) => write!(f, "解析原图地址失败: {}", msg),
            Self::PaginationLoop(msg) => write!(f, "翻页异常: {}", msg),
            Self::Io(e) => write!(f, "文件读写失败: {}", e),
        }
    }
}

impl std::error::Error for AlbumError {}

impl From<FetchError> for AlbumError {
    fn from(error: FetchError) -> Self {
        Self::Fetch(error)
    }
}

impl From<std::io::Error> for AlbumError {
    fn from(error: std::io::Error) -> Self {
        Self::Io(error)
    }
}

pub type AlbumResult<T> = std::result::Result<T, AlbumError>;
