//! MojAlbum 相册备份核心库
//!
//! 负责解析 mojalbum.com 的相册页面，找出每张照片的原图地址，
//! 并把图片下载到本地目录。
//!
//! # 模块结构
//!
//! - [`album`] - 相册地址解析
//! - [`page`] - 列表页数据结构
//! - [`resolve`] - 原图地址解析
//! - [`downloader`] - 下载控制器
//! - [`error`] - 错误类型定义

mod album;
mod downloader;
mod error;
mod page;
mod resolve;

pub use album::AlbumReference;
pub use downloader::{DownloadReport, Downloader, EntryStatus};
pub use error::{AlbumError, AlbumResult};
pub use page::{ListingPage, PhotoEntry};
pub use resolve::resolve_image_url;
