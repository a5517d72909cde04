//! 共用工具函数库
//!
//! 这个模块包含了整个workspace中可能用到的通用工具函数。
use anyhow::Result;
use human_bytes::human_bytes;
use url::Url;
pub mod fetch;
pub use fetch::*;

pub const GENERAL_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// 使用url库安全地拼接URL，避免斜杠重复
pub fn join_url(base: &str, path: &str) -> Result<String> {
    let base_url = Url::parse(base)?;
    let joined = base_url.join(path)?;
    Ok(joined.to_string())
}

/// 将字节数转换为人类可读的格式
pub fn convert_bytes<T: Into<f64>>(bytes: T) -> String {
    human_bytes(bytes.into())
}

/// 根据URL路径的扩展名判断是否直接指向图片文件
pub fn is_image_url(url: &str) -> bool {
    use std::path::Path;

    if let Ok(parsed_url) = Url::parse(url) {
        let path = parsed_url.path();
        if let Some(extension) = Path::new(path).extension() {
            if let Some(ext_str) = extension.to_str() {
                return matches!(
                    ext_str.to_lowercase().as_str(),
                    "jpg" | "jpeg" | "png" | "gif" | "webp"
                );
            }
        }
    }

    false
}
