//! 相册地址解析

use url::Url;

use crate::error::{AlbumError, AlbumResult};

/// 目标站点域名
const ALBUM_HOST: &str = "mojalbum.com";

/// 相册引用
///
/// 规范化后的相册首页地址，以及从路径中提取的所有者和相册名。
/// 路径形如 `/<所有者>/<相册名>`，部分相册前面还带栏目段。
#[derive(Debug, Clone)]
pub struct AlbumReference {
    url: String,
    owner: String,
    slug: String,
}

impl AlbumReference {
    /// 解析用户输入的相册地址
    ///
    /// 规范化规则：
    /// - 缺少协议时补全 `https://`
    /// - 丢弃查询串和片段
    /// - 路径末尾的纯数字段视为页码并去掉（去掉后至少要剩两段路径）
    pub fn parse(input: &str) -> AlbumResult<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(AlbumError::Input("地址为空".to_string()));
        }

        let candidate = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            trimmed.to_string()
        } else {
            format!("https://{}", trimmed)
        };

        let mut parsed =
            Url::parse(&candidate).map_err(|e| AlbumError::Input(format!("{}: {}", trimmed, e)))?;

        let host_ok = parsed
            .host_str()
            .is_some_and(|h| h == ALBUM_HOST || h.ends_with(&format!(".{}", ALBUM_HOST)));
        if !host_ok {
            return Err(AlbumError::Input(format!(
                "不是 {} 的链接: {}",
                ALBUM_HOST, trimmed
            )));
        }

        let mut segments: Vec<String> = parsed
            .path_segments()
            .map(|s| s.filter(|p| !p.is_empty()).map(str::to_string).collect())
            .unwrap_or_default();

        // 末尾纯数字段是页码；只有两段时不去掉，相册名本身可能是数字
        if segments.len() >= 3
            && segments
                .last()
                .is_some_and(|s| s.chars().all(|c| c.is_ascii_digit()))
        {
            segments.pop();
        }

        if segments.len() < 2 {
            return Err(AlbumError::Input(format!(
                "地址中缺少 所有者/相册 路径: {}",
                trimmed
            )));
        }

        let owner = segments[segments.len() - 2].clone();
        let slug = segments[segments.len() - 1].clone();

        parsed.set_path(&segments.join("/"));
        parsed.set_query(None);
        parsed.set_fragment(None);

        Ok(Self {
            url: parsed.to_string(),
            owner,
            slug,
        })
    }

    /// 规范化后的相册首页地址
    pub fn url(&self) -> &str {
        &self.url
    }

    /// 相册所有者
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// 相册名
    pub fn slug(&self) -> &str {
        &self.slug
    }

    /// 照片保存目录名
    pub fn dir_name(&self) -> String {
        format!("{}_{}_photos", self.owner, self.slug)
    }
}
