//! 原图地址解析
//!
//! 无描述布局的条目在列表页就能拿到原图地址；有描述布局的条目
//! 要再抓一次详情页，从里面找回属于这张照片的原图。列表页上只有
//! 缩略图，跳过这一步会把备份质量降级成缩略图。

use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};

use common::{PageSource, is_image_url};

use crate::error::{AlbumError, AlbumResult};
use crate::page::PhotoEntry;

static IMG_SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("img[src]").unwrap());
static ANCHOR_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").unwrap());

// 原图地址形如 https://s6.mojalbum.com/<…>_<ID>/<相册路径>/<文件名>.jpg
static FULL_IMG_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://s\d+\.mojalbum\.com/[^/]+_(\d+)/[^/]+/[^/?#]+\.jpe?g$").unwrap()
});

/// 解析照片的原图地址，必要时抓取详情页
pub async fn resolve_image_url(
    source: &dyn PageSource,
    entry: &PhotoEntry,
) -> AlbumResult<String> {
    // 地址本身指向图片文件时无需二次解析
    if is_image_url(&entry.source_url) {
        return Ok(entry.source_url.clone());
    }

    let html = source.fetch_html(&entry.source_url).await?;
    extract_detail_image(&html, &entry.id).ok_or_else(|| {
        AlbumError::Resolution(format!(
            "详情页中没有 ID 为 {} 的原图: {}",
            entry.id, entry.source_url
        ))
    })
}

/// 在详情页 HTML 中寻找属于指定照片的原图地址
///
/// 详情页上还有相邻照片的缩略图和推荐内容，必须用照片 ID 锚定，
/// 缩略图（_t 后缀）不算原图。
pub(crate) fn extract_detail_image(html: &str, id: &str) -> Option<String> {
    let document = Html::parse_document(html);

    let owns = |url: &str| {
        !url.ends_with("_t.jpg")
            && !url.ends_with("_t.jpeg")
            && FULL_IMG_REGEX
                .captures(url)
                .is_some_and(|caps| &caps[1] == id)
    };

    // 优先取页面主图
    if let Some(src) = document
        .select(&IMG_SELECTOR)
        .filter_map(|img| img.value().attr("src"))
        .find(|src| owns(src))
    {
        return Some(src.to_string());
    }

    // 部分页面用链接指向原图
    document
        .select(&ANCHOR_SELECTOR)
        .filter_map(|a| a.value().attr("href"))
        .find(|href| owns(href))
        .map(str::to_string)
}
