//! 相册列表页解析

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use common::join_url;

use crate::error::{AlbumError, AlbumResult};

// ==== 页面结构 ====
// 列表页的结构约定集中在这里，站点改版时只改这一处

static GRID_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div#AlbumPhotosInner").unwrap());
static CELL_SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("div.photo").unwrap());
static THUMB_SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("img[src]").unwrap());
static LINK_SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a[href]").unwrap());
static NEXT_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.pager a.next[href]").unwrap());

// ==== 缩略图地址 ====

// 无描述布局：缩略图文件名就是照片 ID
// 例 https://s6.mojalbum.com/23557/4/25430895_t.jpg
static FILENAME_ID_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/(\d+)_t\.jpg$").unwrap());

// 有描述布局：文件名是描述串，ID 挂在倒数第三段路径的末尾
// 例 https://s6.mojalbum.com/5372926_5372935_25430895/dopust-2009/10-let-neze_t.jpg
static SEGMENT_ID_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/[^/]+_(\d+)/[^/]+/[^/]+_t\.jpg$").unwrap());

/// 列表页中的一张照片
#[derive(Debug, Clone)]
pub struct PhotoEntry {
    /// 照片数字 ID，也是保存时的文件名
    pub id: String,
    /// 原图地址（无描述布局）或照片详情页地址（有描述布局）
    pub source_url: String,
    /// 是否为有描述布局
    pub has_caption: bool,
}

/// 解析后的相册列表页
#[derive(Debug, Clone)]
pub struct ListingPage {
    pub entries: Vec<PhotoEntry>,
    /// 下一页地址，最后一页为 None
    pub next_url: Option<String>,
}

impl ListingPage {
    /// 从 HTML 解析列表页
    ///
    /// 只在相册自己的照片容器里提取条目，页面底部的"相似相册"
    /// 推荐块（#ClassifiedRecommendationsInner）不会被选中。
    pub fn parse(page_url: &str, html: &str) -> AlbumResult<Self> {
        let document = Html::parse_document(html);

        let grid = document.select(&GRID_SELECTOR).next().ok_or_else(|| {
            AlbumError::Parse("未找到相册照片容器，页面结构可能已改变".to_string())
        })?;

        let mut entries = Vec::new();
        for cell in grid.select(&CELL_SELECTOR) {
            match parse_cell(page_url, cell) {
                Some(entry) => entries.push(entry),
                None => log::warn!("Skipping malformed photo cell on {}", page_url),
            }
        }

        let next_url = extract_next_url(page_url, &document);

        Ok(Self { entries, next_url })
    }
}

/// 解析单个照片格子，结构不完整时返回 None
///
/// 两种布局用缩略图地址的形状区分：文件名是数字 ID 的是无描述布局，
/// 原图地址可以直接推出来；文件名是描述串的要走详情页二次解析。
fn parse_cell(page_url: &str, cell: ElementRef<'_>) -> Option<PhotoEntry> {
    let thumb_src = cell
        .select(&THUMB_SELECTOR)
        .filter_map(|img| img.value().attr("src"))
        .find(|src| src.contains("mojalbum.com") && src.contains("_t.jpg"))?;

    if let Some(caps) = FILENAME_ID_REGEX.captures(thumb_src) {
        return Some(PhotoEntry {
            id: caps[1].to_string(),
            source_url: thumb_to_full(thumb_src),
            has_caption: false,
        });
    }

    let caps = SEGMENT_ID_REGEX.captures(thumb_src)?;
    let href = cell
        .select(&LINK_SELECTOR)
        .filter_map(|a| a.value().attr("href"))
        .next()?;
    let detail_url = join_url(page_url, href).ok()?;

    Some(PhotoEntry {
        id: caps[1].to_string(),
        source_url: detail_url,
        has_caption: true,
    })
}

/// 缩略图地址转原图地址：去掉文件名中的 _t 后缀
pub(crate) fn thumb_to_full(thumb_url: &str) -> String {
    match thumb_url.rsplit_once("_t.") {
        Some((prefix, ext)) if !ext.contains('/') => format!("{}.{}", prefix, ext),
        _ => thumb_url.to_string(),
    }
}

/// 提取下一页链接：存在、非空且不指向当前页时返回绝对地址
fn extract_next_url(page_url: &str, document: &Html) -> Option<String> {
    let href = document
        .select(&NEXT_SELECTOR)
        .filter_map(|a| a.value().attr("href"))
        .find(|h| !h.is_empty() && *h != "#")?;

    let next = join_url(page_url, href).ok()?;

    if same_page(&next, page_url) {
        None
    } else {
        Some(next)
    }
}

/// 忽略末尾斜杠比较两个页面地址
fn same_page(a: &str, b: &str) -> bool {
    a.trim_end_matches('/') == b.trim_end_matches('/')
}
