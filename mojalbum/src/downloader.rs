//! 下载控制器
//!
//! 串行执行：先遍历相册的所有分页收集照片条目，再逐张解析原图并落盘。
//! 列表页出错会中止整次备份；单张照片出错只记一次失败，继续往下走。

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use common::{PageSource, convert_bytes};

use crate::album::AlbumReference;
use crate::error::{AlbumError, AlbumResult};
use crate::page::{ListingPage, PhotoEntry};
use crate::resolve::resolve_image_url;

/// 翻页数量上限，防御异常的"下一页"链接
const MAX_PAGES: usize = 50;

/// 状态清单文件名
const MANIFEST_FILE: &str = "manifest.json";

/// 单张照片的最终状态，记录在状态清单里
///
/// 清单只用来区分"文件已存在"和"上次下载失败"，
/// 是否跳过照片始终只看文件是否存在。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    Downloaded,
    Failed,
}

/// 一次备份运行的统计结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DownloadReport {
    pub downloaded: usize,
    pub skipped: usize,
    pub failed: usize,
    pub total: usize,
}

/// 下载控制器
pub struct Downloader<'a> {
    source: &'a dyn PageSource,
    album: AlbumReference,
    dest_dir: PathBuf,
}

impl<'a> Downloader<'a> {
    /// 创建控制器，照片保存到当前目录下的 `<所有者>_<相册>_photos/`
    pub fn new(source: &'a dyn PageSource, album: AlbumReference) -> Self {
        let dest_dir = PathBuf::from(album.dir_name());
        Self {
            source,
            album,
            dest_dir,
        }
    }

    /// 创建控制器并指定保存目录
    pub fn with_dest_dir(
        source: &'a dyn PageSource,
        album: AlbumReference,
        dest_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            source,
            album,
            dest_dir: dest_dir.into(),
        }
    }

    /// 照片保存目录
    pub fn dest_dir(&self) -> &Path {
        &self.dest_dir
    }

    /// 执行一次完整备份
    pub async fn run(&self) -> AlbumResult<DownloadReport> {
        log::info!(
            "Backing up album {} (owner: {}, slug: {})",
            self.album.url(),
            self.album.owner(),
            self.album.slug()
        );

        fs::create_dir_all(&self.dest_dir)?;

        let entries = self.collect_entries().await?;
        let mut manifest = load_manifest(&self.dest_dir);

        let mut report = DownloadReport {
            total: entries.len(),
            ..Default::default()
        };

        for (index, entry) in entries.iter().enumerate() {
            let filename = format!("{}.jpg", entry.id);
            let path = self.dest_dir.join(&filename);

            log::info!("Photo {}/{} (ID {})", index + 1, entries.len(), entry.id);

            if path.exists() {
                log::info!("Already exists, skipping: {}", filename);
                manifest
                    .entry(entry.id.clone())
                    .or_insert(EntryStatus::Downloaded);
                report.skipped += 1;
                continue;
            }

            match self.download_entry(entry, &path).await {
                Ok(size) => {
                    log::info!("Saved {} ({})", filename, convert_bytes(size as f64));
                    manifest.insert(entry.id.clone(), EntryStatus::Downloaded);
                    report.downloaded += 1;
                }
                Err(e) => {
                    log::warn!("Failed to download photo {}: {}", entry.id, e);
                    manifest.insert(entry.id.clone(), EntryStatus::Failed);
                    report.failed += 1;
                }
            }
        }

        save_manifest(&self.dest_dir, &manifest);

        log::info!(
            "Album backup finished: {} downloaded, {} skipped, {} failed, {} total",
            report.downloaded,
            report.skipped,
            report.failed,
            report.total
        );

        Ok(report)
    }

    /// 遍历相册的所有分页，收集去重后的照片条目
    ///
    /// 按 ID 去重并保持首次出现的顺序。终止条件：没有下一页，
    /// 或当前页没有产生新照片。下一页指回访问过的页面或页数
    /// 超过上限时直接报错，不再发请求。
    async fn collect_entries(&self) -> AlbumResult<Vec<PhotoEntry>> {
        let mut entries: Vec<PhotoEntry> = Vec::new();
        let mut seen_ids: HashSet<String> = HashSet::new();
        let mut visited: HashSet<String> = HashSet::new();
        let mut current = self.album.url().to_string();

        loop {
            if visited.len() >= MAX_PAGES {
                return Err(AlbumError::PaginationLoop(format!(
                    "翻页超过 {} 页上限: {}",
                    MAX_PAGES, current
                )));
            }

            log::info!("Fetching page {}: {}", visited.len() + 1, current);
            let html = self.source.fetch_html(&current).await?;
            let page = ListingPage::parse(&current, &html)?;
            visited.insert(page_key(&current));

            let captioned = page.entries.iter().filter(|e| e.has_caption).count();
            let mut new_count = 0;
            for entry in page.entries {
                if seen_ids.insert(entry.id.clone()) {
                    entries.push(entry);
                    new_count += 1;
                }
            }
            log::info!(
                "Found {} new photos on this page ({} captioned)",
                new_count,
                captioned
            );

            if new_count == 0 {
                log::info!("No new photos, stopping pagination");
                break;
            }

            match page.next_url {
                None => break,
                Some(next) if visited.contains(&page_key(&next)) => {
                    return Err(AlbumError::PaginationLoop(format!(
                        "下一页链接指回已访问过的页面: {}",
                        next
                    )));
                }
                Some(next) => current = next,
            }
        }

        log::info!(
            "Collected {} photos across {} pages",
            entries.len(),
            visited.len()
        );
        Ok(entries)
    }

    /// 下载单张照片：解析原图地址、抓取内容并写入文件，返回字节数
    async fn download_entry(&self, entry: &PhotoEntry, path: &Path) -> AlbumResult<usize> {
        let image_url = resolve_image_url(self.source, entry).await?;
        let bytes = self.source.fetch_bytes(&image_url).await?;
        fs::write(path, &bytes)?;
        Ok(bytes.len())
    }
}

/// 访问记录用的页面键，忽略末尾斜杠差异
fn page_key(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}

/// 读取状态清单，缺失或损坏时从空清单开始
fn load_manifest(dir: &Path) -> BTreeMap<String, EntryStatus> {
    let path = dir.join(MANIFEST_FILE);
    match fs::read_to_string(&path) {
        Ok(text) => match serde_json::from_str(&text) {
            Ok(map) => map,
            Err(e) => {
                log::warn!("Ignoring corrupt manifest {}: {}", path.display(), e);
                BTreeMap::new()
            }
        },
        Err(_) => BTreeMap::new(),
    }
}

/// 写回状态清单，失败只告警，不影响备份结果
fn save_manifest(dir: &Path, manifest: &BTreeMap<String, EntryStatus>) {
    if manifest.is_empty() {
        return;
    }

    let path = dir.join(MANIFEST_FILE);
    match serde_json::to_string_pretty(manifest) {
        Ok(json) => {
            if let Err(e) = fs::write(&path, json) {
                log::warn!("Failed to write manifest {}: {}", path.display(), e);
            }
        }
        Err(e) => log::warn!("Failed to serialize manifest: {}", e),
    }
}
