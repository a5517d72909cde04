use std::io::Write;
use std::time::Duration;

use common::{FetchConfig, HttpFetcher};
use mojalbum::{AlbumReference, DownloadReport, Downloader};


/// 默认请求间隔（秒）
const DEFAULT_DELAY_SECS: f64 = 1.0;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    println!("=== MojAlbum 相册备份工具 ===");
    println!("⚠️ mojalbum.com 将于 2025-10-24 停止服务，请尽快备份相册");
    println!();

    let album = match prompt_album() {
        Some(album) => album,
        None => {
            eprintln!("未能读取相册地址");
            std::process::exit(1);
        }
    };

    let delay = prompt_delay();

    let config = FetchConfig {
        delay: Duration::from_secs_f64(delay),
        ..FetchConfig::default()
    };
    let fetcher = match HttpFetcher::new(config) {
        Ok(fetcher) => fetcher,
        Err(e) => {
            log::error!("Failed to build HTTP client: {}", e);
            std::process::exit(1);
        }
    };

    log::info!(
        "Starting backup of {} (delay: {}s)",
        album.url(),
        delay
    );

    let downloader = Downloader::new(&fetcher, album);
    match downloader.run().await {
        Ok(report) => {
            println!();
            println!("{}", summary_table(&report));
            println!();
            println!("照片保存在: {}", downloader.dest_dir().display());
        }
        Err(e) => {
            log::error!("Album backup failed: {}", e);
            eprintln!("备份失败: {}", e);
            std::process::exit(1);
        }
    }
}

/// 循环读取相册地址直到合法，输入流结束时返回 None
fn prompt_album() -> Option<AlbumReference> {
    loop {
        let line = read_line("请输入相册地址 (如 https://mojalbum.com/janez/dopust-2009): ")?;
        match AlbumReference::parse(&line) {
            Ok(album) => return Some(album),
            Err(e) => println!("{}", e),
        }
    }
}

/// 读取请求间隔秒数，输入流结束时使用默认值
fn prompt_delay() -> f64 {
    match read_line("请输入请求间隔秒数 (默认 1): ") {
        Some(line) => parse_delay(&line),
        None => DEFAULT_DELAY_SECS,
    }
}

/// 解析用户输入的间隔秒数，空输入或非法输入退回默认值
fn parse_delay(input: &str) -> f64 {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return DEFAULT_DELAY_SECS;
    }

    match trimmed.parse::<f64>() {
        Ok(secs) if secs.is_finite() && secs >= 0.0 => secs,
        _ => {
            println!("无法识别的间隔，使用默认值 {} 秒", DEFAULT_DELAY_SECS);
            DEFAULT_DELAY_SECS
        }
    }
}

/// 输出提示并读取一行输入，EOF 或读取失败时返回 None
fn read_line(prompt: &str) -> Option<String> {
    print!("{}", prompt);
    std::io::stdout().flush().ok()?;

    let mut line = String::new();
    match std::io::stdin().read_line(&mut line) {
        Ok(0) => None,
        Ok(_) => Some(line.trim().to_string()),
        Err(_) => None,
    }
}

/// 生成备份结果统计表
fn summary_table(report: &DownloadReport) -> String {
    use tabled::{Table, settings::Style};

    let rows = vec![
        vec!["已下载".to_string(), report.downloaded.to_string()],
        vec!["已跳过".to_string(), report.skipped.to_string()],
        vec!["失败".to_string(), report.failed.to_string()],
        vec!["合计".to_string(), report.total.to_string()],
    ];

    let mut table = Table::from_iter(rows);
    table.with(Style::empty());
    table.to_string()
}
