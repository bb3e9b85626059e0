use std::fs;
use std::path::{Path, PathBuf};
use chrono::Utc;
use clap::{Arg, ArgAction, Command};
use thiserror::Error;
use walkdir::WalkDir;

use utils_common::{encode_snapshot, CatalogMetadata, CatalogSnapshot, CodecError};

mod normalize;

use normalize::{normalize_all, ScrapedRacket};

/// 导入失败
#[derive(Debug, Error)]
enum ImportError {
    #[error("遍历目录时出错: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("读写文件 {path} 失败: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("没有找到有效的球拍数据")]
    NoRecords,
    #[error("压缩目录快照失败: {0}")]
    Codec(#[from] CodecError),
}

/// 一次导入的统计
#[derive(Debug, PartialEq, Eq)]
struct ImportSummary {
    files: usize,
    skipped: usize,
    rackets: usize,
    bytes: usize,
}

fn main() {
    let matches = Command::new("球拍目录导入工具")
        .version(env!("CARGO_PKG_VERSION"))
        .about("把爬取的球拍 JSON 转换为压缩目录快照")
        .arg(Arg::new("source")
            .short('s')
            .long("source")
            .value_name("SOURCE_DIR")
            .help("爬虫输出的 JSON 文件目录")
            .required(true))
        .arg(Arg::new("output")
            .short('o')
            .long("output")
            .value_name("OUTPUT_FILE")
            .help("快照输出路径")
            .required(true))
        .arg(Arg::new("verbose")
            .short('v')
            .long("verbose")
            .help("显示详细信息")
            .action(ArgAction::SetTrue))
        .get_matches();

    // required(true) 保证参数存在
    let source_dir = matches.get_one::<String>("source").cloned().unwrap_or_default();
    let output_file = matches.get_one::<String>("output").cloned().unwrap_or_default();
    let verbose = matches.get_flag("verbose");

    let source_path = Path::new(&source_dir);
    if !source_path.is_dir() {
        eprintln!("错误: 源目录不存在或不是有效目录 '{}'", source_dir);
        std::process::exit(1);
    }

    println!("开始导入...");
    println!("源目录: {}", source_dir);
    println!("输出文件: {}", output_file);

    let start_time = std::time::Instant::now();
    match run(source_path, Path::new(&output_file), verbose) {
        Ok(summary) => {
            println!(
                "导入完成！文件 {} 个（跳过 {} 个），球拍 {} 条，快照 {} 字节，耗时 {:.2} 秒",
                summary.files,
                summary.skipped,
                summary.rackets,
                summary.bytes,
                start_time.elapsed().as_secs_f32()
            );
        }
        Err(e) => {
            eprintln!("错误: 导入失败: {}", e);
            std::process::exit(1);
        }
    }
}

// 扫描、转换、写出快照
fn run(source_dir: &Path, output_file: &Path, verbose: bool) -> Result<ImportSummary, ImportError> {
    let (records, files, skipped) = scan_json_files(source_dir, verbose)?;
    if records.is_empty() {
        return Err(ImportError::NoRecords);
    }

    let rackets = normalize_all(records);
    if verbose {
        println!("处理 {} 条球拍记录", rackets.len());
    }

    let snapshot = CatalogSnapshot {
        metadata: CatalogMetadata {
            racket_count: rackets.len(),
            created_at: Utc::now(),
            version: "1.0".to_string(),
            source: source_dir.display().to_string(),
        },
        rackets,
    };

    let bytes = encode_snapshot(&snapshot)?;
    if let Some(parent) = output_file.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| ImportError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    fs::write(output_file, &bytes).map_err(|source| ImportError::Io {
        path: output_file.to_path_buf(),
        source,
    })?;

    Ok(ImportSummary {
        files,
        skipped,
        rackets: snapshot.metadata.racket_count,
        bytes: bytes.len(),
    })
}

// 递归读取目录下的 JSON 文件，每个文件是一个球拍数组；无法解析的文件跳过
fn scan_json_files(dir: &Path, verbose: bool) -> Result<(Vec<ScrapedRacket>, usize, usize), ImportError> {
    let mut records = Vec::new();
    let mut files = 0;
    let mut skipped = 0;

    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() || entry.path().extension().map_or(true, |ext| ext != "json") {
            continue;
        }
        files += 1;

        let text = fs::read_to_string(entry.path()).map_err(|source| ImportError::Io {
            path: entry.path().to_path_buf(),
            source,
        })?;

        match serde_json::from_str::<Vec<ScrapedRacket>>(&text) {
            Ok(batch) => {
                if verbose {
                    println!("读取 {}: {} 条", entry.path().display(), batch.len());
                }
                records.extend(batch);
            }
            Err(e) => {
                skipped += 1;
                if verbose {
                    eprintln!("跳过无法解析的文件 {}: {}", entry.path().display(), e);
                }
            }
        }
    }

    Ok((records, files, skipped))
}
