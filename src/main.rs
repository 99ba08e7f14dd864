use clap::Parser;
use sftp2s3_lib::core::{SyncEngine, SyncOptions};
use sftp2s3_lib::error::SyncError;
use sftp2s3_lib::storage::{S3ObjectStore, SftpStorage};
use sftp2s3_lib::{logging, AppConfig};
use std::path::PathBuf;
use tracing::{error, info};

/// SFTP 到 S3 的单向增量同步
#[derive(Debug, Parser)]
#[command(name = "sftp2s3", version)]
struct Cli {
    /// 配置文件路径
    #[arg(long, default_value = "./config.yaml")]
    config_file: PathBuf,

    /// 日志级别
    #[arg(long, default_value = "info", value_parser = ["error", "warn", "info", "debug", "trace"])]
    log_level: String,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    logging::init_logging(&cli.log_level);

    if let Err(e) = run(&cli).await {
        error!("{}", e);
        eprintln!("同步失败: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: &Cli) -> Result<(), SyncError> {
    let config = AppConfig::load(&cli.config_file)?;

    let remote = SftpStorage::new(&config.sftp)
        .await
        .map_err(|e| SyncError::Connection(format!("{:#}", e)))?;

    let store = S3ObjectStore::new(&config.s3)
        .await
        .map_err(|e| SyncError::Connection(format!("{:#}", e)))?;

    let engine = SyncEngine::new(SyncOptions {
        key_prefix: config.s3.key_prefix.clone(),
        marker_key: config.incremental_sync.last_modified_s3_key.clone(),
    });

    let report = engine.run(&remote, &store).await?;

    info!(
        "运行结束: 列举 {} 个, 上传 {} 个, 跳过 {} 个, {} 字节, 耗时 {} ms",
        report.files_listed,
        report.files_uploaded,
        report.files_skipped,
        report.bytes_uploaded,
        report.duration_ms
    );

    Ok(())
}
