//! 日志模块 - 初始化 tracing 订阅器

use tracing_subscriber::prelude::*;

/// 将配置的日志级别转换为 tracing Level
pub fn tracing_level(level: &str) -> tracing::Level {
    match level.to_lowercase().as_str() {
        "error" => tracing::Level::ERROR,
        "warn" => tracing::Level::WARN,
        "debug" => tracing::Level::DEBUG,
        "trace" => tracing::Level::TRACE,
        _ => tracing::Level::INFO,
    }
}

/// 初始化日志系统
pub fn init_logging(level: &str) {
    let level = tracing_level(level);

    // 创建日志级别过滤器，压低依赖库的噪音
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(level.into())
        .add_directive("hyper=warn".parse().unwrap())
        .add_directive("aws_smithy_runtime=warn".parse().unwrap())
        .add_directive("aws_config=warn".parse().unwrap());

    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false);

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer);

    let _ = tracing::subscriber::set_global_default(subscriber);
}
