pub mod api;
pub mod core;

use tracing_subscriber::EnvFilter;

/// 安装日志输出，重复调用无副作用
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // log 宏的记录经 tracing-log 桥接输出
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
