use clap::Parser;
use loto_pos::{Config, init_logger};

mod cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. .env 必须先于参数解析加载，clap 的 env 回退依赖它
    let _ = dotenvy::dotenv();
    let cli = cli::Cli::parse();

    // 2. 配置：环境变量 + 命令行覆盖
    let config = cli.apply(Config::from_env());

    // 3. 日志
    init_logger(&config.log_level, config.log_dir.as_deref());
    tracing::debug!(api = %config.api_url, data_dir = %config.data_dir.display(), timezone = %config.timezone, "Starting flor-pos");

    cli::run(cli, config).await
}
