pub mod commands;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;

use anyhow::Result;
use clap::Parser;

use commands::{Cli, Command};
use config::ClientConfig;
use services::store::Store;

/// 应用入口：初始化日志与配置，创建 Store 并执行命令
///
/// 运行时为单线程调度，与 Store 的协作式并发模型一致。
pub fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let mut config = ClientConfig::from_env();
    if let Some(api_base) = cli.api_base {
        config.api_base = api_base.trim_end_matches('/').to_string();
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        let store = Store::from_config(&config)?;
        let command = cli.command.unwrap_or(Command::Overview);
        commands::dispatch(&store, &config, command).await
    })
}
