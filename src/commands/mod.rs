pub mod etf_cmd;
pub mod market_cmd;
pub mod settings_cmd;
pub mod stock_cmd;
pub mod watchlist_cmd;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};

use crate::config::ClientConfig;
use crate::services::store::Store;

#[derive(Parser, Debug)]
#[command(name = "threebros", version, about = "反转三兄弟 - 股票/ETF 信号客户端")]
pub struct Cli {
    /// 后端 API 地址（覆盖 THREEBROS_API_BASE）
    #[arg(long, global = true)]
    pub api_base: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// 大盘指数 + 今日信号 + 自选股概览
    Overview,
    /// 自选股
    #[command(subcommand)]
    Watchlist(watchlist_cmd::WatchlistCommand),
    /// 大盘指数
    Indices,
    /// 今日信号
    Signals,
    /// 全市场扫描（显示进度直到完成）
    Scan {
        #[arg(long, default_value_t = 200)]
        limit: u32,
    },
    /// 自选ETF / 热门ETF
    #[command(subcommand)]
    Etf(etf_cmd::EtfCommand),
    /// 搜索股票
    Search {
        keyword: String,
        #[arg(long)]
        include_etf: bool,
    },
    /// 个股策略分析
    Analysis { code: String },
    /// 输出K线图表描述（JSON）
    Chart {
        code: String,
        #[arg(long)]
        days: Option<u32>,
    },
    /// 推送设置
    #[command(subcommand)]
    Settings(settings_cmd::SettingsCommand),
}

pub async fn dispatch(store: &Store, config: &ClientConfig, command: Command) -> Result<()> {
    match command {
        Command::Overview => market_cmd::overview(store).await,
        Command::Watchlist(cmd) => watchlist_cmd::run(store, cmd).await,
        Command::Indices => market_cmd::indices(store).await,
        Command::Signals => market_cmd::today_signals(store).await,
        Command::Scan { limit } => market_cmd::scan(store, limit).await,
        Command::Etf(cmd) => etf_cmd::run(store, cmd).await,
        Command::Search { keyword, include_etf } => stock_cmd::search(store, &keyword, include_etf).await,
        Command::Analysis { code } => stock_cmd::analysis(store, &code).await,
        Command::Chart { code, days } => {
            stock_cmd::chart(store, &code, days.unwrap_or(config.kline_days)).await
        }
        Command::Settings(cmd) => settings_cmd::run(store, cmd).await,
    }
}

/// 把 Store 中记录的失败消息转成命令错误
pub(crate) fn action_error(store: &Store, context: &str) -> anyhow::Error {
    let message = store.error().unwrap_or_else(|| "未知错误".to_string());
    anyhow!("{}失败: {}", context, message)
}
