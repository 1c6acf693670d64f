use anyhow::Result;
use clap::Subcommand;

use super::action_error;
use super::stock_cmd::print_analysis;
use crate::services::store::Store;

#[derive(Subcommand, Debug)]
pub enum EtfCommand {
    /// 自选ETF
    List,
    /// 添加自选ETF
    Add {
        code: String,
        name: String,
        #[arg(long)]
        notes: Option<String>,
    },
    /// 删除自选ETF
    Remove { code: String },
    /// 热门ETF
    Popular,
    /// 搜索ETF
    Search { keyword: String },
    /// ETF策略分析
    Analysis { code: String },
}

pub async fn run(store: &Store, cmd: EtfCommand) -> Result<()> {
    match cmd {
        EtfCommand::List => {
            if !store.fetch_etf_watchlist().await {
                return Err(action_error(store, "加载自选ETF"));
            }
            print_etf_watchlist(store);
        }
        EtfCommand::Add { code, name, notes } => {
            if !store.add_to_etf_watchlist(&code, &name, notes).await {
                return Err(action_error(store, "添加自选ETF"));
            }
            println!("已添加 {} {}", code, name);
            print_etf_watchlist(store);
        }
        EtfCommand::Remove { code } => {
            if !store.remove_from_etf_watchlist(&code).await {
                return Err(action_error(store, "删除自选ETF"));
            }
            println!("已删除 {}", code);
            print_etf_watchlist(store);
        }
        EtfCommand::Popular => {
            if !store.fetch_popular_etfs().await {
                return Err(action_error(store, "加载热门ETF"));
            }
            for etf in &store.snapshot().popular_etfs {
                println!("  {} {:<12} {}", etf.code, etf.name, etf.category);
            }
        }
        EtfCommand::Search { keyword } => {
            let results = store.search_etfs(&keyword).await;
            if results.is_empty() {
                if let Some(err) = store.error() {
                    anyhow::bail!("搜索ETF失败: {}", err);
                }
                println!("未找到匹配的ETF");
            }
            for r in &results {
                println!("  {} {}", r.code, r.name);
            }
        }
        EtfCommand::Analysis { code } => {
            if !store.fetch_etf_analysis(&code).await {
                return Err(action_error(store, "加载ETF分析"));
            }
            if let Some(analysis) = store.snapshot().current_analysis {
                print_analysis(&analysis);
            }
        }
    }
    Ok(())
}

fn print_etf_watchlist(store: &Store) {
    let items = store.snapshot().etf_watchlist;
    println!("自选ETF {} 只", items.len());
    for item in &items {
        let notes = item.notes.as_deref().filter(|n| !n.is_empty()).unwrap_or("");
        println!("  {} {:<12} {}", item.code, item.name, notes);
    }
}
