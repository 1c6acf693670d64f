use anyhow::Result;
use clap::Subcommand;

use super::action_error;
use crate::models::stock::{BuyInfo, SignalSide, WatchlistEntry};
use crate::services::store::Store;

#[derive(Subcommand, Debug)]
pub enum WatchlistCommand {
    /// 自选股及信号
    List {
        /// 只列出代码、名称和备注，不计算信号
        #[arg(long)]
        plain: bool,
    },
    /// 添加自选股
    Add {
        code: String,
        name: String,
        #[arg(long)]
        notes: Option<String>,
    },
    /// 删除自选股
    Remove { code: String },
    /// 查看买入信息
    BuyInfo { code: String },
    /// 记录买入信息
    SetBuyInfo {
        code: String,
        #[arg(long)]
        price: Option<f64>,
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        quantity: Option<i64>,
    },
}

pub async fn run(store: &Store, cmd: WatchlistCommand) -> Result<()> {
    match cmd {
        WatchlistCommand::List { plain: false } => list(store).await,
        WatchlistCommand::List { plain: true } => list_plain(store).await,
        WatchlistCommand::Add { code, name, notes } => {
            if !store.add_to_watchlist(&code, &name, notes).await {
                return Err(action_error(store, "添加自选股"));
            }
            println!("已添加 {} {}", code, name);
            print_watchlist(store);
            Ok(())
        }
        WatchlistCommand::Remove { code } => {
            if !store.remove_from_watchlist(&code).await {
                return Err(action_error(store, "删除自选股"));
            }
            println!("已删除 {}", code);
            print_watchlist(store);
            Ok(())
        }
        WatchlistCommand::BuyInfo { code } => {
            let info = store
                .get_buy_info(&code)
                .await
                .ok_or_else(|| action_error(store, "获取买入信息"))?;
            println!("{}", serde_json::to_string_pretty(&info)?);
            Ok(())
        }
        WatchlistCommand::SetBuyInfo { code, price, date, quantity } => {
            let info = BuyInfo {
                buy_price: price,
                buy_date: date,
                buy_quantity: quantity,
            };
            if !store.update_buy_info(&code, &info).await {
                return Err(action_error(store, "更新买入信息"));
            }
            println!("已更新 {} 买入信息", code);
            Ok(())
        }
    }
}

pub async fn list(store: &Store) -> Result<()> {
    if !store.fetch_watchlist().await {
        return Err(action_error(store, "加载自选股"));
    }
    print_watchlist(store);
    Ok(())
}

async fn list_plain(store: &Store) -> Result<()> {
    let items = store.get_watchlist_items().await;
    if items.is_empty() {
        if let Some(err) = store.error() {
            anyhow::bail!("读取自选股失败: {}", err);
        }
        println!("  （暂无自选股）");
    }
    for item in &items {
        let notes = item.notes.as_deref().unwrap_or("");
        println!("  {} {:<8} {}", item.code, item.name, notes);
    }
    Ok(())
}

pub(crate) fn print_watchlist(store: &Store) {
    let state = store.snapshot();
    let summary = state.watchlist_summary();
    println!(
        "自选股 {} 只：买入 {} / 卖出 {} / 持有 {}",
        summary.total, summary.buy, summary.sell, summary.hold
    );
    if state.watchlist.is_empty() {
        println!("  （暂无自选股）");
        return;
    }
    for entry in &state.watchlist {
        println!("  {}", format_entry(entry));
    }
}

fn format_entry(entry: &WatchlistEntry) -> String {
    let marker = match entry.action.side() {
        SignalSide::Buy => "▲",
        SignalSide::Sell => "▼",
        SignalSide::Hold => "·",
    };
    let patterns = if entry.patterns.is_empty() {
        String::new()
    } else {
        format!(" [{}]", entry.patterns.join("、"))
    };
    format!(
        "{} {} {:<8} {:>9.2}  {} {}  风险:{} 量比:{:.2}({}) MACD:{}{}",
        marker,
        entry.code,
        entry.name,
        entry.current_price,
        entry.action,
        entry.action_reason,
        entry.risk_level,
        entry.volume_ratio,
        entry.volume_status,
        entry.macd_cross,
        patterns
    )
}
