use anyhow::Result;
use chrono::Local;

use super::action_error;
use super::watchlist_cmd::print_watchlist;
use crate::models::market::{PriceTrend, ScanResult, ScanStatus, ScanTask, TodaySignal};
use crate::services::store::Store;

pub async fn overview(store: &Store) -> Result<()> {
    let (indices_ok, signals_ok, watchlist_ok) = futures::join!(
        store.fetch_indices(),
        store.fetch_today_signals(),
        store.fetch_watchlist(),
    );

    if indices_ok {
        print_indices(store);
    }
    if signals_ok {
        print_today_signals(store);
    }
    if watchlist_ok {
        print_watchlist(store);
    }

    // 并发失败时 error 只保留最后一条
    if !(indices_ok && signals_ok && watchlist_ok) {
        return Err(action_error(store, "加载概览"));
    }
    Ok(())
}

pub async fn indices(store: &Store) -> Result<()> {
    if !store.fetch_indices().await {
        return Err(action_error(store, "加载大盘指数"));
    }
    print_indices(store);
    Ok(())
}

pub async fn today_signals(store: &Store) -> Result<()> {
    if !store.fetch_today_signals().await {
        return Err(action_error(store, "加载今日信号"));
    }
    print_today_signals(store);
    Ok(())
}

/// 发起扫描并跟随 Store 的状态通知输出进度，Ctrl-C 停止轮询
pub async fn scan(store: &Store, limit: u32) -> Result<()> {
    let mut rx = store.subscribe();
    if !store.start_scan(limit).await {
        return Err(action_error(store, "发起扫描"));
    }

    let mut last_processed = None;
    loop {
        let (polling, task) = {
            let state = rx.borrow_and_update();
            (state.scan_polling, state.scan_task.clone())
        };

        if let Some(task) = &task {
            if last_processed != Some(task.processed) {
                last_processed = Some(task.processed);
                println!(
                    "[{}] {:?} {}/{} ({}%)",
                    Local::now().format("%H:%M:%S"),
                    task.status,
                    task.processed,
                    task.total,
                    task.progress
                );
            }
        }

        if !polling {
            break;
        }

        tokio::select! {
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                println!("已停止轮询");
                store.stop_scan_polling().await;
                break;
            }
        }
    }

    match store.snapshot().scan_task {
        Some(task) => print_scan_outcome(&task),
        None => println!("无扫描任务"),
    }
    Ok(())
}

fn print_scan_outcome(task: &ScanTask) {
    match task.status {
        ScanStatus::Completed => {
            println!("扫描完成：共处理 {} 只", task.processed);
            print_scan_results("买入信号", task.buy_signals.as_deref().unwrap_or_default());
            print_scan_results("卖出信号", task.sell_signals.as_deref().unwrap_or_default());
        }
        ScanStatus::Failed => {
            println!("扫描失败：{}", task.error.as_deref().unwrap_or("未知错误"));
        }
        ScanStatus::Pending | ScanStatus::Running => {
            println!(
                "轮询已中断，任务 {} 最后状态 {:?} {}/{}",
                task.task_id, task.status, task.processed, task.total
            );
        }
    }
}

fn print_scan_results(title: &str, results: &[ScanResult]) {
    println!("{}（{}）", title, results.len());
    for r in results {
        println!(
            "  {} {:<8} {:>9.2} {:+.2}%  {} 评分:{} {}",
            r.code, r.name, r.price, r.pct_change, r.action, r.score, r.action_reason
        );
    }
}

fn print_indices(store: &Store) {
    let state = store.snapshot();
    println!(
        "大盘指数（更新于 {}）",
        state.indices_updated_at.as_deref().unwrap_or("-")
    );
    for index in &state.indices {
        let arrow = match index.trend() {
            PriceTrend::Up => "↑",
            PriceTrend::Down => "↓",
            PriceTrend::Flat => "→",
        };
        let action = index.action.map(|a| a.label()).unwrap_or("-");
        println!(
            "  {} {:<6} {:>10.2} {}{:+.2} ({:+.2}%)  {}",
            arrow, index.name, index.price, arrow, index.change, index.pct_change, action
        );
    }
}

fn print_today_signals(store: &Store) {
    let signals = store.snapshot().today_signals;
    println!("今日信号 {} 条", signals.total);
    print_signal_group("买入", &signals.buy_signals);
    print_signal_group("卖出", &signals.sell_signals);
}

fn print_signal_group(title: &str, signals: &[TodaySignal]) {
    if signals.is_empty() {
        return;
    }
    println!("  {}:", title);
    for s in signals {
        println!(
            "    {} {:<8} {} 强度:{:.0}% 价格:{:.2}",
            s.code,
            s.name,
            s.pattern_name,
            s.strength * 100.0,
            s.price
        );
    }
}
