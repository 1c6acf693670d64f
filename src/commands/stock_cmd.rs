use anyhow::Result;

use super::action_error;
use crate::models::stock::StrategyAnalysis;
use crate::services::store::Store;

pub async fn search(store: &Store, keyword: &str, include_etf: bool) -> Result<()> {
    let keyword = keyword.trim();
    if keyword.is_empty() {
        return Ok(());
    }

    let results = store.search_stocks(keyword, include_etf).await;
    if results.is_empty() {
        if let Some(err) = store.error() {
            anyhow::bail!("搜索失败: {}", err);
        }
        println!("未找到匹配的股票");
    }
    for r in &results {
        println!("  {} {:<10} {}", r.code, r.name, r.security_type);
    }
    Ok(())
}

pub async fn analysis(store: &Store, code: &str) -> Result<()> {
    if !store.fetch_analysis(code).await {
        return Err(action_error(store, "加载策略分析"));
    }
    if let Some(analysis) = store.snapshot().current_analysis {
        print_analysis(&analysis);
    }
    Ok(())
}

/// 加载K线后输出图表描述，交给外部渲染器
pub async fn chart(store: &Store, code: &str, days: u32) -> Result<()> {
    if !store.fetch_klines(code, days).await {
        return Err(action_error(store, "加载K线"));
    }
    let spec = store.chart_spec();
    if spec.is_empty() {
        log::info!("{} 无K线数据", code);
    }
    println!("{}", serde_json::to_string_pretty(&spec)?);
    Ok(())
}

pub(crate) fn print_analysis(a: &StrategyAnalysis) {
    println!("{} {}  现价 {:.2}", a.code, a.name, a.current_price);
    println!("建议: {}（{}）风险: {}", a.action, a.action_reason, a.risk_level);
    if !a.position_advice.is_empty() {
        println!("仓位: {}", a.position_advice);
    }
    println!(
        "量价: {} 量比 {:.2}，{}",
        a.volume_status, a.volume_ratio, a.volume_price_conclusion
    );
    println!("MACD: {}（{}）", a.macd_status, a.macd_cross);
    println!("趋势: 5日 {} / 10日 {} / 20日 {}", a.trend_5d, a.trend_10d, a.trend_20d);

    for line in &a.support_lines {
        println!("  支撑 {:.2} {} {}", line.price, line.name, line.vs_current);
    }
    for line in &a.resistance_lines {
        println!("  压力 {:.2} {} {}", line.price, line.name, line.vs_current);
    }
    if !a.support_break_status.is_empty() {
        println!("  ⚠ {}", a.support_break_status);
    }
    if !a.resistance_break_status.is_empty() {
        println!("  ⚑ {}", a.resistance_break_status);
    }

    for p in &a.patterns {
        println!("  形态: {}（{}/{}）{}", p.name, p.pattern_type, p.strength, p.desc);
    }
    for f in &a.bullish_factors {
        println!("  + {}", f);
    }
    for f in &a.bearish_factors {
        println!("  - {}", f);
    }
    if !a.action_detail.is_empty() {
        println!("{}", a.action_detail);
    }
}
