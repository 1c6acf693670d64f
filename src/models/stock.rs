use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// 操作建议（后端返回中文标签）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    #[serde(rename = "买入")]
    Buy,
    #[serde(rename = "加仓")]
    AddPosition,
    #[serde(rename = "卖出")]
    Sell,
    #[serde(rename = "减仓")]
    ReducePosition,
    #[serde(rename = "持有观望", alias = "持有")]
    Hold,
}

/// 买/卖/持有 三分类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalSide {
    Buy,
    Sell,
    Hold,
}

impl Action {
    pub fn side(self) -> SignalSide {
        match self {
            Action::Buy | Action::AddPosition => SignalSide::Buy,
            Action::Sell | Action::ReducePosition => SignalSide::Sell,
            Action::Hold => SignalSide::Hold,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Action::Buy => "买入",
            Action::AddPosition => "加仓",
            Action::Sell => "卖出",
            Action::ReducePosition => "减仓",
            Action::Hold => "持有观望",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// 自选股条目（带信号，来自 /stocks/watchlist/signals）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchlistEntry {
    pub code: String,
    pub name: String,
    pub current_price: f64,
    pub action: Action,
    #[serde(default)]
    pub action_reason: String,
    #[serde(default)]
    pub risk_level: String,
    #[serde(default)]
    pub volume_status: String,
    #[serde(default)]
    pub volume_ratio: f64,
    #[serde(default)]
    pub macd_cross: String,
    #[serde(default)]
    pub patterns: Vec<String>,
}

/// 自选股买卖分布
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct WatchlistSummary {
    pub total: usize,
    pub buy: usize,
    pub sell: usize,
    pub hold: usize,
}

impl WatchlistSummary {
    pub fn from_entries(entries: &[WatchlistEntry]) -> Self {
        let total = entries.len();
        let buy = entries.iter().filter(|e| e.action.side() == SignalSide::Buy).count();
        let sell = entries.iter().filter(|e| e.action.side() == SignalSide::Sell).count();
        Self {
            total,
            buy,
            sell,
            hold: total.saturating_sub(buy + sell),
        }
    }
}

/// 自选股（不带信号）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchlistItem {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub added_at: Option<String>,
    #[serde(default)]
    pub sort_order: Option<i32>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddToWatchlistRequest {
    pub code: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// 写操作通用响应
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionMessage {
    #[serde(default = "default_true")]
    pub success: bool,
    #[serde(default)]
    pub message: String,
}

fn default_true() -> bool { true }

/// 买入信息（PUT 请求体与 GET 响应同构）
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BuyInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buy_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buy_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buy_quantity: Option<i64>,
}

/// 搜索结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub code: String,
    pub name: String,
    #[serde(rename = "type", default = "default_security_type")]
    pub security_type: String,
}

fn default_security_type() -> String { "stock".to_string() }

/// 支撑/压力线强度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineStrength {
    Strong,
    Medium,
    Weak,
}

/// 支撑/压力线
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupportResistanceLine {
    pub price: f64,
    pub name: String,
    #[serde(rename = "type")]
    pub strength: LineStrength,
    #[serde(default)]
    pub ref_date: String,
    #[serde(default)]
    pub days_ago: i32,
    #[serde(default)]
    pub ref_open: f64,
    #[serde(default)]
    pub ref_close: f64,
    #[serde(default)]
    pub calculation: String,
    #[serde(default)]
    pub vs_current: String,
}

/// K线单条数据
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KlineDataPoint {
    pub date: String,
    pub open: f64,
    pub close: f64,
    pub high: f64,
    pub low: f64,
    pub volume: f64,
}

impl KlineDataPoint {
    /// 平盘算涨
    pub fn is_up(&self) -> bool {
        self.close >= self.open
    }
}

/// K线 + 支撑压力线（/stocks/{code}/klines）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KlineResponse {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub klines: Vec<KlineDataPoint>,
    #[serde(default)]
    pub support_lines: Vec<SupportResistanceLine>,
    #[serde(default)]
    pub resistance_lines: Vec<SupportResistanceLine>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaStatus {
    pub value: f64,
    pub above: bool,
    pub diff_pct: f64,
}

/// 反转形态
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub pattern_type: String,   // 看涨/看跌/待定
    pub strength: String,       // 强/中/弱
    #[serde(default)]
    pub desc: String,
    #[serde(default)]
    pub position_advice: Option<String>,
}

/// 个股/ETF 完整策略分析
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyAnalysis {
    pub code: String,
    pub name: String,
    pub current_price: f64,

    // 量价
    #[serde(default)]
    pub volume_status: String,
    #[serde(default)]
    pub volume_ratio: f64,
    #[serde(default)]
    pub price_new_high: bool,
    #[serde(default)]
    pub price_new_low: bool,
    #[serde(default)]
    pub volume_price_conclusion: String,

    // 支撑压力
    #[serde(default)]
    pub support_lines: Vec<SupportResistanceLine>,
    #[serde(default)]
    pub resistance_lines: Vec<SupportResistanceLine>,
    #[serde(default)]
    pub near_support: bool,
    #[serde(default)]
    pub near_resistance: bool,
    #[serde(default)]
    pub support_break_status: String,
    #[serde(default)]
    pub resistance_break_status: String,

    // 上影线
    #[serde(default)]
    pub upper_shadow_ratio: f64,
    #[serde(default)]
    pub upper_shadow_warning: bool,
    #[serde(default)]
    pub upper_shadow_detail: String,

    // 均线
    #[serde(default)]
    pub ma_status: BTreeMap<String, Option<MaStatus>>,
    #[serde(default)]
    pub ma_support: String,

    // MACD
    #[serde(default)]
    pub macd_status: String,
    #[serde(default)]
    pub macd_cross: String,

    // 形态
    #[serde(default)]
    pub patterns: Vec<PatternInfo>,
    #[serde(default)]
    pub pattern_analysis: Vec<String>,

    // 趋势
    #[serde(default)]
    pub trend_5d: String,
    #[serde(default)]
    pub trend_10d: String,
    #[serde(default)]
    pub trend_20d: String,

    // 综合建议
    pub action: Action,
    #[serde(default)]
    pub action_reason: String,
    #[serde(default)]
    pub action_detail: String,
    #[serde(default)]
    pub bullish_factors: Vec<String>,
    #[serde(default)]
    pub bearish_factors: Vec<String>,
    #[serde(default)]
    pub risk_level: String,
    #[serde(default)]
    pub position_advice: String,
}
