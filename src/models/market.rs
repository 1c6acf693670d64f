use serde::{Deserialize, Serialize};
use super::stock::Action;

/// 涨跌方向（决定指数卡片配色）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceTrend {
    Up,
    Down,
    Flat,
}

/// 大盘指数（带信号）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexInfo {
    pub code: String,
    pub name: String,
    pub price: f64,
    pub change: f64,
    pub pct_change: f64,
    #[serde(default)]
    pub volume: Option<f64>,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub action: Option<Action>,
    #[serde(default)]
    pub action_reason: Option<String>,
    #[serde(default)]
    pub macd_cross: Option<String>,
}

impl IndexInfo {
    pub fn trend(&self) -> PriceTrend {
        if self.pct_change > 0.0 {
            PriceTrend::Up
        } else if self.pct_change < 0.0 {
            PriceTrend::Down
        } else {
            PriceTrend::Flat
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketIndices {
    pub indices: Vec<IndexInfo>,
    #[serde(default)]
    pub update_time: String,
}

/// 今日信号
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TodaySignal {
    pub code: String,
    pub name: String,
    pub signal_type: String,  // 买入/卖出
    pub pattern_name: String,
    pub strength: f64,        // 0-1
    pub price: f64,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub confirmations: Vec<String>,
    #[serde(default)]
    pub detected_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TodaySignals {
    #[serde(default)]
    pub buy_signals: Vec<TodaySignal>,
    #[serde(default)]
    pub sell_signals: Vec<TodaySignal>,
    #[serde(default)]
    pub total: usize,
}

/// 扫描任务状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl ScanStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, ScanStatus::Completed | ScanStatus::Failed)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ScanRequest {
    pub limit: u32,
}

/// 扫描结果项（按评分排序）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanResult {
    pub code: String,
    pub name: String,
    pub price: f64,
    pub pct_change: f64,
    pub action: Action,
    #[serde(default)]
    pub action_reason: String,
    #[serde(default)]
    pub patterns: Vec<String>,
    #[serde(default)]
    pub bullish_count: u32,
    #[serde(default)]
    pub bearish_count: u32,
    #[serde(default)]
    pub score: i32,
}

/// 扫描任务：POST /market/scan 返回任务描述，GET /market/scan/{id} 返回进度与结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanTask {
    pub task_id: String,
    pub status: ScanStatus,
    #[serde(default)]
    pub progress: u32,        // 0-100
    #[serde(default)]
    pub total: u32,
    #[serde(default)]
    pub processed: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<Vec<ScanResult>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buy_signals: Option<Vec<ScanResult>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sell_signals: Option<Vec<ScanResult>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ScanTask {
    pub fn is_active(&self) -> bool {
        !self.status.is_terminal()
    }
}
