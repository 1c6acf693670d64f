//! 测试用的内存后端：按接口预置响应，并记录调用次数

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use app_lib::error::{ApiError, ApiResult};
use app_lib::models::etf::{EtfSearchResult, EtfWatchlistItem, PopularEtf};
use app_lib::models::market::*;
use app_lib::models::settings::{NotifySettings, TestNotifyResult, UpdateSettingsRequest};
use app_lib::models::stock::*;
use app_lib::services::api_client::StockApi;
use app_lib::services::store::{Store, StoreState};
use async_trait::async_trait;

pub struct MockApi {
    calls: Mutex<HashMap<&'static str, usize>>,

    pub watchlist: Mutex<ApiResult<Vec<WatchlistEntry>>>,
    pub watchlist_delay: Mutex<Option<Duration>>,
    pub mutation: Mutex<ApiResult<ActionMessage>>,

    pub indices: Mutex<ApiResult<MarketIndices>>,
    pub today_signals: Mutex<ApiResult<TodaySignals>>,

    scan_starts: Mutex<VecDeque<ApiResult<ScanTask>>>,
    scan_scripts: Mutex<HashMap<String, VecDeque<ApiResult<ScanTask>>>>,
    scan_last: Mutex<HashMap<String, ApiResult<ScanTask>>>,

    pub etf_watchlist: Mutex<ApiResult<Vec<EtfWatchlistItem>>>,
    pub analysis: Mutex<ApiResult<StrategyAnalysis>>,
    pub klines: Mutex<ApiResult<KlineResponse>>,
    pub search: Mutex<ApiResult<Vec<SearchResult>>>,
    pub settings: Mutex<ApiResult<NotifySettings>>,
}

impl MockApi {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(HashMap::new()),
            watchlist: Mutex::new(Ok(vec![])),
            watchlist_delay: Mutex::new(None),
            mutation: Mutex::new(Ok(ActionMessage { success: true, message: "ok".to_string() })),
            indices: Mutex::new(Ok(MarketIndices { indices: vec![], update_time: String::new() })),
            today_signals: Mutex::new(Ok(TodaySignals::default())),
            scan_starts: Mutex::new(VecDeque::new()),
            scan_scripts: Mutex::new(HashMap::new()),
            scan_last: Mutex::new(HashMap::new()),
            etf_watchlist: Mutex::new(Ok(vec![])),
            analysis: Mutex::new(Err(ApiError::new("未设置分析数据"))),
            klines: Mutex::new(Err(ApiError::new("未设置K线数据"))),
            search: Mutex::new(Ok(vec![])),
            settings: Mutex::new(Ok(NotifySettings::default())),
        }
    }

    pub fn calls(&self, name: &str) -> usize {
        self.calls.lock().unwrap().get(name).copied().unwrap_or(0)
    }

    fn record(&self, name: &'static str) {
        *self.calls.lock().unwrap().entry(name).or_insert(0) += 1;
    }

    pub fn set<T>(slot: &Mutex<ApiResult<T>>, value: ApiResult<T>) {
        *slot.lock().unwrap() = value;
    }

    pub fn push_scan_start(&self, response: ApiResult<ScanTask>) {
        self.scan_starts.lock().unwrap().push_back(response);
    }

    /// 按任务 ID 预置状态查询的响应序列；用完后重复最后一条
    pub fn script_scan(&self, task_id: &str, responses: Vec<ApiResult<ScanTask>>) {
        self.scan_scripts
            .lock()
            .unwrap()
            .insert(task_id.to_string(), responses.into());
    }
}

#[async_trait]
impl StockApi for MockApi {
    async fn get_watchlist(&self) -> ApiResult<Vec<WatchlistItem>> {
        self.record("get_watchlist");
        let entries = self.watchlist.lock().unwrap().clone()?;
        Ok(entries
            .into_iter()
            .map(|e| WatchlistItem {
                code: e.code,
                name: e.name,
                added_at: None,
                sort_order: None,
                notes: None,
            })
            .collect())
    }

    async fn get_watchlist_signals(&self) -> ApiResult<Vec<WatchlistEntry>> {
        self.record("get_watchlist_signals");
        let delay = *self.watchlist_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.watchlist.lock().unwrap().clone()
    }

    async fn add_to_watchlist(&self, _request: &AddToWatchlistRequest) -> ApiResult<ActionMessage> {
        self.record("add_to_watchlist");
        self.mutation.lock().unwrap().clone()
    }

    async fn remove_from_watchlist(&self, _code: &str) -> ApiResult<ActionMessage> {
        self.record("remove_from_watchlist");
        self.mutation.lock().unwrap().clone()
    }

    async fn get_stock_analysis(&self, _code: &str) -> ApiResult<StrategyAnalysis> {
        self.record("get_stock_analysis");
        self.analysis.lock().unwrap().clone()
    }

    async fn get_stock_klines(&self, _code: &str, _days: u32) -> ApiResult<KlineResponse> {
        self.record("get_stock_klines");
        self.klines.lock().unwrap().clone()
    }

    async fn search_stocks(&self, _keyword: &str, _include_etf: bool) -> ApiResult<Vec<SearchResult>> {
        self.record("search_stocks");
        self.search.lock().unwrap().clone()
    }

    async fn get_buy_info(&self, _code: &str) -> ApiResult<BuyInfo> {
        self.record("get_buy_info");
        Ok(BuyInfo::default())
    }

    async fn update_buy_info(&self, _code: &str, _info: &BuyInfo) -> ApiResult<ActionMessage> {
        self.record("update_buy_info");
        self.mutation.lock().unwrap().clone()
    }

    async fn get_market_indices(&self) -> ApiResult<MarketIndices> {
        self.record("get_market_indices");
        self.indices.lock().unwrap().clone()
    }

    async fn get_today_signals(&self) -> ApiResult<TodaySignals> {
        self.record("get_today_signals");
        self.today_signals.lock().unwrap().clone()
    }

    async fn start_scan(&self, _limit: u32) -> ApiResult<ScanTask> {
        self.record("start_scan");
        self.scan_starts
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ApiError::new("未设置扫描任务")))
    }

    async fn get_scan_result(&self, task_id: &str) -> ApiResult<ScanTask> {
        self.record("get_scan_result");
        let next = self
            .scan_scripts
            .lock()
            .unwrap()
            .get_mut(task_id)
            .and_then(|q| q.pop_front());
        let mut last = self.scan_last.lock().unwrap();
        match next {
            Some(response) => {
                last.insert(task_id.to_string(), response.clone());
                response
            }
            None => last
                .get(task_id)
                .cloned()
                .unwrap_or_else(|| Err(ApiError::new("任务不存在"))),
        }
    }

    async fn get_etf_watchlist(&self) -> ApiResult<Vec<EtfWatchlistItem>> {
        self.record("get_etf_watchlist");
        self.etf_watchlist.lock().unwrap().clone()
    }

    async fn add_to_etf_watchlist(&self, _request: &AddToWatchlistRequest) -> ApiResult<ActionMessage> {
        self.record("add_to_etf_watchlist");
        self.mutation.lock().unwrap().clone()
    }

    async fn remove_from_etf_watchlist(&self, _code: &str) -> ApiResult<ActionMessage> {
        self.record("remove_from_etf_watchlist");
        self.mutation.lock().unwrap().clone()
    }

    async fn get_popular_etfs(&self) -> ApiResult<Vec<PopularEtf>> {
        self.record("get_popular_etfs");
        Ok(vec![PopularEtf {
            code: "510300".to_string(),
            name: "沪深300ETF".to_string(),
            category: "宽基".to_string(),
        }])
    }

    async fn search_etfs(&self, _keyword: &str) -> ApiResult<Vec<EtfSearchResult>> {
        self.record("search_etfs");
        Ok(vec![])
    }

    async fn get_etf_analysis(&self, _code: &str) -> ApiResult<StrategyAnalysis> {
        self.record("get_etf_analysis");
        self.analysis.lock().unwrap().clone()
    }

    async fn get_settings(&self) -> ApiResult<NotifySettings> {
        self.record("get_settings");
        self.settings.lock().unwrap().clone()
    }

    async fn update_settings(&self, _request: &UpdateSettingsRequest) -> ApiResult<ActionMessage> {
        self.record("update_settings");
        self.mutation.lock().unwrap().clone()
    }

    async fn test_notify(&self) -> ApiResult<TestNotifyResult> {
        self.record("test_notify");
        Ok(TestNotifyResult { success: false, message: "Server酱未配置，请先设置SendKey".to_string() })
    }
}

// ==================== 构造数据 ====================

pub fn entry(code: &str, action: Action) -> WatchlistEntry {
    WatchlistEntry {
        code: code.to_string(),
        name: format!("股票{}", code),
        current_price: 10.0,
        action,
        action_reason: String::new(),
        risk_level: "低".to_string(),
        volume_status: "平量".to_string(),
        volume_ratio: 1.0,
        macd_cross: "无".to_string(),
        patterns: vec![],
    }
}

pub fn task(task_id: &str, status: ScanStatus, processed: u32, total: u32) -> ScanTask {
    ScanTask {
        task_id: task_id.to_string(),
        status,
        progress: if total == 0 { 0 } else { processed * 100 / total },
        total,
        processed,
        started_at: None,
        completed_at: None,
        results: None,
        buy_signals: None,
        sell_signals: None,
        error: None,
    }
}

pub fn scan_result(code: &str, action: Action, score: i32) -> ScanResult {
    ScanResult {
        code: code.to_string(),
        name: format!("股票{}", code),
        price: 12.5,
        pct_change: 1.2,
        action,
        action_reason: "底部放量".to_string(),
        patterns: vec!["锤子线".to_string()],
        bullish_count: 3,
        bearish_count: 0,
        score,
    }
}

pub fn analysis(code: &str, action: Action) -> StrategyAnalysis {
    let json = serde_json::json!({
        "code": code,
        "name": format!("股票{}", code),
        "current_price": 10.5,
        "volume_status": "放量",
        "volume_ratio": 1.8,
        "volume_price_conclusion": "放量上涨",
        "macd_cross": "金叉",
        "action": action.label(),
        "action_reason": "底部反转",
        "risk_level": "中",
    });
    serde_json::from_value(json).unwrap()
}

/// 等待 Store 状态满足条件（暂停时钟下会自动推进定时器）
pub async fn wait_until(store: &Store, predicate: impl FnMut(&StoreState) -> bool) {
    let mut rx = store.subscribe();
    tokio::time::timeout(Duration::from_secs(600), rx.wait_for(predicate))
        .await
        .expect("等待 Store 状态超时")
        .expect("Store 已关闭");
}
