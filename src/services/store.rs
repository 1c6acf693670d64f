use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::config::ClientConfig;
use crate::error::{ApiError, ApiResult};
use crate::models::chart::ChartSpec;
use crate::models::etf::{EtfSearchResult, EtfWatchlistItem, PopularEtf};
use crate::models::market::{IndexInfo, ScanTask, TodaySignals};
use crate::models::settings::{NotifySettings, TestNotifyResult, UpdateSettingsRequest};
use crate::models::stock::*;
use crate::services::api_client::{ApiClient, StockApi};
use crate::services::chart_builder::build_chart_spec;

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1000);

/// Store 持有的全部数据切片
///
/// 每个切片都是三态：初始空值 -> loading -> 已加载；
/// 失败时写入共享的 `error`，切片保留旧值。
#[derive(Debug, Clone, Default)]
pub struct StoreState {
    pub watchlist: Vec<WatchlistEntry>,
    pub watchlist_loading: bool,

    pub indices: Vec<IndexInfo>,
    pub indices_updated_at: Option<String>,
    pub indices_loading: bool,

    pub today_signals: TodaySignals,
    pub signals_loading: bool,

    pub scan_task: Option<ScanTask>,
    /// 轮询互斥标志，整个 Store 同时只有一个轮询循环
    pub scan_polling: bool,

    pub etf_watchlist: Vec<EtfWatchlistItem>,
    pub etf_loading: bool,
    pub popular_etfs: Vec<PopularEtf>,

    pub settings: Option<NotifySettings>,
    pub settings_loading: bool,

    pub current_analysis: Option<StrategyAnalysis>,
    pub analysis_loading: bool,

    pub current_klines: Option<KlineResponse>,
    pub klines_loading: bool,

    /// 最近一次失败的消息，并发失败时后写覆盖先写
    pub error: Option<String>,
}

impl StoreState {
    pub fn watchlist_summary(&self) -> WatchlistSummary {
        WatchlistSummary::from_entries(&self.watchlist)
    }

    /// 由当前K线切片派生图表描述
    pub fn chart_spec(&self) -> ChartSpec {
        match &self.current_klines {
            Some(k) => build_chart_spec(&k.klines, &k.support_lines, &k.resistance_lines),
            None => ChartSpec::default(),
        }
    }
}

/// 数据切片标识，用于定位 loading 标志
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slice {
    Watchlist,
    Indices,
    TodaySignals,
    EtfWatchlist,
    PopularEtfs,
    Settings,
    Analysis,
    Klines,
}

impl Slice {
    fn loading_flag(self, state: &mut StoreState) -> Option<&mut bool> {
        match self {
            Slice::Watchlist => Some(&mut state.watchlist_loading),
            Slice::Indices => Some(&mut state.indices_loading),
            Slice::TodaySignals => Some(&mut state.signals_loading),
            Slice::EtfWatchlist => Some(&mut state.etf_loading),
            Slice::PopularEtfs => None,
            Slice::Settings => Some(&mut state.settings_loading),
            Slice::Analysis => Some(&mut state.analysis_loading),
            Slice::Klines => Some(&mut state.klines_loading),
        }
    }

    fn label(self) -> &'static str {
        match self {
            Slice::Watchlist => "自选股",
            Slice::Indices => "大盘指数",
            Slice::TodaySignals => "今日信号",
            Slice::EtfWatchlist => "自选ETF",
            Slice::PopularEtfs => "热门ETF",
            Slice::Settings => "设置",
            Slice::Analysis => "策略分析",
            Slice::Klines => "K线",
        }
    }
}

/// 置位 loading 标志，drop 时清除（包括 action future 被取消的情况）
struct LoadingGuard<'a> {
    state: &'a watch::Sender<StoreState>,
    slice: Slice,
}

impl<'a> LoadingGuard<'a> {
    fn engage(state: &'a watch::Sender<StoreState>, slice: Slice) -> Self {
        state.send_if_modified(|s| match slice.loading_flag(s) {
            Some(flag) => {
                *flag = true;
                true
            }
            None => false,
        });
        Self { state, slice }
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        let slice = self.slice;
        self.state.send_if_modified(|s| match slice.loading_flag(s) {
            Some(flag) => {
                *flag = false;
                true
            }
            None => false,
        });
    }
}

/// 轮询任务句柄槽；generation 区分先后启动的循环
#[derive(Default)]
pub(super) struct PollSlot {
    pub(super) generation: u64,
    pub(super) handle: Option<JoinHandle<()>>,
}

pub(super) struct StoreInner {
    pub(super) api: Arc<dyn StockApi>,
    pub(super) state: watch::Sender<StoreState>,
    pub(super) poll_interval: Duration,
    pub(super) poll_slot: Mutex<PollSlot>,
}

/// 数据同步 Store：由应用根创建，克隆后传给各个使用方（克隆共享同一份状态）
///
/// 所有切片只能通过 action 修改；状态变化通过 [`Store::subscribe`] 广播。
#[derive(Clone)]
pub struct Store {
    pub(super) inner: Arc<StoreInner>,
}

impl Store {
    pub fn new(api: Arc<dyn StockApi>) -> Self {
        Self::with_poll_interval(api, DEFAULT_POLL_INTERVAL)
    }

    pub fn with_poll_interval(api: Arc<dyn StockApi>, poll_interval: Duration) -> Self {
        let (state, _) = watch::channel(StoreState::default());
        Self {
            inner: Arc::new(StoreInner {
                api,
                state,
                poll_interval,
                poll_slot: Mutex::new(PollSlot::default()),
            }),
        }
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let client = ApiClient::new(config)?;
        log::info!("后端地址: {}", client.base_url());
        Ok(Self::with_poll_interval(Arc::new(client), config.scan_poll_interval))
    }

    // ==================== 读取 ====================

    pub fn snapshot(&self) -> StoreState {
        self.inner.state.borrow().clone()
    }

    /// 订阅状态变化（每次 action 写入切片都会通知）
    pub fn subscribe(&self) -> watch::Receiver<StoreState> {
        self.inner.state.subscribe()
    }

    pub fn watchlist_summary(&self) -> WatchlistSummary {
        self.inner.state.borrow().watchlist_summary()
    }

    pub fn chart_spec(&self) -> ChartSpec {
        self.inner.state.borrow().chart_spec()
    }

    pub fn is_scan_polling(&self) -> bool {
        self.inner.state.borrow().scan_polling
    }

    pub fn error(&self) -> Option<String> {
        self.inner.state.borrow().error.clone()
    }

    pub fn clear_error(&self) {
        self.inner.state.send_if_modified(|s| s.error.take().is_some());
    }

    // ==================== 自选股 ====================

    pub async fn fetch_watchlist(&self) -> bool {
        self.load(Slice::Watchlist, self.inner.api.get_watchlist_signals(), |s, items| {
            s.watchlist = items;
        })
        .await
    }

    pub async fn add_to_watchlist(&self, code: &str, name: &str, notes: Option<String>) -> bool {
        let request = AddToWatchlistRequest {
            code: code.to_string(),
            name: name.to_string(),
            notes,
        };
        let ok = self.mutate("添加自选股", self.inner.api.add_to_watchlist(&request)).await;
        self.fetch_watchlist().await;
        ok
    }

    pub async fn remove_from_watchlist(&self, code: &str) -> bool {
        let ok = self.mutate("删除自选股", self.inner.api.remove_from_watchlist(code)).await;
        self.fetch_watchlist().await;
        ok
    }

    /// 不带信号的自选股列表（仅代码、名称、备注），不落切片
    pub async fn get_watchlist_items(&self) -> Vec<WatchlistItem> {
        self.request("读取自选股", self.inner.api.get_watchlist())
            .await
            .unwrap_or_default()
    }

    pub async fn get_buy_info(&self, code: &str) -> Option<BuyInfo> {
        self.request("买入信息", self.inner.api.get_buy_info(code)).await
    }

    /// 买入信息影响自选股展示，写入后重新加载自选股
    pub async fn update_buy_info(&self, code: &str, info: &BuyInfo) -> bool {
        let ok = self.mutate("更新买入信息", self.inner.api.update_buy_info(code, info)).await;
        self.fetch_watchlist().await;
        ok
    }

    // ==================== 市场 ====================

    pub async fn fetch_indices(&self) -> bool {
        self.load(Slice::Indices, self.inner.api.get_market_indices(), |s, market| {
            s.indices = market.indices;
            s.indices_updated_at = Some(market.update_time);
        })
        .await
    }

    pub async fn fetch_today_signals(&self) -> bool {
        self.load(Slice::TodaySignals, self.inner.api.get_today_signals(), |s, signals| {
            s.today_signals = signals;
        })
        .await
    }

    // ==================== ETF ====================

    pub async fn fetch_etf_watchlist(&self) -> bool {
        self.load(Slice::EtfWatchlist, self.inner.api.get_etf_watchlist(), |s, items| {
            s.etf_watchlist = items;
        })
        .await
    }

    pub async fn add_to_etf_watchlist(&self, code: &str, name: &str, notes: Option<String>) -> bool {
        let request = AddToWatchlistRequest {
            code: code.to_string(),
            name: name.to_string(),
            notes,
        };
        let ok = self.mutate("添加自选ETF", self.inner.api.add_to_etf_watchlist(&request)).await;
        self.fetch_etf_watchlist().await;
        ok
    }

    pub async fn remove_from_etf_watchlist(&self, code: &str) -> bool {
        let ok = self.mutate("删除自选ETF", self.inner.api.remove_from_etf_watchlist(code)).await;
        self.fetch_etf_watchlist().await;
        ok
    }

    pub async fn fetch_popular_etfs(&self) -> bool {
        self.load(Slice::PopularEtfs, self.inner.api.get_popular_etfs(), |s, items| {
            s.popular_etfs = items;
        })
        .await
    }

    pub async fn search_etfs(&self, keyword: &str) -> Vec<EtfSearchResult> {
        self.request("搜索ETF", self.inner.api.search_etfs(keyword))
            .await
            .unwrap_or_default()
    }

    pub async fn fetch_etf_analysis(&self, code: &str) -> bool {
        self.invalidate_analysis();
        self.load(Slice::Analysis, self.inner.api.get_etf_analysis(code), |s, analysis| {
            s.current_analysis = Some(analysis);
        })
        .await
    }

    // ==================== 个股 ====================

    pub async fn search_stocks(&self, keyword: &str, include_etf: bool) -> Vec<SearchResult> {
        self.request("搜索股票", self.inner.api.search_stocks(keyword, include_etf))
            .await
            .unwrap_or_default()
    }

    /// 详情页单槽位：加载期间清空旧分析
    pub async fn fetch_analysis(&self, code: &str) -> bool {
        self.invalidate_analysis();
        self.load(Slice::Analysis, self.inner.api.get_stock_analysis(code), |s, analysis| {
            s.current_analysis = Some(analysis);
        })
        .await
    }

    pub async fn fetch_klines(&self, code: &str, days: u32) -> bool {
        self.load(Slice::Klines, self.inner.api.get_stock_klines(code, days), |s, klines| {
            s.current_klines = Some(klines);
        })
        .await
    }

    // ==================== 设置 ====================

    pub async fn fetch_settings(&self) -> bool {
        self.load(Slice::Settings, self.inner.api.get_settings(), |s, settings| {
            s.settings = Some(settings);
        })
        .await
    }

    pub async fn update_settings(&self, request: &UpdateSettingsRequest) -> bool {
        let ok = self.mutate("更新设置", self.inner.api.update_settings(request)).await;
        self.fetch_settings().await;
        ok
    }

    pub async fn test_notify(&self) -> Option<TestNotifyResult> {
        self.request("测试推送", self.inner.api.test_notify()).await
    }

    // ==================== 内部 ====================

    fn invalidate_analysis(&self) {
        self.inner.state.send_if_modified(|s| s.current_analysis.take().is_some());
    }

    pub(super) fn record_error(&self, context: &str, err: ApiError) {
        log::warn!("{}失败: {}", context, err);
        self.inner.state.send_modify(|s| s.error = Some(err.message));
    }

    /// 读取类 action：置 loading -> 请求 -> 整体替换切片 / 写 error -> 清 loading
    async fn load<T, Fut>(
        &self,
        slice: Slice,
        request: Fut,
        apply: impl FnOnce(&mut StoreState, T),
    ) -> bool
    where
        Fut: Future<Output = ApiResult<T>>,
    {
        let _loading = LoadingGuard::engage(&self.inner.state, slice);
        match request.await {
            Ok(value) => {
                self.inner.state.send_modify(|s| apply(s, value));
                log::debug!("{}已更新", slice.label());
                true
            }
            Err(err) => {
                self.record_error(&format!("加载{}", slice.label()), err);
                false
            }
        }
    }

    /// 写操作：只返回成功与否，失败消息进入 error
    ///
    /// 调用方无论成败都会重新加载对应切片，与后端重新同步
    async fn mutate<Fut>(&self, context: &str, request: Fut) -> bool
    where
        Fut: Future<Output = ApiResult<ActionMessage>>,
    {
        match request.await {
            Ok(msg) => {
                log::info!("{}: {}", context, msg.message);
                true
            }
            Err(err) => {
                self.record_error(context, err);
                false
            }
        }
    }

    /// 不落切片的请求（搜索、自选股列表、买入信息、测试推送）
    async fn request<T, Fut>(&self, context: &str, request: Fut) -> Option<T>
    where
        Fut: Future<Output = ApiResult<T>>,
    {
        match request.await {
            Ok(value) => Some(value),
            Err(err) => {
                self.record_error(context, err);
                None
            }
        }
    }
}
