use anyhow::Result;
use async_trait::async_trait;
use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::config::ClientConfig;
use crate::error::{ApiError, ApiResult};
use crate::models::etf::{EtfSearchResult, EtfWatchlistItem, PopularEtf};
use crate::models::market::{MarketIndices, ScanRequest, ScanTask, TodaySignals};
use crate::models::settings::{NotifySettings, TestNotifyResult, UpdateSettingsRequest};
use crate::models::stock::*;
use crate::utils::http::build_api_client;

/// 信号后端的全部资源接口
///
/// 返回值均为解包后的业务数据（不含 {items, total} 之类的外层结构），
/// 任何传输错误或非 2xx 响应都归并为 [`ApiError`]。
#[async_trait]
pub trait StockApi: Send + Sync {
    // -- 自选股 ---------------------------------------------------------------
    async fn get_watchlist(&self) -> ApiResult<Vec<WatchlistItem>>;
    async fn get_watchlist_signals(&self) -> ApiResult<Vec<WatchlistEntry>>;
    async fn add_to_watchlist(&self, request: &AddToWatchlistRequest) -> ApiResult<ActionMessage>;
    async fn remove_from_watchlist(&self, code: &str) -> ApiResult<ActionMessage>;

    // -- 个股 -----------------------------------------------------------------
    async fn get_stock_analysis(&self, code: &str) -> ApiResult<StrategyAnalysis>;
    async fn get_stock_klines(&self, code: &str, days: u32) -> ApiResult<KlineResponse>;
    async fn search_stocks(&self, keyword: &str, include_etf: bool) -> ApiResult<Vec<SearchResult>>;
    async fn get_buy_info(&self, code: &str) -> ApiResult<BuyInfo>;
    async fn update_buy_info(&self, code: &str, info: &BuyInfo) -> ApiResult<ActionMessage>;

    // -- 市场 -----------------------------------------------------------------
    async fn get_market_indices(&self) -> ApiResult<MarketIndices>;
    async fn get_today_signals(&self) -> ApiResult<TodaySignals>;
    async fn start_scan(&self, limit: u32) -> ApiResult<ScanTask>;
    async fn get_scan_result(&self, task_id: &str) -> ApiResult<ScanTask>;

    // -- ETF ------------------------------------------------------------------
    async fn get_etf_watchlist(&self) -> ApiResult<Vec<EtfWatchlistItem>>;
    async fn add_to_etf_watchlist(&self, request: &AddToWatchlistRequest) -> ApiResult<ActionMessage>;
    async fn remove_from_etf_watchlist(&self, code: &str) -> ApiResult<ActionMessage>;
    async fn get_popular_etfs(&self) -> ApiResult<Vec<PopularEtf>>;
    async fn search_etfs(&self, keyword: &str) -> ApiResult<Vec<EtfSearchResult>>;
    async fn get_etf_analysis(&self, code: &str) -> ApiResult<StrategyAnalysis>;

    // -- 设置 -----------------------------------------------------------------
    async fn get_settings(&self) -> ApiResult<NotifySettings>;
    async fn update_settings(&self, request: &UpdateSettingsRequest) -> ApiResult<ActionMessage>;
    async fn test_notify(&self) -> ApiResult<TestNotifyResult>;
}

#[derive(Deserialize)]
struct ItemsEnvelope<T> {
    items: Vec<T>,
}

#[derive(Deserialize)]
struct ResultsEnvelope<T> {
    results: Vec<T>,
}

/// 基于 reqwest 的实现，不做任何缓存（缓存由 Store 负责）
#[derive(Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = build_api_client(config.timeout)?;
        Ok(Self {
            client,
            base_url: config.api_base.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        self.send(self.client.get(self.url(path))).await
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> ApiResult<T> {
        let resp = builder.send().await.map_err(|e| {
            log::warn!("请求发送失败: {}", e);
            ApiError::from(e)
        })?;

        let status = resp.status();
        let url = resp.url().path().to_string();
        let text = resp.text().await?;

        if !status.is_success() {
            let err = ApiError::from_status(status, &text);
            log::warn!("{} 返回 {}: {}", url, status.as_u16(), err.message);
            return Err(err);
        }

        log::debug!("{} 返回 {} 字节", url, text.len());
        serde_json::from_str(&text).map_err(|e| {
            log::warn!("{} 响应解析失败: {}", url, e);
            ApiError::from(e)
        })
    }

    /// 写操作返回 {success, message}，success=false 同样视为失败
    async fn mutate(&self, builder: RequestBuilder) -> ApiResult<ActionMessage> {
        let msg: ActionMessage = self.send(builder).await?;
        if msg.success {
            Ok(msg)
        } else {
            Err(ApiError::new(if msg.message.is_empty() { "操作失败".to_string() } else { msg.message }))
        }
    }
}

fn encode(segment: &str) -> String {
    urlencoding::encode(segment).into_owned()
}

#[async_trait]
impl StockApi for ApiClient {
    async fn get_watchlist(&self) -> ApiResult<Vec<WatchlistItem>> {
        let env: ItemsEnvelope<WatchlistItem> = self.get("/stocks/watchlist").await?;
        Ok(env.items)
    }

    async fn get_watchlist_signals(&self) -> ApiResult<Vec<WatchlistEntry>> {
        let env: ItemsEnvelope<WatchlistEntry> = self.get("/stocks/watchlist/signals").await?;
        Ok(env.items)
    }

    async fn add_to_watchlist(&self, request: &AddToWatchlistRequest) -> ApiResult<ActionMessage> {
        self.mutate(self.client.post(self.url("/stocks/watchlist")).json(request)).await
    }

    async fn remove_from_watchlist(&self, code: &str) -> ApiResult<ActionMessage> {
        let url = self.url(&format!("/stocks/watchlist/{}", encode(code)));
        self.mutate(self.client.delete(url)).await
    }

    async fn get_stock_analysis(&self, code: &str) -> ApiResult<StrategyAnalysis> {
        self.get(&format!("/stocks/{}/analysis", encode(code))).await
    }

    async fn get_stock_klines(&self, code: &str, days: u32) -> ApiResult<KlineResponse> {
        let url = self.url(&format!("/stocks/{}/klines", encode(code)));
        self.send(self.client.get(url).query(&[("days", days)])).await
    }

    async fn search_stocks(&self, keyword: &str, include_etf: bool) -> ApiResult<Vec<SearchResult>> {
        let req = self
            .client
            .get(self.url("/stocks/search"))
            .query(&[("keyword", keyword.to_string()), ("include_etf", include_etf.to_string())]);
        let env: ResultsEnvelope<SearchResult> = self.send(req).await?;
        Ok(env.results)
    }

    async fn get_buy_info(&self, code: &str) -> ApiResult<BuyInfo> {
        self.get(&format!("/stocks/{}/buy-info", encode(code))).await
    }

    async fn update_buy_info(&self, code: &str, info: &BuyInfo) -> ApiResult<ActionMessage> {
        let url = self.url(&format!("/stocks/{}/buy-info", encode(code)));
        self.mutate(self.client.put(url).json(info)).await
    }

    async fn get_market_indices(&self) -> ApiResult<MarketIndices> {
        self.get("/market/indices").await
    }

    async fn get_today_signals(&self) -> ApiResult<TodaySignals> {
        self.get("/market/signals/today").await
    }

    async fn start_scan(&self, limit: u32) -> ApiResult<ScanTask> {
        let req = self.client.post(self.url("/market/scan")).json(&ScanRequest { limit });
        self.send(req).await
    }

    async fn get_scan_result(&self, task_id: &str) -> ApiResult<ScanTask> {
        self.get(&format!("/market/scan/{}", encode(task_id))).await
    }

    async fn get_etf_watchlist(&self) -> ApiResult<Vec<EtfWatchlistItem>> {
        let env: ItemsEnvelope<EtfWatchlistItem> = self.get("/etfs/watchlist").await?;
        Ok(env.items)
    }

    async fn add_to_etf_watchlist(&self, request: &AddToWatchlistRequest) -> ApiResult<ActionMessage> {
        self.mutate(self.client.post(self.url("/etfs/watchlist")).json(request)).await
    }

    async fn remove_from_etf_watchlist(&self, code: &str) -> ApiResult<ActionMessage> {
        let url = self.url(&format!("/etfs/watchlist/{}", encode(code)));
        self.mutate(self.client.delete(url)).await
    }

    async fn get_popular_etfs(&self) -> ApiResult<Vec<PopularEtf>> {
        let env: ItemsEnvelope<PopularEtf> = self.get("/etfs/popular").await?;
        Ok(env.items)
    }

    async fn search_etfs(&self, keyword: &str) -> ApiResult<Vec<EtfSearchResult>> {
        let req = self.client.get(self.url("/etfs/search")).query(&[("keyword", keyword)]);
        let env: ResultsEnvelope<EtfSearchResult> = self.send(req).await?;
        Ok(env.results)
    }

    async fn get_etf_analysis(&self, code: &str) -> ApiResult<StrategyAnalysis> {
        self.get(&format!("/etfs/{}/analysis", encode(code))).await
    }

    async fn get_settings(&self) -> ApiResult<NotifySettings> {
        self.get("/settings").await
    }

    async fn update_settings(&self, request: &UpdateSettingsRequest) -> ApiResult<ActionMessage> {
        self.mutate(self.client.put(self.url("/settings")).json(request)).await
    }

    async fn test_notify(&self) -> ApiResult<TestNotifyResult> {
        self.send(self.client.post(self.url("/settings/notify/test"))).await
    }
}
