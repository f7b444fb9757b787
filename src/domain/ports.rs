use crate::domain::model::{PirepReports, RawReport, ReportKind};
use crate::utils::error::Result;
use async_trait::async_trait;

/// 天氣報告解析函式庫的抽象：抓取並解析，回傳結構化資料
#[async_trait]
pub trait ReportFetcher: Send + Sync {
    async fn fetch_metar(&self, station: &str) -> Result<RawReport>;

    /// `report` 有值時解析該原始字串，不做即時抓取
    async fn fetch_taf(&self, station: &str, report: Option<&str>) -> Result<RawReport>;

    async fn fetch_pireps(&self, station: &str) -> Result<PirepReports>;
}

pub trait Storage: Send + Sync {
    /// 整檔覆寫，必要時建立上層目錄
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn api_endpoint(&self) -> &str;
    fn api_token(&self) -> Option<&str>;
    fn timeout_seconds(&self) -> u64;
    fn output_path(&self) -> &str;
    fn report_kinds(&self) -> &[ReportKind];
    fn stations(&self) -> &[String];
    fn taf_report(&self, station: &str) -> Option<&str>;
    fn keep_going(&self) -> bool;
}
