use crate::core::normalize;
use crate::domain::model::{
    Fixture, PirepEntry, PirepFixture, RawReport, ReportFixture, ReportKind,
};
use crate::domain::ports::ReportFetcher;
use crate::utils::error::{FixtureError, Result};

/// 依報告種類抓取資料並清除時間欄位，組成可序列化的 fixture
pub struct FixtureBuilder<F: ReportFetcher> {
    fetcher: F,
}

impl<F: ReportFetcher> FixtureBuilder<F> {
    pub fn new(fetcher: F) -> Self {
        Self { fetcher }
    }

    /// `None` 表示沒有可寫入的 fixture（目前只有 PIREP 無資料時）
    pub async fn build(
        &self,
        kind: ReportKind,
        station: &str,
        taf_report: Option<&str>,
    ) -> Result<Option<Fixture>> {
        match kind {
            ReportKind::Metar => Ok(Some(self.metar(station).await?.into())),
            ReportKind::Taf => Ok(Some(self.taf(station, taf_report).await?.into())),
            ReportKind::Pirep => Ok(self.pirep(station).await?.map(Fixture::from)),
        }
    }

    pub async fn metar(&self, station: &str) -> Result<ReportFixture> {
        let mut report = self.fetcher.fetch_metar(station).await?;
        normalize::normalize_metar(&mut report.data)
            .map_err(|msg| FixtureError::parse(ReportKind::Metar, station, msg))?;
        Ok(into_fixture(report))
    }

    pub async fn taf(&self, station: &str, report: Option<&str>) -> Result<ReportFixture> {
        let mut raw = self.fetcher.fetch_taf(station, report).await?;
        let periods = normalize::normalize_taf(&mut raw.data)
            .map_err(|msg| FixtureError::parse(ReportKind::Taf, station, msg))?;
        tracing::debug!("TAF {} has {} forecast periods", station, periods);
        Ok(into_fixture(raw))
    }

    pub async fn pirep(&self, station: &str) -> Result<Option<PirepFixture>> {
        let fetched = self.fetcher.fetch_pireps(station).await?;
        if fetched.reports.is_empty() {
            return Ok(None);
        }

        let station_info = fetched.station_info.ok_or_else(|| {
            FixtureError::parse(ReportKind::Pirep, station, "station info is missing")
        })?;

        let mut reports = Vec::with_capacity(fetched.reports.len());
        for (i, mut data) in fetched.reports.into_iter().enumerate() {
            normalize::normalize_pirep(&mut data).map_err(|msg| {
                FixtureError::parse(ReportKind::Pirep, station, format!("report {}: {}", i, msg))
            })?;
            reports.push(PirepEntry { data });
        }

        Ok(Some(PirepFixture {
            reports,
            station_info,
        }))
    }
}

fn into_fixture(report: RawReport) -> ReportFixture {
    ReportFixture {
        data: report.data,
        translations: report.translations,
        summary: report.summary,
        speech: report.speech,
        station_info: report.station_info,
    }
}
