use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// 報告種類，決定使用哪個 builder 以及哪些時間欄位需要清除
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum ReportKind {
    Metar,
    Taf,
    Pirep,
}

impl ReportKind {
    pub const ALL: [ReportKind; 3] = [ReportKind::Metar, ReportKind::Taf, ReportKind::Pirep];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportKind::Metar => "metar",
            ReportKind::Taf => "taf",
            ReportKind::Pirep => "pirep",
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "metar" => Ok(ReportKind::Metar),
            "taf" => Ok(ReportKind::Taf),
            "pirep" => Ok(ReportKind::Pirep),
            other => Err(format!("unknown report kind: {}", other)),
        }
    }
}

pub const DEFAULT_STATIONS: [&str; 4] = ["KJFK", "KMCO", "PHNL", "EGLL"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Runway {
    pub length_ft: Option<i64>,
    pub width_ft: Option<i64>,
    pub ident1: Option<String>,
    pub ident2: Option<String>,
}

/// 測站基本資料。欄位固定，缺值時序列化為 null
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StationInfo {
    pub city: Option<String>,
    pub country: Option<String>,
    pub elevation_ft: Option<i64>,
    pub elevation_m: Option<i64>,
    pub iata: Option<String>,
    pub icao: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub name: Option<String>,
    pub note: Option<String>,
    pub reporting: Option<bool>,
    pub runways: Option<Vec<Runway>>,
    pub state: Option<String>,
    #[serde(rename = "type")]
    pub station_type: Option<String>,
    pub website: Option<String>,
    pub wiki: Option<String>,
}

/// METAR/TAF 解析結果，只在單次 builder 呼叫期間存在
#[derive(Debug, Clone, PartialEq)]
pub struct RawReport {
    pub data: Value,
    pub translations: Value,
    pub summary: Value,
    pub speech: Value,
    pub station_info: StationInfo,
}

/// PIREP 解析結果：多筆報告共用一份測站資料
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PirepReports {
    pub reports: Vec<Value>,
    pub station_info: Option<StationInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportFixture {
    pub data: Value,
    pub translations: Value,
    pub summary: Value,
    pub speech: Value,
    pub station_info: StationInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PirepEntry {
    pub data: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PirepFixture {
    pub reports: Vec<PirepEntry>,
    pub station_info: StationInfo,
}

/// 寫入磁碟前的正規化紀錄
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Fixture {
    Report(ReportFixture),
    Pireps(PirepFixture),
}

impl From<ReportFixture> for Fixture {
    fn from(fixture: ReportFixture) -> Self {
        Fixture::Report(fixture)
    }
}

impl From<PirepFixture> for Fixture {
    fn from(fixture: PirepFixture) -> Self {
        Fixture::Pireps(fixture)
    }
}
