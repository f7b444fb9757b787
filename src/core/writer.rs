use crate::core::builder::FixtureBuilder;
use crate::core::normalize::sort_keys;
use crate::domain::model::{Fixture, ReportKind};
use crate::domain::ports::{ConfigProvider, ReportFetcher, Storage};
use crate::utils::error::{FixtureError, Result};
use serde::Serialize;
use serde_json::ser::{Formatter, PrettyFormatter, Serializer};
use std::io;

pub const FIXTURE_ROOT: &str = "tests";

/// `tests/<kind>/<station>.json`
pub fn fixture_path(kind: ReportKind, station: &str) -> String {
    format!("{}/{}/{}.json", FIXTURE_ROOT, kind, station)
}

/// 四格縮排、鍵值排序、非 ASCII 字元以 `\uXXXX` 輸出的 JSON
pub fn to_canonical_json<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    let value = sort_keys(serde_json::to_value(value)?);

    let mut buf = Vec::new();
    let formatter = AsciiFormatter(PrettyFormatter::with_indent(b"    "));
    let mut serializer = Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut serializer)?;
    Ok(buf)
}

/// 排版交給 PrettyFormatter，字串中 0x7f 以上的字元改寫成 UTF-16 跳脫序列
struct AsciiFormatter<'a>(PrettyFormatter<'a>);

impl Formatter for AsciiFormatter<'_> {
    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        let mut start = 0;
        for (i, c) in fragment.char_indices() {
            if c < '\x7f' {
                continue;
            }
            writer.write_all(fragment[start..i].as_bytes())?;
            let mut units = [0u16; 2];
            for unit in c.encode_utf16(&mut units) {
                write!(writer, "\\u{:04x}", unit)?;
            }
            start = i + c.len_utf8();
        }
        writer.write_all(fragment[start..].as_bytes())
    }

    fn begin_array<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.0.begin_array(writer)
    }

    fn end_array<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.0.end_array(writer)
    }

    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.0.begin_array_value(writer, first)
    }

    fn end_array_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.0.end_array_value(writer)
    }

    fn begin_object<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.0.begin_object(writer)
    }

    fn end_object<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.0.end_object(writer)
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.0.begin_object_key(writer, first)
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.0.begin_object_value(writer)
    }

    fn end_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.0.end_object_value(writer)
    }
}

#[derive(Debug)]
pub struct FailedPair {
    pub kind: ReportKind,
    pub station: String,
    pub error: FixtureError,
}

#[derive(Debug, Default)]
pub struct RunSummary {
    pub written: Vec<String>,
    pub skipped: Vec<(ReportKind, String)>,
    pub failed: Vec<FailedPair>,
}

impl RunSummary {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    /// 全部成功為 0，keep_going 下有任何失敗為 1
    pub fn exit_code(&self) -> i32 {
        if self.is_success() {
            0
        } else {
            1
        }
    }
}

/// 跑完整個 (kind × station) 矩陣並寫出 fixture 檔案
pub struct FixtureWriter<F: ReportFetcher, S: Storage, C: ConfigProvider> {
    builder: FixtureBuilder<F>,
    storage: S,
    config: C,
}

impl<F: ReportFetcher, S: Storage, C: ConfigProvider> FixtureWriter<F, S, C> {
    pub fn new(fetcher: F, storage: S, config: C) -> Self {
        Self {
            builder: FixtureBuilder::new(fetcher),
            storage,
            config,
        }
    }

    /// 預設遇錯即停；keep_going 時收集失敗並繼續
    pub async fn run(&self) -> Result<RunSummary> {
        let mut summary = RunSummary::default();
        let kinds = self.config.report_kinds();
        let stations = self.config.stations();

        tracing::info!(
            "Generating fixtures for {} kinds x {} stations",
            kinds.len(),
            stations.len()
        );

        for &kind in kinds {
            for station in stations {
                match self.generate(kind, station).await {
                    Ok(Some(path)) => summary.written.push(path),
                    Ok(None) => {
                        tracing::debug!("⏭️  No {} reports for {}, skipping", kind, station);
                        summary.skipped.push((kind, station.clone()));
                    }
                    Err(e) if self.config.keep_going() => {
                        tracing::error!("❌ {} {} failed: {}", kind, station, e);
                        summary.failed.push(FailedPair {
                            kind,
                            station: station.clone(),
                            error: e,
                        });
                    }
                    Err(e) => return Err(e),
                }
            }
        }

        tracing::info!(
            "Wrote {} fixtures, skipped {}, failed {}",
            summary.written.len(),
            summary.skipped.len(),
            summary.failed.len()
        );
        Ok(summary)
    }

    /// 產生單一 fixture，回傳寫入路徑；`None` 表示不需寫檔
    pub async fn generate(&self, kind: ReportKind, station: &str) -> Result<Option<String>> {
        tracing::debug!("Building {} fixture for {}", kind, station);

        let fixture = match self
            .builder
            .build(kind, station, self.config.taf_report(station))
            .await?
        {
            Some(fixture) => fixture,
            None => return Ok(None),
        };

        let path = fixture_path(kind, station);
        self.write(&path, &fixture).await?;
        tracing::info!("✅ Wrote {}", path);
        Ok(Some(path))
    }

    async fn write(&self, path: &str, fixture: &Fixture) -> Result<()> {
        let bytes = to_canonical_json(fixture)?;
        tracing::debug!("Writing {} bytes to {}", bytes.len(), path);
        self.storage.write_file(path, &bytes).await
    }
}
