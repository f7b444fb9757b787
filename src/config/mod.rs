pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli::CliConfig;

#[cfg(feature = "cli")]
mod cli {
    use crate::adapters::http::DEFAULT_API_ENDPOINT;
    use crate::config::toml_config::ConfigOverrides;
    use crate::core::ConfigProvider;
    use crate::domain::model::{ReportKind, DEFAULT_STATIONS};
    use crate::utils::error::Result;
    use crate::utils::validation::{self, Validate};
    use clap::parser::ValueSource;
    use clap::{ArgMatches, CommandFactory, FromArgMatches, Parser};
    use std::collections::HashMap;
    use std::ffi::OsString;
    use std::path::PathBuf;

    #[derive(Debug, Clone, Parser)]
    #[command(name = "wx-fixtures")]
    #[command(about = "Regenerate METAR/TAF/PIREP end-to-end test fixtures")]
    pub struct CliConfig {
        #[arg(long, default_value = DEFAULT_API_ENDPOINT)]
        pub api_endpoint: String,

        #[arg(long, help = "API token sent as a bearer token")]
        pub api_token: Option<String>,

        #[arg(long, default_value = ".")]
        pub output_path: String,

        #[arg(long, default_value = "30")]
        pub timeout_seconds: u64,

        #[arg(long, value_enum, value_delimiter = ',', default_values_t = ReportKind::ALL)]
        pub kinds: Vec<ReportKind>,

        #[arg(long, value_delimiter = ',', default_values_t = DEFAULT_STATIONS.map(String::from))]
        pub stations: Vec<String>,

        #[arg(long, help = "Keep generating after a failed station and report all failures")]
        pub keep_going: bool,

        #[arg(short, long, help = "Load settings from a TOML file")]
        pub config: Option<PathBuf>,

        #[arg(short, long, help = "Enable verbose output")]
        pub verbose: bool,

        #[arg(long, help = "Emit logs as JSON")]
        pub json_logs: bool,

        #[arg(skip)]
        pub taf_reports: HashMap<String, String>,
    }

    impl CliConfig {
        /// 解析命令列，同時取出使用者明確指定、要蓋過 TOML 配置的選項
        pub fn try_parse_with_overrides<I, T>(
            args: I,
        ) -> std::result::Result<(Self, ConfigOverrides), clap::Error>
        where
            I: IntoIterator<Item = T>,
            T: Into<OsString> + Clone,
        {
            let matches = Self::command().try_get_matches_from(args)?;
            let cli = Self::from_arg_matches(&matches)?;
            let overrides = cli.explicit_overrides(&matches);
            Ok((cli, overrides))
        }

        fn explicit_overrides(&self, matches: &ArgMatches) -> ConfigOverrides {
            let given = |id: &str| matches.value_source(id) == Some(ValueSource::CommandLine);

            ConfigOverrides {
                api_endpoint: given("api_endpoint").then(|| self.api_endpoint.clone()),
                api_token: self.api_token.clone(),
                output_path: given("output_path").then(|| self.output_path.clone()),
                timeout_seconds: given("timeout_seconds").then_some(self.timeout_seconds),
                kinds: given("kinds").then(|| self.kinds.clone()),
                stations: given("stations").then(|| self.stations.clone()),
                keep_going: self.keep_going,
            }
        }
    }

    impl ConfigProvider for CliConfig {
        fn api_endpoint(&self) -> &str {
            &self.api_endpoint
        }

        fn api_token(&self) -> Option<&str> {
            self.api_token.as_deref()
        }

        fn timeout_seconds(&self) -> u64 {
            self.timeout_seconds
        }

        fn output_path(&self) -> &str {
            &self.output_path
        }

        fn report_kinds(&self) -> &[ReportKind] {
            &self.kinds
        }

        fn stations(&self) -> &[String] {
            &self.stations
        }

        fn taf_report(&self, station: &str) -> Option<&str> {
            self.taf_reports.get(station).map(String::as_str)
        }

        fn keep_going(&self) -> bool {
            self.keep_going
        }
    }

    impl Validate for CliConfig {
        fn validate(&self) -> Result<()> {
            validation::validate_url("api_endpoint", &self.api_endpoint)?;
            validation::validate_path("output_path", &self.output_path)?;
            validation::validate_range("timeout_seconds", self.timeout_seconds, 1, 300)?;
            validation::validate_non_empty_list("kinds", &self.kinds)?;
            validation::validate_stations("stations", &self.stations)?;
            Ok(())
        }
    }

}
