pub mod builder;
pub mod normalize;
pub mod writer;

pub use crate::domain::model::{Fixture, PirepFixture, ReportFixture, ReportKind};
pub use crate::domain::ports::{ConfigProvider, ReportFetcher, Storage};
pub use crate::utils::error::Result;
