pub mod etl;
pub mod fetcher;
pub mod filter;
pub mod pipeline;
pub mod sleeper;
pub mod tmdb;
pub mod uploader;
pub mod walker;

pub use crate::domain::model::{MovieDetail, MovieRecord};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Sleeper, Storage};
pub use crate::utils::error::Result;
