//! hamfec tools library

pub mod common;
pub mod config;
pub mod pipeline;

pub use common::{init_logging, load_config, save_config, GlobalConfig, Palette};
pub use config::{ChannelModel, SimConfig};
pub use pipeline::{Pipeline, PipelineReport};
