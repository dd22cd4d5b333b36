pub mod artifact;
pub mod catalog;
pub mod chat;
pub mod config;
pub mod delivery;
pub mod extractor;
pub mod pipeline;
pub mod progress;
pub mod testing;
pub mod uploader;

pub use catalog::{build_catalog, CatalogCache, CatalogEntry, FormatCatalog};
pub use chat::{ChatApi, ChatError, ChatId, InlineKeyboard, MessageRef, StatusMessage};
pub use config::{
    load_config, load_config_from_env, load_config_from_str, validate_config, Config, ConfigError,
    SanitizedConfig,
};
pub use delivery::{DeliveryOutcome, DeliveryRouter};
pub use extractor::{FormatSelection, MediaExtractor, ProbeInfo, YtDlpExtractor};
pub use pipeline::{Pipeline, PipelineRequest};
pub use progress::{ProgressEvent, ProgressReporter, StatusSink};
pub use uploader::{create_uploader, RemoteUploader};
