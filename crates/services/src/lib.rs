#![forbid(unsafe_code)]

pub mod app_services;
pub mod dashboard;
pub mod error;
pub mod progress_service;
pub mod progress_source;

pub use progress_core::Clock;

pub use app_services::AppServices;
pub use dashboard::{LearnerSummary, RankKey, rank_learners};
pub use error::{
    AppServicesError, ProgressApiConfigError, ProgressServiceError, ProgressSourceError,
};
pub use progress_service::{LearnerReport, ProgressService, ResumeDecision};
pub use progress_source::{
    HttpProgressSource, ProgressApiConfig, ProgressSource, StaticProgressSource,
};
