//! Template resource controller.
//!
//! Maps between the host attribute tree and the template API, corrects plans
//! so server-assigned identifiers survive edits, and orchestrates the remote
//! calls for each lifecycle operation.

pub mod config;
pub mod conflict;
pub mod controller;
pub mod error;
pub mod import;
pub mod mapper;
pub mod observability;
pub mod provider;

pub use config::{FORCE_UPDATE_ENV, ForceUpdate, ProviderConfig, parse_force_update};
pub use controller::{ReadOutcome, TemplateController};
pub use error::{ControllerError, Diagnostic, Operation, Result};
pub use import::ImportKey;
pub use provider::{MINIMUM_PLATFORM_VERSION, Provider};
