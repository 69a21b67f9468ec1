//! Typed clients for the backend services the gateway composes.
//!
//! Each backend (auth, directory, threading, excomms, care, layout, settings,
//! invite, media, payments) is modeled as a trait whose methods mirror the
//! service's wire operations. The gateway's resource accessor only ever talks
//! to these traits, so tests substitute recording mocks and the binary wires
//! in the HTTP implementations.
//!
//! Not-found is a first-class outcome: every client maps the service's
//! not-found signal to [`UpstreamError::NotFound`] so callers can branch on
//! it without string matching.

pub mod auth;
pub mod care;
pub mod directory;
pub mod error;
pub mod excomms;
pub mod http;
pub mod invite;
pub mod layout;
pub mod media;
pub mod payments;
pub mod settings;
pub mod threading;

use std::sync::Arc;

pub use error::{UpstreamError, UpstreamResult};

/// The full bundle of backend service handles.
///
/// Cloning is cheap; all handles are `Arc`ed trait objects.
#[derive(Clone)]
pub struct Services {
    pub auth: Arc<dyn auth::AuthService>,
    pub directory: Arc<dyn directory::DirectoryService>,
    pub threading: Arc<dyn threading::ThreadingService>,
    pub excomms: Arc<dyn excomms::ExcommsService>,
    pub care: Arc<dyn care::CareService>,
    pub layout: Arc<dyn layout::LayoutService>,
    pub settings: Arc<dyn settings::SettingsService>,
    pub invite: Arc<dyn invite::InviteService>,
    pub media: Arc<dyn media::MediaService>,
    pub payments: Arc<dyn payments::PaymentsService>,
}

impl Services {
    /// A bundle where every service rejects or returns empty results.
    /// Useful for tests and for running the gateway before backends exist.
    #[must_use]
    pub fn noop() -> Self {
        Self {
            auth: Arc::new(auth::NoopAuthService),
            directory: Arc::new(directory::NoopDirectoryService),
            threading: Arc::new(threading::NoopThreadingService),
            excomms: Arc::new(excomms::NoopExcommsService),
            care: Arc::new(care::NoopCareService),
            layout: Arc::new(layout::NoopLayoutService),
            settings: Arc::new(settings::NoopSettingsService),
            invite: Arc::new(invite::NoopInviteService),
            media: Arc::new(media::NoopMediaService),
            payments: Arc::new(payments::NoopPaymentsService),
        }
    }
}
