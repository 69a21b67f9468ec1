//! Shared gateway state.

use std::sync::Arc;

use {
    meridian_common::request_id::RequestIdGenerator,
    meridian_graphql::{
        MeridianSchema, build_schema,
        context::FeatureFlags,
        raccess::ResourceAccessor,
    },
    meridian_upstream::Services,
};

use crate::config::Config;

/// Everything the request handlers share. Built once at startup.
pub struct AppState {
    pub schema: MeridianSchema,
    pub raccess: Arc<ResourceAccessor>,
    pub services: Services,
    pub features: FeatureFlags,
    pub dev_mode: bool,
    pub behind_proxy: bool,
    pub request_ids: RequestIdGenerator,
}

impl AppState {
    pub fn from_config(config: &Config) -> anyhow::Result<Arc<Self>> {
        let services = config.services()?;
        Ok(Self::new(config, services))
    }

    /// Assemble state around an already-built service bundle. Tests use this
    /// to serve against mock backends.
    #[must_use]
    pub fn new(config: &Config, services: Services) -> Arc<Self> {
        let schema = build_schema(services.clone(), config.static_config());
        Arc::new(Self {
            schema,
            raccess: Arc::new(ResourceAccessor::new(services.clone())),
            services,
            features: FeatureFlags {
                video_calling: config.enable_video_calling,
                payments: config.enable_payments,
            },
            dev_mode: config.dev_mode(),
            behind_proxy: config.behind_proxy,
            request_ids: RequestIdGenerator::new(),
        })
    }
}
