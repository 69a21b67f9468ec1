//! Command-line and environment configuration.

use {anyhow::Context, clap::Parser, std::net::SocketAddr, url::Url};

use {
    meridian_graphql::context::StaticConfig,
    meridian_upstream::{Services, http},
};

#[derive(Parser, Debug, Clone)]
#[command(name = "meridian-gateway", about = "GraphQL gateway for Meridian", version)]
pub struct Config {
    /// Address to serve HTTP on.
    #[arg(long, env = "MERIDIAN_LISTEN_ADDR", default_value = "127.0.0.1:8080")]
    pub listen_addr: SocketAddr,

    /// Base URL the backend services hang off of. When unset the gateway
    /// runs against no-op backends, which is only useful for smoke tests.
    #[arg(long, env = "MERIDIAN_BACKEND_URL")]
    pub backend_url: Option<Url>,

    /// Deployment environment. Anything other than "prod" runs in dev mode:
    /// insecure cookies and error causes in responses.
    #[arg(long, env = "MERIDIAN_ENV", default_value = "dev")]
    pub environment: String,

    /// Trust X-Forwarded-For for the client address.
    #[arg(long, env = "MERIDIAN_BEHIND_PROXY")]
    pub behind_proxy: bool,

    /// Domain provisioned email addresses end in.
    #[arg(long, env = "MERIDIAN_EMAIL_DOMAIN", default_value = "mail.meridian.example")]
    pub email_domain: String,

    /// Domain the web client is served from, used to build deep links.
    #[arg(long, env = "MERIDIAN_WEB_DOMAIN", default_value = "app.meridian.example")]
    pub web_domain: String,

    /// Domain media URLs point at.
    #[arg(long, env = "MERIDIAN_MEDIA_API_DOMAIN", default_value = "media.meridian.example")]
    pub media_api_domain: String,

    /// Prefix for static assets such as entity avatars.
    #[arg(long, env = "MERIDIAN_STATIC_URL_PREFIX", default_value = "https://static.meridian.example")]
    pub static_url_prefix: String,

    /// Entity id system-generated messages are posted as.
    #[arg(long, env = "MERIDIAN_SYSTEM_ORG_ID", default_value = "entity_system")]
    pub system_org_id: String,

    /// Phone number support contacts surface as.
    #[arg(long, env = "MERIDIAN_SERVICE_PHONE_NUMBER", default_value = "")]
    pub service_phone_number: String,

    /// Allow clients to start video calls.
    #[arg(long, env = "MERIDIAN_ENABLE_VIDEO_CALLING")]
    pub enable_video_calling: bool,

    /// Allow clients to request payments.
    #[arg(long, env = "MERIDIAN_ENABLE_PAYMENTS")]
    pub enable_payments: bool,

    /// Log filter when RUST_LOG is unset.
    #[arg(long, env = "MERIDIAN_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Emit logs as JSON lines.
    #[arg(long, env = "MERIDIAN_JSON_LOGS")]
    pub json_logs: bool,
}

impl Config {
    #[must_use]
    pub fn dev_mode(&self) -> bool {
        self.environment != "prod"
    }

    #[must_use]
    pub fn static_config(&self) -> StaticConfig {
        StaticConfig {
            email_domain: self.email_domain.clone(),
            web_domain: self.web_domain.clone(),
            media_api_domain: self.media_api_domain.clone(),
            static_url_prefix: self.static_url_prefix.clone(),
            system_org_id: self.system_org_id.clone(),
            service_phone_number: self.service_phone_number.clone(),
            dev_mode: self.dev_mode(),
        }
    }

    /// Connect the backend service clients, or fall back to no-ops when no
    /// backend URL is configured.
    pub fn services(&self) -> anyhow::Result<Services> {
        let Some(base) = &self.backend_url else {
            tracing::warn!("no backend URL configured, serving with no-op backends");
            return Ok(Services::noop());
        };
        let join = |path: &str| {
            base.join(path)
                .with_context(|| format!("joining {path} onto {base}"))
        };
        Ok(http::connect(http::Endpoints {
            auth: join("auth/")?,
            directory: join("directory/")?,
            threading: join("threading/")?,
            excomms: join("excomms/")?,
            care: join("care/")?,
            layout: join("layout/")?,
            settings: join("settings/")?,
            invite: join("invite/")?,
            media: join("media/")?,
            payments: join("payments/")?,
        }))
    }
}
