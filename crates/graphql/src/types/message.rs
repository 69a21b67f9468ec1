use async_graphql::{Enum, SimpleObject, Union};

use meridian_upstream::threading;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Enum)]
#[graphql(rename_items = "SCREAMING_SNAKE_CASE")]
pub enum EndpointChannel {
    App,
    Sms,
    Voice,
    Email,
}

impl From<threading::EndpointChannel> for EndpointChannel {
    fn from(c: threading::EndpointChannel) -> Self {
        match c {
            threading::EndpointChannel::App => Self::App,
            threading::EndpointChannel::Sms => Self::Sms,
            threading::EndpointChannel::Voice => Self::Voice,
            threading::EndpointChannel::Email => Self::Email,
        }
    }
}

impl EndpointChannel {
    /// Channel label used when building message titles.
    #[must_use]
    pub fn title_label(self) -> &'static str {
        match self {
            Self::App => "App",
            Self::Sms => "SMS",
            Self::Voice => "Voice",
            Self::Email => "Email",
        }
    }
}

#[derive(Debug, Clone, SimpleObject)]
pub struct Endpoint {
    pub channel: EndpointChannel,
    pub id: String,
    #[graphql(name = "displayValue")]
    pub display_value: String,
}

#[derive(Debug, Clone, SimpleObject)]
pub struct ImageAttachment {
    pub mimetype: String,
    pub url: String,
    #[graphql(name = "thumbnailURL")]
    pub thumbnail_url: String,
}

#[derive(Debug, Clone, SimpleObject)]
pub struct VideoAttachment {
    pub mimetype: String,
    pub url: String,
}

#[derive(Debug, Clone, SimpleObject)]
pub struct AudioAttachment {
    pub mimetype: String,
    pub url: String,
    #[graphql(name = "durationSeconds")]
    pub duration_seconds: f64,
}

/// Attachments without inline media render as a tappable banner with a deep
/// link (visits, payment requests, care plans, documents).
#[derive(Debug, Clone, SimpleObject)]
pub struct BannerButtonAttachment {
    pub title: String,
    #[graphql(name = "ctaText")]
    pub cta_text: String,
    #[graphql(name = "iconURL")]
    pub icon_url: String,
    #[graphql(name = "tapURL")]
    pub tap_url: String,
}

#[derive(Debug, Clone, Union)]
pub enum AttachmentData {
    Image(ImageAttachment),
    Video(VideoAttachment),
    Audio(AudioAttachment),
    BannerButton(BannerButtonAttachment),
}

#[derive(Debug, Clone, SimpleObject)]
pub struct Attachment {
    pub title: String,
    pub url: String,
    pub data: AttachmentData,
}

#[derive(Debug, Clone, SimpleObject)]
pub struct EntityRef {
    pub id: async_graphql::ID,
    #[graphql(name = "type")]
    pub ref_type: String,
}

#[derive(Debug, Clone, SimpleObject)]
pub struct Message {
    /// Raw markup source.
    #[graphql(name = "textMarkup")]
    pub text_markup: String,
    /// Markup stripped to plain text.
    pub text: String,
    pub title: String,
    pub summary: String,
    pub source: Endpoint,
    pub destinations: Vec<Endpoint>,
    pub attachments: Vec<Attachment>,
    pub refs: Vec<EntityRef>,
}
