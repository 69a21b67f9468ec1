//! Node id helpers.
//!
//! Every object the gateway exposes through the `node` query carries an
//! opaque id whose prefix encodes the concrete type (`entity_x`, `t_x`, …).
//! The prefix table here is the single source of truth for routing a
//! `node(id:)` lookup to the right resolver.

use serde::{Deserialize, Serialize};

/// The polymorphism group behind the `Node` interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    Account,
    Entity,
    SavedThreadQuery,
    Thread,
    ThreadItem,
    Visit,
    Call,
    SavedMessage,
    ScheduledMessage,
}

impl NodeKind {
    /// The id prefix for this kind, without the trailing underscore.
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Account => "account",
            Self::Entity => "entity",
            Self::SavedThreadQuery => "sq",
            Self::Thread => "t",
            Self::ThreadItem => "ti",
            Self::Visit => "visit",
            Self::Call => "ipc",
            Self::SavedMessage => "sm",
            Self::ScheduledMessage => "schmsg",
        }
    }

    /// Resolve the kind encoded in `id`, if the prefix is known.
    #[must_use]
    pub fn from_id(id: &str) -> Option<Self> {
        let (prefix, rest) = id.split_once('_')?;
        if rest.is_empty() {
            return None;
        }
        match prefix {
            "account" => Some(Self::Account),
            "entity" => Some(Self::Entity),
            "sq" => Some(Self::SavedThreadQuery),
            "t" => Some(Self::Thread),
            "ti" => Some(Self::ThreadItem),
            "visit" => Some(Self::Visit),
            "ipc" => Some(Self::Call),
            "sm" => Some(Self::SavedMessage),
            "schmsg" => Some(Self::ScheduledMessage),
            _ => None,
        }
    }

    /// Whether `id` carries this kind's prefix.
    #[must_use]
    pub fn matches(self, id: &str) -> bool {
        NodeKind::from_id(id) == Some(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_prefixes_resolve() {
        assert_eq!(NodeKind::from_id("entity_1A2B"), Some(NodeKind::Entity));
        assert_eq!(NodeKind::from_id("t_99"), Some(NodeKind::Thread));
        assert_eq!(NodeKind::from_id("ti_42"), Some(NodeKind::ThreadItem));
        assert_eq!(NodeKind::from_id("sq_7"), Some(NodeKind::SavedThreadQuery));
        assert_eq!(NodeKind::from_id("account_x"), Some(NodeKind::Account));
        assert_eq!(NodeKind::from_id("visit_x"), Some(NodeKind::Visit));
        assert_eq!(NodeKind::from_id("ipc_x"), Some(NodeKind::Call));
    }

    #[test]
    fn unknown_or_malformed_ids_do_not_resolve() {
        assert_eq!(NodeKind::from_id("bogus_1"), None);
        assert_eq!(NodeKind::from_id("entity"), None);
        assert_eq!(NodeKind::from_id("entity_"), None);
        assert_eq!(NodeKind::from_id(""), None);
    }

    #[test]
    fn matches_checks_prefix() {
        assert!(NodeKind::Thread.matches("t_1"));
        assert!(!NodeKind::Thread.matches("ti_1"));
    }
}
