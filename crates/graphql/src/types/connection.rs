//! Relay-style cursor pagination.
//!
//! `first`/`after` page from the start, `last`/`before` page from the end.
//! The corresponding `pageInfo` flag is taken from the upstream `has_more`
//! bit: FROM_START feeds `hasNextPage`, FROM_END feeds `hasPreviousPage`.

use async_graphql::{InputObject, OutputType, SimpleObject};

use meridian_upstream::threading::{IteratorDirection, PageIterator};

const DEFAULT_PAGE_SIZE: u32 = 20;

#[derive(Debug, Clone, SimpleObject)]
pub struct PageInfo {
    #[graphql(name = "hasNextPage")]
    pub has_next_page: bool,
    #[graphql(name = "hasPreviousPage")]
    pub has_previous_page: bool,
}

#[derive(Debug, Clone, SimpleObject)]
#[graphql(concrete(name = "ThreadEdge", params(super::Thread)))]
#[graphql(concrete(name = "ThreadItemEdge", params(super::ThreadItem)))]
pub struct Edge<T: OutputType> {
    pub node: T,
    pub cursor: String,
}

#[derive(Debug, Clone, SimpleObject)]
#[graphql(concrete(name = "ThreadConnection", params(super::Thread)))]
#[graphql(concrete(name = "ThreadItemConnection", params(super::ThreadItem)))]
pub struct Connection<T: OutputType>
where
    Edge<T>: OutputType,
{
    pub edges: Vec<Edge<T>>,
    #[graphql(name = "pageInfo")]
    pub page_info: PageInfo,
    pub total: Option<u64>,
}

impl<T: OutputType> Connection<T>
where
    Edge<T>: OutputType,
{
    /// Assemble a connection from upstream edges given the direction the
    /// iterator ran in.
    #[must_use]
    pub fn from_edges(
        edges: Vec<Edge<T>>,
        direction: IteratorDirection,
        has_more: bool,
        total: Option<u64>,
    ) -> Self {
        let page_info = match direction {
            IteratorDirection::FromStart => PageInfo {
                has_next_page: has_more,
                has_previous_page: false,
            },
            IteratorDirection::FromEnd => PageInfo {
                has_next_page: false,
                has_previous_page: has_more,
            },
        };
        Self {
            edges,
            page_info,
            total,
        }
    }
}

/// The reusable Relay pagination argument set.
#[derive(Debug, Clone, Default, InputObject)]
pub struct ConnectionArgs {
    pub after: Option<String>,
    pub before: Option<String>,
    pub first: Option<u32>,
    pub last: Option<u32>,
}

impl ConnectionArgs {
    /// Map Relay arguments onto the upstream iterator. `last` pages from the
    /// end; everything else (including no arguments) pages from the start.
    #[must_use]
    pub fn iterator(&self) -> PageIterator {
        if let Some(last) = self.last {
            return PageIterator {
                start_cursor: self.after.clone(),
                end_cursor: self.before.clone(),
                count: last,
                direction: IteratorDirection::FromEnd,
            };
        }
        PageIterator {
            start_cursor: self.after.clone(),
            end_cursor: self.before.clone(),
            count: self.first.unwrap_or(DEFAULT_PAGE_SIZE),
            direction: IteratorDirection::FromStart,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_maps_to_from_start() {
        let args = ConnectionArgs {
            first: Some(5),
            ..Default::default()
        };
        let it = args.iterator();
        assert_eq!(it.direction, IteratorDirection::FromStart);
        assert_eq!(it.count, 5);
    }

    #[test]
    fn last_maps_to_from_end() {
        let args = ConnectionArgs {
            last: Some(3),
            before: Some("cur".into()),
            ..Default::default()
        };
        let it = args.iterator();
        assert_eq!(it.direction, IteratorDirection::FromEnd);
        assert_eq!(it.count, 3);
        assert_eq!(it.end_cursor.as_deref(), Some("cur"));
    }

    #[test]
    fn has_more_feeds_the_directional_flag() {
        let c: Connection<super::super::Thread> =
            Connection::from_edges(Vec::new(), IteratorDirection::FromStart, true, Some(7));
        assert!(c.page_info.has_next_page);
        assert!(!c.page_info.has_previous_page);

        let c: Connection<super::super::Thread> =
            Connection::from_edges(Vec::new(), IteratorDirection::FromEnd, true, None);
        assert!(c.page_info.has_previous_page);
        assert!(!c.page_info.has_next_page);
    }
}
