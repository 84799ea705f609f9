//! Abstractions for pagination.

use std::vec;

/// Page of nodes selected by [`Arguments`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Page<N> {
    /// Nodes on this [`Page`].
    pub nodes: Vec<N>,

    /// [`Arguments`] this [`Page`] was selected with.
    pub arguments: Arguments,
}

impl<N> Page<N> {
    /// Creates a new [`Page`] from the provided nodes.
    #[must_use]
    pub fn new(arguments: Arguments, nodes: impl IntoIterator<Item = N>) -> Self {
        Self {
            nodes: nodes.into_iter().collect(),
            arguments,
        }
    }
}

impl<N> IntoIterator for Page<N> {
    type Item = N;
    type IntoIter = vec::IntoIter<N>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.into_iter()
    }
}

/// Offset pagination arguments.
///
/// Pages are numbered from `1`.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Arguments {
    /// Number of the requested page.
    page: u32,

    /// Maximum number of nodes on a page.
    limit: u32,
}

impl Arguments {
    /// Number of the page returned when no page is requested.
    pub const FIRST_PAGE: u32 = 1;

    /// Creates new [`Arguments`] falling back to the [`FIRST_PAGE`] and the
    /// provided `default_limit`.
    ///
    /// [`None`] is returned if the requested `page` is `0`.
    ///
    /// [`FIRST_PAGE`]: Self::FIRST_PAGE
    #[must_use]
    pub fn new(
        page: Option<u32>,
        limit: Option<u32>,
        default_limit: u32,
    ) -> Option<Self> {
        let page = page.unwrap_or(Self::FIRST_PAGE);
        (page >= Self::FIRST_PAGE).then_some(Self {
            page,
            limit: limit.unwrap_or(default_limit),
        })
    }

    /// Returns number of the requested page.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Returns limit requested by these [`Arguments`].
    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    /// Returns number of nodes to skip before the requested page.
    #[must_use]
    pub fn offset(&self) -> u64 {
        u64::from(self.page - Self::FIRST_PAGE) * u64::from(self.limit)
    }
}

/// Defines pagination types.
#[expect(clippy::module_name_repetitions, reason = "more readable")]
#[macro_export]
macro_rules! define_pagination {
    ($node:ty) => {
        #[doc = "A [`Page`] of nodes."]
        pub type Page = $crate::pagination::Page<$node>;

        #[doc = "Arguments for selecting a [`Page`]."]
        pub type Arguments = $crate::pagination::Arguments;
    };
}

#[cfg(test)]
mod spec {
    use super::{Arguments, Page};

    #[test]
    fn defaults_to_first_page() {
        let args = Arguments::new(None, None, 10).unwrap();

        assert_eq!(args.page(), 1);
        assert_eq!(args.limit(), 10);
        assert_eq!(args.offset(), 0);
    }

    #[test]
    fn computes_offset() {
        let args = Arguments::new(Some(3), Some(25), 10).unwrap();

        assert_eq!(args.limit(), 25);
        assert_eq!(args.offset(), 50);
    }

    #[test]
    fn rejects_zero_page() {
        assert!(Arguments::new(Some(0), Some(10), 10).is_none());
    }

    #[test]
    fn does_not_overflow_offset() {
        let args = Arguments::new(Some(u32::MAX), Some(u32::MAX), 10).unwrap();

        assert_eq!(
            args.offset(),
            u64::from(u32::MAX - 1) * u64::from(u32::MAX),
        );
    }

    #[test]
    fn iterates_nodes() {
        let args = Arguments::new(None, None, 10).unwrap();
        let page = Page::new(args, [1, 2, 3]);

        assert_eq!(page.arguments, args);
        assert_eq!(page.into_iter().collect::<Vec<_>>(), vec![1, 2, 3]);
    }
}
