//! Lazy, cursor-following iteration over list operations.

use crate::error::{LifecycleError, LifecycleResult};
use sagekit_abstraction::{ControlPlane, Payload, NEXT_TOKEN_KEY};
use sagekit_resources::ResourceKind;
use std::collections::VecDeque;
use std::iter::FusedIterator;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
enum PageCursor {
    Start,
    Next(String),
    Exhausted,
}

/// Iterator over every resource matching a set of list filters.
///
/// Pages are requested one at a time, only once the previous page has been
/// fully consumed. The first list call happens on the first `next()`. A
/// transport error is yielded once and ends the iteration.
pub struct ResourcePager<K: ResourceKind> {
    transport: Arc<dyn ControlPlane>,
    filters: Payload,
    buffer: VecDeque<K::Summary>,
    cursor: PageCursor,
    pages_fetched: u32,
    _kind: PhantomData<fn() -> K>,
}

impl<K: ResourceKind> ResourcePager<K> {
    pub(crate) fn new(transport: Arc<dyn ControlPlane>, filters: Payload) -> Self {
        Self {
            transport,
            filters,
            buffer: VecDeque::new(),
            cursor: PageCursor::Start,
            pages_fetched: 0,
            _kind: PhantomData,
        }
    }

    /// Number of list calls issued so far.
    pub fn pages_fetched(&self) -> u32 {
        self.pages_fetched
    }

    fn fetch_page(&mut self) -> LifecycleResult<()> {
        let schema = K::schema();
        let operation = schema.operations.list;

        let mut request = self.filters.clone();
        if let PageCursor::Next(token) = &self.cursor {
            request.insert(NEXT_TOKEN_KEY.to_string(), token.clone().into());
        }

        let mut response = self.transport.execute(operation, request)?;
        self.pages_fetched += 1;

        let items = match response.remove(schema.list_key) {
            None | Some(serde_json::Value::Null) => Vec::new(),
            Some(serde_json::Value::Array(items)) => items,
            Some(other) => {
                return Err(LifecycleError::malformed(
                    operation,
                    format!("{} is not an array: {other}", schema.list_key),
                ));
            }
        };
        for item in items {
            let summary = serde_json::from_value(item).map_err(|e| LifecycleError::malformed(operation, e))?;
            self.buffer.push_back(summary);
        }

        self.cursor = match response.remove(NEXT_TOKEN_KEY) {
            Some(serde_json::Value::String(token)) if !token.is_empty() => PageCursor::Next(token),
            _ => PageCursor::Exhausted,
        };

        debug!(
            resource = schema.type_name,
            page = self.pages_fetched,
            items = self.buffer.len(),
            more = matches!(self.cursor, PageCursor::Next(_)),
            "Fetched list page"
        );
        Ok(())
    }
}

impl<K: ResourceKind> Iterator for ResourcePager<K> {
    type Item = LifecycleResult<K::Summary>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(item) = self.buffer.pop_front() {
                return Some(Ok(item));
            }
            if self.cursor == PageCursor::Exhausted {
                return None;
            }
            if let Err(err) = self.fetch_page() {
                self.buffer.clear();
                self.cursor = PageCursor::Exhausted;
                return Some(Err(err));
            }
        }
    }
}

impl<K: ResourceKind> FusedIterator for ResourcePager<K> {}

impl<K: ResourceKind> std::fmt::Debug for ResourcePager<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourcePager")
            .field("type", &K::schema().type_name)
            .field("buffered", &self.buffer.len())
            .field("cursor", &self.cursor)
            .field("pages_fetched", &self.pages_fetched)
            .finish()
    }
}
