use crate::dto::queue_item::QueueItem;

/// The session's mirror of the engine timeline plus the collection it was started from.
#[derive(Clone, Debug, Default)]
pub(crate) struct PlaybackQueue {
    items: Vec<QueueItem>,
    current_index: Option<usize>,
    active_collection_id: Option<String>,
}

impl PlaybackQueue {
    /// Replaces everything. Returns the start index actually used, which is clamped into bounds.
    pub(crate) fn replace(
        &mut self,
        items: Vec<QueueItem>,
        start_index: usize,
        collection_id: Option<String>,
    ) -> Option<usize> {
        self.current_index = if items.is_empty() {
            None
        } else {
            Some(start_index.min(items.len() - 1))
        };
        self.items = items;
        self.active_collection_id = collection_id;
        self.current_index
    }

    /// Adopts the engine's timeline as the source of truth.
    pub(crate) fn sync_timeline(&mut self, items: Vec<QueueItem>, current_index: Option<usize>) {
        self.current_index = match current_index {
            Some(index) if index < items.len() => Some(index),
            _ if items.is_empty() => None,
            _ => Some(0),
        };
        self.items = items;
    }

    pub(crate) fn append(&mut self, items: Vec<QueueItem>) {
        self.items.extend(items);
        if self.current_index.is_none() && !self.items.is_empty() {
            self.current_index = Some(0);
        }
    }

    pub(crate) fn set_current(&mut self, index: usize) -> bool {
        if index < self.items.len() {
            self.current_index = Some(index);
            true
        } else {
            false
        }
    }

    pub(crate) fn current(&self) -> Option<&QueueItem> {
        self.items.get(self.current_index?)
    }

    pub(crate) fn current_index(&self) -> Option<usize> {
        self.current_index
    }

    pub(crate) fn active_collection_id(&self) -> Option<&str> {
        self.active_collection_id.as_deref()
    }

    pub(crate) fn has_next(&self) -> bool {
        self.current_index
            .is_some_and(|index| index + 1 < self.items.len())
    }

    /// Whether `index` is close enough to the end that more items should be fetched.
    pub(crate) fn in_tail_window(&self, index: usize, window: usize) -> bool {
        index + window >= self.items.len()
    }

    pub(crate) fn ids(&self) -> Vec<String> {
        self.items.iter().map(|i| i.id().to_owned()).collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.items.len()
    }
}

#[cfg(test)]
#[path = "./queue_test.rs"]
mod queue_test;
