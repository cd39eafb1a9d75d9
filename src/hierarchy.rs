use crate::response::ActivationTensor;

/// One named activation tensor, borrowed from the current inference result.
pub type LayerEntry<'a> = (&'a str, &'a ActivationTensor);

/// The split view of a flat layer mapping.
///
/// `main` holds the top-level layers (no `.` in the name) in encounter order.
/// `internals` holds one bucket per parent, keyed by the first dot-delimited
/// segment, parents ordered by first encounter and entries in encounter
/// order. Borrowed rather than owned: this is a derived structure recomputed
/// from the immutable inference result on every render pass, never cached.
#[derive(Default, Debug)]
pub struct LayerHierarchy<'a> {
    pub main: Vec<LayerEntry<'a>>,
    pub internals: Vec<(&'a str, Vec<LayerEntry<'a>>)>,
}

impl<'a> LayerHierarchy<'a> {
    /// Internal entries grouped under `parent`, in encounter order.
    pub fn internals_of(&self, parent: &str) -> Option<&[LayerEntry<'a>]> {
        self.internals
            .iter()
            .find(|(name, _)| *name == parent)
            .map(|(_, entries)| entries.as_slice())
    }

    /// Internal entries under `parent`, sorted lexicographically by full
    /// name. This is the presentation ordering; the split itself keeps
    /// encounter order. Idempotent.
    pub fn sorted_internals(&self, parent: &str) -> Vec<LayerEntry<'a>> {
        let mut entries = self
            .internals_of(parent)
            .map(|e| e.to_vec())
            .unwrap_or_default();
        entries.sort_by(|(a, _), (b, _)| a.cmp(b));
        entries
    }

    /// Total number of entries across both buckets.
    pub fn len(&self) -> usize {
        self.main.len() + self.internals.iter().map(|(_, e)| e.len()).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Partition layer entries into top-level layers and their nested internals,
/// inferred purely from dotted name structure.
///
/// Single pass: a name without a separator is a main layer; otherwise the
/// first segment names the parent bucket and the whole entry (full name
/// included) is appended there. A key with an empty first segment (leading
/// dot) is not a valid layer path and is dropped silently.
pub fn split_layers<'a>(entries: &'a [(String, ActivationTensor)]) -> LayerHierarchy<'a> {
    let mut hierarchy = LayerHierarchy::default();

    for (name, tensor) in entries {
        match name.split_once('.') {
            None => {
                if !name.is_empty() {
                    hierarchy.main.push((name.as_str(), tensor));
                }
            }
            Some((parent, _)) => {
                if parent.is_empty() {
                    tracing::debug!("[Layers] Dropping malformed layer key {:?}", name);
                    continue;
                }
                match hierarchy
                    .internals
                    .iter_mut()
                    .find(|(existing, _)| *existing == parent)
                {
                    Some((_, bucket)) => bucket.push((name.as_str(), tensor)),
                    None => hierarchy.internals.push((parent, vec![(name.as_str(), tensor)])),
                }
            }
        }
    }

    hierarchy
}
