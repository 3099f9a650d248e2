use std::collections::HashMap;

/// User metadata attached to an object. Values are always strings.
pub type Metadata = HashMap<String, String>;

/// A partial metadata update.
///
/// A field mapped to `None` is undefined: it is dropped before the merge and
/// never written. There is no way to delete a field through a patch; supply a
/// custom [`MetadataMerge`] for that.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataPatch {
    fields: HashMap<String, Option<String>>,
}

impl MetadataPatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field, converting the value with its `ToString` impl
    pub fn set(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.fields.insert(key.into(), Some(value.to_string()));
        self
    }

    /// Set a field that may be undefined
    pub fn set_opt<V: ToString>(mut self, key: impl Into<String>, value: Option<V>) -> Self {
        self.fields
            .insert(key.into(), value.map(|v| v.to_string()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The defined fields as plain metadata
    pub fn into_metadata(self) -> Metadata {
        self.fields
            .into_iter()
            .filter_map(|(key, value)| value.map(|v| (key, v)))
            .collect()
    }
}

impl From<Metadata> for MetadataPatch {
    fn from(metadata: Metadata) -> Self {
        Self {
            fields: metadata.into_iter().map(|(k, v)| (k, Some(v))).collect(),
        }
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for MetadataPatch
where
    K: Into<String>,
    V: ToString,
{
    fn from(fields: [(K, V); N]) -> Self {
        fields
            .into_iter()
            .fold(Self::new(), |patch, (key, value)| patch.set(key, value))
    }
}

impl<K, V> FromIterator<(K, Option<V>)> for MetadataPatch
where
    K: Into<String>,
    V: ToString,
{
    fn from_iter<I: IntoIterator<Item = (K, Option<V>)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::new(), |patch, (key, value)| patch.set_opt(key, value))
    }
}

/// Merge policy used when patching object metadata.
///
/// Receives the current metadata and the defined fields of the patch; the
/// returned map becomes the complete metadata set of the object.
pub trait MetadataMerge: Send + Sync {
    fn merge(&self, current: &Metadata, patch: &Metadata) -> Metadata;
}

impl<F> MetadataMerge for F
where
    F: Fn(&Metadata, &Metadata) -> Metadata + Send + Sync,
{
    fn merge(&self, current: &Metadata, patch: &Metadata) -> Metadata {
        self(current, patch)
    }
}

/// Shallow field-level overlay: patch fields win, everything else is kept
#[derive(Debug, Clone, Copy, Default)]
pub struct OverlayMerge;

impl MetadataMerge for OverlayMerge {
    fn merge(&self, current: &Metadata, patch: &Metadata) -> Metadata {
        let mut merged = current.clone();
        merged.extend(patch.iter().map(|(k, v)| (k.clone(), v.clone())));
        merged
    }
}
