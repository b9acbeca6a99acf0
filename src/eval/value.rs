/// The result of every expression: a sequence of node handles.
///
/// A Value is truthy exactly when it is non-empty. `None` elements are null
/// handles; `TRUE` is a single null handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Value<N>(Vec<Option<N>>);

impl<N> Default for Value<N> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<N: Clone> Value<N> {
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    pub fn truth() -> Self {
        Self(vec![None])
    }

    pub fn from_bool(flag: bool) -> Self {
        if flag {
            Self::truth()
        } else {
            Self::empty()
        }
    }

    pub fn singleton(handle: Option<N>) -> Self {
        Self(vec![handle])
    }

    pub fn from_nodes(nodes: Vec<N>) -> Self {
        Self(nodes.into_iter().map(Some).collect())
    }

    pub fn is_truthy(&self) -> bool {
        !self.0.is_empty()
    }

    pub fn negate(&self) -> Self {
        Self::from_bool(!self.is_truthy())
    }

    /// The handle that attribute and query operations act on; the rest is ignored.
    pub fn first(&self) -> Option<&Option<N>> {
        self.0.first()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Option<N>> {
        self.0.iter()
    }
}

impl<N> IntoIterator for Value<N> {
    type Item = Option<N>;
    type IntoIter = std::vec::IntoIter<Option<N>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<N> From<Vec<Option<N>>> for Value<N> {
    fn from(handles: Vec<Option<N>>) -> Self {
        Self(handles)
    }
}
