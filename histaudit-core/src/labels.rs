use std::fmt;

/// Name of the label that carries a series' metric name.
pub const METRIC_NAME: &str = "__name__";

/// A single name/value pair attached to a series.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Label {
    pub name: String,
    pub value: String,
}

impl Label {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// The identifying label set of a series, kept sorted by label name.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Labels {
    inner: Vec<Label>,
}

impl Labels {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Label> {
        self.inner.iter()
    }

    /// Returns the value of the named label, if present.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.inner
            .binary_search_by(|l| l.name.as_str().cmp(name))
            .ok()
            .map(|idx| self.inner[idx].value.as_str())
    }

    /// Returns the metric name, i.e. the value of the `__name__` label.
    pub fn metric_name(&self) -> Option<&str> {
        self.get(METRIC_NAME)
    }

    /// Returns true if every matcher is satisfied by this label set.
    pub fn matches(&self, matchers: &[LabelMatcher]) -> bool {
        matchers.iter().all(|m| m.matches(self))
    }
}

impl<N, V> FromIterator<(N, V)> for Labels
where
    N: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (N, V)>>(iter: T) -> Self {
        let mut builder = LabelsBuilder::new();
        for (name, value) in iter {
            builder.add(name, value);
        }
        builder.labels()
    }
}

impl fmt::Display for Labels {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (idx, label) in self.inner.iter().enumerate() {
            if idx > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}=\"{}\"", label.name, label.value)?;
        }
        write!(f, "}}")
    }
}

/// Reusable scratch space for assembling a [`Labels`].
///
/// Index readers fill one of these per series. Later additions of an
/// existing name replace the earlier value.
#[derive(Clone, Debug, Default)]
pub struct LabelsBuilder {
    scratch: Vec<Label>,
}

impl LabelsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.scratch.clear();
    }

    pub fn add(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        let label = Label::new(name, value);
        match self.scratch.iter_mut().find(|l| l.name == label.name) {
            Some(existing) => existing.value = label.value,
            None => self.scratch.push(label),
        }
        self
    }

    /// Produces the sorted label set without consuming the scratch space.
    pub fn labels(&self) -> Labels {
        let mut inner = self.scratch.clone();
        inner.sort();
        Labels { inner }
    }
}

/// An exact-match constraint on one label of a series.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct LabelMatcher {
    pub name: String,
    pub value: String,
}

impl LabelMatcher {
    pub fn equal(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// A series without the label only matches an empty value, as in PromQL.
    pub fn matches(&self, labels: &Labels) -> bool {
        labels.get(&self.name).unwrap_or("") == self.value
    }
}

impl fmt::Display for LabelMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}=\"{}\"", self.name, self.value)
    }
}
