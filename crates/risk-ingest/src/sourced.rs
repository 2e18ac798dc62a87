use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    Live,
    Mock,
}

/// Data tagged with where it came from. Callers always receive usable data;
/// the tag tells them how far to trust it.
#[derive(Clone, Debug, PartialEq)]
pub enum Sourced<T> {
    Live(T),
    Mock(T),
}

impl<T> Sourced<T> {
    pub fn source(&self) -> DataSource {
        match self {
            Sourced::Live(_) => DataSource::Live,
            Sourced::Mock(_) => DataSource::Mock,
        }
    }

    pub fn is_live(&self) -> bool {
        matches!(self, Sourced::Live(_))
    }

    pub fn data(&self) -> &T {
        match self {
            Sourced::Live(data) | Sourced::Mock(data) => data,
        }
    }

    pub fn into_inner(self) -> T {
        match self {
            Sourced::Live(data) | Sourced::Mock(data) => data,
        }
    }
}
