use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

const CATEGORY_STATE: &str = "category-state";
const VARIABLE_STATE: &str = "variable-state";
const POINTER_PREFIX: &str = "pointer-";

/// Identity of a bus subscriber, usually the id of the view that owns it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubscriberId(String);

/// Views subscribe under their own id.
pub type ViewId = SubscriberId;

impl SubscriberId {
    /// Create a subscriber identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Access the identifier text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check whether the identifier is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SubscriberId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for SubscriberId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&SubscriberId> for SubscriberId {
    fn from(id: &SubscriberId) -> Self {
        id.clone()
    }
}

/// A named topic on the coordination bus.
///
/// Well-known topics are typed; per-view pointer channels carry the view id
/// as a qualifier. Any other name is kept as [`Channel::Named`]. Parsing a
/// string always yields the typed variant when one matches, so
/// `"category-state"` and [`Channel::CategoryState`] are the same channel.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Channel {
    /// Category hover/selection broadcasts.
    CategoryState,
    /// Variable hover/selection broadcasts.
    VariableState,
    /// Raw pointer position of one view.
    Pointer(ViewId),
    /// Any other topic.
    Named(String),
}

impl Channel {
    /// Pointer channel of the given view.
    pub fn pointer(view: impl Into<ViewId>) -> Self {
        Self::Pointer(view.into())
    }

    /// Check whether the channel has no usable name.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::CategoryState | Self::VariableState => false,
            Self::Pointer(view) => view.is_empty(),
            Self::Named(name) => name.is_empty(),
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CategoryState => f.write_str(CATEGORY_STATE),
            Self::VariableState => f.write_str(VARIABLE_STATE),
            Self::Pointer(view) => write!(f, "{POINTER_PREFIX}{view}"),
            Self::Named(name) => f.write_str(name),
        }
    }
}

impl FromStr for Channel {
    type Err = std::convert::Infallible;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(name))
    }
}

impl From<&str> for Channel {
    fn from(name: &str) -> Self {
        match name {
            CATEGORY_STATE => Self::CategoryState,
            VARIABLE_STATE => Self::VariableState,
            _ => match name.strip_prefix(POINTER_PREFIX) {
                Some(view) if !view.is_empty() => Self::Pointer(ViewId::new(view)),
                _ => Self::Named(name.to_owned()),
            },
        }
    }
}

impl From<String> for Channel {
    fn from(name: String) -> Self {
        Self::from(name.as_str())
    }
}

impl From<Channel> for String {
    fn from(channel: Channel) -> Self {
        channel.to_string()
    }
}

impl From<&Channel> for Channel {
    fn from(channel: &Channel) -> Self {
        channel.clone()
    }
}
