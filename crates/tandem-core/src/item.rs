use std::fmt;

use anyhow::anyhow;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which of the two lists an item belongs to. Persisted as the boolean
/// `working` flag (`true` = work).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Context {
    #[default]
    Work,
    Travel,
}

impl Context {
    pub fn placeholder(self) -> &'static str {
        match self {
            Self::Work => "What do you have to do?",
            Self::Travel => "Where do you want to go?",
        }
    }
}

impl From<bool> for Context {
    fn from(working: bool) -> Self {
        if working { Self::Work } else { Self::Travel }
    }
}

impl From<Context> for bool {
    fn from(context: Context) -> bool {
        context == Context::Work
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Work => write!(f, "work"),
            Self::Travel => write!(f, "travel"),
        }
    }
}

impl std::str::FromStr for Context {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "work" | "w" => Ok(Self::Work),
            "travel" | "t" => Ok(Self::Travel),
            other => Err(anyhow!("unknown context: {other} (expected work or travel)")),
        }
    }
}

/// Millisecond UNIX timestamp taken at creation time. Unique within a store;
/// ordering only reflects creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(i64);

impl ItemId {
    pub fn from_timestamp(now: DateTime<Utc>) -> Self {
        Self(now.timestamp_millis())
    }

    pub fn bumped(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for ItemId {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s
            .parse::<i64>()
            .map_err(|_| anyhow!("invalid item id: {s}"))?;
        Ok(Self(raw))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub text: String,
    pub context: Context,
    pub done: bool,
}

impl Item {
    pub fn new(text: String, context: Context) -> Self {
        Self {
            text,
            context,
            done: false,
        }
    }
}
