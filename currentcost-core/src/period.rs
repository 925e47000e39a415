// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use core::cmp::Ordering;
use core::fmt::{self, Display};

/// History bucket selected by the first letter of a datapoint tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PeriodKind {
    Hour,
    Day,
    Month,
    Year,
}

impl PeriodKind {
    pub const ALL: [PeriodKind; 4] = [Self::Hour, Self::Day, Self::Month, Self::Year];

    #[must_use]
    pub const fn prefix(self) -> char {
        match self {
            Self::Hour => 'h',
            Self::Day => 'd',
            Self::Month => 'm',
            Self::Year => 'y',
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Hour => "hour",
            Self::Day => "day",
            Self::Month => "month",
            Self::Year => "year",
        }
    }

    pub fn from_prefix(prefix: char) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.prefix() == prefix)
    }
}

impl Display for PeriodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A history datapoint tag such as `h004` or `m12`.
///
/// The digits after the prefix only order entries inside a bucket. Ordering is by
/// kind, then numeric index, then the tag text so that `h4` and `h004` remain
/// distinct entries.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PeriodTag {
    kind: PeriodKind,
    index: u32,
    tag: String,
}

impl PeriodTag {
    /// Parse a tag, returning `None` for an unknown prefix or a non-numeric index.
    pub fn parse(tag: &str) -> Option<Self> {
        let mut chars = tag.chars();
        let kind = PeriodKind::from_prefix(chars.next()?)?;
        let digits = chars.as_str();
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let index = digits.parse().ok()?;
        Some(Self {
            kind,
            index,
            tag: tag.to_string(),
        })
    }

    pub fn kind(&self) -> PeriodKind {
        self.kind
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    /// The tag exactly as the device sent it.
    pub fn as_str(&self) -> &str {
        &self.tag
    }
}

impl Ord for PeriodTag {
    fn cmp(&self, other: &Self) -> Ordering {
        self.kind
            .cmp(&other.kind)
            .then(self.index.cmp(&other.index))
            .then_with(|| self.tag.cmp(&other.tag))
    }
}

impl PartialOrd for PeriodTag {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Display for PeriodTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tag)
    }
}
