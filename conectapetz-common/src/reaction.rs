//! Reactions on posts.
//!
//! A user holds at most one reaction kind per post. Older records stored plain
//! per-kind counters instead of the reacting users; those are still readable for
//! display and are replaced by an empty ledger on the first toggle.

use serde::{Deserialize, Deserializer, Serialize};
use std::{collections::BTreeSet, fmt::Display, str::FromStr};
use thiserror::Error;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReactionKind {
    Like,
    Love,
    Question,
}

impl ReactionKind {
    /// Every kind, in the order a user's current reaction is looked up.
    pub const ALL: [ReactionKind; 3] = [ReactionKind::Like, ReactionKind::Love, ReactionKind::Question];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ReactionKind::Like => "like",
            ReactionKind::Love => "love",
            ReactionKind::Question => "question",
        }
    }
}

impl Display for ReactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, Error)]
#[error("Unknown reaction kind: {0:?}")]
pub struct UnknownReactionKindError(String);

impl FromStr for ReactionKind {
    type Err = UnknownReactionKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownReactionKindError(s.to_owned()))
    }
}

/// The users behind each reaction kind, keyed by e-mail.
#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, Serialize, Deserialize)]
pub struct ReactionLedger {
    #[serde(default)]
    like: BTreeSet<String>,
    #[serde(default)]
    love: BTreeSet<String>,
    #[serde(default)]
    question: BTreeSet<String>,
}

/// What a toggle did to the user's reaction.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Toggle {
    Added { kind: ReactionKind },
    Removed { kind: ReactionKind },
    Switched { from: ReactionKind, to: ReactionKind },
}

impl Toggle {
    /// The user's reaction after the toggle.
    #[must_use]
    pub fn current(self) -> Option<ReactionKind> {
        match self {
            Toggle::Added { kind } => Some(kind),
            Toggle::Removed { .. } => None,
            Toggle::Switched { to, .. } => Some(to),
        }
    }
}

impl ReactionLedger {
    fn users_mut(&mut self, kind: ReactionKind) -> &mut BTreeSet<String> {
        match kind {
            ReactionKind::Like => &mut self.like,
            ReactionKind::Love => &mut self.love,
            ReactionKind::Question => &mut self.question,
        }
    }

    #[must_use]
    pub fn users(&self, kind: ReactionKind) -> &BTreeSet<String> {
        match kind {
            ReactionKind::Like => &self.like,
            ReactionKind::Love => &self.love,
            ReactionKind::Question => &self.question,
        }
    }

    /// The first kind, in [`ReactionKind::ALL`] order, that lists `user`.
    #[must_use]
    pub fn reaction_of(&self, user: &str) -> Option<ReactionKind> {
        ReactionKind::ALL
            .into_iter()
            .find(|kind| self.users(*kind).contains(user))
    }

    pub fn toggle(&mut self, user: &str, kind: ReactionKind) -> Toggle {
        let current = self.reaction_of(user);
        if current == Some(kind) {
            self.users_mut(kind).remove(user);
            return Toggle::Removed { kind };
        }

        if let Some(from) = current {
            self.users_mut(from).remove(user);
        }
        self.users_mut(kind).insert(user.to_owned());

        match current {
            Some(from) => Toggle::Switched { from, to: kind },
            None => Toggle::Added { kind },
        }
    }

    /// Moves every reaction of `old` over to `new`. Returns whether anything moved.
    pub fn rename_user(&mut self, old: &str, new: &str) -> bool {
        let mut renamed = false;
        for kind in ReactionKind::ALL {
            let users = self.users_mut(kind);
            if users.remove(old) {
                users.insert(new.to_owned());
                renamed = true;
            }
        }

        renamed
    }

    #[must_use]
    pub fn counts(&self) -> ReactionCounts {
        let count = |kind| self.users(kind).len() as u64;

        ReactionCounts {
            like: count(ReactionKind::Like),
            love: count(ReactionKind::Love),
            question: count(ReactionKind::Question),
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Serialize, Deserialize)]
pub struct ReactionCounts {
    #[serde(default)]
    pub like: u64,
    #[serde(default)]
    pub love: u64,
    #[serde(default)]
    pub question: u64,
}

impl ReactionCounts {
    #[must_use]
    pub fn total(self) -> u64 {
        self.like + self.love + self.question
    }
}

/// Reactions as stored on a post: either the current ledger or legacy counters.
///
/// Anything else is kept verbatim as `Unrecognized` so the rest of the post stays
/// readable. It counts as no reactions and is replaced on the first toggle.
#[derive(Clone, Eq, PartialEq, Debug, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Reactions {
    UserSets(ReactionLedger),
    LegacyCounts(ReactionCounts),
    Unrecognized(serde_json::Value),
}

impl Default for Reactions {
    fn default() -> Self {
        Reactions::UserSets(ReactionLedger::default())
    }
}

impl Reactions {
    /// Whether this is anything other than the current ledger.
    #[must_use]
    pub fn is_legacy(&self) -> bool {
        !matches!(self, Reactions::UserSets(_))
    }

    #[must_use]
    pub fn counts(&self) -> ReactionCounts {
        match self {
            Reactions::UserSets(ledger) => ledger.counts(),
            Reactions::LegacyCounts(counts) => *counts,
            Reactions::Unrecognized(_) => ReactionCounts::default(),
        }
    }

    /// Legacy counters do not know who reacted, so nobody has a reaction there.
    #[must_use]
    pub fn reaction_of(&self, user: &str) -> Option<ReactionKind> {
        match self {
            Reactions::UserSets(ledger) => ledger.reaction_of(user),
            Reactions::LegacyCounts(_) | Reactions::Unrecognized(_) => None,
        }
    }

    /// Toggles on the ledger. Anything else is discarded first.
    pub fn toggle(&mut self, user: &str, kind: ReactionKind) -> Toggle {
        if let Reactions::UserSets(ledger) = self {
            return ledger.toggle(user, kind);
        }

        let mut ledger = ReactionLedger::default();
        let toggle = ledger.toggle(user, kind);
        *self = Reactions::UserSets(ledger);
        toggle
    }

    pub fn rename_user(&mut self, old: &str, new: &str) -> bool {
        match self {
            Reactions::UserSets(ledger) => ledger.rename_user(old, new),
            Reactions::LegacyCounts(_) | Reactions::Unrecognized(_) => false,
        }
    }
}

/// Reads a reactions field that may be `null` in older records.
pub fn deserialize_nullable<'de, D>(deserializer: D) -> Result<Reactions, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Reactions>::deserialize(deserializer).map(Option::unwrap_or_default)
}
