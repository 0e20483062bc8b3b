use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::memo::Memo;
use crate::state::PlayerIdentity;

const EMBEDDED_ROSTER: &str = include_str!("../data/players.json");

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RosterEntry {
    pub id: u32,
    pub full_name: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub is_active: bool,
}

// nba_api ships its static list either as objects or as
// `[id, last_name, first_name, full_name, is_active]` tuples. Tuples are
// tried first since a derived struct would also accept a positional array.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawEntry {
    Tuple(u32, String, String, String, bool),
    Object(RosterEntry),
}

impl From<RawEntry> for RosterEntry {
    fn from(raw: RawEntry) -> Self {
        match raw {
            RawEntry::Tuple(id, last_name, first_name, full_name, is_active) => RosterEntry {
                id,
                full_name,
                first_name,
                last_name,
                is_active,
            },
            RawEntry::Object(entry) => entry,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Roster {
    entries: Vec<RosterEntry>,
}

impl Roster {
    pub fn new(entries: Vec<RosterEntry>) -> Self {
        Self { entries }
    }

    pub fn embedded() -> Result<Self> {
        Self::from_json(EMBEDDED_ROSTER).context("embedded roster is invalid")
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed reading roster {}", path.display()))?;
        Self::from_json(&raw).with_context(|| format!("invalid roster {}", path.display()))
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let parsed: Vec<RawEntry> = serde_json::from_str(raw.trim()).context("invalid roster json")?;
        Ok(Self::new(parsed.into_iter().map(RosterEntry::from).collect()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[RosterEntry] {
        &self.entries
    }

    /// Case-insensitive exact match on the full name; the first entry wins.
    pub fn resolve(&self, full_name: &str) -> Option<PlayerIdentity> {
        let wanted = full_name.to_lowercase();
        self.entries
            .iter()
            .find(|entry| entry.full_name.to_lowercase() == wanted)
            .map(|entry| PlayerIdentity {
                name: entry.full_name.clone(),
                id: entry.id,
            })
    }
}

/// Roster lookups memoized per distinct input string, misses included.
pub struct IdentityResolver {
    roster: Roster,
    memo: Memo<Option<PlayerIdentity>>,
}

impl IdentityResolver {
    const MEMO_FN: &'static str = "resolve";

    pub fn new(roster: Roster) -> Self {
        Self {
            roster,
            memo: Memo::new(None),
        }
    }

    pub fn resolve(&self, full_name: &str) -> Option<PlayerIdentity> {
        if let Some(hit) = self.memo.get(Self::MEMO_FN, full_name) {
            return hit;
        }
        let found = self.roster.resolve(full_name);
        self.memo.insert(Self::MEMO_FN, full_name, found.clone());
        found
    }

    pub fn clear(&self) -> usize {
        self.memo.clear()
    }
}

/// Loads the roster file when one is configured, falling back to the
/// embedded list. The second value is a warning for the console.
pub fn load_roster(path: Option<&Path>) -> Result<(Roster, Option<String>)> {
    let Some(path) = path else {
        return Ok((Roster::embedded()?, None));
    };
    match Roster::from_file(path) {
        Ok(roster) if !roster.is_empty() => Ok((roster, None)),
        Ok(_) => Ok((
            Roster::embedded()?,
            Some(format!(
                "[WARN] Roster {} is empty, using built-in list",
                path.display()
            )),
        )),
        Err(err) => Ok((
            Roster::embedded()?,
            Some(format!("[WARN] {err:#}, using built-in list")),
        )),
    }
}
