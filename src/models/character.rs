// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Game character model.
//!
//! A character is identified by (account, character id, world); character ids
//! are only unique within a world.

use serde::{Deserialize, Serialize};

/// Lowest valid character level.
pub const MIN_LEVEL: u16 = 1;
/// Highest valid character level.
pub const MAX_LEVEL: u16 = 499;

/// Character class, stored as its one-letter code.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Profession {
    #[default]
    #[serde(rename = "w")]
    Warrior,
    #[serde(rename = "m")]
    Mage,
    #[serde(rename = "h")]
    Hunter,
    #[serde(rename = "t")]
    Tracker,
    #[serde(rename = "p")]
    Paladin,
    #[serde(rename = "b")]
    BladeDancer,
}

impl Profession {
    /// Parse the site's one-letter profession code.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "w" => Some(Self::Warrior),
            "m" => Some(Self::Mage),
            "h" => Some(Self::Hunter),
            "t" => Some(Self::Tracker),
            "p" => Some(Self::Paladin),
            "b" => Some(Self::BladeDancer),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Warrior => "w",
            Self::Mage => "m",
            Self::Hunter => "h",
            Self::Tracker => "t",
            Self::Paladin => "p",
            Self::BladeDancer => "b",
        }
    }
}

/// Identity of a character.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CharacterKey {
    pub account_id: u64,
    pub character_id: u64,
    pub world: String,
}

impl CharacterKey {
    pub fn new(account_id: u64, character_id: u64, world: &str) -> Self {
        Self {
            account_id,
            character_id,
            world: world.to_string(),
        }
    }

    /// Firestore document ID: `{aid}_{cid}_{world}` with the world url-encoded.
    pub fn doc_id(&self) -> String {
        format!(
            "{}_{}_{}",
            self.account_id,
            self.character_id,
            urlencoding::encode(&self.world)
        )
    }
}

/// Profile data scraped from a character's profile page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterProfile {
    pub nick: String,
    pub level: u16,
    pub profession: Profession,
    pub avatar_url: Option<String>,
}

/// Stored character record in Firestore.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    /// Owning account ID
    pub account_id: u64,
    /// Character ID within the world
    pub character_id: u64,
    /// World (server) name
    pub world: String,
    /// Nickname, empty until the profile has been fetched
    #[serde(default)]
    pub nick: String,
    /// Level, `None` until the profile has been fetched
    pub level: Option<u16>,
    /// Profession (defaults to warrior until the profile has been fetched)
    #[serde(default)]
    pub profession: Profession,
    /// Avatar path suffix on the game's CDN
    #[serde(default)]
    pub avatar_url: Option<String>,
}

impl Character {
    /// Newly sighted character without profile data.
    pub fn new(key: &CharacterKey) -> Self {
        Self {
            account_id: key.account_id,
            character_id: key.character_id,
            world: key.world.clone(),
            nick: String::new(),
            level: None,
            profession: Profession::default(),
            avatar_url: None,
        }
    }

    pub fn key(&self) -> CharacterKey {
        CharacterKey::new(self.account_id, self.character_id, &self.world)
    }

    pub fn doc_id(&self) -> String {
        self.key().doc_id()
    }

    /// Whether the profile still has to be fetched.
    pub fn needs_profile(&self) -> bool {
        self.level.is_none()
    }

    /// Copy scraped profile data onto the record.
    pub fn apply_profile(&mut self, profile: &CharacterProfile) {
        self.nick = profile.nick.clone();
        self.level = Some(profile.level);
        self.profession = profile.profession;
        self.avatar_url = profile.avatar_url.clone();
    }

    /// Nickname, or `????` when not yet known.
    pub fn nick_or_placeholder(&self) -> &str {
        if self.nick.is_empty() {
            "????"
        } else {
            &self.nick
        }
    }

    /// Level and profession code (e.g. `87m`), or `??` when not yet known.
    pub fn level_label(&self) -> String {
        match self.level {
            Some(level) => format!("{}{}", level, self.profession.code()),
            None => "??".to_string(),
        }
    }
}

impl std::fmt::Display for Character {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}][{}] {} {} {}",
            self.account_id,
            self.character_id,
            self.nick_or_placeholder(),
            self.level_label(),
            self.world
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_character_needs_profile() {
        let character = Character::new(&CharacterKey::new(1, 2, "tarhuna"));

        assert!(character.needs_profile());
        assert_eq!(character.profession, Profession::Warrior);
        assert_eq!(character.nick_or_placeholder(), "????");
        assert_eq!(character.level_label(), "??");
    }

    #[test]
    fn test_apply_profile() {
        let mut character = Character::new(&CharacterKey::new(1, 2, "tarhuna"));
        character.apply_profile(&CharacterProfile {
            nick: "Zorro".to_string(),
            level: 87,
            profession: Profession::Mage,
            avatar_url: Some("/m/mag1.gif".to_string()),
        });

        assert!(!character.needs_profile());
        assert_eq!(character.nick_or_placeholder(), "Zorro");
        assert_eq!(character.level_label(), "87m");
        assert_eq!(character.to_string(), "[1][2] Zorro 87m tarhuna");
    }

    #[test]
    fn test_profession_codes() {
        for code in ["w", "m", "h", "t", "p", "b"] {
            let profession = Profession::from_code(code).unwrap();
            assert_eq!(profession.code(), code);
            assert_eq!(
                serde_json::to_value(profession).unwrap(),
                serde_json::Value::String(code.to_string())
            );
        }
        assert_eq!(Profession::from_code("x"), None);
    }

    #[test]
    fn test_doc_id_encodes_world() {
        let key = CharacterKey::new(10, 20, "a b");
        assert_eq!(key.doc_id(), "10_20_a%20b");
    }
}
