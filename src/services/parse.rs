// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Extractors for the game site's HTML pages.
//!
//! Handles:
//! - The "who's online" page: profile links inside `news-body` blocks
//! - Character profile pages: nickname, level, profession and avatar

use crate::models::character::{MAX_LEVEL, MIN_LEVEL};
use crate::models::{CharacterKey, CharacterProfile, Profession};
use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;

/// Profile link: account id, character id, world.
static PROFILE_LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/profile/view,(\d+)#char_(\d+),(\w+)").expect("valid regex")
});

/// Opening tag of a `news-body` content block.
static NEWS_BODY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<div\b[^>]*\bclass\s*=\s*["'](?:[^"']*\s)?news-body(?:\s[^"']*)?["'][^>]*>"#)
        .expect("valid regex")
});

/// Opening `span`/`input` tags on a profile page.
static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<(span|input)\b[^>]*>").expect("valid regex"));

static ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([A-Za-z_:][-A-Za-z0-9_:.]*)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+))"#)
        .expect("valid regex")
});

static DATA_ID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\bdata-id\s*=\s*["']?(\d+)["']?"#).expect("valid regex")
});

/// The avatar path sits at a fixed offset inside the `cimg` span's style:
/// `background-image: url(...)` with a 70-byte prefix and a 3-byte suffix.
const AVATAR_STYLE_PREFIX: usize = 70;
const AVATAR_STYLE_SUFFIX: usize = 3;

/// Errors from page extraction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("No element for character {0} on profile page")]
    CharacterNotFound(u64),

    #[error("Missing <{tag} class=\"{class}\"> element")]
    MissingElement {
        tag: &'static str,
        class: &'static str,
    },

    #[error("Missing {attribute:?} attribute on {class:?} element")]
    MissingAttribute {
        class: &'static str,
        attribute: &'static str,
    },

    #[error("Invalid level {0:?} (expected 1-499)")]
    InvalidLevel(String),

    #[error("Unknown profession code {0:?}")]
    UnknownProfession(String),
}

/// Extract every character sighting from the online page.
///
/// Only the `news-body` blocks whose positions fall in `blocks` are scanned;
/// the page repeats entries in the others. Duplicates within the scanned
/// blocks are returned as-is.
pub fn parse_online_feed(html: &str, blocks: Range<usize>) -> Vec<CharacterKey> {
    let starts: Vec<usize> = NEWS_BODY_RE.find_iter(html).map(|m| m.start()).collect();

    let mut sightings = Vec::new();
    for index in blocks {
        let Some(&start) = starts.get(index) else {
            break;
        };
        let end = starts.get(index + 1).copied().unwrap_or(html.len());

        for caps in PROFILE_LINK_RE.captures_iter(&html[start..end]) {
            match (caps[1].parse::<u64>(), caps[2].parse::<u64>()) {
                (Ok(account_id), Ok(character_id)) => {
                    sightings.push(CharacterKey::new(account_id, character_id, &caps[3]));
                }
                _ => {
                    tracing::debug!(link = &caps[0], "Skipping profile link with oversized id");
                }
            }
        }
    }

    sightings
}

/// Extract a character's profile from its account's profile page.
///
/// The page lists every character of the account; the one we want is the
/// element tagged `data-id="{character_id}"`.
pub fn parse_profile(html: &str, character_id: u64) -> Result<CharacterProfile, ParseError> {
    let section = character_section(html, character_id)
        .ok_or(ParseError::CharacterNotFound(character_id))?;

    let style = find_tag(section, "span", "cimg")
        .ok_or(ParseError::MissingElement {
            tag: "span",
            class: "cimg",
        })
        .and_then(|tag| {
            attribute(tag, "style").ok_or(ParseError::MissingAttribute {
                class: "cimg",
                attribute: "style",
            })
        })?;
    let avatar_url = style
        .get(AVATAR_STYLE_PREFIX..style.len().saturating_sub(AVATAR_STYLE_SUFFIX))
        .filter(|path| !path.is_empty())
        .map(str::to_string);

    let nick = input_value(section, "chnick")?;
    let level_raw = input_value(section, "chlvl")?;
    let profession_raw = input_value(section, "chprof")?;

    let level = level_raw
        .trim()
        .parse::<u16>()
        .ok()
        .filter(|lvl| (MIN_LEVEL..=MAX_LEVEL).contains(lvl))
        .ok_or_else(|| ParseError::InvalidLevel(level_raw.clone()))?;

    let profession = Profession::from_code(profession_raw.trim())
        .ok_or_else(|| ParseError::UnknownProfession(profession_raw.clone()))?;

    Ok(CharacterProfile {
        nick,
        level,
        profession,
        avatar_url,
    })
}

/// Slice of the page from the tagged element up to the next tagged element.
fn character_section(html: &str, character_id: u64) -> Option<&str> {
    let mut ids = DATA_ID_RE.captures_iter(html);
    let found = ids.find(|caps| caps[1].parse::<u64>().ok() == Some(character_id))?;
    let attr = found.get(0)?;

    let start = html[..attr.start()].rfind('<').unwrap_or(attr.start());
    let end = ids
        .next()
        .and_then(|caps| caps.get(0))
        .map(|m| html[..m.start()].rfind('<').unwrap_or(m.start()))
        .filter(|&end| end > start)
        .unwrap_or(html.len());

    Some(&html[start..end])
}

/// First opening `<tag>` in `fragment` whose class list contains `class`.
fn find_tag<'a>(fragment: &'a str, tag: &str, class: &str) -> Option<&'a str> {
    TAG_RE
        .captures_iter(fragment)
        .filter(|caps| caps[1].eq_ignore_ascii_case(tag))
        .filter_map(|caps| caps.get(0))
        .map(|m| m.as_str())
        .find(|text| {
            attribute(text, "class")
                .map(|classes| classes.split_whitespace().any(|c| c == class))
                .unwrap_or(false)
        })
}

/// Entity-decoded value of attribute `name` on an opening tag.
fn attribute(tag: &str, name: &str) -> Option<String> {
    ATTR_RE
        .captures_iter(tag)
        .find(|caps| caps[1].eq_ignore_ascii_case(name))
        .and_then(|caps| caps.get(2).or(caps.get(3)).or(caps.get(4)))
        .map(|value| decode_entities(value.as_str()))
}

fn input_value(section: &str, class: &'static str) -> Result<String, ParseError> {
    let tag = find_tag(section, "input", class).ok_or(ParseError::MissingElement {
        tag: "input",
        class,
    })?;
    attribute(tag, "value").ok_or(ParseError::MissingAttribute {
        class,
        attribute: "value",
    })
}

/// Decode the HTML character references that show up in attribute values.
fn decode_entities(raw: &str) -> String {
    if !raw.contains('&') {
        return raw.to_string();
    }

    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];

        let decoded = rest.find(';').and_then(|semi| {
            let entity = &rest[1..semi];
            let ch = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "nbsp" => Some('\u{a0}'),
                _ => entity
                    .strip_prefix("#x")
                    .or_else(|| entity.strip_prefix("#X"))
                    .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                    .or_else(|| entity.strip_prefix('#').and_then(|dec| dec.parse().ok()))
                    .and_then(char::from_u32),
            };
            ch.map(|c| (c, semi))
        });

        match decoded {
            Some((c, semi)) => {
                out.push(c);
                rest = &rest[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}
