//! Voice name to gender resolution
//!
//! The synthesis service selects its actual voice from a language code plus a
//! gender tag, so each named character voice has to be mapped onto one.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Gender tag understood by the synthesis service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Gender {
    Male,
    Female,
}

/// Known voice names and their gender tags
///
/// Voice names come from the character presets. Names ending in `_emo` are
/// emotive variants of the base voice and share its gender.
static VOICE_GENDERS: Lazy<HashMap<&'static str, Gender>> = Lazy::new(|| {
    let mut m = HashMap::new();
    m.insert("nozomi", Gender::Female);
    m.insert("sumire", Gender::Female);
    m.insert("maki", Gender::Female);
    m.insert("kaho", Gender::Female);
    m.insert("akari", Gender::Female);
    m.insert("nanako", Gender::Female);
    m.insert("reina", Gender::Female);
    m.insert("seiji", Gender::Male);
    m.insert("hiroshi", Gender::Male);
    m.insert("osamu", Gender::Male);
    m.insert("taichi", Gender::Male);
    m.insert("koutarou", Gender::Male);
    m.insert("anzu", Gender::Male);
    m.insert("yuuto", Gender::Female);
    m.insert("chihiro", Gender::Female);
    m.insert("nozomi_emo", Gender::Female);
    m.insert("maki_emo", Gender::Female);
    m.insert("reina_emo", Gender::Female);
    m.insert("taichi_emo", Gender::Male);
    m
});

impl Gender {
    /// Resolve a voice name to its gender tag
    ///
    /// Total over all inputs: unknown or empty names resolve to [`Gender::Male`]
    /// rather than failing, matching the service's own fallback voice.
    pub fn for_voice(voice: &str) -> Gender {
        VOICE_GENDERS.get(voice).copied().unwrap_or(Gender::Male)
    }
}
