use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::BakeError;

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq, Hash, PartialOrd, Ord,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(i32)]
pub enum Menu {
    #[default]
    Unknown = 0,
    Classic = 1,
    BananaAndWhip = 2,
    BaconAndCheese = 3,
    MixBerry = 4,
    BakedMarshmallow = 5,
    SpicyCurry = 6,
}

impl Menu {
    pub const MAX: Menu = Menu::SpicyCurry;

    pub const ALL: [Menu; 7] = [
        Menu::Unknown,
        Menu::Classic,
        Menu::BananaAndWhip,
        Menu::BaconAndCheese,
        Menu::MixBerry,
        Menu::BakedMarshmallow,
        Menu::SpicyCurry,
    ];

    pub fn value(self) -> i32 {
        self as i32
    }

    pub fn from_value(value: i32) -> Option<Self> {
        Self::ALL.iter().copied().find(|menu| menu.value() == value)
    }

    pub fn as_str_name(self) -> &'static str {
        match self {
            Menu::Unknown => "UNKNOWN",
            Menu::Classic => "CLASSIC",
            Menu::BananaAndWhip => "BANANA_AND_WHIP",
            Menu::BaconAndCheese => "BACON_AND_CHEESE",
            Menu::MixBerry => "MIX_BERRY",
            Menu::BakedMarshmallow => "BAKED_MARSHMALLOW",
            Menu::SpicyCurry => "SPICY_CURRY",
        }
    }

    pub fn from_str_name(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|menu| menu.as_str_name() == name)
    }

    // Range check, not a membership check: the enum has no gaps between the
    // sentinel and `MAX`.
    pub fn validate(selector: i32) -> Result<Self, BakeError> {
        if selector <= Menu::Unknown.value() || selector > Menu::MAX.value() {
            return Err(BakeError::choose_a_pancake(selector));
        }
        Self::from_value(selector).ok_or_else(|| BakeError::choose_a_pancake(selector))
    }
}

impl fmt::Display for Menu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str_name())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawSelector {
    Signed(i64),
    Unsigned(u64),
    Name(String),
}

// Numbers outside i32 saturate so validation still rejects them; null is
// UNKNOWN; unknown names are a decode error.
pub fn deserialize_selector<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<RawSelector>::deserialize(deserializer)? {
        None => Ok(Menu::Unknown.value()),
        Some(RawSelector::Signed(value)) => Ok(saturate_selector(value)),
        Some(RawSelector::Unsigned(value)) => Ok(i32::try_from(value).unwrap_or(i32::MAX)),
        Some(RawSelector::Name(name)) => Menu::from_str_name(&name)
            .map(Menu::value)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown pancake menu `{name}`"))),
    }
}

fn saturate_selector(value: i64) -> i32 {
    i32::try_from(value).unwrap_or(if value < 0 { i32::MIN } else { i32::MAX })
}
