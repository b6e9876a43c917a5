// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::anyhow;
use std::fmt;
use std::str::FromStr;

/// NudeNet detection classes, in model output order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Label {
    FemaleGenitaliaCovered,
    FaceFemale,
    ButtocksExposed,
    FemaleBreastExposed,
    FemaleGenitaliaExposed,
    MaleBreastExposed,
    AnusExposed,
    FeetExposed,
    BellyCovered,
    FeetCovered,
    ArmpitsCovered,
    ArmpitsExposed,
    FaceMale,
    BellyExposed,
    MaleGenitaliaExposed,
    AnusCovered,
    FemaleBreastCovered,
    ButtocksCovered,
}

impl Label {
    /// All classes indexed by model class id
    pub const ALL: [Label; 18] = [
        Label::FemaleGenitaliaCovered,
        Label::FaceFemale,
        Label::ButtocksExposed,
        Label::FemaleBreastExposed,
        Label::FemaleGenitaliaExposed,
        Label::MaleBreastExposed,
        Label::AnusExposed,
        Label::FeetExposed,
        Label::BellyCovered,
        Label::FeetCovered,
        Label::ArmpitsCovered,
        Label::ArmpitsExposed,
        Label::FaceMale,
        Label::BellyExposed,
        Label::MaleGenitaliaExposed,
        Label::AnusCovered,
        Label::FemaleBreastCovered,
        Label::ButtocksCovered,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Label::FemaleGenitaliaCovered => "FEMALE_GENITALIA_COVERED",
            Label::FaceFemale => "FACE_FEMALE",
            Label::ButtocksExposed => "BUTTOCKS_EXPOSED",
            Label::FemaleBreastExposed => "FEMALE_BREAST_EXPOSED",
            Label::FemaleGenitaliaExposed => "FEMALE_GENITALIA_EXPOSED",
            Label::MaleBreastExposed => "MALE_BREAST_EXPOSED",
            Label::AnusExposed => "ANUS_EXPOSED",
            Label::FeetExposed => "FEET_EXPOSED",
            Label::BellyCovered => "BELLY_COVERED",
            Label::FeetCovered => "FEET_COVERED",
            Label::ArmpitsCovered => "ARMPITS_COVERED",
            Label::ArmpitsExposed => "ARMPITS_EXPOSED",
            Label::FaceMale => "FACE_MALE",
            Label::BellyExposed => "BELLY_EXPOSED",
            Label::MaleGenitaliaExposed => "MALE_GENITALIA_EXPOSED",
            Label::AnusCovered => "ANUS_COVERED",
            Label::FemaleBreastCovered => "FEMALE_BREAST_COVERED",
            Label::ButtocksCovered => "BUTTOCKS_COVERED",
        }
    }
}

impl TryFrom<usize> for Label {
    type Error = anyhow::Error;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        Label::ALL
            .get(value)
            .copied()
            .ok_or_else(|| anyhow!("Invalid class id: {}", value))
    }
}

impl FromStr for Label {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Label::ALL
            .iter()
            .copied()
            .find(|label| label.as_str() == s)
            .ok_or_else(|| anyhow!("Unknown label: {}", s))
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
