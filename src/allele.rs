// ==============================================================================
// allele.rs - Allele State Model
// ==============================================================================
// Description: Resolved allele states and their rendering markers
// Author: Genotype Importer maintainers
// Created: 2026-10-19
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================
// Algorithm:
//   Vendor presence signals are reported per physical probe ("FAM+", "neo-"),
//   not per logical allele. Configuration says which state a probe means when
//   it is detected (`if_positive`); the observed signal then either confirms
//   that state or flips it:
//   - if_positive=mut, signal "+" → mut
//   - if_positive=mut, signal "-" → wt
//   - if_positive=wt,  signal "+" → wt
//   - if_positive=wt,  signal "-" → mut
// ==============================================================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Tag used in configuration for the mutant state
pub const MUTANT_TAG: &str = "mut";

/// Tag used in configuration for the wild-type state
pub const WILD_TYPE_TAG: &str = "wt";

/// Character whose presence in a vendor cell marks a detected probe
const PRESENCE_CHAR: char = '+';

/// Errors that can occur when reading an allele state tag
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AlleleStateError {
    #[error("Unknown allele state tag: '{0}' (expected 'mut' or 'wt')")]
    UnknownTag(String),
}

/// Binary state of one allele
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlleleState {
    #[serde(rename = "mut")]
    Mutant,
    #[serde(rename = "wt")]
    WildType,
}

impl AlleleState {
    pub fn as_tag(&self) -> &'static str {
        match self {
            AlleleState::Mutant => MUTANT_TAG,
            AlleleState::WildType => WILD_TYPE_TAG,
        }
    }

    pub fn is_mutant(&self) -> bool {
        matches!(self, AlleleState::Mutant)
    }

    /// The other state
    pub fn opposite(&self) -> Self {
        match self {
            AlleleState::Mutant => AlleleState::WildType,
            AlleleState::WildType => AlleleState::Mutant,
        }
    }
}

impl FromStr for AlleleState {
    type Err = AlleleStateError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag {
            MUTANT_TAG => Ok(AlleleState::Mutant),
            WILD_TYPE_TAG => Ok(AlleleState::WildType),
            other => Err(AlleleStateError::UnknownTag(other.to_string())),
        }
    }
}

impl fmt::Display for AlleleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_tag())
    }
}

/// Output symbols for the two states of one mutation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerPair {
    #[serde(rename = "mut_marker")]
    pub mutant: String,

    #[serde(rename = "wt_marker")]
    pub wild_type: String,
}

impl MarkerPair {
    pub fn new(mutant: impl Into<String>, wild_type: impl Into<String>) -> Self {
        Self {
            mutant: mutant.into(),
            wild_type: wild_type.into(),
        }
    }

    /// Marker rendered for `state`
    pub fn marker_for(&self, state: AlleleState) -> &str {
        match state {
            AlleleState::Mutant => &self.mutant,
            AlleleState::WildType => &self.wild_type,
        }
    }
}

/// Whether a raw vendor cell reports the probe as detected
pub fn signals_presence(presence_marker: &str) -> bool {
    presence_marker.contains(PRESENCE_CHAR)
}

/// Resolve a conditional allele from its configured positive state
///
/// # Arguments
/// * `if_positive` - State the allele has when its probe is detected
/// * `presence_marker` - Raw vendor cell (e.g., "+", "FAM-", "neo+")
///
/// # Returns
/// * `if_positive` when the cell contains '+', otherwise the opposite state
///
/// # Examples
/// ```
/// use genotype_importer::allele::{resolve_conditional_allele, AlleleState};
///
/// assert_eq!(resolve_conditional_allele(AlleleState::Mutant, "+"), AlleleState::Mutant);
/// assert_eq!(resolve_conditional_allele(AlleleState::Mutant, "-"), AlleleState::WildType);
/// assert_eq!(resolve_conditional_allele(AlleleState::WildType, "neo-"), AlleleState::Mutant);
/// ```
pub fn resolve_conditional_allele(if_positive: AlleleState, presence_marker: &str) -> AlleleState {
    if signals_presence(presence_marker) {
        if_positive
    } else {
        if_positive.opposite()
    }
}

/// One resolved allele for one animal, borrowing its mutation's markers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlleleValue<'a> {
    state: AlleleState,
    markers: &'a MarkerPair,
}

impl<'a> AlleleValue<'a> {
    pub fn new(state: AlleleState, markers: &'a MarkerPair) -> Self {
        Self { state, markers }
    }

    pub fn state(&self) -> AlleleState {
        self.state
    }

    pub fn markers(&self) -> &'a MarkerPair {
        self.markers
    }

    /// Same markers, opposite state
    pub fn invert(&self) -> Self {
        Self::new(self.state.opposite(), self.markers)
    }

    /// Keep this allele if the probe was detected, invert it otherwise
    pub fn check_presence(&self, presence_marker: &str) -> Self {
        Self::new(
            resolve_conditional_allele(self.state, presence_marker),
            self.markers,
        )
    }

    pub fn is_mutant(&self) -> bool {
        self.state.is_mutant()
    }

    pub fn to_marker(&self) -> &'a str {
        self.markers.marker_for(self.state)
    }
}
