//! ModeInterpreter: label a reading from its lit icons.
//!
//! The mode is the label whose icon set overlaps the active icons the most;
//! on a tie the label listed first in the profile wins, and no overlap at
//! all gives [`UNKNOWN_MODE_LABEL`]. Description and unit are built from the
//! per-icon tables in active-icon order.

use std::collections::HashSet;

use serde::Serialize;

use crate::config::{DecoderConfig, ModeLabelMap};

pub const UNKNOWN_MODE_LABEL: &str = "unknown";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Interpretation {
    pub mode_label: String,
    pub description: String,
    pub unit: String,
}

pub fn interpret(active_icons: &[String], config: &DecoderConfig) -> Interpretation {
    Interpretation {
        mode_label: select_mode_label(active_icons, config.mode_label_map()).to_string(),
        description: compose_description(active_icons, config),
        unit: compose_unit(active_icons, config),
    }
}

/// Number of distinct icons shared by `icons` and `active`.
pub fn mode_overlap(icons: &[String], active: &HashSet<&str>) -> usize {
    icons
        .iter()
        .map(String::as_str)
        .collect::<HashSet<_>>()
        .intersection(active)
        .count()
}

pub fn select_mode_label<'a>(active_icons: &[String], modes: &'a ModeLabelMap) -> &'a str {
    let active: HashSet<&str> = active_icons.iter().map(String::as_str).collect();
    let mut best: &'a str = UNKNOWN_MODE_LABEL;
    let mut best_overlap = 0;
    for entry in modes.iter() {
        let overlap = mode_overlap(&entry.icons, &active);
        if overlap > best_overlap {
            best = entry.label.as_str();
            best_overlap = overlap;
        }
    }
    best
}

/// Space-joined descriptions of the active icons; icons without one are
/// skipped.
pub fn compose_description(active_icons: &[String], config: &DecoderConfig) -> String {
    active_icons
        .iter()
        .filter_map(|icon| config.description(icon))
        .filter(|phrase| !phrase.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string()
}

pub fn compose_unit(active_icons: &[String], config: &DecoderConfig) -> String {
    active_icons
        .iter()
        .filter_map(|icon| config.unit(icon))
        .collect::<String>()
        .trim()
        .to_string()
}
