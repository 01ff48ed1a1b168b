//! Tag palette and region tagging state for the editor.

use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Number of tags reachable through `Ctrl+0`..`Ctrl+9`
pub const HOTKEY_TAG_SLOTS: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub name: CompactString,
    pub color: CompactString,
}

impl Tag {
    pub fn new(name: impl Into<CompactString>, color: impl Into<CompactString>) -> Self {
        Self {
            name: name.into(),
            color: color.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    pub id: CompactString,
    pub tags: Vec<Tag>,
}

impl Region {
    pub fn new(id: impl Into<CompactString>) -> Self {
        Self {
            id: id.into(),
            tags: Vec::new(),
        }
    }

    pub fn has_tag(&self, name: &str) -> bool {
        self.tags.iter().any(|tag| tag.name == name)
    }
}

/// Review progress of the asset being edited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetState {
    #[default]
    NotVisited,
    Visited,
    Tagged,
}

/// Tag a hotkey digit resolves to.
///
/// `1`..`9` pick the tag at that 1-based position, `0` picks the tenth tag.
/// Positions past the end resolve to nothing.
pub fn tag_for_digit(tags: &[Tag], digit: u32) -> Option<&Tag> {
    match digit {
        0 => tags.get(HOTKEY_TAG_SLOTS - 1),
        1..=9 => tags.get(digit as usize - 1),
        _ => None,
    }
}

/// Like [`tag_for_digit`] for a key name. Only a single ASCII digit matches.
pub fn tag_for_hotkey<'a>(tags: &'a [Tag], key: &str) -> Option<&'a Tag> {
    match key.as_bytes() {
        [b @ b'0'..=b'9'] => tag_for_digit(tags, u32::from(b - b'0')),
        _ => None,
    }
}

#[derive(Debug, Clone, Default)]
pub struct EditorState {
    pub tags: Vec<Tag>,
    pub regions: Vec<Region>,
    pub selected_regions: Vec<CompactString>,
    pub asset_state: AssetState,
}

impl EditorState {
    pub fn new(tags: Vec<Tag>) -> Self {
        Self {
            tags,
            ..Self::default()
        }
    }

    pub fn add_region(&mut self, region: Region) {
        self.regions.push(region);
        self.refresh_asset_state();
    }

    /// Any metadata change marks the asset: tagged once it has regions,
    /// visited otherwise.
    fn refresh_asset_state(&mut self) {
        self.asset_state = if self.regions.is_empty() {
            AssetState::Visited
        } else {
            AssetState::Tagged
        };
    }

    pub fn select_region(&mut self, id: &str) {
        if !self.selected_regions.iter().any(|selected| selected == id) {
            self.selected_regions.push(CompactString::new(id));
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected_regions.clear();
    }

    /// Toggle `tag` on every selected region. Returns how many regions changed.
    pub fn toggle_tag(&mut self, tag: &Tag) -> usize {
        let mut touched = 0;

        for region in self
            .regions
            .iter_mut()
            .filter(|region| self.selected_regions.contains(&region.id))
        {
            match region.tags.iter().position(|existing| existing.name == tag.name) {
                Some(index) => {
                    region.tags.remove(index);
                }
                None => region.tags.push(tag.clone()),
            }
            touched += 1;
        }

        self.refresh_asset_state();
        debug!(
            tag = %tag.name,
            touched,
            state = ?self.asset_state,
            "Toggled tag on selected regions"
        );
        touched
    }

    /// Toggle the tag a hotkey digit names
    pub fn apply_digit(&mut self, digit: u32) -> Option<usize> {
        let tag = tag_for_digit(&self.tags, digit)?.clone();
        Some(self.toggle_tag(&tag))
    }

    /// Resolve a hotkey key name and toggle the tag it names
    pub fn apply_hotkey(&mut self, key: &str) -> Option<usize> {
        let tag = tag_for_hotkey(&self.tags, key)?.clone();
        Some(self.toggle_tag(&tag))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn palette(count: usize) -> Vec<Tag> {
        (1..=count)
            .map(|i| Tag::new(format!("tag{i}"), "#ffffff"))
            .collect()
    }

    #[test]
    fn test_tag_for_hotkey_positions() {
        let tags = palette(10);

        assert_eq!(tag_for_hotkey(&tags, "1").unwrap().name, "tag1");
        assert_eq!(tag_for_hotkey(&tags, "9").unwrap().name, "tag9");
        assert_eq!(tag_for_hotkey(&tags, "0").unwrap().name, "tag10");
    }

    #[test]
    fn test_tag_for_hotkey_out_of_range() {
        let tags = palette(3);

        assert!(tag_for_hotkey(&tags, "4").is_none());
        assert!(tag_for_hotkey(&tags, "0").is_none());
        assert!(tag_for_hotkey(&tags, "x").is_none());
        assert!(tag_for_hotkey(&tags, "12").is_none());
    }

    #[test]
    fn test_tag_for_hotkey_single_ascii_digit_only() {
        let tags = palette(10);

        assert!(tag_for_hotkey(&tags, "+1").is_none());
        assert!(tag_for_hotkey(&tags, "01").is_none());
        assert!(tag_for_hotkey(&tags, " 1").is_none());
        assert!(tag_for_hotkey(&tags, "").is_none());
        assert!(tag_for_hotkey(&tags, "\u{0661}").is_none());
        assert_eq!(tag_for_digit(&tags, 3).unwrap().name, "tag3");
        assert!(tag_for_digit(&tags, 12).is_none());
    }

    #[test]
    fn test_asset_state_follows_regions() {
        let tags = palette(1);
        let mut state = EditorState::new(tags.clone());
        assert_eq!(state.asset_state, AssetState::NotVisited);

        assert_eq!(state.toggle_tag(&tags[0]), 0);
        assert_eq!(state.asset_state, AssetState::Visited);

        state.add_region(Region::new("r1"));
        assert_eq!(state.asset_state, AssetState::Tagged);
    }

    #[test]
    fn test_toggle_tag_on_selected_regions() {
        let tags = palette(2);
        let mut state = EditorState::new(tags.clone());
        state.add_region(Region::new("r1"));
        state.add_region(Region::new("r2"));
        state.select_region("r1");

        assert_eq!(state.toggle_tag(&tags[0]), 1);
        assert!(state.regions[0].has_tag("tag1"));
        assert!(!state.regions[1].has_tag("tag1"));

        assert_eq!(state.toggle_tag(&tags[0]), 1);
        assert!(!state.regions[0].has_tag("tag1"));
    }

    #[test]
    fn test_toggle_without_selection() {
        let tags = palette(1);
        let mut state = EditorState::new(tags.clone());
        state.add_region(Region::new("r1"));

        assert_eq!(state.toggle_tag(&tags[0]), 0);
        assert!(state.regions[0].tags.is_empty());
    }

    #[test]
    fn test_apply_hotkey() {
        let mut state = EditorState::new(palette(3));
        state.add_region(Region::new("r1"));
        state.select_region("r1");
        state.select_region("r1");

        assert_eq!(state.apply_hotkey("2"), Some(1));
        assert!(state.regions[0].has_tag("tag2"));
        assert_eq!(state.apply_hotkey("5"), None);
        assert_eq!(state.apply_digit(2), Some(1));
        assert!(!state.regions[0].has_tag("tag2"));
    }
}
