use serde::{Deserialize, Serialize};

use crate::entry::ImageEntry;
use crate::lot::{LotId, LotSelection};

/// What to do when the same lot tag is photographed twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateTagPolicy {
    /// The later tag starts the lot over; earlier item photos are discarded.
    #[default]
    LastTagWins,
    /// The later tag re-activates the lot and new photos are appended.
    FirstTagWins,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupingPolicy {
    pub duplicate_tags: DuplicateTagPolicy,
}

/// Item photos collected for one lot, in the order they were seen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LotGroup {
    pub lot: LotId,
    pub members: Vec<ImageEntry>,
    /// How many tag photos for this lot were recognized (0 for extras).
    pub tag_sightings: usize,
}

impl LotGroup {
    fn new(lot: LotId) -> Self {
        Self { lot, members: Vec::new(), tag_sightings: 0 }
    }
}

/// Lot groups in first-detected order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LotMap {
    groups: Vec<LotGroup>,
}

impl LotMap {
    pub fn get(&self, lot: &LotId) -> Option<&LotGroup> {
        self.groups.iter().find(|g| &g.lot == lot)
    }

    fn get_mut(&mut self, lot: &LotId) -> Option<&mut LotGroup> {
        self.groups.iter_mut().find(|g| &g.lot == lot)
    }

    pub fn contains(&self, lot: &LotId) -> bool {
        self.get(lot).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LotGroup> {
        self.groups.iter()
    }

    pub fn lots(&self) -> impl Iterator<Item = &LotId> {
        self.groups.iter().map(|g| &g.lot)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Names of the member photos of `lot`, mostly useful in tests and reports.
    pub fn member_names(&self, lot: &LotId) -> Vec<&str> {
        self.get(lot)
            .map(|g| g.members.iter().map(ImageEntry::name).collect())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupState {
    NoActiveLot,
    ActiveLot(LotId),
}

/// What a single observation did to the grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// A new lot was opened.
    Opened,
    /// A repeated tag emptied an existing lot.
    Reset,
    /// A repeated tag re-activated an existing lot, keeping its photos.
    Resumed,
    /// A tag for a skipped lot; following photos are dropped until the next tag.
    Skipped,
    /// The photo was added to the active lot.
    Appended,
    /// The photo came before any usable tag and belongs to nothing.
    Dropped,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grouping {
    pub lots: LotMap,
    /// Photos that could not be attributed to any lot, in input order.
    pub unassigned: Vec<ImageEntry>,
}

/// Walks images in ingest order and assigns item photos to the most recent tag.
pub struct LotGrouper<'a> {
    policy: GroupingPolicy,
    selection: &'a LotSelection,
    state: GroupState,
    lots: LotMap,
    unassigned: Vec<ImageEntry>,
}

impl<'a> LotGrouper<'a> {
    pub fn new(policy: GroupingPolicy, selection: &'a LotSelection) -> Self {
        Self {
            policy,
            selection,
            state: GroupState::NoActiveLot,
            lots: LotMap::default(),
            unassigned: Vec::new(),
        }
    }

    pub fn state(&self) -> &GroupState {
        &self.state
    }

    /// Feed one image with the recognizer's verdict for it.
    pub fn observe(&mut self, entry: ImageEntry, verdict: Option<LotId>) -> Transition {
        match verdict {
            Some(lot) => self.observe_tag(lot),
            None => self.observe_item(entry),
        }
    }

    fn observe_tag(&mut self, lot: LotId) -> Transition {
        if self.selection.is_skipped(&lot) {
            self.state = GroupState::NoActiveLot;
            return Transition::Skipped;
        }

        let existing = self.lots.groups.iter().position(|g| g.lot == lot);
        let transition = match existing {
            None => {
                let mut group = LotGroup::new(lot.clone());
                group.tag_sightings = 1;
                self.lots.groups.push(group);
                Transition::Opened
            }
            Some(idx) => {
                let group = &mut self.lots.groups[idx];
                group.tag_sightings += 1;
                match self.policy.duplicate_tags {
                    DuplicateTagPolicy::LastTagWins => {
                        // Photos from the earlier sighting are no longer attributed.
                        self.unassigned.append(&mut group.members);
                        Transition::Reset
                    }
                    DuplicateTagPolicy::FirstTagWins => Transition::Resumed,
                }
            }
        };
        self.state = GroupState::ActiveLot(lot);
        transition
    }

    fn observe_item(&mut self, entry: ImageEntry) -> Transition {
        let active = match &self.state {
            GroupState::ActiveLot(lot) => self.lots.get_mut(lot),
            GroupState::NoActiveLot => None,
        };
        match active {
            Some(group) => {
                group.members.push(entry);
                Transition::Appended
            }
            None => {
                self.unassigned.push(entry);
                Transition::Dropped
            }
        }
    }

    /// End of input: add empty groups for extra lots that never showed a tag.
    pub fn finish(mut self) -> Grouping {
        for lot in self.selection.extra() {
            if !self.lots.contains(lot) {
                self.lots.groups.push(LotGroup::new(lot.clone()));
            }
        }
        self.unassigned.sort_by_key(ImageEntry::position);
        Grouping { lots: self.lots, unassigned: self.unassigned }
    }
}
