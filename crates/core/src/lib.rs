pub mod entry;
pub mod grouping;
pub mod lot;
pub mod plan;
pub mod warning;

pub use entry::{EntryRole, ImageEntry};
pub use grouping::{
    DuplicateTagPolicy, GroupState, Grouping, GroupingPolicy, LotGroup, LotGrouper, LotMap,
    Transition,
};
pub use lot::{parse_lot_list, LotId, LotIdError, LotSelection};
pub use plan::{RenameEntry, RenamePlan};
pub use warning::{RunWarning, WarningKind};
