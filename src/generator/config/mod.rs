pub mod formats;
pub mod group;
pub mod region;
pub mod remark;
pub mod ruleset;

pub use group::assemble_groups;
pub use region::{classify, RegionGroups, RegionTag};
pub use remark::RemarkRegistry;
pub use ruleset::{static_rules, Rule};
