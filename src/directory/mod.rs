//! Listing rules for the member directory: the recently-updated window, role
//! and name ordering, and grouping by small group. Everything here is pure and
//! recomputed per request.

pub mod ordering;
pub mod recent;
pub mod view;

pub use ordering::{GroupSection, NameCollator, group_by_group, sort_members};
pub use recent::{RECENT_WINDOW_DAYS, RecentSet, compute_recent, recent_cutoff};
pub use view::{DirectoryView, MemberCard, SectionView, build_directory, relative_label};
