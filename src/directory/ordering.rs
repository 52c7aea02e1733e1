use std::cmp::Ordering;
use std::collections::HashMap;

use icu_collator::{Collator, CollatorOptions};
use icu_locid::locale;
use serde::Serialize;
use uuid::Uuid;

use crate::database::models::{Member, SmallGroup};

/// Locale-aware name comparison.
pub struct NameCollator {
    collator: Option<Collator>,
}

impl NameCollator {
    /// Korean collation. Falls back to code-point order if the collation data
    /// cannot be loaded.
    pub fn korean() -> Self {
        match Collator::try_new(&locale!("ko").into(), CollatorOptions::new()) {
            Ok(collator) => Self {
                collator: Some(collator),
            },
            Err(e) => {
                log::warn!("Korean collator unavailable, using code-point order: {}", e);
                Self::code_point()
            }
        }
    }

    pub fn code_point() -> Self {
        Self { collator: None }
    }

    pub fn compare(&self, a: &str, b: &str) -> Ordering {
        match &self.collator {
            Some(collator) => collator.compare(a, b),
            None => a.cmp(b),
        }
    }
}

impl Default for NameCollator {
    fn default() -> Self {
        Self::korean()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GroupSection<'a> {
    pub group: &'a SmallGroup,
    pub members: Vec<&'a Member>,
}

/// Role priority first, then collated name. Equal keys keep their input order.
pub fn sort_members<'a, I>(members: I, collator: &NameCollator) -> Vec<&'a Member>
where
    I: IntoIterator<Item = &'a Member>,
{
    let mut sorted: Vec<&Member> = members.into_iter().collect();
    sorted.sort_by(|a, b| {
        a.role
            .priority()
            .cmp(&b.role.priority())
            .then_with(|| collator.compare(&a.name, &b.name))
    });
    sorted
}

/// One section per group in collated name order, including groups with no
/// members. Members pointing at an unknown group land in no section.
pub fn group_by_group<'a>(
    members: &'a [Member],
    groups: &'a [SmallGroup],
    collator: &NameCollator,
) -> Vec<GroupSection<'a>> {
    let mut ordered_groups: Vec<&SmallGroup> = groups.iter().collect();
    ordered_groups.sort_by(|a, b| collator.compare(&a.name, &b.name));

    let mut by_group: HashMap<Uuid, Vec<&Member>> = HashMap::new();
    for member in members {
        by_group.entry(member.small_group_id).or_default().push(member);
    }

    let orphans = by_group
        .keys()
        .filter(|id| !groups.iter().any(|group| group.id == **id))
        .count();
    if orphans > 0 {
        log::debug!("{} member group id(s) match no small group; those members are not listed", orphans);
    }

    ordered_groups
        .into_iter()
        .map(|group| GroupSection {
            group,
            members: sort_members(
                by_group.get(&group.id).into_iter().flatten().copied(),
                collator,
            ),
        })
        .collect()
}
