use std::collections::HashMap;

use chrono::{Duration, TimeZone, Utc};
use darakbang::database::models::MemberRole;
use darakbang::directory::{NameCollator, RECENT_WINDOW_DAYS, build_directory, compute_recent};
use fake::Fake;
use pretty_assertions::assert_eq;

mod common;

use common::MockData;

#[test]
fn test_generated_directory_respects_listing_rules() {
    let now = Utc.with_ymd_and_hms(2024, 9, 1, 9, 0, 0).unwrap();
    let groups = vec![
        MockData::group("3다락방"),
        MockData::group("1다락방"),
        MockData::group("2다락방"),
    ];

    let mut members = Vec::new();
    for group in &groups {
        let count: usize = (0..12).fake();
        for _ in 0..count {
            members.push(MockData::random_member(group, now));
        }
    }

    let collator = NameCollator::korean();
    let view = build_directory(&members, &groups, now, &collator, &HashMap::new());

    let names: Vec<&str> = view.sections.iter().map(|s| s.group.name.as_str()).collect();
    assert_eq!(names, vec!["1다락방", "2다락방", "3다락방"]);

    let listed: usize = view.sections.iter().map(|s| s.members.len()).sum();
    assert_eq!(listed, members.len());

    for section in &view.sections {
        for pair in section.members.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            assert!(a.role.priority() <= b.role.priority());
            if a.role == b.role {
                assert_ne!(collator.compare(&a.name, &b.name), std::cmp::Ordering::Greater);
            }
            assert_eq!(a.small_group_id, section.group.id);
        }
    }

    let cutoff = now - Duration::days(RECENT_WINDOW_DAYS);
    let expected_recent = members.iter().filter(|m| m.updated_at >= cutoff).count();
    assert_eq!(view.recent.len(), expected_recent);
    for pair in view.recent.windows(2) {
        assert!(pair[0].updated_at >= pair[1].updated_at);
    }

    for card in view.sections.iter().flat_map(|s| &s.members) {
        assert_eq!(card.is_recent, card.updated_at >= cutoff);
    }
}

#[test]
fn test_role_order_within_a_group() {
    let now = Utc::now();
    let group = MockData::group("1다락방");
    let members = vec![
        MockData::member(&group, MemberRole::SubLeader, now),
        MockData::member(&group, MemberRole::Pastor, now),
        MockData::member(&group, MemberRole::Leader, now),
    ];

    let view = build_directory(
        &members,
        std::slice::from_ref(&group),
        now,
        &NameCollator::korean(),
        &HashMap::new(),
    );

    let roles: Vec<MemberRole> = view.sections[0].members.iter().map(|m| m.role).collect();
    assert_eq!(
        roles,
        vec![MemberRole::Pastor, MemberRole::Leader, MemberRole::SubLeader]
    );
    let labels: Vec<&str> = view.sections[0].members.iter().map(|m| m.role_label).collect();
    assert_eq!(labels, vec!["교역자", "다락방장", "순장"]);
}

#[test]
fn test_prayer_request_summary_uses_the_oldest_entry() {
    let now = Utc::now();
    let group = MockData::group("1다락방");
    let mut member = MockData::member(&group, MemberRole::Leader, now);
    member.prayer_requests = Some(vec![
        MockData::prayer_request(&member, "가족의 건강", now - Duration::days(20)),
        MockData::prayer_request(&member, "새 직장", now - Duration::days(2)),
    ]);

    let view = build_directory(
        std::slice::from_ref(&member),
        std::slice::from_ref(&group),
        now,
        &NameCollator::korean(),
        &HashMap::new(),
    );

    let card = &view.sections[0].members[0];
    assert_eq!(card.prayer_request_count, 2);
    assert_eq!(
        card.first_prayer_request.as_ref().map(|r| r.content.as_str()),
        Some("가족의 건강")
    );
}

#[test]
fn test_recent_window_is_fourteen_days_inclusive() {
    let now = Utc::now();
    let group = MockData::group("1다락방");
    let members = vec![
        MockData::member(&group, MemberRole::Leader, now - Duration::days(14)),
        MockData::member(&group, MemberRole::Leader, now - Duration::days(15)),
    ];

    let recent = compute_recent(&members, now);
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].id, members[0].id);
}
