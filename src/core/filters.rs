use std::collections::HashSet;

use uuid::Uuid;

use crate::models::{Group, Profile};

/// Check if a profile may be shown to other users during discovery
#[inline]
pub fn is_discoverable(profile: &Profile) -> bool {
    profile.allow_matching && !profile.is_private
}

/// Check if a profile is an eligible discovery candidate for `requester_id`
///
/// `evaluated` holds every user that already shares a match record with the
/// requester, in either direction and with any status.
#[inline]
pub fn is_candidate(requester_id: Uuid, profile: &Profile, evaluated: &HashSet<Uuid>) -> bool {
    profile.user_id != requester_id
        && is_discoverable(profile)
        && !evaluated.contains(&profile.user_id)
}

/// Case-insensitive substring search over group name and description
///
/// A missing or blank search matches every group.
pub fn matches_group_search(group: &Group, search: Option<&str>) -> bool {
    let needle = match search.map(str::trim) {
        Some(s) if !s.is_empty() => s.to_lowercase(),
        _ => return true,
    };

    group.name.to_lowercase().contains(&needle)
        || group.description.to_lowercase().contains(&needle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn create_group(name: &str, description: &str) -> Group {
        Group {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: description.to_string(),
            created_by: Uuid::new_v4(),
            is_premium_group: false,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_private_profile_not_discoverable() {
        let mut profile = Profile::new(Uuid::new_v4());
        assert!(is_discoverable(&profile));

        profile.is_private = true;
        assert!(!is_discoverable(&profile));
    }

    #[test]
    fn test_matching_disabled_not_discoverable() {
        let mut profile = Profile::new(Uuid::new_v4());
        profile.allow_matching = false;
        assert!(!is_discoverable(&profile));
    }

    #[test]
    fn test_candidate_excludes_self_and_evaluated() {
        let requester = Uuid::new_v4();
        let own = Profile::new(requester);
        let seen = Profile::new(Uuid::new_v4());
        let fresh = Profile::new(Uuid::new_v4());
        let evaluated: HashSet<Uuid> = [seen.user_id].into_iter().collect();

        assert!(!is_candidate(requester, &own, &evaluated));
        assert!(!is_candidate(requester, &seen, &evaluated));
        assert!(is_candidate(requester, &fresh, &evaluated));
    }

    #[test]
    fn test_group_search() {
        let group = create_group("Coffee Connoisseurs", "Discussing the perfect brew");

        assert!(matches_group_search(&group, None));
        assert!(matches_group_search(&group, Some("  ")));
        assert!(matches_group_search(&group, Some("coffee")));
        assert!(matches_group_search(&group, Some("BREW")));
        assert!(!matches_group_search(&group, Some("gaming")));
    }
}
