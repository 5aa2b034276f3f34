//! Participant matching for remote chats.

use crate::entities::{ChatParticipant, RemoteChat};

/// Local user ids of both participants, sorted.
pub fn sorted_user_ids(first: &ChatParticipant, second: &ChatParticipant) -> [String; 2] {
    let mut ids = [first.user_id.clone(), second.user_id.clone()];
    ids.sort();
    ids
}

/// True when `chat` has exactly two identifiable members and they are the two
/// participants, compared case-insensitively in either order.
pub fn matches_participants(
    chat: &RemoteChat,
    first: &ChatParticipant,
    second: &ChatParticipant,
) -> bool {
    let mut member_ids: Vec<String> = chat
        .members
        .iter()
        .filter_map(|member| member.object_id())
        .map(str::to_lowercase)
        .collect();

    if member_ids.len() != 2 {
        return false;
    }
    member_ids.sort();

    let mut wanted = [
        first.azure_ad_object_id.to_lowercase(),
        second.azure_ad_object_id.to_lowercase(),
    ];
    wanted.sort();

    member_ids == wanted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::RemoteMember;

    fn member(id: &str) -> RemoteMember {
        RemoteMember {
            user_id: Some(id.to_string()),
            user: None,
            display_name: None,
        }
    }

    fn chat(members: &[&str]) -> RemoteChat {
        RemoteChat {
            id: "chat".to_string(),
            topic: Some("t".to_string()),
            chat_type: Some("group".to_string()),
            members: members.iter().map(|id| member(id)).collect(),
        }
    }

    #[test]
    fn test_match_ignores_case_and_order() {
        let alice = ChatParticipant::new("1", "A");
        let bob = ChatParticipant::new("2", "b");

        assert!(matches_participants(&chat(&["a", "B"]), &alice, &bob));
        assert!(matches_participants(&chat(&["B", "a"]), &bob, &alice));
    }

    #[test]
    fn test_third_member_rejects_match() {
        let alice = ChatParticipant::new("1", "a");
        let bob = ChatParticipant::new("2", "b");

        assert!(!matches_participants(&chat(&["a", "b", "c"]), &alice, &bob));
    }

    #[test]
    fn test_members_without_ids_are_ignored() {
        let alice = ChatParticipant::new("1", "a");
        let bob = ChatParticipant::new("2", "b");
        let mut remote = chat(&["a", "b"]);
        remote.members.push(RemoteMember {
            user_id: None,
            user: None,
            display_name: Some("Bot".to_string()),
        });

        assert!(matches_participants(&remote, &alice, &bob));
    }

    #[test]
    fn test_different_pair_does_not_match() {
        let alice = ChatParticipant::new("1", "a");
        let bob = ChatParticipant::new("2", "b");

        assert!(!matches_participants(&chat(&["a", "c"]), &alice, &bob));
        assert!(!matches_participants(&chat(&["a"]), &alice, &bob));
    }

    #[test]
    fn test_user_ids_are_sorted() {
        let first = ChatParticipant::new("zed", "z");
        let second = ChatParticipant::new("amy", "a");
        assert_eq!(sorted_user_ids(&first, &second), ["amy".to_string(), "zed".to_string()]);
    }
}
