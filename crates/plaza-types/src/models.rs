use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub bio: String,
    pub avatar: String,
}

impl Profile {
    pub fn new(bio: &str) -> Self {
        Self {
            bio: bio.to_string(),
            avatar: "default.png".to_string(),
        }
    }
}

/// Users live only in process memory. The password field holds an argon2
/// hash, never the plaintext.
#[derive(Debug, Clone)]
pub struct User {
    pub username: String,
    pub password_hash: String,
    pub is_admin: bool,
    pub profile: Profile,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsItem {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub author: String,
    pub created_at: DateTime<Utc>,
}

/// Chat message content is stored post-processed: mentions and hashtags are
/// already rewritten into markup when the message is appended.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub content: String,
    pub author: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Poll {
    pub id: Uuid,
    pub name: String,
    pub creator: String,
    pub created_at: DateTime<Utc>,
    pub votes_agree: Vec<String>,
    pub votes_disagree: Vec<String>,
}

impl Poll {
    pub fn new(name: String, creator: String, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            creator,
            created_at,
            votes_agree: Vec::new(),
            votes_disagree: Vec::new(),
        }
    }

    /// Apply one vote. The voter is first removed from both sets, then added
    /// to the set named by `vote_type` (`"agree"` or `"disagree"`). Any other
    /// value retracts the vote without adding a new one. Invariant: a voter
    /// is never in both sets.
    pub fn cast_vote(&mut self, voter: &str, vote_type: &str) {
        self.votes_agree.retain(|v| v != voter);
        self.votes_disagree.retain(|v| v != voter);

        match vote_type {
            "agree" => self.votes_agree.push(voter.to_string()),
            "disagree" => self.votes_disagree.push(voter.to_string()),
            _ => {}
        }
    }

    pub fn has_voted(&self, voter: &str) -> bool {
        self.votes_agree.iter().any(|v| v == voter)
            || self.votes_disagree.iter().any(|v| v == voter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn poll() -> Poll {
        Poll::new("climate".into(), "asad".into(), Utc::now())
    }

    #[test]
    fn vote_moves_between_sets() {
        let mut p = poll();

        p.cast_vote("daniello", "agree");
        assert_eq!(p.votes_agree, vec!["daniello"]);
        assert!(p.votes_disagree.is_empty());

        p.cast_vote("daniello", "disagree");
        assert!(p.votes_agree.is_empty());
        assert_eq!(p.votes_disagree, vec!["daniello"]);
    }

    #[test]
    fn unrecognized_vote_type_retracts() {
        let mut p = poll();
        p.cast_vote("daniello", "agree");
        p.cast_vote("daniello", "disagree");
        p.cast_vote("daniello", "maybe");
        assert!(!p.has_voted("daniello"));
    }

    #[test]
    fn voting_is_idempotent_per_voter() {
        let mut p = poll();
        p.cast_vote("daniello", "agree");
        p.cast_vote("daniello", "agree");
        assert_eq!(p.votes_agree, vec!["daniello"]);
    }

    #[test]
    fn voters_are_independent() {
        let mut p = poll();
        p.cast_vote("daniello", "agree");
        p.cast_vote("shalil", "disagree");
        assert_eq!(p.votes_agree, vec!["daniello"]);
        assert_eq!(p.votes_disagree, vec!["shalil"]);
    }
}
