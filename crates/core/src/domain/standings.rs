// Final ranking of a competition

use serde::{Deserialize, Serialize};

use super::competition::CompetitionId;
use super::user::{User, UserId};

/// One participant's position in the final ranking
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedParticipant {
    pub user_id: UserId,
    /// 1-based
    pub rank: i64,
    pub likes: Option<i64>,
}

/// Outcome of closing one competition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Standings {
    pub competition_id: CompetitionId,
    pub ranking: Vec<RankedParticipant>,
    pub winner_id: Option<UserId>,
}

impl Standings {
    /// Rank participants by like count, highest first.
    ///
    /// `participants` must be in admission order: the sort is stable, so
    /// equal like counts keep that order. Participants without a like count
    /// rank after everyone else and can never win.
    pub fn compute(competition_id: CompetitionId, participants: &[User]) -> Self {
        let mut ordered: Vec<&User> = participants.iter().collect();
        // Option<i64> orders None lowest, so reversing puts missing counts last
        ordered.sort_by(|a, b| b.likes_number.cmp(&a.likes_number));

        let ranking: Vec<RankedParticipant> = ordered
            .iter()
            .zip(1..)
            .map(|(user, rank)| RankedParticipant {
                user_id: user.id,
                rank,
                likes: user.likes_number,
            })
            .collect();

        let winner_id = ranking
            .first()
            .filter(|top| top.likes.is_some())
            .map(|top| top.user_id);

        Self {
            competition_id,
            ranking,
            winner_id,
        }
    }

    /// User ids in ranked order
    pub fn ranked_ids(&self) -> Vec<UserId> {
        self.ranking.iter().map(|p| p.user_id).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn participant(id: UserId, likes: Option<i64>) -> User {
        User {
            id,
            id_qr_code: format!("USER{}", id),
            full_name: None,
            is_gold: true,
            is_active: true,
            date_wedding: None,
            url: Some(format!("https://www.facebook.com/reel/1000000{}", id)),
            likes_number: likes,
            views_number: Some(0),
            rank: 0,
            is_winner: false,
        }
    }

    #[test]
    fn test_ties_keep_admission_order() {
        // A=10, B=30, C=30, D=5 admitted in that order
        let participants = vec![
            participant(1, Some(10)),
            participant(2, Some(30)),
            participant(3, Some(30)),
            participant(4, Some(5)),
        ];

        let standings = Standings::compute(9, &participants);

        assert_eq!(standings.ranked_ids(), vec![2, 3, 1, 4]);
        assert_eq!(standings.winner_id, Some(2));
        let ranks: Vec<i64> = standings.ranking.iter().map(|p| p.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_missing_counts_rank_last() {
        let participants = vec![
            participant(1, None),
            participant(2, Some(0)),
            participant(3, Some(4)),
        ];

        let standings = Standings::compute(1, &participants);

        assert_eq!(standings.ranked_ids(), vec![3, 2, 1]);
        assert_eq!(standings.winner_id, Some(3));
    }

    #[test]
    fn test_no_counted_participant_means_no_winner() {
        let participants = vec![participant(1, None), participant(2, None)];

        let standings = Standings::compute(1, &participants);

        assert_eq!(standings.ranking.len(), 2);
        assert_eq!(standings.winner_id, None);
    }

    #[test]
    fn test_empty_competition() {
        let standings = Standings::compute(1, &[]);
        assert!(standings.ranking.is_empty());
        assert_eq!(standings.winner_id, None);
    }
}
