//! Practice-mode checkpoints

use serde::{Deserialize, Serialize};

use super::player::{Checkpoint, Player};

/// Stack of checkpoints placed during a practice run; the newest is used
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PracticeCheckpoints {
    checkpoints: Vec<Checkpoint>,
}

impl PracticeCheckpoints {
    pub fn add(&mut self, player: &Player) {
        self.checkpoints.push(player.checkpoint());
    }

    pub fn remove_last(&mut self) -> Option<Checkpoint> {
        self.checkpoints.pop()
    }

    pub fn last(&self) -> Option<&Checkpoint> {
        self.checkpoints.last()
    }

    pub fn len(&self) -> usize {
        self.checkpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checkpoints.is_empty()
    }

    pub fn reset(&mut self) {
        self.checkpoints.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::Tuning;
    use glam::Vec2;

    #[test]
    fn test_stack_order() {
        let tuning = Tuning::default();
        let mut practice = PracticeCheckpoints::default();
        assert!(practice.last().is_none());

        let mut player = Player::new(Vec2::new(60.0, 420.0), &tuning);
        practice.add(&player);
        player.body.pos.x = 500.0;
        practice.add(&player);
        assert_eq!(practice.len(), 2);
        assert_eq!(practice.last().map(|c| c.x), Some(500.0));

        practice.remove_last();
        assert_eq!(practice.last().map(|c| c.x), Some(60.0));
        practice.reset();
        assert!(practice.is_empty());
    }
}
