//! Cables: consecutive troncons pulled as a single cable

use super::troncon::{TronconId, Troncons};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cable {
    pub capa: usize,
    /// Estimated length from node distances plus love
    pub length: i64,
    pub troncons: Vec<TronconId>,
}

/// Pulling lengths summed over a cable
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Lengths {
    pub love: i64,
    pub underground: i64,
    pub aerial: i64,
    pub facade: i64,
}

impl Lengths {
    pub fn total(&self) -> i64 {
        self.love + self.underground + self.aerial + self.facade
    }
}

impl Cable {
    pub fn new(capa: usize) -> Self {
        Self {
            capa,
            ..Default::default()
        }
    }

    /// Append a troncon spanning `distance` meters
    pub fn add_troncon(&mut self, troncon: TronconId, distance: i64, love: i64) {
        self.length += distance + love;
        self.troncons.push(troncon);
    }

    pub fn first_troncon(&self) -> Option<TronconId> {
        self.troncons.first().copied()
    }

    pub fn last_troncon(&self) -> Option<TronconId> {
        self.troncons.last().copied()
    }

    pub fn lengths(&self, troncons: &Troncons) -> Lengths {
        self.troncons
            .iter()
            .map(|id| &troncons[*id])
            .fold(Lengths::default(), |acc, tr| Lengths {
                love: acc.love + tr.love_length,
                underground: acc.underground + tr.underground_length,
                aerial: acc.aerial + tr.aerial_length,
                facade: acc.facade + tr.facade_length,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cable_lengths() {
        let mut troncons = Troncons::new();
        let a = troncons.get_or_create("TR-A");
        let b = troncons.get_or_create("TR-B");
        troncons[a].love_length = 20;
        troncons[a].underground_length = 150;
        troncons[b].love_length = 20;
        troncons[b].aerial_length = 80;
        troncons[b].facade_length = 10;

        let mut cable = Cable::new(48);
        cable.add_troncon(a, 150, 20);
        cable.add_troncon(b, 90, 20);

        assert_eq!(cable.length, 280);
        assert_eq!(cable.first_troncon(), Some(a));
        assert_eq!(cable.last_troncon(), Some(b));
        let lengths = cable.lengths(&troncons);
        assert_eq!(lengths.love, 40);
        assert_eq!(lengths.aerial + lengths.facade, 90);
        assert_eq!(lengths.total(), 280);
    }
}
