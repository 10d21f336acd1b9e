use crate::common::traits::OutcomeSource;
use crate::common::types::{Space, TableType, DOUBLE_ZERO, ZERO};
use rand::Rng;

const AMERICAN_ORDER: [&str; 38] = [
    ZERO, "28", "9", "26", "30", "11", "7", "20", "32", "17", "5", "22", "34", "15", "3", "24",
    "36", "13", "1", DOUBLE_ZERO, "27", "10", "25", "29", "12", "8", "19", "31", "18", "6", "21",
    "33", "16", "4", "23", "35", "14", "2",
];

const EUROPEAN_ORDER: [&str; 37] = [
    ZERO, "32", "15", "19", "4", "21", "2", "25", "17", "34", "6", "27", "13", "36", "11", "30",
    "8", "23", "10", "5", "24", "16", "33", "1", "20", "14", "31", "9", "22", "18", "29", "7",
    "28", "12", "35", "3", "26",
];

/// Fixed ring of pockets with a uniform selector
#[derive(Debug, Clone)]
pub struct Wheel {
    spaces: Vec<Space>,
    current: Option<usize>,
}

impl Wheel {
    pub fn new(table_type: TableType) -> Self {
        let order: &[&str] = match table_type {
            TableType::American => &AMERICAN_ORDER,
            TableType::European => &EUROPEAN_ORDER,
        };
        let spaces = order
            .iter()
            .enumerate()
            .map(|(location, value)| Space::new(*value, location))
            .collect();

        Self {
            spaces,
            current: None,
        }
    }

    /// Pockets in wheel order
    pub fn spaces(&self) -> &[Space] {
        &self.spaces
    }

    /// Outcome of the most recent spin
    pub fn current_space(&self) -> Option<&Space> {
        self.current.map(|index| &self.spaces[index])
    }

    /// Spin using the caller's random source
    pub fn spin_with<R: Rng + ?Sized>(&mut self, rng: &mut R) -> &Space {
        let index = rng.gen_range(0..self.spaces.len());
        self.current = Some(index);
        &self.spaces[index]
    }
}

impl OutcomeSource for Wheel {
    fn spin(&mut self) -> Space {
        self.spin_with(&mut rand::thread_rng()).clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::types::Color;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_european_wheel_spaces() {
        let wheel = Wheel::new(TableType::European);
        let spaces = wheel.spaces();

        assert_eq!(spaces.len(), 37);
        assert_eq!((spaces[0].value.as_str(), spaces[0].color), ("0", Color::Green));
        assert_eq!((spaces[10].value.as_str(), spaces[10].color), ("6", Color::Black));
        assert_eq!((spaces[21].value.as_str(), spaces[21].color), ("16", Color::Red));
        assert_eq!((spaces[30].value.as_str(), spaces[30].color), ("29", Color::Black));
        assert_eq!((spaces[36].value.as_str(), spaces[36].color), ("26", Color::Black));
    }

    #[test]
    fn test_american_wheel_spaces() {
        let wheel = Wheel::new(TableType::American);
        let spaces = wheel.spaces();

        assert_eq!(spaces.len(), 38);
        assert_eq!((spaces[0].value.as_str(), spaces[0].color), ("0", Color::Green));
        assert_eq!((spaces[19].value.as_str(), spaces[19].color), ("00", Color::Green));
        assert_eq!((spaces[10].value.as_str(), spaces[10].color), ("5", Color::Red));
        assert_eq!((spaces[21].value.as_str(), spaces[21].color), ("10", Color::Black));
        assert_eq!((spaces[30].value.as_str(), spaces[30].color), ("21", Color::Red));
        assert_eq!((spaces[37].value.as_str(), spaces[37].color), ("2", Color::Black));
    }

    #[test]
    fn test_colors_alternate_around_the_ring() {
        for table_type in [TableType::American, TableType::European] {
            let wheel = Wheel::new(table_type);
            for pair in wheel.spaces().windows(2) {
                if pair[0].color != Color::Green && pair[1].color != Color::Green {
                    assert_ne!(pair[0].color, pair[1].color, "{} / {}", pair[0], pair[1]);
                }
            }
        }
    }

    #[test]
    fn test_seeded_spin_records_outcome() {
        let mut wheel = Wheel::new(TableType::American);
        assert!(wheel.current_space().is_none());

        let mut rng = StdRng::seed_from_u64(7);
        let first = wheel.spin_with(&mut rng).clone();
        assert_eq!(wheel.current_space(), Some(&first));

        let mut replay = StdRng::seed_from_u64(7);
        let mut other = Wheel::new(TableType::American);
        assert_eq!(other.spin_with(&mut replay), &first);
    }

    #[test]
    fn test_spins_reach_many_pockets() {
        let mut wheel = Wheel::new(TableType::European);
        let mut rng = StdRng::seed_from_u64(42);
        let seen: std::collections::HashSet<String> = (0..2_000)
            .map(|_| wheel.spin_with(&mut rng).value.clone())
            .collect();

        assert_eq!(seen.len(), 37);
    }
}
