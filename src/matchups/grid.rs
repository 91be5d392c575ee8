use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::domain::{CHARACTER_COUNT, Character};

/// Directional win-rate of one character pair, from the first character's side
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MatchupCell {
    /// `None` when no qualifying match exists
    pub win_rate: Option<f64>,
    pub matches: usize,
}

impl MatchupCell {
    pub fn undefined() -> Self {
        Self::default()
    }

    pub fn is_defined(&self) -> bool {
        self.win_rate.is_some()
    }
}

/// Matchup cells for every ordered pair; rows are the P1 character, columns the P2 character.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "Vec<Vec<MatchupCell>>", try_from = "Vec<Vec<MatchupCell>>")]
pub struct MatchupGrid {
    cells: Array2<MatchupCell>,
}

impl MatchupGrid {
    pub fn new() -> Self {
        Self {
            cells: Array2::from_elem((CHARACTER_COUNT, CHARACTER_COUNT), MatchupCell::undefined()),
        }
    }

    pub fn get(&self, first: Character, second: Character) -> &MatchupCell {
        &self.cells[[first.index(), second.index()]]
    }

    pub fn set(&mut self, first: Character, second: Character, cell: MatchupCell) {
        self.cells[[first.index(), second.index()]] = cell;
    }

    pub fn iter(&self) -> impl Iterator<Item = (Character, Character, &MatchupCell)> {
        self.cells
            .indexed_iter()
            .map(|((row, col), cell)| (Character::ALL[row], Character::ALL[col], cell))
    }

    pub fn defined_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_defined()).count()
    }
}

impl Default for MatchupGrid {
    fn default() -> Self {
        Self::new()
    }
}

impl From<MatchupGrid> for Vec<Vec<MatchupCell>> {
    fn from(grid: MatchupGrid) -> Self {
        grid.cells.rows().into_iter().map(|row| row.to_vec()).collect()
    }
}

impl TryFrom<Vec<Vec<MatchupCell>>> for MatchupGrid {
    type Error = String;

    fn try_from(rows: Vec<Vec<MatchupCell>>) -> Result<Self, Self::Error> {
        if rows.len() != CHARACTER_COUNT || rows.iter().any(|row| row.len() != CHARACTER_COUNT) {
            return Err(format!(
                "matchup grid must be {CHARACTER_COUNT}x{CHARACTER_COUNT}"
            ));
        }

        let flat: Vec<MatchupCell> = rows.into_iter().flatten().collect();
        let cells = Array2::from_shape_vec((CHARACTER_COUNT, CHARACTER_COUNT), flat)
            .map_err(|e| e.to_string())?;
        Ok(Self { cells })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_grid_is_entirely_undefined() {
        let grid = MatchupGrid::new();
        assert_eq!(grid.iter().count(), CHARACTER_COUNT * CHARACTER_COUNT);
        assert_eq!(grid.defined_count(), 0);
    }

    #[test]
    fn cells_are_directional() {
        let mut grid = MatchupGrid::new();
        grid.set(
            Character::Fox,
            Character::Marth,
            MatchupCell {
                win_rate: Some(0.75),
                matches: 4,
            },
        );

        assert_eq!(grid.get(Character::Fox, Character::Marth).win_rate, Some(0.75));
        assert!(!grid.get(Character::Marth, Character::Fox).is_defined());
    }

    #[test]
    fn serializes_as_rows_with_null_for_undefined() {
        let mut grid = MatchupGrid::new();
        grid.set(
            Character::DonkeyKong,
            Character::CaptainFalcon,
            MatchupCell {
                win_rate: Some(0.5),
                matches: 2,
            },
        );

        let json = serde_json::to_value(&grid).unwrap();
        assert_eq!(json[1][0]["win_rate"], 0.5);
        assert!(json[0][1]["win_rate"].is_null());

        let back: MatchupGrid = serde_json::from_value(json).unwrap();
        assert_eq!(back, grid);
    }

    #[test]
    fn rejects_wrongly_shaped_rows() {
        let rows = vec![vec![MatchupCell::undefined(); 3]; 3];
        assert!(MatchupGrid::try_from(rows).is_err());
    }
}
