use crate::config::InteractionMode;
use crate::slot::Board;
use serde::Serialize;

pub const DEFAULT_NAME: &str = "Enter Your Name Here";
pub const FIXED_CAPTION: &str = "Midwife in the making";
pub const DEFAULT_START_YEAR: &str = "2025";
pub const DEFAULT_END_YEAR: &str = "2028";
pub const DEFAULT_DATE_RANGE: &str = "2025 - 2028";

pub const BASE_YEAR: u16 = 2020;
pub const YEAR_SPAN: u16 = 15;

/// The selectable years for the start/end period pickers.
pub fn year_choices() -> Vec<String> {
    (BASE_YEAR..BASE_YEAR + YEAR_SPAN)
        .map(|year| year.to_string())
        .collect()
}

pub fn is_year_choice(value: &str) -> bool {
    year_choices().iter().any(|year| year == value)
}

/// Everything that is persisted. Both header shapes are carried so either
/// interaction mode can read a record written by the other.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackerState {
    pub name: String,
    pub subtitle: String,
    pub start_year: String,
    pub end_year: String,
    pub date_range: String,
    pub slots: Board,
}

impl Default for TrackerState {
    fn default() -> Self {
        Self {
            name: DEFAULT_NAME.to_string(),
            subtitle: FIXED_CAPTION.to_string(),
            start_year: DEFAULT_START_YEAR.to_string(),
            end_year: DEFAULT_END_YEAR.to_string(),
            date_range: DEFAULT_DATE_RANGE.to_string(),
            slots: Board::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BoardStats {
    pub pink: usize,
    pub blue: usize,
    pub total: usize,
    pub capacity: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackerView {
    pub mode: InteractionMode,
    pub state: TrackerState,
    pub stats: BoardStats,
    pub active_slot: Option<usize>,
    pub reset_pending: bool,
    pub year_choices: Vec<String>,
}
