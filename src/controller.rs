use crate::config::InteractionMode;
use crate::errors::AppError;
use crate::models::{TrackerState, TrackerView, is_year_choice, year_choices};
use crate::slot::{Board, Category, SLOT_COUNT};
use crate::stats::build_stats;
use crate::storage::Persistence;
use serde::Deserialize;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeaderField {
    Name,
    Subtitle,
    StartYear,
    EndYear,
    DateRange,
}

/// One discrete user gesture.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    SelectSlot { index: usize },
    ChooseCategory { category: Category },
    EditDate { date: String },
    ClearSlot,
    CloseEditor,
    EditHeader { field: HeaderField, value: String },
    RequestReset,
    ConfirmReset,
    CancelReset,
}

/// What selecting a slot did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// An editing context is now open for this index.
    Opened(usize),
    /// The board was changed directly.
    Applied,
}

/// How a mode reacts to slot taps and which header fields it exposes.
pub trait SlotPolicy: Send + Sync {
    fn mode(&self) -> InteractionMode;

    fn select(&self, board: &mut Board, index: usize) -> Selection;

    fn allows(&self, field: HeaderField) -> bool;
}

#[derive(Debug, Default)]
pub struct EditorPolicy;

impl SlotPolicy for EditorPolicy {
    fn mode(&self) -> InteractionMode {
        InteractionMode::Editor
    }

    fn select(&self, _board: &mut Board, index: usize) -> Selection {
        Selection::Opened(index)
    }

    fn allows(&self, field: HeaderField) -> bool {
        matches!(
            field,
            HeaderField::Name | HeaderField::StartYear | HeaderField::EndYear
        )
    }
}

#[derive(Debug, Default)]
pub struct CyclePolicy;

impl SlotPolicy for CyclePolicy {
    fn mode(&self) -> InteractionMode {
        InteractionMode::Cycle
    }

    fn select(&self, board: &mut Board, index: usize) -> Selection {
        board.update(index, |slot| slot.cycle());
        Selection::Applied
    }

    fn allows(&self, field: HeaderField) -> bool {
        matches!(
            field,
            HeaderField::Name | HeaderField::Subtitle | HeaderField::DateRange
        )
    }
}

pub fn policy_for(mode: InteractionMode) -> Box<dyn SlotPolicy> {
    match mode {
        InteractionMode::Editor => Box::new(EditorPolicy),
        InteractionMode::Cycle => Box::new(CyclePolicy),
    }
}

/// Owns the tracker state and applies user actions to it, saving after
/// every change to the persisted record.
pub struct Tracker {
    state: TrackerState,
    policy: Box<dyn SlotPolicy>,
    persistence: Persistence,
    active_slot: Option<usize>,
    reset_pending: bool,
}

impl Tracker {
    /// Loads the saved record (or starts from defaults) before anything can
    /// be rendered or saved.
    pub async fn open(mut persistence: Persistence, policy: Box<dyn SlotPolicy>) -> Self {
        let state = persistence.load().await.unwrap_or_default();
        let stats = build_stats(&state.slots);
        info!(
            mode = ?policy.mode(),
            pink = stats.pink,
            blue = stats.blue,
            "tracker ready"
        );

        Self {
            state,
            policy,
            persistence,
            active_slot: None,
            reset_pending: false,
        }
    }

    pub fn state(&self) -> &TrackerState {
        &self.state
    }

    pub fn reset_pending(&self) -> bool {
        self.reset_pending
    }

    pub fn view(&self) -> TrackerView {
        TrackerView {
            mode: self.policy.mode(),
            state: self.state.clone(),
            stats: build_stats(&self.state.slots),
            active_slot: self.active_slot,
            reset_pending: self.reset_pending,
            year_choices: year_choices(),
        }
    }

    pub async fn apply(&mut self, action: Action) -> Result<TrackerView, AppError> {
        let changed = match action {
            Action::SelectSlot { index } => self.select_slot(index)?,
            Action::ChooseCategory { category } => {
                let index = self.editing()?;
                self.state.slots.update(index, |slot| slot.set_category(category));
                true
            }
            Action::EditDate { date } => {
                let index = self.editing()?;
                self.state.slots.update(index, |slot| slot.set_date(date));
                true
            }
            Action::ClearSlot => {
                let index = self.editing()?;
                self.state.slots.update(index, |slot| slot.clear());
                true
            }
            Action::CloseEditor => {
                self.active_slot = None;
                false
            }
            Action::EditHeader { field, value } => {
                self.edit_header(field, value)?;
                true
            }
            Action::RequestReset => {
                self.reset_pending = true;
                false
            }
            Action::ConfirmReset => {
                if !self.reset_pending {
                    return Err(AppError::conflict("no reset is awaiting confirmation"));
                }
                self.reset_pending = false;
                self.state.slots = Board::default();
                info!("board reset");
                true
            }
            Action::CancelReset => {
                self.reset_pending = false;
                false
            }
        };

        if changed {
            self.persistence.save(&self.state).await?;
        }
        Ok(self.view())
    }

    fn select_slot(&mut self, index: usize) -> Result<bool, AppError> {
        if index >= SLOT_COUNT {
            return Err(AppError::bad_request(format!(
                "slot index must be below {SLOT_COUNT}"
            )));
        }

        match self.policy.select(&mut self.state.slots, index) {
            Selection::Opened(index) => {
                self.active_slot = Some(index);
                Ok(false)
            }
            Selection::Applied => Ok(true),
        }
    }

    fn editing(&self) -> Result<usize, AppError> {
        self.active_slot
            .ok_or_else(|| AppError::conflict("no slot is being edited"))
    }

    fn edit_header(&mut self, field: HeaderField, value: String) -> Result<(), AppError> {
        if !self.policy.allows(field) {
            return Err(AppError::bad_request(format!(
                "{field:?} is not editable in {:?} mode",
                self.policy.mode()
            )));
        }
        if matches!(field, HeaderField::StartYear | HeaderField::EndYear) && !is_year_choice(&value)
        {
            return Err(AppError::bad_request(format!("{value} is not a selectable year")));
        }

        let target = match field {
            HeaderField::Name => &mut self.state.name,
            HeaderField::Subtitle => &mut self.state.subtitle,
            HeaderField::StartYear => &mut self.state.start_year,
            HeaderField::EndYear => &mut self.state.end_year,
            HeaderField::DateRange => &mut self.state.date_range,
        };
        *target = value;
        Ok(())
    }
}
