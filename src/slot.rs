use serde::{Deserialize, Deserializer, Serialize};

/// Number of footprints on the board.
pub const SLOT_COUNT: usize = 40;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    Empty,
    Pink,
    Blue,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Empty, Category::Pink, Category::Blue];

    /// Next category in the tap cycle: empty, pink, blue, back to empty.
    pub fn next(self) -> Self {
        match self {
            Category::Empty => Category::Pink,
            Category::Pink => Category::Blue,
            Category::Blue => Category::Empty,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Empty => "empty",
            Category::Pink => "pink",
            Category::Blue => "blue",
        }
    }
}

/// One footprint. An empty `date` means no delivery date was recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Slot {
    pub color: Category,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub date: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl Slot {
    pub fn new(color: Category, date: impl Into<String>) -> Self {
        Self {
            color,
            date: date.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.color == Category::Empty
    }

    pub fn set_category(&self, color: Category) -> Self {
        Self {
            color,
            date: self.date.clone(),
        }
    }

    pub fn set_date(&self, date: impl Into<String>) -> Self {
        Self {
            color: self.color,
            date: date.into(),
        }
    }

    /// Zeroes both fields together.
    pub fn clear(&self) -> Self {
        Self::default()
    }

    pub fn cycle(&self) -> Self {
        self.set_category(self.color.next())
    }
}

/// The fixed-length row of slots. Entries are replaced by index, never added
/// or removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Board {
    slots: Vec<Slot>,
}

impl Default for Board {
    fn default() -> Self {
        Self {
            slots: vec![Slot::default(); SLOT_COUNT],
        }
    }
}

impl Board {
    /// Builds a board from exactly [`SLOT_COUNT`] slots; any other length is
    /// refused and handed back.
    pub fn from_slots(slots: Vec<Slot>) -> Result<Self, Vec<Slot>> {
        if slots.len() == SLOT_COUNT {
            Ok(Self { slots })
        } else {
            Err(slots)
        }
    }

    pub fn get(&self, index: usize) -> Option<&Slot> {
        self.slots.get(index)
    }

    /// Replaces the slot at `index` with `f(slot)`. Returns the new slot, or
    /// `None` when the index is off the board.
    pub fn update(&mut self, index: usize, f: impl FnOnce(&Slot) -> Slot) -> Option<&Slot> {
        let slot = self.slots.get_mut(index)?;
        *slot = f(slot);
        Some(slot)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Slot> {
        self.slots.iter()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
