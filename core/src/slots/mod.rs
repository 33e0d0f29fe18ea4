//! CSV attachment slots and their validation state.
//!
//! Each slot of the upload form (file, description, key column, schema
//! option) is validated asynchronously: the UI reads the file, then hands the
//! text to the matcher. Reads for one slot may overlap when the user changes
//! the file or the option quickly, so every request is stamped:
//!
//! ```text
//! begin(slot) ──▶ Ticket { slot, generation: 3 }
//! begin(slot) ──▶ Ticket { slot, generation: 4 }
//! complete(gen 4) ──▶ Applied
//! complete(gen 3) ──▶ Stale (discarded)
//! ```
//!
//! Only the latest request of a slot can store its verdict.

pub mod view;

use serde::{Deserialize, Serialize};

use crate::error::{ClientError, ClientResult};
use crate::validation::ValidationVerdict;

pub use view::{Dropdown, SlotStatus, SlotView};

/// Slot identifier, unique for the life of a tracker.
pub type SlotId = u32;

/// Stamp of one validation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    pub slot: SlotId,
    pub generation: u64,
}

/// What happened to a completed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// The verdict was stored.
    Applied,
    /// A newer request exists for the slot, or the slot is gone.
    Stale,
}

/// One CSV attachment of the upload form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CsvSlot {
    pub id: SlotId,
    /// Selected file name; `None` when no file is chosen.
    pub file_name: Option<String>,
    pub description: String,
    /// Column used to merge the CSV rows with BIM elements.
    pub key_column: String,
    /// Schema option chosen in the dropdown.
    pub selected_option: Option<String>,
    generation: u64,
    pending: bool,
    verdict: Option<ValidationVerdict>,
}

impl CsvSlot {
    pub fn has_file(&self) -> bool {
        self.file_name.is_some()
    }

    /// The verdict does not reflect the current file and option yet.
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Verdict of the latest completed validation.
    pub fn verdict(&self) -> Option<&ValidationVerdict> {
        self.verdict.as_ref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Drop the verdict and invalidate any request in flight.
    fn invalidate(&mut self) {
        self.generation += 1;
        self.pending = false;
        self.verdict = None;
    }
}

/// Ordered set of CSV slots with generation-stamped validation.
#[derive(Debug, Clone, Default)]
pub struct SlotTracker {
    slots: Vec<CsvSlot>,
    next_id: SlotId,
}

impl SlotTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an empty slot.
    pub fn add_slot(&mut self) -> SlotId {
        let id = self.next_id;
        self.next_id += 1;
        self.slots.push(CsvSlot {
            id,
            ..Default::default()
        });
        id
    }

    /// Remove a slot; in-flight requests for it become stale.
    pub fn remove_slot(&mut self, id: SlotId) -> bool {
        let before = self.slots.len();
        self.slots.retain(|s| s.id != id);
        self.slots.len() != before
    }

    /// Remove every slot (the LOD changed or the form was reset).
    pub fn clear(&mut self) {
        self.slots.clear();
    }

    pub fn slots(&self) -> &[CsvSlot] {
        &self.slots
    }

    pub fn slot(&self, id: SlotId) -> Option<&CsvSlot> {
        self.slots.iter().find(|s| s.id == id)
    }

    fn slot_mut(&mut self, id: SlotId) -> ClientResult<&mut CsvSlot> {
        self.slots
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(ClientError::UnknownSlot(id))
    }

    /// Select (or clear) the slot's file.
    ///
    /// The schema option and the verdict are reset, like a fresh slot.
    pub fn set_file(&mut self, id: SlotId, file_name: Option<String>) -> ClientResult<()> {
        let slot = self.slot_mut(id)?;
        slot.file_name = file_name;
        slot.selected_option = None;
        slot.invalidate();
        Ok(())
    }

    /// Choose a schema option; an empty string clears it.
    ///
    /// A different option makes a file's verdict outdated: the slot stays
    /// pending until it is validated again, and requests in flight become
    /// stale. The old verdict is kept for display only.
    pub fn set_option(&mut self, id: SlotId, option: Option<String>) -> ClientResult<()> {
        let slot = self.slot_mut(id)?;
        let option = option.filter(|o| !o.is_empty());
        if option == slot.selected_option {
            return Ok(());
        }

        slot.selected_option = option;
        slot.generation += 1;
        slot.pending = slot.has_file();
        Ok(())
    }

    pub fn set_details(&mut self, id: SlotId, description: String, key_column: String) -> ClientResult<()> {
        let slot = self.slot_mut(id)?;
        slot.description = description;
        slot.key_column = key_column;
        Ok(())
    }

    /// Start a validation request for a slot.
    pub fn begin(&mut self, id: SlotId) -> ClientResult<Ticket> {
        let slot = self.slot_mut(id)?;
        slot.generation += 1;
        slot.pending = true;
        Ok(Ticket {
            slot: id,
            generation: slot.generation,
        })
    }

    /// Whether `ticket` is still the latest request of its slot.
    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.slot(ticket.slot)
            .is_some_and(|s| s.generation == ticket.generation)
    }

    /// Store the verdict of a request unless a newer one was started.
    ///
    /// An invalid verdict that offers no selection remedy (structural or
    /// parse errors) also drops the file, so the user picks another one.
    pub fn complete(&mut self, ticket: Ticket, verdict: ValidationVerdict) -> Completion {
        if !self.is_current(ticket) {
            log::debug!(
                "discarding stale verdict for slot {} (generation {})",
                ticket.slot,
                ticket.generation
            );
            return Completion::Stale;
        }

        let Ok(slot) = self.slot_mut(ticket.slot) else {
            return Completion::Stale;
        };

        slot.pending = false;
        if !verdict.is_valid && !verdict.requires_selection {
            slot.file_name = None;
            slot.selected_option = None;
        } else if let Some(option) = &slot.selected_option {
            // Keep a chosen option only while the verdict still offers it.
            if !verdict.selection_options.contains(option) {
                slot.selected_option = None;
            }
        }
        slot.verdict = Some(verdict);
        Completion::Applied
    }

    /// The file read of a request failed.
    pub fn fail(&mut self, ticket: Ticket) -> Completion {
        self.complete(ticket, ValidationVerdict::read_error())
    }

    /// UI state of a slot.
    pub fn view(&self, id: SlotId) -> Option<SlotView> {
        self.slot(id).map(SlotView::from_slot)
    }
}
