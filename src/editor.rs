use crate::api::{KeymapApi, SaveReceipt};
use crate::error::{ApiError, Error, Result};
use crate::keymap::{validate_character, KeyPosition, Keymaps, Layer};
use crate::timer::Timer;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// How long a save confirmation stays visible.
pub const CONFIRMATION_TIMEOUT: Duration = Duration::from_secs(3);

const SAVED_MESSAGE: &str = "Keymaps saved";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    Idle,
    /// A key awaits a character. `draft` is the text typed so far.
    Selected { position: KeyPosition, draft: String },
}

/// User-visible feedback from the editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// A commit was rejected; shown inline next to the draft.
    Invalid(String),
    /// Auto-dismissed after [`CONFIRMATION_TIMEOUT`].
    Saved(String),
    /// The backend's message, verbatim.
    SaveFailed(String),
}

/// A snapshot handed to the save boundary. Edits made after it was taken are
/// not part of it.
#[derive(Debug, Clone)]
pub struct SaveTicket {
    pub revision: u64,
    pub keymaps: Keymaps,
}

/// In-memory editing of all six layers. Nothing is persisted until a save.
#[derive(Debug, Clone)]
pub struct KeymapEditorSession {
    keymaps: Keymaps,
    current_layer: Layer,
    selection: Selection,
    notice: Option<Notice>,
    confirmation: Timer,
    revision: u64,
    saved_revision: u64,
    saves_in_flight: usize,
}

impl KeymapEditorSession {
    pub fn new(initial: Keymaps) -> Self {
        Self {
            keymaps: initial,
            current_layer: Layer::BASE,
            selection: Selection::Idle,
            notice: None,
            confirmation: Timer::new(CONFIRMATION_TIMEOUT),
            revision: 0,
            saved_revision: 0,
            saves_in_flight: 0,
        }
    }

    /// Changes the visible layer. A pending selection is dropped.
    pub fn switch_layer(&mut self, layer: Layer) {
        debug!(%layer, "switch layer");
        self.current_layer = layer;
        self.selection = Selection::Idle;
        self.clear_errors();
    }

    pub fn switch_layer_index(&mut self, index: i64) -> Result<()> {
        let layer = Layer::new(index).map_err(|e| self.reject(e))?;
        self.switch_layer(layer);
        Ok(())
    }

    /// Selects a key on the current layer, replacing any previous selection.
    /// Returns its current assignment; `None` means unassigned.
    pub fn select_key(&mut self, position: KeyPosition) -> Option<&str> {
        let draft = self
            .keymaps
            .get(self.current_layer, position.as_str())
            .unwrap_or_default()
            .to_string();
        debug!(%position, layer = %self.current_layer, "select key");
        self.selection = Selection::Selected { position, draft };
        self.clear_errors();
        self.selected_assignment()
    }

    /// Assigns `raw` to the selected key and returns to idle.
    pub fn assign_character(&mut self, raw: &str) -> Result<()> {
        let position = match &self.selection {
            Selection::Selected { position, .. } => position.clone(),
            Selection::Idle => return Err(self.reject(Error::NoSelection)),
        };
        let character = validate_character(raw).map_err(|e| self.reject(e))?;

        debug!(%position, layer = %self.current_layer, %character, "assign");
        self.keymaps.assign(self.current_layer, position, character);
        self.revision += 1;
        self.selection = Selection::Idle;
        self.clear_errors();
        Ok(())
    }

    /// Commits the typed draft. Rejected drafts leave the selection in place.
    pub fn commit_typed_character(&mut self) -> Result<()> {
        let draft = match &self.selection {
            Selection::Selected { draft, .. } => draft.clone(),
            Selection::Idle => return Err(self.reject(Error::NoSelection)),
        };
        self.assign_character(&draft)
    }

    pub fn push_draft(&mut self, c: char) {
        if let Selection::Selected { draft, .. } = &mut self.selection {
            draft.push(c);
            self.clear_errors();
        }
    }

    pub fn pop_draft(&mut self) {
        if let Selection::Selected { draft, .. } = &mut self.selection {
            draft.pop();
            self.clear_errors();
        }
    }

    pub fn cancel_edit(&mut self) {
        self.selection = Selection::Idle;
        self.clear_errors();
    }

    /// Takes the full snapshot for the save boundary.
    pub fn begin_save(&mut self) -> SaveTicket {
        self.saves_in_flight += 1;
        self.clear_errors();
        info!(
            revision = self.revision,
            assignments = self.keymaps.len(),
            "save requested"
        );
        SaveTicket {
            revision: self.revision,
            keymaps: self.keymaps.clone(),
        }
    }

    /// Applies the outcome of a save started with [`begin_save`]. Local edits
    /// are kept either way. Returns whether the save succeeded.
    ///
    /// [`begin_save`]: KeymapEditorSession::begin_save
    pub fn finish_save(
        &mut self,
        revision: u64,
        result: std::result::Result<SaveReceipt, ApiError>,
        now: Instant,
    ) -> bool {
        self.saves_in_flight = self.saves_in_flight.saturating_sub(1);
        match result {
            Ok(receipt) => {
                self.saved_revision = self.saved_revision.max(revision);
                let message = receipt.message.unwrap_or_else(|| SAVED_MESSAGE.to_string());
                info!(revision, "save succeeded");
                self.notice = Some(Notice::Saved(message));
                self.confirmation.reschedule(now);
                true
            }
            Err(e) => {
                warn!(revision, error = %e, "save failed");
                self.notice = Some(Notice::SaveFailed(e.to_string()));
                self.confirmation.cancel();
                false
            }
        }
    }

    /// Saves synchronously through `api`.
    pub fn save_all(&mut self, api: &dyn KeymapApi, now: Instant) -> bool {
        let ticket = self.begin_save();
        let result = api.save(&ticket.keymaps);
        self.finish_save(ticket.revision, result, now)
    }

    /// Dismisses an expired confirmation. Returns whether anything changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        if self.confirmation.fire(now) && matches!(self.notice, Some(Notice::Saved(_))) {
            self.notice = None;
            return true;
        }
        false
    }

    pub fn keymaps(&self) -> &Keymaps {
        &self.keymaps
    }

    pub fn current_layer(&self) -> Layer {
        self.current_layer
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn selected_position(&self) -> Option<&KeyPosition> {
        match &self.selection {
            Selection::Selected { position, .. } => Some(position),
            Selection::Idle => None,
        }
    }

    pub fn selected_assignment(&self) -> Option<&str> {
        self.selected_position()
            .and_then(|p| self.keymaps.get(self.current_layer, p.as_str()))
    }

    pub fn draft(&self) -> Option<&str> {
        match &self.selection {
            Selection::Selected { draft, .. } => Some(draft),
            Selection::Idle => None,
        }
    }

    /// Label of `position` on the current layer.
    pub fn label(&self, position: &str) -> &str {
        self.keymaps.label(self.current_layer, position)
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// True when there are edits no successful save has covered yet.
    pub fn is_dirty(&self) -> bool {
        self.revision != self.saved_revision
    }

    pub fn saves_in_flight(&self) -> usize {
        self.saves_in_flight
    }

    fn reject(&mut self, err: Error) -> Error {
        debug!(error = %err, "edit rejected");
        self.notice = Some(Notice::Invalid(err.to_string()));
        err
    }

    fn clear_errors(&mut self) {
        if matches!(
            self.notice,
            Some(Notice::Invalid(_)) | Some(Notice::SaveFailed(_))
        ) {
            self.notice = None;
        }
    }
}

impl Default for KeymapEditorSession {
    fn default() -> Self {
        Self::new(Keymaps::new())
    }
}
