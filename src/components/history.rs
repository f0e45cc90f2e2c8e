use eframe::egui;
use image::RgbaImage;
use std::collections::VecDeque;
use std::sync::mpsc;

use crate::canvas::CanvasState;

/// Default number of undo steps kept before the oldest is evicted.
pub const DEFAULT_UNDO_LIMIT: usize = 30;

// ============================================================================
// COMMAND TRAIT
// ============================================================================

/// Trait for undoable/redoable commands.
///
/// `undo` takes `&mut self` so a command can capture the state it is
/// undoing away from, which `redo` later restores.
pub trait Command: Send {
    fn undo(&mut self, canvas: &mut CanvasState);
    fn redo(&mut self, canvas: &mut CanvasState);
    fn description(&self) -> String;
    fn memory_size(&self) -> usize;
}

// ============================================================================
// SNAPSHOT COMMAND — whole-canvas before/after images
// ============================================================================

/// Stores the complete canvas before an action and, once undone, the
/// canvas as it was at undo time.
pub struct SnapshotCommand {
    description: String,
    before: RgbaImage,
    /// Starts as a copy of `before`; replaced on every undo.
    after: RgbaImage,
}

impl SnapshotCommand {
    /// Create a snapshot command. Call BEFORE performing the operation.
    pub fn new(description: impl Into<String>, state: &CanvasState) -> Self {
        let before = state.image().clone();
        Self {
            description: description.into(),
            after: before.clone(),
            before,
        }
    }

}

impl Command for SnapshotCommand {
    fn undo(&mut self, canvas: &mut CanvasState) {
        self.after = canvas.image().clone();
        canvas.replace_image(self.before.clone());
    }

    fn redo(&mut self, canvas: &mut CanvasState) {
        canvas.replace_image(self.after.clone());
    }

    fn description(&self) -> String {
        self.description.clone()
    }

    fn memory_size(&self) -> usize {
        self.before.as_raw().len() + self.after.as_raw().len()
    }
}

// ============================================================================
// AVAILABILITY SIGNALS
// ============================================================================

/// Sent to subscribers when undo/redo availability flips.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HistorySignal {
    CanUndoChanged(bool),
    CanRedoChanged(bool),
}

// ============================================================================
// HISTORY MANAGER - Manages undo/redo stacks
// ============================================================================

/// Bounded undo/redo history.
///
/// The undo stack holds entries behind the cursor, the redo stack entries in
/// front of it. Pushing clears the redo stack; the undo stack never holds
/// more than `max_history_size` entries.
pub struct HistoryManager {
    undo_stack: VecDeque<Box<dyn Command>>,
    redo_stack: VecDeque<Box<dyn Command>>,
    max_history_size: usize,
    /// Running memory total across both stacks.
    total_memory: usize,
    subscribers: Vec<mpsc::Sender<HistorySignal>>,
    last_can_undo: bool,
    last_can_redo: bool,
}

impl Default for HistoryManager {
    fn default() -> Self {
        Self::new(DEFAULT_UNDO_LIMIT)
    }
}

impl HistoryManager {
    pub fn new(max_history_size: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: VecDeque::new(),
            max_history_size: max_history_size.max(1),
            total_memory: 0,
            subscribers: Vec::new(),
            last_can_undo: false,
            last_can_redo: false,
        }
    }

    /// Receive `HistorySignal`s from now on. Dropped receivers are pruned.
    pub fn subscribe(&mut self) -> mpsc::Receiver<HistorySignal> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    pub fn push(&mut self, command: Box<dyn Command>) {
        for cmd in self.redo_stack.drain(..) {
            self.total_memory = self.total_memory.saturating_sub(cmd.memory_size());
        }

        self.total_memory += command.memory_size();
        self.undo_stack.push_back(command);
        self.prune();
        self.notify();
    }

    pub fn undo(&mut self, canvas: &mut CanvasState) -> Option<String> {
        let mut command = self.undo_stack.pop_back()?;
        let description = command.description();
        self.total_memory = self.total_memory.saturating_sub(command.memory_size());
        command.undo(canvas);
        self.total_memory += command.memory_size();
        self.redo_stack.push_back(command);
        self.notify();
        Some(description)
    }

    pub fn redo(&mut self, canvas: &mut CanvasState) -> Option<String> {
        let mut command = self.redo_stack.pop_back()?;
        let description = command.description();
        command.redo(canvas);
        self.undo_stack.push_back(command);
        self.notify();
        Some(description)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_description(&self) -> Option<String> {
        self.undo_stack.back().map(|c| c.description())
    }

    pub fn redo_description(&self) -> Option<String> {
        self.redo_stack.back().map(|c| c.description())
    }

    /// Get all undo descriptions (most recent first)
    pub fn undo_history(&self) -> Vec<String> {
        self.undo_stack.iter().rev().map(|c| c.description()).collect()
    }

    pub fn memory_usage(&self) -> usize {
        self.total_memory
    }


    fn prune(&mut self) {
        while self.undo_stack.len() > self.max_history_size {
            if let Some(removed) = self.undo_stack.pop_front() {
                self.total_memory = self.total_memory.saturating_sub(removed.memory_size());
            }
        }
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.total_memory = 0;
        self.notify();
    }

    /// Undo to position `index` in undo_history() (0 = most recent).
    pub fn undo_to(&mut self, index: usize, canvas: &mut CanvasState) {
        for _ in 0..index {
            if self.undo(canvas).is_none() {
                break;
            }
        }
    }

    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }

    fn notify(&mut self) {
        let mut signals = Vec::with_capacity(2);
        let can_undo = self.can_undo();
        if can_undo != self.last_can_undo {
            self.last_can_undo = can_undo;
            signals.push(HistorySignal::CanUndoChanged(can_undo));
        }
        let can_redo = self.can_redo();
        if can_redo != self.last_can_redo {
            self.last_can_redo = can_redo;
            signals.push(HistorySignal::CanRedoChanged(can_redo));
        }
        if signals.is_empty() {
            return;
        }
        self.subscribers
            .retain(|tx| signals.iter().all(|s| tx.send(*s).is_ok()));
    }
}

// ============================================================================
// HISTORY PANEL - UI for displaying history
// ============================================================================

#[derive(Default)]
pub struct HistoryPanel {
    show_memory_info: bool,
}

impl HistoryPanel {
    /// History list; clicking an older entry reverts to it.
    pub fn show_interactive(
        &mut self,
        ui: &mut egui::Ui,
        history: &mut HistoryManager,
        canvas: &mut CanvasState,
    ) {
        ui.horizontal(|ui| {
            ui.label(format!(
                "Undo: {} | Redo: {}",
                history.undo_count(),
                history.redo_count()
            ));
            if ui.small_button("ℹ").on_hover_text("Show memory info").clicked() {
                self.show_memory_info = !self.show_memory_info;
            }
        });

        if self.show_memory_info {
            let mem_mb = history.memory_usage() as f64 / (1024.0 * 1024.0);
            ui.label(format!("Memory: {:.2} MB", mem_mb));
        }

        egui::ScrollArea::vertical()
            .max_height(240.0)
            .show(ui, |ui| {
                let items = history.undo_history();
                if items.is_empty() {
                    ui.weak("No history yet");
                    return;
                }
                let mut revert_to: Option<usize> = None;
                for (i, desc) in items.iter().enumerate() {
                    let text = if i == 0 {
                        egui::RichText::new(format!("▶ {}", desc)).strong()
                    } else {
                        egui::RichText::new(format!("  {}", desc)).weak()
                    };
                    let response = ui.add(egui::Label::new(text).sense(egui::Sense::click()));
                    if i > 0 && response.on_hover_text("Click to revert to this state").clicked() {
                        revert_to = Some(i);
                    }
                }
                if let Some(index) = revert_to {
                    history.undo_to(index, canvas);
                }
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn paint(canvas: &mut CanvasState, v: u8) {
        canvas.fill(Rgba([v, v, v, 255]));
    }

    fn action(history: &mut HistoryManager, canvas: &mut CanvasState, v: u8) {
        history.push(Box::new(SnapshotCommand::new(format!("Paint {}", v), canvas)));
        paint(canvas, v);
    }

    #[test]
    fn undo_restores_before_and_redo_restores_undo_time_state() {
        let mut canvas = CanvasState::new(2, 2);
        let mut history = HistoryManager::new(30);
        action(&mut history, &mut canvas, 10);

        assert_eq!(history.undo(&mut canvas).as_deref(), Some("Paint 10"));
        assert_eq!(canvas.get_pixel(0, 0), Rgba([255, 255, 255, 255]));
        history.redo(&mut canvas);
        assert_eq!(canvas.get_pixel(0, 0), Rgba([10, 10, 10, 255]));
    }

    #[test]
    fn redo_image_is_captured_lazily_at_undo_time() {
        let mut canvas = CanvasState::new(2, 2);
        let mut history = HistoryManager::new(30);
        action(&mut history, &mut canvas, 10);
        // Mutation after the push but before the undo still belongs to the entry.
        paint(&mut canvas, 77);

        history.undo(&mut canvas);
        history.redo(&mut canvas);
        assert_eq!(canvas.get_pixel(1, 1), Rgba([77, 77, 77, 255]));
    }

    #[test]
    fn boundaries_are_silently_ignored() {
        let mut canvas = CanvasState::new(2, 2);
        let mut history = HistoryManager::new(30);
        assert!(history.undo(&mut canvas).is_none());
        assert!(history.redo(&mut canvas).is_none());
        action(&mut history, &mut canvas, 1);
        assert!(history.redo(&mut canvas).is_none());
        history.undo(&mut canvas);
        assert!(history.undo(&mut canvas).is_none());
    }

    #[test]
    fn push_discards_redo_entries() {
        let mut canvas = CanvasState::new(2, 2);
        let mut history = HistoryManager::new(30);
        action(&mut history, &mut canvas, 1);
        action(&mut history, &mut canvas, 2);
        history.undo(&mut canvas);
        assert!(history.can_redo());
        action(&mut history, &mut canvas, 3);
        assert!(!history.can_redo());
        assert_eq!(history.undo_history(), vec!["Paint 3", "Paint 1"]);
    }

    #[test]
    fn descriptions_follow_the_cursor() {
        let mut canvas = CanvasState::new(2, 2);
        let mut history = HistoryManager::new(30);
        assert_eq!(history.undo_description(), None);
        action(&mut history, &mut canvas, 1);
        action(&mut history, &mut canvas, 2);
        assert_eq!(history.undo_description().as_deref(), Some("Paint 2"));
        assert_eq!(history.redo_description(), None);

        history.undo(&mut canvas);
        assert_eq!(history.undo_description().as_deref(), Some("Paint 1"));
        assert_eq!(history.redo_description().as_deref(), Some("Paint 2"));
    }

    #[test]
    fn oldest_entries_are_evicted_past_the_limit() {
        let mut canvas = CanvasState::new(2, 2);
        let mut history = HistoryManager::new(3);
        for v in 1..=5 {
            action(&mut history, &mut canvas, v);
        }
        assert_eq!(history.undo_count(), 3);
        while history.undo(&mut canvas).is_some() {}
        // Back to the state before action 3, never further.
        assert_eq!(canvas.get_pixel(0, 0), Rgba([2, 2, 2, 255]));
    }

    #[test]
    fn signals_fire_only_on_change() {
        let mut canvas = CanvasState::new(2, 2);
        let mut history = HistoryManager::new(30);
        let rx = history.subscribe();

        action(&mut history, &mut canvas, 1);
        action(&mut history, &mut canvas, 2);
        history.undo(&mut canvas);
        history.undo(&mut canvas);
        history.redo(&mut canvas);

        let got: Vec<_> = rx.try_iter().collect();
        assert_eq!(
            got,
            vec![
                HistorySignal::CanUndoChanged(true),
                HistorySignal::CanRedoChanged(true),
                HistorySignal::CanUndoChanged(false),
                HistorySignal::CanUndoChanged(true),
            ]
        );
    }

    #[test]
    fn dropped_subscribers_are_pruned() {
        let mut canvas = CanvasState::new(2, 2);
        let mut history = HistoryManager::new(30);
        drop(history.subscribe());
        let rx = history.subscribe();
        action(&mut history, &mut canvas, 1);
        assert_eq!(rx.try_recv(), Ok(HistorySignal::CanUndoChanged(true)));
        assert_eq!(history.subscribers.len(), 1);
    }

    #[test]
    fn undo_to_walks_back_several_entries() {
        let mut canvas = CanvasState::new(2, 2);
        let mut history = HistoryManager::new(30);
        for v in 1..=4 {
            action(&mut history, &mut canvas, v);
        }
        history.undo_to(2, &mut canvas);
        assert_eq!(canvas.get_pixel(0, 0), Rgba([2, 2, 2, 255]));
        assert_eq!(history.redo_count(), 2);
    }

    #[test]
    fn memory_accounting_tracks_both_stacks() {
        let mut canvas = CanvasState::new(4, 4);
        let mut history = HistoryManager::new(30);
        action(&mut history, &mut canvas, 1);
        assert_eq!(history.memory_usage(), 2 * 4 * 4 * 4);
        history.undo(&mut canvas);
        assert_eq!(history.memory_usage(), 2 * 4 * 4 * 4);
        history.clear();
        assert_eq!(history.memory_usage(), 0);
        assert!(!history.can_undo() && !history.can_redo());
    }
}
