//! Pointer-drag interaction state machine.
//!
//! A [`DragController`] holds exactly one [`DragState`] value. Pointer events
//! are fed through [`DragController::handle`], which mutates the store and
//! reports what happened as a [`DragOutcome`].
//!
//! ```text
//!            press palette                 release over canvas
//!   Idle ─────────────────▶ DraggingNew ─────────────────────────▶ Idle (+ create)
//!    │                          │ release outside / cancel
//!    │                          └────────────────────────────────▶ Idle
//!    │ press element                       release over canvas
//!    └───────────────────▶ DraggingExisting ─────────────────────▶ Idle (final position)
//!                               │ release outside / cancel
//!                               └────────────────────────────────▶ Idle (origin restored)
//! ```

use serde::{Deserialize, Serialize};

use crate::event::{DropTarget, PointerEvent, PressTarget};
use crate::{DocumentStore, ElementId, ElementPatch, ElementType, Position};

/// Offset from the drop point to the created element's top-left corner.
///
/// Half of the 100×50 drag preview, so the preview's centre lands where the
/// element's anchor ends up.
pub const DROP_ANCHOR: Position = Position::new(50.0, 25.0);

/// Top-left corner for an element dropped at (x, y), clamped at zero.
#[must_use]
pub fn drop_position(x: f64, y: f64) -> Position {
    Position::new(x - DROP_ANCHOR.x, y - DROP_ANCHOR.y).clamped()
}

/// Active drag of an element already on the page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActiveDrag {
    /// Element being dragged.
    pub id: ElementId,
    /// Element position when the drag began.
    pub origin: Position,
    /// Pointer position at press.
    pub press: Position,
    /// Cumulative pointer displacement since press.
    pub delta: Position,
}

impl ActiveDrag {
    /// Origin plus cumulative delta, each axis clamped at 0.
    #[must_use]
    pub fn live_position(&self) -> Position {
        self.origin.offset(self.delta.x, self.delta.y).clamped()
    }

    fn track(&mut self, x: f64, y: f64) {
        self.delta = Position::new(x - self.press.x, y - self.press.y);
    }
}

/// The controller's single state value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum DragState {
    /// No drag in progress.
    #[default]
    Idle,
    /// Dragging a palette item that has not been placed yet.
    DraggingNew {
        /// Type that will be created on drop.
        kind: ElementType,
        /// Last known pointer position.
        pointer: Position,
    },
    /// Dragging an element that is already on the page.
    DraggingExisting(ActiveDrag),
}

/// Result of feeding one pointer event to the controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragOutcome {
    /// Event had no effect in the current state.
    Ignored,
    /// Press over empty canvas cleared the selection.
    Deselected,
    /// A palette drag began.
    StartedNew(ElementType),
    /// An element was selected and its drag began.
    StartedExisting(ElementId),
    /// Pointer moved during a palette drag.
    Tracking(Position),
    /// Live position update of the dragged element.
    Moved(ElementId, Position),
    /// A palette drop created an element.
    Created(ElementId),
    /// The dragged element was released at its final position.
    Placed(ElementId, Position),
    /// The drag was cancelled and the element is back at its origin.
    Restored(ElementId),
    /// A palette drag ended without creating anything.
    Discarded,
    /// The dragged element disappeared mid-drag.
    Aborted(ElementId),
}

impl DragOutcome {
    /// Whether the outcome left a net change in the document.
    #[must_use]
    pub fn changed_document(&self) -> bool {
        matches!(self, Self::Created(_) | Self::Placed(..))
    }
}

/// Drives element creation and movement from pointer events.
#[derive(Debug, Clone, Default)]
pub struct DragController {
    state: DragState,
}

impl DragController {
    /// Create an idle controller.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> DragState {
        self.state
    }

    /// Whether any drag is in progress.
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        !matches!(self.state, DragState::Idle)
    }

    /// Feed one pointer event.
    pub fn handle(&mut self, store: &mut DocumentStore, event: PointerEvent) -> DragOutcome {
        match (self.state, event) {
            (DragState::Idle, PointerEvent::Press { x, y, target }) => {
                self.press(store, x, y, target)
            }
            (DragState::Idle, _) => DragOutcome::Ignored,

            (_, PointerEvent::Press { .. }) => {
                tracing::debug!("Press ignored: drag already in progress");
                DragOutcome::Ignored
            }

            (DragState::DraggingNew { kind, .. }, PointerEvent::Move { x, y }) => {
                let pointer = Position::new(x, y);
                self.state = DragState::DraggingNew { kind, pointer };
                DragOutcome::Tracking(pointer)
            }
            (DragState::DraggingNew { kind, .. }, PointerEvent::Release { x, y, over }) => {
                self.state = DragState::Idle;
                match over {
                    DropTarget::Canvas => {
                        let id = store.create_element(kind, drop_position(x, y));
                        tracing::debug!("Palette drop created {kind} element {id}");
                        DragOutcome::Created(id)
                    }
                    DropTarget::Outside => {
                        tracing::debug!("Palette drag for {kind} dropped outside canvas");
                        DragOutcome::Discarded
                    }
                }
            }
            (DragState::DraggingNew { .. }, PointerEvent::Cancel) => {
                self.state = DragState::Idle;
                DragOutcome::Discarded
            }

            (DragState::DraggingExisting(mut drag), PointerEvent::Move { x, y }) => {
                drag.track(x, y);
                let position = drag.live_position();
                if store.update_element(drag.id, ElementPatch::position(position)).is_err() {
                    return self.abort(drag.id);
                }
                self.state = DragState::DraggingExisting(drag);
                DragOutcome::Moved(drag.id, position)
            }
            (
                DragState::DraggingExisting(mut drag),
                PointerEvent::Release {
                    x,
                    y,
                    over: DropTarget::Canvas,
                },
            ) => {
                drag.track(x, y);
                let position = drag.live_position();
                if store.update_element(drag.id, ElementPatch::position(position)).is_err() {
                    return self.abort(drag.id);
                }
                self.state = DragState::Idle;
                tracing::debug!(
                    "Element {} placed at ({}, {})",
                    drag.id,
                    position.x,
                    position.y
                );
                DragOutcome::Placed(drag.id, position)
            }
            (
                DragState::DraggingExisting(drag),
                PointerEvent::Release {
                    over: DropTarget::Outside,
                    ..
                }
                | PointerEvent::Cancel,
            ) => {
                if store.update_element(drag.id, ElementPatch::position(drag.origin)).is_err() {
                    return self.abort(drag.id);
                }
                self.state = DragState::Idle;
                tracing::debug!("Drag of element {} cancelled, origin restored", drag.id);
                DragOutcome::Restored(drag.id)
            }
        }
    }

    fn press(
        &mut self,
        store: &mut DocumentStore,
        x: f64,
        y: f64,
        target: PressTarget,
    ) -> DragOutcome {
        match target {
            PressTarget::Palette(kind) => {
                self.state = DragState::DraggingNew {
                    kind,
                    pointer: Position::new(x, y),
                };
                tracing::debug!("Palette drag started for {kind}");
                DragOutcome::StartedNew(kind)
            }
            PressTarget::Element(id) => {
                let Some(origin) = store.element(id).map(|e| e.position) else {
                    tracing::warn!("Press on unknown element {id}");
                    return DragOutcome::Ignored;
                };
                if store.select(id).is_err() {
                    return DragOutcome::Ignored;
                }
                self.state = DragState::DraggingExisting(ActiveDrag {
                    id,
                    origin,
                    press: Position::new(x, y),
                    delta: Position::default(),
                });
                tracing::debug!("Drag started for element {id} at ({}, {})", origin.x, origin.y);
                DragOutcome::StartedExisting(id)
            }
            PressTarget::Canvas => {
                store.clear_selection();
                DragOutcome::Deselected
            }
            PressTarget::Outside => DragOutcome::Ignored,
        }
    }

    fn abort(&mut self, id: ElementId) -> DragOutcome {
        tracing::warn!("Dragged element {id} no longer exists; drag aborted");
        self.state = DragState::Idle;
        DragOutcome::Aborted(id)
    }
}
