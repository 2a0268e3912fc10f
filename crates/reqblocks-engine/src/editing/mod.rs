/*!
 * # Editing
 *
 * The document session that turns user input into block-array mutations.
 *
 * All input enters as a [`Cmd`] and goes through [`Editor::apply`], which
 * returns a [`Patch`] describing what changed. Commands that need rendered
 * geometry are queued and finished by [`Editor::after_layout`] once the
 * front end has painted:
 *
 * ```rust
 * use reqblocks_engine::editing::{Cmd, Editor};
 * use reqblocks_engine::layout::MonospaceLayout;
 * use reqblocks_engine::Dictionary;
 *
 * let mut editor = Editor::from_text("while aircraft", Dictionary::ears());
 * editor.apply(Cmd::Input { text: "speed".to_string() });
 * let patch = editor.apply(Cmd::Space);
 * assert_eq!(patch.merges.len(), 1);
 * assert_eq!(editor.text(), "while aircraft speed");
 *
 * editor.apply(Cmd::ArrowLeft);
 * let layout = MonospaceLayout::compute(&editor.lines(), 80, editor.caret(), editor.pending());
 * editor.after_layout(&layout);
 * ```
 */

pub mod commands;
pub mod editor;
pub mod patch;

pub use commands::{Cmd, DropTarget};
pub use editor::Editor;
pub use patch::Patch;
