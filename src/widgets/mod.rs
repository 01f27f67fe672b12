//! Higher-level widgets built on the component trait.

pub mod checklist;
pub mod input;
pub mod notification;
pub mod suggestion_editor;
pub mod suggestion_list;

pub use checklist::{CheckItem, CheckList, CheckListTheme};
pub use input::Input;
pub use notification::Notification;
pub use suggestion_editor::SuggestionEditor;
pub use suggestion_list::{SuggestionList, SuggestionListTheme};
