//! Action factories, one module per action family
//!
//! Every factory takes an options record, validates it and returns a
//! [`VirtualAction`](crate::VirtualAction). Invalid options are reported as
//! [`ActionError`](crate::ActionError) at construction, never at render time.

pub mod application;
pub mod control;
pub mod files;
pub mod input;
pub mod prompt;
pub mod script;
pub mod text;

pub use application::{
    activate_application, manipulate_window, quit_application, select_menu_item,
    ActivateOptions, AlreadyActivated, MenuOptions, QuitMode, QuitOptions, WindowManipulation,
    WindowOptions,
};
pub use control::{
    cancel, comment, execute_macro, for_each, group, if_then_else, pause, pause_until,
    return_result, switch, until, while_loop, CancelScope, CaseTest, CommentOptions,
    ExecuteMacroOptions, ForCollection, ForEachOptions, GroupOptions, IfThenElseOptions,
    LoopOptions, PauseOptions, PauseUntilOptions, SwitchCase, SwitchOptions, SwitchSource,
};
pub use files::{
    file_action, open_file, open_url, play_sound, read_file, screen_capture, write_file,
    CaptureDestination, CaptureOptions, FileOperation, FileOptions, OpenFileOptions,
    OpenUrlOptions, SoundOptions, WriteFileOptions,
};
pub use input::{
    move_and_click, scroll_wheel, simulate_keystroke, simulate_keystroke_str, ClickKind, Corner,
    KeystrokeOptions, MouseButton, MouseOptions, MousePosition, ScrollDirection, ScrollOptions,
};
pub use prompt::{
    prompt_for_input, prompt_with_list, ListPromptOptions, PromptButton, PromptField,
    PromptOptions,
};
pub use script::{execute_script, ScriptOptions};
pub use text::{
    cut_copy_paste, delete_variable, insert_text, notification, search_replace,
    set_clipboard_to_text, set_variable_to_calculation, set_variable_to_text, CalculationOptions,
    ClipboardTextOptions, EditCommand, InsertMode, InsertTextOptions, NotificationOptions,
    SearchMode, SearchReplaceOptions, SearchTarget, SetVariableOptions,
};
