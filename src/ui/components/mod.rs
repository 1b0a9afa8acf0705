pub mod editor_pane;
pub mod file_browser;
pub mod prompt_box;
pub mod select_list;
