mod autosave;
mod create;
mod helper;
