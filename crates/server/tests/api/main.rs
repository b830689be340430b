mod helpers;

mod analyses;
mod persistence;
mod ui_fragments;
