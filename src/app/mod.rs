//! Core application logic: state, event handling, dispatch and navigation.

pub mod action;
pub mod dispatch;
pub mod event;
pub mod form;
pub mod handler;
pub mod interaction;
pub mod navigation;
pub mod patch;
pub mod state;
