//! UI feedback hooks.
//!
//! The store does not own presentation. Callers pass a [`Feedback`] to each
//! remote-bound operation; the store reports success or failure through it
//! and brackets slow calls with the loading indicator.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastVariant {
  Success,
  Error,
}

/// A short, user-facing notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
  pub variant:  ToastVariant,
  pub title:    String,
  pub subtitle: String,
}

impl Toast {
  pub fn success(title: impl Into<String>, subtitle: impl Into<String>) -> Self {
    Self {
      variant:  ToastVariant::Success,
      title:    title.into(),
      subtitle: subtitle.into(),
    }
  }

  pub fn error(title: impl Into<String>, subtitle: impl Into<String>) -> Self {
    Self {
      variant:  ToastVariant::Error,
      title:    title.into(),
      subtitle: subtitle.into(),
    }
  }

  pub fn is_error(&self) -> bool { self.variant == ToastVariant::Error }
}

impl fmt::Display for Toast {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}: {}", self.title, self.subtitle)
  }
}

/// Receiver for per-operation UI feedback. Every method defaults to a no-op.
pub trait Feedback: Send + Sync {
  fn toast(&self, _toast: Toast) {}

  fn show_loading(&self) {}

  fn hide_loading(&self) {}
}

/// Feedback that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct Silent;

impl Feedback for Silent {}

/// Shows the loading indicator until dropped, so it is hidden on every exit
/// path including early returns.
pub(crate) struct Loading<'a>(&'a dyn Feedback);

impl<'a> Loading<'a> {
  pub(crate) fn show(feedback: &'a dyn Feedback) -> Self {
    feedback.show_loading();
    Self(feedback)
  }
}

impl Drop for Loading<'_> {
  fn drop(&mut self) { self.0.hide_loading(); }
}
