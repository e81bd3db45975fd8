//! User-interaction seams shared by the page controllers.

/// Modal interaction: `window.alert` / `window.confirm` in the browser, stdin/stderr on the CLI.
pub trait Prompter {
    fn alert(&self, message: &str);
    fn confirm(&self, message: &str) -> bool;
}

/// A page-level busy indicator.
pub trait LoadingIndicator {
    fn show_loading(&self);
    fn hide_loading(&self);
}

/// Shows the indicator on creation and hides it on drop, so every exit path of a fetch hides it.
#[must_use = "the indicator is hidden as soon as the guard is dropped"]
pub struct LoadingGuard<'a, L: LoadingIndicator + ?Sized> {
    indicator: &'a L,
}

impl<'a, L: LoadingIndicator + ?Sized> LoadingGuard<'a, L> {
    pub fn new(indicator: &'a L) -> Self {
        indicator.show_loading();
        LoadingGuard { indicator }
    }
}

impl<L: LoadingIndicator + ?Sized> Drop for LoadingGuard<'_, L> {
    fn drop(&mut self) {
        self.indicator.hide_loading();
    }
}
