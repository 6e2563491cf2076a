//! Sign-in prompt state.

/// State of the sign-in prompt shown when an action requires authentication.
///
/// `redirect_url` is where the user should land once signed in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginPrompt {
    is_open: bool,
    message: String,
    redirect_url: String,
}

impl LoginPrompt {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self, message: impl Into<String>, redirect_url: impl Into<String>) {
        self.message = message.into();
        self.redirect_url = redirect_url.into();
        self.is_open = true;
    }

    pub fn close(&mut self) {
        self.is_open = false;
        self.message.clear();
        self.redirect_url.clear();
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn redirect_url(&self) -> &str {
        &self.redirect_url
    }
}
