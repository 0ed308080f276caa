//! User-supplied delivery hooks.
//!
//! A [`Callbacks`] pair travels with a slot binding. The success hook may
//! substitute a different image, pass the decoded one through, or veto the
//! application entirely by returning `None`. The error hook observes every
//! non-success outcome together with the response metadata when one was
//! received. Both run synchronously on the delivery path and must not block
//! indefinitely or call back into the owning binding.

use crate::error::FetchError;
use crate::http::ResponseMeta;
use image::DynamicImage;

pub type SuccessHook = Box<dyn FnMut(&DynamicImage) -> Option<DynamicImage> + Send>;
pub type ErrorHook = Box<dyn FnMut(&FetchError, Option<&ResponseMeta>) + Send>;

/// Optional success/error hook pair. An absent success hook passes the
/// decoded image through unchanged; an absent error hook is a no-op.
#[derive(Default)]
pub struct Callbacks {
    on_success: Option<SuccessHook>,
    on_error: Option<ErrorHook>,
}

impl Callbacks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_success<F>(mut self, hook: F) -> Self
    where
        F: FnMut(&DynamicImage) -> Option<DynamicImage> + Send + 'static,
    {
        self.on_success = Some(Box::new(hook));
        self
    }

    pub fn on_error<F>(mut self, hook: F) -> Self
    where
        F: FnMut(&FetchError, Option<&ResponseMeta>) + Send + 'static,
    {
        self.on_error = Some(Box::new(hook));
        self
    }

    /// Runs the success hook. Returns the image to apply to the slot, or
    /// `None` when the hook vetoed the application.
    pub(crate) fn run_success(&mut self, image: DynamicImage) -> Option<DynamicImage> {
        match &mut self.on_success {
            Some(hook) => hook(&image),
            None => Some(image),
        }
    }

    pub(crate) fn run_error(&mut self, error: &FetchError) {
        if let Some(hook) = &mut self.on_error {
            hook(error, error.response());
        }
    }
}
