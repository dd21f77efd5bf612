//! Contact form collector
//!
//! Collects the three form fields, checks them, hands the message to a
//! [`SubmissionSink`] and plays the submit-button press before reporting
//! success. Delivery itself belongs to the sink.

use std::sync::{Arc, Mutex};

use folio_animation::{AnimatedTween, AnimationHandle, Easing, Props, TweenSpec};
use folio_core::{lock, ElementId, Property};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SiteError};

/// A message collected from the form
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub message: String,
}

impl ContactMessage {
    /// Check required fields and the basic shape of the email address
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            (Field::Name, &self.name),
            (Field::Email, &self.email),
            (Field::Message, &self.message),
        ] {
            if value.trim().is_empty() {
                return Err(SiteError::Form(format!("{} is required", field.label())));
            }
        }
        if !looks_like_email(self.email.trim()) {
            return Err(SiteError::Form(format!(
                "'{}' is not a valid email address",
                self.email.trim()
            )));
        }
        Ok(())
    }

    fn clear(&mut self) {
        self.name.clear();
        self.email.clear();
        self.message.clear();
    }
}

fn looks_like_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !email.contains(char::is_whitespace)
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty() && !tld.ends_with('.'))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Email,
    Message,
}

impl Field {
    pub fn label(self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Email => "email",
            Field::Message => "message",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FormStatus {
    #[default]
    Idle,
    /// Accepted by the sink, press feedback playing
    Sending,
    Sent,
    Invalid(String),
    Failed(String),
}

/// Where submitted messages go
pub trait SubmissionSink: Send + Sync {
    fn submit(&self, message: &ContactMessage) -> Result<()>;
}

/// Sink that records submissions in the log
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl SubmissionSink for TracingSink {
    fn submit(&self, message: &ContactMessage) -> Result<()> {
        tracing::info!(
            name = %message.name,
            email = %message.email,
            length = message.message.len(),
            "contact: message submitted"
        );
        Ok(())
    }
}

#[derive(Default)]
struct FormState {
    message: ContactMessage,
    status: FormStatus,
}

fn mark_sent(state: &Mutex<FormState>) {
    let mut state = lock(state);
    state.message.clear();
    state.status = FormStatus::Sent;
    tracing::debug!("contact: form cleared");
}

/// The contact form's state and submit behaviour
pub struct ContactForm {
    state: Arc<Mutex<FormState>>,
    sink: Arc<dyn SubmissionSink>,
    animations: AnimationHandle,
    button: Option<ElementId>,
    press: Option<AnimatedTween>,
}

impl ContactForm {
    pub fn new(animations: AnimationHandle, button: Option<ElementId>) -> Self {
        Self::with_sink(animations, button, Arc::new(TracingSink))
    }

    pub fn with_sink(
        animations: AnimationHandle,
        button: Option<ElementId>,
        sink: Arc<dyn SubmissionSink>,
    ) -> Self {
        Self {
            state: Arc::new(Mutex::new(FormState::default())),
            sink,
            animations,
            button,
            press: None,
        }
    }

    pub fn set_field(&self, field: Field, value: impl Into<String>) {
        let mut state = lock(&self.state);
        let value = value.into();
        match field {
            Field::Name => state.message.name = value,
            Field::Email => state.message.email = value,
            Field::Message => state.message.message = value,
        }
    }

    pub fn field(&self, field: Field) -> String {
        let state = lock(&self.state);
        match field {
            Field::Name => state.message.name.clone(),
            Field::Email => state.message.email.clone(),
            Field::Message => state.message.message.clone(),
        }
    }

    pub fn status(&self) -> FormStatus {
        lock(&self.state).status.clone()
    }

    /// Validate and hand the message to the sink
    ///
    /// On success the button press plays and the form is cleared when it
    /// finishes. Failures are not retried.
    pub fn submit(&mut self) -> Result<()> {
        let message = {
            let mut state = lock(&self.state);
            if state.status == FormStatus::Sending {
                return Err(SiteError::Form("a submission is already in progress".to_string()));
            }
            if let Err(err) = state.message.validate() {
                state.status = FormStatus::Invalid(err.to_string());
                return Err(err);
            }
            state.status = FormStatus::Sending;
            state.message.clone()
        };

        if let Err(err) = self.sink.submit(&message) {
            tracing::warn!("contact: submission failed: {err}");
            lock(&self.state).status = FormStatus::Failed(err.to_string());
            return Err(err);
        }

        self.play_press();
        Ok(())
    }

    fn play_press(&mut self) {
        let Some(button) = self.button else {
            mark_sent(&self.state);
            return;
        };
        let finished = Arc::downgrade(&self.state);
        let press = AnimatedTween::new(
            self.animations.clone(),
            TweenSpec::to([button], Props::new().set(Property::Scale, 0.9))
                .duration(200.0)
                .repeat(1)
                .yoyo(true)
                .ease(Easing::PowerInOut(1))
                .on_complete(move || {
                    if let Some(state) = finished.upgrade() {
                        mark_sent(&state);
                    }
                }),
        );
        if press.id().is_none() {
            tracing::debug!("contact: scheduler gone, skipping press feedback");
            mark_sent(&self.state);
        }
        self.press = Some(press);
    }

    /// Kill a press still in flight
    pub fn detach(&mut self) {
        if let Some(mut press) = self.press.take() {
            press.kill();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_animation::AnimationScheduler;
    use folio_core::{Stage, Viewport};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSink(AtomicUsize);

    impl SubmissionSink for CountingSink {
        fn submit(&self, _message: &ContactMessage) -> Result<()> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct FailingSink;

    impl SubmissionSink for FailingSink {
        fn submit(&self, _message: &ContactMessage) -> Result<()> {
            Err(SiteError::Form("transport down".to_string()))
        }
    }

    fn fill(form: &ContactForm) {
        form.set_field(Field::Name, "Ada");
        form.set_field(Field::Email, "ada@example.com");
        form.set_field(Field::Message, "Hello there");
    }

    #[test]
    fn test_submit_plays_press_then_clears() {
        let stage = Stage::new(Viewport::default());
        let scheduler = AnimationScheduler::new(stage.handle());
        let button = stage.handle().create("contact-submit", None).unwrap();
        let sink = Arc::new(CountingSink(AtomicUsize::new(0)));
        let mut form = ContactForm::with_sink(scheduler.handle(), Some(button), sink.clone());

        fill(&form);
        form.submit().unwrap();
        assert_eq!(form.status(), FormStatus::Sending);
        assert_eq!(sink.0.load(Ordering::SeqCst), 1);

        scheduler.advance(200.0);
        let scale = stage.handle().style(button, Property::Scale).unwrap();
        assert!((scale - 0.9).abs() < 1e-4, "scale was {scale}");

        scheduler.advance(250.0);
        assert_eq!(form.status(), FormStatus::Sent);
        assert_eq!(form.field(Field::Name), "");
        assert_eq!(form.field(Field::Message), "");
        assert_eq!(stage.handle().style(button, Property::Scale), Some(1.0));
    }

    #[test]
    fn test_invalid_message_never_reaches_sink() {
        let stage = Stage::new(Viewport::default());
        let scheduler = AnimationScheduler::new(stage.handle());
        let sink = Arc::new(CountingSink(AtomicUsize::new(0)));
        let mut form = ContactForm::with_sink(scheduler.handle(), None, sink.clone());

        fill(&form);
        form.set_field(Field::Email, "not-an-email");
        assert!(matches!(form.submit(), Err(SiteError::Form(_))));
        assert!(matches!(form.status(), FormStatus::Invalid(_)));

        form.set_field(Field::Email, "ada@example.com");
        form.set_field(Field::Message, "   ");
        assert!(form.submit().is_err());
        assert_eq!(sink.0.load(Ordering::SeqCst), 0);
        assert_eq!(form.field(Field::Name), "Ada");
    }

    #[test]
    fn test_failed_sink_keeps_fields() {
        let stage = Stage::new(Viewport::default());
        let scheduler = AnimationScheduler::new(stage.handle());
        let mut form = ContactForm::with_sink(scheduler.handle(), None, Arc::new(FailingSink));
        fill(&form);
        assert!(form.submit().is_err());
        assert_eq!(form.status(), FormStatus::Failed("form error: transport down".to_string()));
        assert_eq!(form.field(Field::Email), "ada@example.com");
        assert_eq!(scheduler.animation_count(), 0);
    }

    #[test]
    fn test_without_button_completes_immediately() {
        let stage = Stage::new(Viewport::default());
        let scheduler = AnimationScheduler::new(stage.handle());
        let mut form = ContactForm::new(scheduler.handle(), None);
        fill(&form);
        form.submit().unwrap();
        assert_eq!(form.status(), FormStatus::Sent);
    }

    #[test]
    fn test_email_shape() {
        assert!(looks_like_email("a@b.co"));
        assert!(!looks_like_email("a@b"));
        assert!(!looks_like_email("@b.co"));
        assert!(!looks_like_email("a@@b.co"));
        assert!(!looks_like_email("a b@c.io"));
    }
}
