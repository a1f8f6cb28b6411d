use serde::Serialize;

use crate::error::{PortalError, PortalResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FormPhase {
    Idle,
    Editing,
    Submitting,
    /// The last submission was rejected by the server; input is kept.
    Failed,
}

/// Create/edit form of a management page.
///
/// `Idle -> Editing -> Submitting -> Idle`, `Submitting -> Failed`, and
/// `cancel` from `Editing`/`Failed` back to `Idle`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Form<Id, Input> {
    pub phase: FormPhase,
    pub editing_id: Option<Id>,
    pub input: Input,
    pub error: Option<String>,
}

impl<Id, Input: Default> Form<Id, Input> {
    pub fn new() -> Self {
        Self {
            phase: FormPhase::Idle,
            editing_id: None,
            input: Input::default(),
            error: None,
        }
    }

    pub fn edit(&mut self, id: Id, input: Input) {
        self.phase = FormPhase::Editing;
        self.editing_id = Some(id);
        self.input = input;
        self.error = None;
    }

    /// Client-side validation failed: keep what the user typed, issue nothing.
    pub fn reject(&mut self, input: Input, message: String) {
        self.input = input;
        self.error = Some(message);
    }

    /// Enters `Submitting`. The returned guard must be settled once the
    /// request has an outcome; dropping it unsettled marks the form `Failed`.
    pub fn start_submit(&mut self, input: Input) -> PortalResult<InFlight<'_, Id, Input>> {
        if self.phase == FormPhase::Submitting {
            return Err(PortalError::Busy);
        }
        self.phase = FormPhase::Submitting;
        self.input = input;
        self.error = None;
        Ok(InFlight {
            form: self,
            settled: false,
        })
    }

    pub fn succeed(&mut self) {
        self.reset();
    }

    pub fn fail(&mut self, message: String) {
        self.phase = FormPhase::Failed;
        self.error = Some(message);
    }

    /// Discards unsaved input. Refused while a submission is in flight.
    pub fn cancel(&mut self) -> bool {
        if self.phase == FormPhase::Submitting {
            return false;
        }
        self.reset();
        true
    }

    fn reset(&mut self) {
        self.phase = FormPhase::Idle;
        self.editing_id = None;
        self.input = Input::default();
        self.error = None;
    }
}

/// Left on a form whose request was abandoned before it answered.
pub const INTERRUPTED_MESSAGE: &str = "The submission was interrupted, please try again";

/// A submission whose request is still outstanding.
pub struct InFlight<'a, Id, Input> {
    form: &'a mut Form<Id, Input>,
    settled: bool,
}

impl<Id, Input> InFlight<'_, Id, Input> {
    /// The request answered; the caller moves the form on from here.
    pub fn settle(mut self) {
        self.settled = true;
    }
}

impl<Id, Input> Drop for InFlight<'_, Id, Input> {
    fn drop(&mut self) {
        if !self.settled && self.form.phase == FormPhase::Submitting {
            self.form.phase = FormPhase::Failed;
            self.form.error = Some(INTERRUPTED_MESSAGE.to_string());
        }
    }
}

impl<Id, Input: Default> Default for Form<Id, Input> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type TestForm = Form<i64, String>;

    #[test]
    fn edit_submit_succeed_returns_to_idle() {
        let mut form = TestForm::new();
        form.edit(4, "Dairy".into());
        assert_eq!(form.phase, FormPhase::Editing);

        form.start_submit("Dairy products".into()).unwrap().settle();
        assert_eq!(form.phase, FormPhase::Submitting);

        form.succeed();
        assert_eq!(form.phase, FormPhase::Idle);
        assert_eq!(form.editing_id, None);
        assert!(form.input.is_empty());
    }

    #[test]
    fn failure_keeps_input_until_cancelled() {
        let mut form = TestForm::new();
        form.edit(4, "Dairy".into());
        form.start_submit("Dairy!".into()).unwrap().settle();
        form.fail("Name taken".into());

        assert_eq!(form.phase, FormPhase::Failed);
        assert_eq!(form.input, "Dairy!");
        assert_eq!(form.editing_id, Some(4));

        assert!(form.cancel());
        assert_eq!(form.phase, FormPhase::Idle);
        assert!(form.input.is_empty());
    }

    #[test]
    fn second_submit_while_in_flight_is_busy() {
        let mut form = TestForm::new();
        form.start_submit("a".into()).unwrap().settle();
        assert!(matches!(form.start_submit("b".into()), Err(PortalError::Busy)));
        assert!(!form.cancel());
        assert_eq!(form.input, "a");
    }

    #[test]
    fn abandoned_submission_can_be_retried_or_cancelled() {
        let mut form = TestForm::new();
        form.edit(7, "Gluten".into());
        {
            let _in_flight = form.start_submit("Gluten free".into()).unwrap();
        }

        assert_eq!(form.phase, FormPhase::Failed);
        assert_eq!(form.error.as_deref(), Some(INTERRUPTED_MESSAGE));
        assert_eq!(form.input, "Gluten free");
        assert_eq!(form.editing_id, Some(7));

        form.start_submit("Gluten free".into()).unwrap().settle();
        assert_eq!(form.phase, FormPhase::Submitting);
        form.fail("again".into());
        assert!(form.cancel());
        assert_eq!(form.phase, FormPhase::Idle);
    }

    #[test]
    fn rejected_input_keeps_phase() {
        let mut form = TestForm::new();
        form.edit(1, "x".into());
        form.reject("".into(), "Name is required".into());
        assert_eq!(form.phase, FormPhase::Editing);
        assert_eq!(form.error.as_deref(), Some("Name is required"));
    }
}
