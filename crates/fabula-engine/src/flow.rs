//! Explicit suspension: command resolution as a value.
//!
//! A command either finishes with a success flag or suspends waiting for the
//! player to pick an option (a clarification, a "Next" page, a conversation
//! branch). The rest of the work becomes a continuation attached to each
//! option, so suspension points are visible in the type system instead of
//! being buried in asynchronous control flow.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::session::Session;

/// The rest of a suspended command, resumed with the session.
pub type Continuation = Box<dyn FnOnce(&mut Session) -> Flow>;

/// One selectable option on a suspended command.
pub struct PromptOption {
    /// The label shown to the player.
    pub label: String,
    /// The continuation run when this option is selected.
    pub resume: Continuation,
}

impl PromptOption {
    /// Create an option.
    pub fn new(label: impl Into<String>, resume: Continuation) -> Self {
        Self {
            label: label.into(),
            resume,
        }
    }
}

impl fmt::Debug for PromptOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PromptOption")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

/// A question put to the player, with one continuation per option.
#[derive(Debug)]
pub struct Prompt {
    /// The question text, narrated before the options ("" for bare options).
    pub question: String,
    /// The selectable options.
    pub options: Vec<PromptOption>,
}

impl Prompt {
    /// A prompt with a question and options.
    pub fn new(question: impl Into<String>, options: Vec<PromptOption>) -> Self {
        Self {
            question: question.into(),
            options,
        }
    }

    /// A single-option prompt, used for pagination.
    pub fn next(label: impl Into<String>, resume: Continuation) -> Self {
        Self {
            question: String::new(),
            options: vec![PromptOption::new(label, resume)],
        }
    }
}

/// The result of driving a command as far as it can go without the player.
#[derive(Debug)]
pub enum Flow {
    /// The command finished; true means it counts as a success for chaining.
    Done(bool),
    /// The command is waiting on a choice.
    Awaiting(Prompt),
}

/// Run `then` after `flow` completes, regardless of how many suspensions
/// `flow` still has ahead of it.
///
/// For a finished flow, `then` runs immediately. For a suspended one, every
/// option's continuation is wrapped so that whichever option the player
/// picks, `then` runs once the inner flow finishes. Only one option ever
/// runs, so the single `then` is shared behind an `Rc<RefCell<Option<_>>>`.
pub(crate) fn flow_then<F>(sess: &mut Session, flow: Flow, then: F) -> Flow
where
    F: FnOnce(&mut Session, bool) -> Flow + 'static,
{
    match flow {
        Flow::Done(result) => then(sess, result),
        Flow::Awaiting(prompt) => {
            let shared = Rc::new(RefCell::new(Some(then)));
            let options = prompt
                .options
                .into_iter()
                .map(|option| {
                    let shared = Rc::clone(&shared);
                    PromptOption {
                        label: option.label,
                        resume: Box::new(move |sess: &mut Session| {
                            let inner = (option.resume)(sess);
                            let taken = shared.borrow_mut().take();
                            match taken {
                                Some(then) => flow_then(sess, inner, then),
                                None => inner,
                            }
                        }),
                    }
                })
                .collect();
            Flow::Awaiting(Prompt {
                question: prompt.question,
                options,
            })
        }
    }
}

/// Public outcome of `Session::resolve` and `Session::choose`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The command ran to completion with the given success flag.
    Complete(bool),
    /// The command is suspended; see `Session::options`.
    Suspended,
}

impl Resolution {
    /// Whether the command completed successfully.
    pub fn succeeded(&self) -> bool {
        matches!(self, Self::Complete(true))
    }
}
