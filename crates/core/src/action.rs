/// Lifecycle of one asynchronous action.
///
/// The last successful payload survives later loads and failures, so a
/// failed refresh never blanks a panel that already rendered.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionState<T> {
    Idle,
    Loading {
        previous: Option<T>,
    },
    Success(T),
    Error {
        message: String,
        previous: Option<T>,
    },
}

impl<T> Default for ActionState<T> {
    fn default() -> Self {
        ActionState::Idle
    }
}

impl<T> ActionState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, ActionState::Loading { .. })
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, ActionState::Idle)
    }

    /// Latest successful payload, if any.
    pub fn value(&self) -> Option<&T> {
        match self {
            ActionState::Idle => None,
            ActionState::Success(value) => Some(value),
            ActionState::Loading { previous } | ActionState::Error { previous, .. } => {
                previous.as_ref()
            }
        }
    }

    pub fn value_mut(&mut self) -> Option<&mut T> {
        match self {
            ActionState::Idle => None,
            ActionState::Success(value) => Some(value),
            ActionState::Loading { previous } | ActionState::Error { previous, .. } => {
                previous.as_mut()
            }
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ActionState::Error { message, .. } => Some(message),
            _ => None,
        }
    }

    pub fn start(&mut self) {
        let previous = self.take_value();
        *self = ActionState::Loading { previous };
    }

    pub fn succeed(&mut self, value: T) {
        *self = ActionState::Success(value);
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        let previous = self.take_value();
        *self = ActionState::Error {
            message: message.into(),
            previous,
        };
    }

    fn take_value(&mut self) -> Option<T> {
        match std::mem::take(self) {
            ActionState::Idle => None,
            ActionState::Success(value) => Some(value),
            ActionState::Loading { previous } | ActionState::Error { previous, .. } => previous,
        }
    }
}
