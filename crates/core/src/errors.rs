use thiserror::Error;

use crate::flows::FlowTransitionError;
use crate::store::StoreError;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error(transparent)]
    Flow(#[from] FlowTransitionError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ApplicationError {
    /// Stable class name used in structured command output.
    pub fn class(&self) -> &'static str {
        match self {
            Self::Flow(_) => "flow",
            Self::Store(_) => "store",
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::errors::ApplicationError;
    use crate::flows::{FlowTransitionError, Screen};
    use crate::store::StoreError;

    #[test]
    fn store_errors_keep_transport_detail_in_display() {
        let error = ApplicationError::from(StoreError::Unavailable("timeout".to_owned()));

        assert_eq!(error.class(), "store");
        assert_eq!(error.to_string(), "store unavailable: timeout");
    }

    #[test]
    fn flow_errors_keep_their_detail_in_display() {
        let error = ApplicationError::from(FlowTransitionError::InvalidTransition {
            screen: Screen::Catalog,
            event: "buy_now",
        });

        assert_eq!(error.class(), "flow");
        assert!(error.to_string().contains("buy_now"));
    }
}
