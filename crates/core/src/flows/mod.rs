pub mod engine;
pub mod states;

pub use engine::{transition, FlowEngine, FlowTransitionError};
pub use states::{
    FlowContext, NavigationQuery, Notice, NoticeSource, NoticeTone, Screen, TransitionOutcome,
    ViewAction, ViewEvent, ViewState,
};
