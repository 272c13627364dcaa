mod quiz_vm;


pub use quiz_vm::{
    ActivationOutcome, ITEMS_NOT_LOADED_MESSAGE, QuizNavigationController, RefreshFailure,
    RefreshOutcome, SERVER_UNREACHABLE_MESSAGE,
};
