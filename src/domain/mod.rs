pub mod feed;
pub mod id;
pub mod post;
pub mod state;

pub use feed::Feed;
pub use id::unique_id;
pub use post::Post;
pub use state::{
    AddingProcess, AddingState, AppState, FeedState, LoadingState, ParsingState, UiState,
    UpdatingProcess, UpdatingState, ValidatingState,
};
