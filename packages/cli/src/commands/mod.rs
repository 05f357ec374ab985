pub mod annotate;
pub mod batch;
pub mod edit;
pub mod locate;
pub mod parse;

pub use annotate::{annotate, AnnotateArgs};
pub use batch::{batch, BatchArgs};
pub use edit::{edit, EditArgs};
pub use locate::{locate, LocateArgs};
pub use parse::{parse, ParseArgs};
