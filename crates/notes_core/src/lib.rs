pub mod domain;
pub mod gateway;
pub mod ports;

pub use domain::{classify, DisplayOption, ExpirationOffset, Note, NoteState};
pub use gateway::{CreateNote, GatewayError, GatewayResult, NoteGateway, DEFAULT_MAX_CONTENT_CHARS};
pub use ports::{NotePatch, NoteStore, PortError, PortResult};
