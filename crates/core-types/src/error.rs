use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Trade {0} has already been closed")]
    AlreadyClosed(Uuid),
}
