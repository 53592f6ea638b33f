use thiserror::Error;

#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("migration size floor {min_bytes} is above the ceiling {max_bytes}")]
    MigrationBytesInverted { min_bytes: u64, max_bytes: u64 },

    #[error("{name} must be nonzero")]
    ZeroInterval { name: &'static str },
}

pub type Result<T> = std::result::Result<T, DispatchError>;
