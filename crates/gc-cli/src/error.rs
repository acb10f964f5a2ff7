//! エラー型定義 (gcontacts)

use std::fmt;

/// gcontacts の統合エラー型
///
/// 各サブクレートのエラー型を統合して扱います
#[derive(Debug)]
pub enum CliError {
    /// Core error
    Core(gc_core::Error),
    /// Contacts error
    Contacts(gc_contacts::ContactsError),
    /// Bad command line
    Usage(String),
    /// Contact has no photo, or it could not be fetched
    NoPhoto(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Core(e) => write!(f, "Core error: {}", e),
            Self::Contacts(e) => write!(f, "Contacts error: {}", e),
            Self::Usage(e) => write!(f, "Usage error: {} (see --help)", e),
            Self::NoPhoto(id) => write!(f, "No photo available for {}", id),
        }
    }
}

impl std::error::Error for CliError {}

impl From<gc_core::Error> for CliError {
    fn from(e: gc_core::Error) -> Self {
        Self::Core(e)
    }
}

impl From<gc_contacts::ContactsError> for CliError {
    fn from(e: gc_contacts::ContactsError) -> Self {
        Self::Contacts(e)
    }
}

/// Result 型エイリアス
pub type Result<T> = std::result::Result<T, CliError>;
